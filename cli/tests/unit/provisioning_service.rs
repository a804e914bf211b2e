//! Unit tests for the provisioning gate and failure handling.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use vmagent_cli::application::services::provisioning::{
    handle_provisioning_failure, provision,
};
use vmagent_cli::application::services::verification::{VerificationOutcome, verify_template};
use vmagent_cli::domain::error::ProvisioningError;
use vmagent_cli::domain::status::{TemplateStatus, VerificationState};
use vmagent_cli::domain::template::Template;
use vmagent_cli::infra::queue::InMemoryVerificationQueue;
use vmagent_common::FailureStage;

use crate::mocks::{
    BrokenQueue, FakeCloud, FakeCredentials, RecordingProvisioning, RecordingReporter,
    advanced_record, basic_record,
};

/// A verified template bound to the `prod` cloud.
fn verified(name: &str) -> (Template, TemplateStatus) {
    let (template, mut status) = Template::rehydrate(advanced_record(name));
    status.bind_cloud("prod").unwrap();
    status.mark_verified();
    (template, status)
}

// ── Gate ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_provision_unverified_template_is_refused() {
    let (template, mut status) = Template::rehydrate(advanced_record("linux-builders"));
    let provisioning = RecordingProvisioning::accepting();

    let err = provision(
        &template,
        &mut status,
        &FakeCloud::new("prod", "build-rg"),
        &provisioning,
        &InMemoryVerificationQueue::new(),
        1,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ProvisioningError>(),
        Some(ProvisioningError::NotVerified { template }) if template == "linux-builders"
    ));
    assert!(provisioning.deployment_calls().is_empty());
}

#[tokio::test]
async fn test_provision_zero_agents_is_refused() {
    let (template, mut status) = verified("linux-builders");
    let provisioning = RecordingProvisioning::accepting();

    let err = provision(
        &template,
        &mut status,
        &FakeCloud::new("prod", "build-rg"),
        &provisioning,
        &InMemoryVerificationQueue::new(),
        0,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ProvisioningError>(),
        Some(ProvisioningError::InvalidCount { count: 0 })
    ));
    assert!(provisioning.deployment_calls().is_empty());
    assert!(status.is_verified());
}

#[tokio::test]
async fn test_provision_verified_template_requests_deployment() {
    let (template, mut status) = verified("linux-builders");
    let provisioning = RecordingProvisioning::accepting();
    let queue = InMemoryVerificationQueue::new();

    let handle = provision(
        &template,
        &mut status,
        &FakeCloud::new("prod", "build-rg"),
        &provisioning,
        &queue,
        3,
    )
    .await
    .expect("deployment accepted");

    assert_eq!(handle.agent_count, 3);
    assert_eq!(handle.resource_group, "build-rg");
    assert_eq!(
        provisioning.deployment_calls(),
        vec![("linux-builders".to_string(), 3)]
    );
    assert!(status.is_verified());
    assert!(queue.is_empty());
}

#[tokio::test]
async fn test_provision_rehydrated_verified_record_without_binding_is_refused() {
    let mut record = basic_record("persisted");
    record.template_verified = true;
    let (template, mut status) = Template::rehydrate(record);
    assert!(status.is_verified());
    assert_eq!(status.cloud, None);
    let provisioning = RecordingProvisioning::accepting();

    let err = provision(
        &template,
        &mut status,
        &FakeCloud::new("prod", "vmagent-rg"),
        &provisioning,
        &InMemoryVerificationQueue::new(),
        1,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ProvisioningError>(),
        Some(ProvisioningError::NotBound { template, cloud })
            if template == "persisted" && cloud == "prod"
    ));
    assert!(provisioning.deployment_calls().is_empty());
    assert!(status.is_verified());
}

#[tokio::test]
async fn test_provision_for_another_cloud_is_refused() {
    let (template, mut status) = verified("linux-builders");
    let provisioning = RecordingProvisioning::accepting();

    let err = provision(
        &template,
        &mut status,
        &FakeCloud::new("staging", "build-rg"),
        &provisioning,
        &InMemoryVerificationQueue::new(),
        1,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ProvisioningError>(),
        Some(ProvisioningError::NotBound { cloud, .. }) if cloud == "staging"
    ));
    assert!(provisioning.deployment_calls().is_empty());
}

#[tokio::test]
async fn test_provision_bound_template_without_storage_name_is_refused() {
    let mut record = basic_record("persisted");
    record.template_verified = true;
    let (template, mut status) = Template::rehydrate(record);
    status.bind_cloud("prod").unwrap();
    let provisioning = RecordingProvisioning::accepting();

    let err = provision(
        &template,
        &mut status,
        &FakeCloud::new("prod", "vmagent-rg"),
        &provisioning,
        &InMemoryVerificationQueue::new(),
        1,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ProvisioningError>(),
        Some(ProvisioningError::MissingStorageAccount { template }) if template == "persisted"
    ));
    assert!(provisioning.deployment_calls().is_empty());
}

#[tokio::test]
async fn test_reverified_rehydrated_record_provisions_with_generated_storage_name() {
    let mut record = basic_record("persisted");
    record.template_verified = true;
    let (mut template, mut status) = Template::rehydrate(record);
    let cloud = FakeCloud::new("prod", "vmagent-rg");
    let provisioning = RecordingProvisioning::accepting();

    verify_template(
        &mut template,
        &mut status,
        &cloud,
        &FakeCredentials::with(&["vm-creds"]),
        &provisioning,
        &RecordingReporter::default(),
    )
    .await
    .unwrap();
    provision(
        &template,
        &mut status,
        &cloud,
        &provisioning,
        &InMemoryVerificationQueue::new(),
        1,
    )
    .await
    .expect("bound template provisions");

    assert_eq!(template.storage.effective_name(), "jn7lw8ompbmsnpu491uh9goq");
}

#[test]
fn test_disabled_template_is_not_usable_even_when_verified() {
    let mut record = advanced_record("linux-builders");
    record.template_disabled = true;
    let (template, mut status) = Template::rehydrate(record);
    status.mark_verified();

    assert!(status.is_verified());
    assert!(!status.is_usable(&template));
}

// ── Failure handling ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_failed_deployment_marks_failed_and_queues_once() {
    let (template, mut status) = verified("linux-builders");
    let provisioning = RecordingProvisioning {
        deploy_fails: true,
        ..RecordingProvisioning::default()
    };
    let queue = InMemoryVerificationQueue::new();
    let cloud = FakeCloud::new("prod", "build-rg");

    let err = provision(&template, &mut status, &cloud, &provisioning, &queue, 2)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("quota exceeded"));
    assert!(matches!(status.state, VerificationState::Failed { .. }));
    assert!(status.status_details.contains("quota exceeded"));

    handle_provisioning_failure(
        &template,
        &mut status,
        &queue,
        "init script exited with 1",
        FailureStage::PostProvisioning,
    )
    .await
    .unwrap();

    assert_eq!(queue.pending(), vec!["linux-builders".to_string()]);
    assert_eq!(status.status_details, "init script exited with 1");
}

#[tokio::test]
async fn test_failed_template_must_be_reverified_before_provisioning() {
    let (mut template, mut status) = verified("linux-builders");
    let failing = RecordingProvisioning {
        deploy_fails: true,
        ..RecordingProvisioning::default()
    };
    let queue = InMemoryVerificationQueue::new();
    let cloud = FakeCloud::new("prod", "build-rg");

    provision(&template, &mut status, &cloud, &failing, &queue, 1)
        .await
        .unwrap_err();

    let healthy = RecordingProvisioning::accepting();
    let refused = provision(&template, &mut status, &cloud, &healthy, &queue, 1)
        .await
        .unwrap_err();
    assert!(refused.is::<ProvisioningError>());

    assert_eq!(queue.take_next().as_deref(), Some("linux-builders"));
    let outcome = verify_template(
        &mut template,
        &mut status,
        &cloud,
        &FakeCredentials::with(&["vm-creds"]),
        &healthy,
        &RecordingReporter::default(),
    )
    .await
    .unwrap();
    assert_eq!(outcome, VerificationOutcome::Verified);

    provision(&template, &mut status, &cloud, &healthy, &queue, 1)
        .await
        .expect("provisioning allowed again");
    assert_eq!(healthy.deployment_calls().len(), 1);
}

#[tokio::test]
async fn test_broken_queue_still_returns_provisioning_error() {
    let (template, mut status) = verified("linux-builders");
    let provisioning = RecordingProvisioning {
        deploy_fails: true,
        ..RecordingProvisioning::default()
    };

    let err = provision(
        &template,
        &mut status,
        &FakeCloud::new("prod", "build-rg"),
        &provisioning,
        &BrokenQueue,
        1,
    )
    .await
    .unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("quota exceeded"));
    assert!(!message.contains("queue offline"));
    assert!(!status.is_verified());
}

#[tokio::test]
async fn test_handle_failure_with_broken_queue_still_marks_failed() {
    let (template, mut status) = verified("linux-builders");

    let err = handle_provisioning_failure(
        &template,
        &mut status,
        &BrokenQueue,
        "vm never became reachable",
        FailureStage::PostProvisioning,
    )
    .await
    .unwrap_err();

    assert!(format!("{err:#}").contains("queue offline"));
    assert_eq!(
        status.state,
        VerificationState::Failed {
            reason: "vm never became reachable".to_string()
        }
    );
}
