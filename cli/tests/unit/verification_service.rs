//! Unit tests for `verify_template` and `bind_template`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use vmagent_cli::application::services::template::bind_template;
use vmagent_cli::application::services::verification::{VerificationOutcome, verify_template};
use vmagent_cli::domain::error::TemplateError;
use vmagent_cli::domain::status::{VERIFICATION_FAILED_HEADER, VerificationState};
use vmagent_cli::domain::template::{ImageSource, Template};

use crate::mocks::{
    FakeCloud, FakeCredentials, RecordingProvisioning, RecordingReporter, advanced_record,
    basic_record,
};

// ── Accepted ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_verify_accepted_template_becomes_verified() {
    let (mut template, mut status) = Template::rehydrate(advanced_record("linux-builders"));
    let cloud = FakeCloud::new("prod", "build-rg");
    let provisioning = RecordingProvisioning::accepting();
    let reporter = RecordingReporter::default();

    let outcome = verify_template(
        &mut template,
        &mut status,
        &cloud,
        &FakeCredentials::with(&["vm-creds"]),
        &provisioning,
        &reporter,
    )
    .await
    .expect("verification runs");

    assert_eq!(outcome, VerificationOutcome::Verified);
    assert!(status.is_verified());
    assert!(status.status_details.is_empty());
    assert_eq!(status.cloud.as_deref(), Some("prod"));
    assert_eq!(reporter.kinds().last(), Some(&"success"));
}

#[tokio::test]
async fn test_verify_passes_active_storage_axis_to_collaborator() {
    let (mut template, mut status) = Template::rehydrate(advanced_record("linux-builders"));
    let provisioning = RecordingProvisioning::accepting();

    verify_template(
        &mut template,
        &mut status,
        &FakeCloud::new("prod", "build-rg"),
        &FakeCredentials::with(&["vm-creds"]),
        &provisioning,
        &RecordingReporter::default(),
    )
    .await
    .unwrap();

    let calls = provisioning.verify_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].storage_account_name, "acct2");
    assert_eq!(calls[0].resource_group, "build-rg");
    assert_eq!(calls[0].parallel_jobs, 2);
    assert!(matches!(calls[0].image, ImageSource::Reference(_)));
}

#[tokio::test]
async fn test_verify_generates_storage_account_for_basic_template() {
    let (mut template, mut status) = Template::rehydrate(basic_record("ubuntu-basic"));
    let provisioning = RecordingProvisioning::accepting();
    let reporter = RecordingReporter::default();

    verify_template(
        &mut template,
        &mut status,
        &FakeCloud::new("prod", "vmagent-rg"),
        &FakeCredentials::with(&["vm-creds"]),
        &provisioning,
        &reporter,
    )
    .await
    .unwrap();

    assert_eq!(template.storage.effective_name(), "jn7lw8ompbmsnpu491uh9goq");
    assert_eq!(
        provisioning.verify_calls()[0].storage_account_name,
        "jn7lw8ompbmsnpu491uh9goq"
    );
    assert!(
        reporter
            .messages()
            .iter()
            .any(|m| m.contains("jn7lw8ompbmsnpu491uh9goq"))
    );
}

#[tokio::test]
async fn test_verify_clears_earlier_failure_before_running() {
    let (mut template, mut status) = Template::rehydrate(advanced_record("linux-builders"));
    status.mark_failed("quota exceeded");

    verify_template(
        &mut template,
        &mut status,
        &FakeCloud::new("prod", "build-rg"),
        &FakeCredentials::with(&["vm-creds"]),
        &RecordingProvisioning::accepting(),
        &RecordingReporter::default(),
    )
    .await
    .unwrap();

    assert_eq!(status.state, VerificationState::Verified);
}

// ── Rejected ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_verify_rejected_template_records_numbered_report() {
    let (mut template, mut status) = Template::rehydrate(advanced_record("linux-builders"));
    let provisioning = RecordingProvisioning::rejecting(&["Invalid VM size", "Unknown location"]);

    let outcome = verify_template(
        &mut template,
        &mut status,
        &FakeCloud::new("prod", "build-rg"),
        &FakeCredentials::with(&["vm-creds"]),
        &provisioning,
        &RecordingReporter::default(),
    )
    .await
    .unwrap();

    assert_eq!(
        outcome,
        VerificationOutcome::Rejected {
            errors: vec!["Invalid VM size".to_string(), "Unknown location".to_string()],
        }
    );
    assert!(!status.is_verified());
    assert!(status.status_details.starts_with(VERIFICATION_FAILED_HEADER));
    assert!(status.status_details.contains("1: Invalid VM size"));
    assert!(status.status_details.contains("2: Unknown location"));
}

#[tokio::test]
async fn test_verify_missing_credentials_is_a_verification_error() {
    let (mut template, mut status) = Template::rehydrate(advanced_record("linux-builders"));
    let provisioning = RecordingProvisioning::accepting();

    let outcome = verify_template(
        &mut template,
        &mut status,
        &FakeCloud::new("prod", "build-rg"),
        &FakeCredentials::with(&["someone-else"]),
        &provisioning,
        &RecordingReporter::default(),
    )
    .await
    .unwrap();

    assert_eq!(
        outcome,
        VerificationOutcome::Rejected {
            errors: vec!["Credentials 'vm-creds' not found".to_string()],
        }
    );
    assert!(provisioning.verify_calls().is_empty());
    assert!(matches!(status.state, VerificationState::Failed { .. }));
}

// ── Could not run ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_verify_unreachable_credential_store_propagates_and_fails() {
    let (mut template, mut status) = Template::rehydrate(advanced_record("linux-builders"));
    let provisioning = RecordingProvisioning::accepting();

    let err = verify_template(
        &mut template,
        &mut status,
        &FakeCloud::new("prod", "build-rg"),
        &FakeCredentials::unreachable(),
        &provisioning,
        &RecordingReporter::default(),
    )
    .await
    .unwrap_err();

    assert!(format!("{err:#}").contains("credential store unreachable"));
    assert!(provisioning.verify_calls().is_empty());
    assert!(status.status_details.contains("credential store unreachable"));
}

#[tokio::test]
async fn test_verify_transport_error_propagates_and_fails() {
    let (mut template, mut status) = Template::rehydrate(advanced_record("linux-builders"));
    let provisioning = RecordingProvisioning {
        verify_unreachable: true,
        ..RecordingProvisioning::default()
    };

    let err = verify_template(
        &mut template,
        &mut status,
        &FakeCloud::new("prod", "build-rg"),
        &FakeCredentials::with(&["vm-creds"]),
        &provisioning,
        &RecordingReporter::default(),
    )
    .await
    .unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("verifying template 'linux-builders'"));
    assert!(message.contains("management endpoint timed out"));
    assert!(matches!(status.state, VerificationState::Failed { .. }));
}

// ── Binding ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_verify_template_owned_by_other_cloud_fails() {
    let (mut template, mut status) = Template::rehydrate(advanced_record("linux-builders"));
    status.bind_cloud("staging").unwrap();
    let provisioning = RecordingProvisioning::accepting();

    let err = verify_template(
        &mut template,
        &mut status,
        &FakeCloud::new("prod", "build-rg"),
        &FakeCredentials::with(&["vm-creds"]),
        &provisioning,
        &RecordingReporter::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<TemplateError>(),
        Some(TemplateError::AlreadyBound { .. })
    ));
    assert!(provisioning.verify_calls().is_empty());
    assert_eq!(status.cloud.as_deref(), Some("staging"));
    assert!(!status.is_verified());
}

#[test]
fn test_bind_template_keeps_configured_storage_account() {
    let (mut template, mut status) = Template::rehydrate(advanced_record("linux-builders"));
    let reporter = RecordingReporter::default();

    bind_template(
        &mut template,
        &mut status,
        &FakeCloud::new("prod", "build-rg"),
        &reporter,
    )
    .unwrap();

    assert_eq!(template.storage.effective_name(), "acct2");
    assert!(reporter.messages().is_empty());
}

#[test]
fn test_bind_template_twice_to_same_cloud_is_noop() {
    let (mut template, mut status) = Template::rehydrate(basic_record("ubuntu-basic"));
    let cloud = FakeCloud::new("prod", "vmagent-rg");
    let reporter = RecordingReporter::default();

    bind_template(&mut template, &mut status, &cloud, &reporter).unwrap();
    bind_template(&mut template, &mut status, &cloud, &reporter).unwrap();

    assert_eq!(status.cloud.as_deref(), Some("prod"));
    assert_eq!(reporter.messages().len(), 1, "name generated only once");
}

#[test]
fn test_bind_template_salts_generated_name_with_subscription() {
    let (mut template, mut status) = Template::rehydrate(basic_record("ubuntu-basic"));
    let cloud = FakeCloud {
        subscription: Some("sub-123".to_string()),
        ..FakeCloud::new("prod", "build-agents")
    };

    bind_template(
        &mut template,
        &mut status,
        &cloud,
        &RecordingReporter::default(),
    )
    .unwrap();

    assert_eq!(template.storage.effective_name(), "jnodviawjaet291s9hqsimag");
}
