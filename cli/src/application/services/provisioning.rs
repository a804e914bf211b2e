//! Application service: agent provisioning from verified templates.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use anyhow::{Context, Result};
use vmagent_common::FailureStage;

use crate::application::ports::{
    CloudContext, DeploymentHandle, ProvisioningService, VerificationQueue,
};
use crate::domain::error::ProvisioningError;
use crate::domain::status::TemplateStatus;
use crate::domain::template::Template;

/// Request `count` agents from a verified template.
///
/// Does not re-verify or bind. The template must already be bound to
/// `cloud` with a storage account, which a status rehydrated from disk is
/// not. A failed request demotes the template and queues it for
/// re-verification before the error is returned.
///
/// # Errors
///
/// Returns [`ProvisioningError`] if the template is not verified, not bound
/// to `cloud`, has no storage account name, or `count` is zero, otherwise
/// the collaborator's error.
pub async fn provision(
    template: &Template,
    status: &mut TemplateStatus,
    cloud: &impl CloudContext,
    provisioning: &impl ProvisioningService,
    queue: &impl VerificationQueue,
    count: u32,
) -> Result<DeploymentHandle> {
    if !status.is_verified() {
        return Err(ProvisioningError::NotVerified {
            template: template.name.clone(),
        }
        .into());
    }
    if status.cloud.as_deref() != Some(cloud.cloud_name()) {
        return Err(ProvisioningError::NotBound {
            template: template.name.clone(),
            cloud: cloud.cloud_name().to_string(),
        }
        .into());
    }
    if template.storage.effective_name().trim().is_empty() {
        return Err(ProvisioningError::MissingStorageAccount {
            template: template.name.clone(),
        }
        .into());
    }
    if count == 0 {
        return Err(ProvisioningError::InvalidCount { count }.into());
    }

    let resolved = template.resolve(cloud.resource_group_name());
    tracing::info!(template = %template.name, count, "requesting deployment");

    match provisioning.create_deployment(&resolved, count).await {
        Ok(handle) => {
            tracing::info!(
                template = %template.name,
                deployment = %handle.deployment_name,
                "deployment accepted"
            );
            Ok(handle)
        }
        Err(e) => {
            let message = format!("{e:#}");
            if let Err(queue_err) = handle_provisioning_failure(
                template,
                status,
                queue,
                &message,
                FailureStage::Provisioning,
            )
            .await
            {
                tracing::warn!(template = %template.name, error = %format!("{queue_err:#}"), "re-verification queue unavailable");
            }
            Err(e.context(format!(
                "provisioning {count} agent(s) from template '{}'",
                template.name
            )))
        }
    }
}

/// Demote a template after a provisioning failure.
///
/// The template is queued for re-verification, then marked `Failed` with
/// `message`. It is marked failed even if queueing fails.
///
/// # Errors
///
/// Returns an error if the queue rejects the registration.
pub async fn handle_provisioning_failure(
    template: &Template,
    status: &mut TemplateStatus,
    queue: &impl VerificationQueue,
    message: &str,
    stage: FailureStage,
) -> Result<()> {
    let registered = queue.register(&template.name).await;
    status.mark_failed(message);
    tracing::warn!(template = %template.name, %stage, "provisioning failed, template needs re-verification");

    let newly_queued = registered.with_context(|| {
        format!(
            "queueing template '{}' for re-verification",
            template.name
        )
    })?;
    if !newly_queued {
        tracing::debug!(template = %template.name, "template already queued");
    }
    Ok(())
}
