//! Application service: template verification gate.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use anyhow::Result;
use serde::Serialize;

use crate::application::ports::{
    CloudContext, CredentialStore, ProgressReporter, ProvisioningService,
};
use crate::application::services::template::bind_template;
use crate::domain::error::CredentialError;
use crate::domain::status::{TemplateStatus, format_verification_report};
use crate::domain::template::Template;

/// Outcome of a verification run that reached a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VerificationOutcome {
    Verified,
    Rejected { errors: Vec<String> },
}

/// Check a template against its cloud and record the verdict in `status`.
///
/// An unknown credential reference counts as a verification error. Any
/// other failure to run the check leaves the template `Failed` with the
/// error text and is returned as `Err`.
///
/// # Errors
///
/// Returns an error if binding fails, the credential store cannot be
/// reached, or the provisioning collaborator cannot perform the check.
pub async fn verify_template(
    template: &mut Template,
    status: &mut TemplateStatus,
    cloud: &impl CloudContext,
    credentials: &impl CredentialStore,
    provisioning: &impl ProvisioningService,
    reporter: &impl ProgressReporter,
) -> Result<VerificationOutcome> {
    status.begin_verification();
    reporter.step(&format!("Verifying template {}", template.name));

    if let Err(e) = bind_template(template, status, cloud, reporter) {
        status.mark_failed(&format!("{e:#}"));
        return Err(e);
    }
    let resolved = template.resolve(cloud.resource_group_name());

    let errors = match credentials.resolve(&template.launch.credentials_id).await {
        Ok(creds) => match provisioning.verify(&resolved, &creds).await {
            Ok(errors) => errors,
            Err(e) => {
                let e = e.context(format!("verifying template '{}'", template.name));
                status.mark_failed(&format!("{e:#}"));
                tracing::warn!(template = %template.name, error = %format!("{e:#}"), "verification could not run");
                return Err(e);
            }
        },
        Err(e) if e.is::<CredentialError>() => vec![e.to_string()],
        Err(e) => {
            let e = e.context(format!(
                "resolving credentials for template '{}'",
                template.name
            ));
            status.mark_failed(&format!("{e:#}"));
            return Err(e);
        }
    };

    if errors.is_empty() {
        status.mark_verified();
        tracing::info!(template = %template.name, "template verified");
        reporter.success(&format!("Template {} verified", template.name));
        Ok(VerificationOutcome::Verified)
    } else {
        let report = format_verification_report(&errors);
        status.mark_failed(&report);
        tracing::warn!(template = %template.name, errors = errors.len(), "template verification failed");
        reporter.warn(&report);
        Ok(VerificationOutcome::Rejected { errors })
    }
}
