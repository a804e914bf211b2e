//! Runtime verification status of a template.
//!
//! Kept apart from [`Template`] so configuration stays immutable while the
//! verification gate and provisioning path move the state around.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vmagent_common::TemplateRecord;

use crate::domain::error::TemplateError;
use crate::domain::template::Template;

/// Header of a failed verification report.
pub const VERIFICATION_FAILED_HEADER: &str = "Template verification failed:";

/// Where a template stands with the verification gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VerificationState {
    #[default]
    Unverified,
    Verified,
    Failed { reason: String },
}

/// Mutable runtime record, keyed by template name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateStatus {
    pub template_name: String,
    #[serde(flatten)]
    pub state: VerificationState,
    /// Last human-readable status message. Empty when verified.
    pub status_details: String,
    /// Name of the owning cloud. Assigned once by binding.
    pub cloud: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl TemplateStatus {
    #[must_use]
    pub fn new(template_name: &str) -> Self {
        Self {
            template_name: template_name.to_string(),
            state: VerificationState::Unverified,
            status_details: String::new(),
            cloud: None,
            updated_at: Utc::now(),
        }
    }

    /// Recover the status persisted alongside a record.
    #[must_use]
    pub fn from_record(record: &TemplateRecord) -> Self {
        let mut status = Self::new(&record.template_name);
        status.status_details.clone_from(&record.template_status_details);
        status.state = if record.template_verified {
            VerificationState::Verified
        } else if record.template_status_details.trim().is_empty() {
            VerificationState::Unverified
        } else {
            VerificationState::Failed {
                reason: record.template_status_details.clone(),
            }
        };
        status
    }

    /// Attach the owning cloud.
    ///
    /// Returns `true` on first binding and `false` if already bound to the
    /// same cloud.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::AlreadyBound`] if a different cloud owns the
    /// template.
    pub fn bind_cloud(&mut self, cloud_name: &str) -> Result<bool, TemplateError> {
        match &self.cloud {
            Some(bound) if bound == cloud_name => Ok(false),
            Some(bound) => Err(TemplateError::AlreadyBound {
                template: self.template_name.clone(),
                bound: bound.clone(),
                requested: cloud_name.to_string(),
            }),
            None => {
                self.cloud = Some(cloud_name.to_string());
                self.touch();
                Ok(true)
            }
        }
    }

    /// A new verification run clears an earlier failure.
    pub fn begin_verification(&mut self) {
        if matches!(self.state, VerificationState::Failed { .. }) {
            self.state = VerificationState::Unverified;
            self.touch();
        }
    }

    pub fn mark_verified(&mut self) {
        self.state = VerificationState::Verified;
        self.status_details.clear();
        self.touch();
    }

    pub fn mark_failed(&mut self, reason: &str) {
        self.state = VerificationState::Failed {
            reason: reason.to_string(),
        };
        self.status_details = reason.to_string();
        self.touch();
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.state == VerificationState::Verified
    }

    /// Scheduler predicate: verified and not disabled by an administrator.
    #[must_use]
    pub fn is_usable(&self, template: &Template) -> bool {
        self.is_verified() && !template.disabled
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Numbered report of verification errors, one per line after the header.
#[must_use]
pub fn format_verification_report(errors: &[String]) -> String {
    let mut report = String::from(VERIFICATION_FAILED_HEADER);
    for (i, err) in errors.iter().enumerate() {
        report.push('\n');
        report.push_str(&format!("{}: {err}", i + 1));
    }
    report
}
