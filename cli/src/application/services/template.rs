//! Application service: template loading, migration and cloud binding.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use vmagent_common::TemplateRecord;

use crate::application::ports::{CloudContext, ProgressReporter, TemplateStore};
use crate::domain::error::TemplateError;
use crate::domain::migration;
use crate::domain::status::TemplateStatus;
use crate::domain::template::Template;

/// Result of upgrading a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub template_name: String,
    pub from_version: u32,
    pub to_version: u32,
}

impl MigrationReport {
    #[must_use]
    pub fn changed(&self) -> bool {
        self.from_version != self.to_version
    }
}

/// Load and rehydrate the template stored at `path`.
///
/// # Errors
///
/// Returns an error if the record cannot be read or parsed.
pub async fn load_template(
    store: &impl TemplateStore,
    path: &Path,
) -> Result<(Template, TemplateStatus)> {
    let record = store.load_async(path).await?;
    Ok(Template::rehydrate(record))
}

/// Write a template and its status back as a current-schema record.
///
/// # Errors
///
/// Returns an error if the record cannot be written.
pub async fn save_template(
    store: &impl TemplateStore,
    path: &Path,
    template: &Template,
    status: &TemplateStatus,
) -> Result<()> {
    store.save_async(path, &template.to_record(status)).await
}

/// Upgrade the record at `path`, optionally writing it back.
///
/// Returns the report and the upgraded record.
///
/// # Errors
///
/// Returns an error if the record cannot be read or written.
pub async fn migrate_record(
    store: &impl TemplateStore,
    path: &Path,
    write: bool,
) -> Result<(MigrationReport, TemplateRecord)> {
    let record = store.load_async(path).await?;
    let from_version = record.schema_version;
    let upgraded = migration::upgrade(record);
    let report = MigrationReport {
        template_name: upgraded.template_name.clone(),
        from_version,
        to_version: upgraded.schema_version,
    };

    if write && report.changed() {
        store
            .save_async(path, &upgraded)
            .await
            .with_context(|| format!("writing migrated template {}", path.display()))?;
        tracing::info!(
            template = %report.template_name,
            from = report.from_version,
            to = report.to_version,
            "migrated template record"
        );
    }
    Ok((report, upgraded))
}

/// Attach a template to its owning cloud and make sure it has a storage
/// account, generating one from the cloud's resource group if needed.
///
/// # Errors
///
/// Returns [`TemplateError::AlreadyBound`] if another cloud owns the
/// template, or [`TemplateError::StorageAccountNameUnavailable`] if no
/// storage account name could be generated.
pub fn bind_template(
    template: &mut Template,
    status: &mut TemplateStatus,
    cloud: &impl CloudContext,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    if status.bind_cloud(cloud.cloud_name())? {
        tracing::debug!(template = %template.name, cloud = cloud.cloud_name(), "bound template to cloud");
    }

    let generated = template
        .ensure_storage_account(cloud.resource_group_name(), cloud.subscription_id())
        .map_err(|source| TemplateError::StorageAccountNameUnavailable {
            template: template.name.clone(),
            source,
        })?;

    if let Some(name) = generated {
        tracing::info!(template = %template.name, storage_account = %name, "generated storage account name");
        reporter.step(&format!("Using generated storage account {name}"));
    }
    Ok(())
}
