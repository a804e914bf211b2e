//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one pretty-printed document on
//! stdout. Failures use the error object from [`format_error`].

use std::path::Path;

use anyhow::{Context, Result};
use vmagent_common::TemplateRecord;

use crate::application::services::template::MigrationReport;
use crate::domain::settings::VmAgentSettings;
use crate::domain::status::TemplateStatus;
use crate::domain::template::{ResolvedTemplate, Template};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Renders domain types as JSON documents on stdout.
pub struct JsonRenderer;

#[allow(clippy::unused_self)] // methods mirror HumanRenderer for Renderer dispatch
impl JsonRenderer {
    fn print(value: &serde_json::Value) -> Result<()> {
        let out = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
        println!("{out}");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_resolved(&self, resolved: &ResolvedTemplate, status: &TemplateStatus) -> Result<()> {
        Self::print(&serde_json::json!({
            "template": resolved,
            "status": status,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_status(&self, template: &Template, status: &TemplateStatus) -> Result<()> {
        Self::print(&serde_json::json!({
            "status": status,
            "disabled": template.disabled,
            "usable": status.is_usable(template),
        }))
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_migration(
        &self,
        report: &MigrationReport,
        record: &TemplateRecord,
        written: bool,
    ) -> Result<()> {
        Self::print(&serde_json::json!({
            "migration": report,
            "changed": report.changed(),
            "written": written,
            "record": record,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_storage_name(&self, resource_group: &str, name: &str) -> Result<()> {
        Self::print(&serde_json::json!({
            "resource_group": resource_group,
            "storage_account_name": name,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_settings(&self, settings: &VmAgentSettings, path: &Path) -> Result<()> {
        Self::print(&serde_json::json!({
            "path": path.display().to_string(),
            "settings": settings,
        }))
    }
}
