//! Output formatting module

pub mod human;
pub mod json;
pub mod reporter;
pub mod styles;

use std::path::Path;

use anyhow::Result;
use console::Term;
use owo_colors::OwoColorize as _;
use vmagent_common::TemplateRecord;

use crate::application::services::template::MigrationReport;
use crate::domain::settings::VmAgentSettings;
use crate::domain::status::TemplateStatus;
use crate::domain::template::{ResolvedTemplate, Template};
pub use human::HumanRenderer;
pub use json::JsonRenderer;
pub use styles::Styles;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a warning message prefixed with `⚠`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an info message prefixed with `ℹ`. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    /// Print a section header. Suppressed when `quiet`.
    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {} {value}", format!("{key:<22}").style(self.styles.dim));
        }
    }
}

/// Dispatches rendering to the human or JSON renderer.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json(JsonRenderer),
}

impl Renderer<'_> {
    /// Render a resolved provisioning request.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_resolved(
        &self,
        resolved: &ResolvedTemplate,
        status: &TemplateStatus,
    ) -> Result<()> {
        match self {
            Renderer::Human(r) => {
                r.render_resolved(resolved, status);
                Ok(())
            }
            Renderer::Json(r) => r.render_resolved(resolved, status),
        }
    }

    /// Render a template's verification status.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_status(&self, template: &Template, status: &TemplateStatus) -> Result<()> {
        match self {
            Renderer::Human(r) => {
                r.render_status(template, status);
                Ok(())
            }
            Renderer::Json(r) => r.render_status(template, status),
        }
    }

    /// Render the result of a record migration.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_migration(
        &self,
        report: &MigrationReport,
        record: &TemplateRecord,
        written: bool,
    ) -> Result<()> {
        match self {
            Renderer::Human(r) => r.render_migration(report, record, written),
            Renderer::Json(r) => r.render_migration(report, record, written),
        }
    }

    /// Render a generated storage account name.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_storage_name(&self, resource_group: &str, name: &str) -> Result<()> {
        match self {
            Renderer::Human(r) => {
                r.render_storage_name(name);
                Ok(())
            }
            Renderer::Json(r) => r.render_storage_name(resource_group, name),
        }
    }

    /// Render the CLI settings.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_settings(&self, settings: &VmAgentSettings, path: &Path) -> Result<()> {
        match self {
            Renderer::Human(r) => {
                r.render_settings(settings, path);
                Ok(())
            }
            Renderer::Json(r) => r.render_settings(settings, path),
        }
    }
}
