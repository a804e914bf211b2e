//! Human-readable terminal renderer.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize as _;
use vmagent_common::TemplateRecord;

use crate::application::services::template::MigrationReport;
use crate::domain::settings::VmAgentSettings;
use crate::domain::status::{TemplateStatus, VerificationState};
use crate::domain::template::{ImageSource, ResolvedTemplate, Template};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the fully resolved provisioning request.
    pub fn render_resolved(&self, resolved: &ResolvedTemplate, status: &TemplateStatus) {
        let ctx = self.ctx;
        println!();
        ctx.header(&format!("Template {}", resolved.template_name));
        ctx.kv("cloud:", status.cloud.as_deref().unwrap_or("(unbound)"));
        ctx.kv("state:", state_display(&status.state));
        ctx.kv("location:", &resolved.location);
        ctx.kv("vm size:", &resolved.vm_size);
        ctx.kv("resource group:", &resolved.resource_group);
        ctx.kv(
            "storage account:",
            &format!(
                "{} ({})",
                resolved.storage_account_name,
                resolved.storage_account_type.as_str()
            ),
        );
        ctx.kv("image:", &image_display(&resolved.image));
        ctx.kv("os type:", resolved.os_type.as_str());
        ctx.kv("launch method:", resolved.launch_method.as_str());
        ctx.kv(
            "init script:",
            &format!(
                "{} line(s){}",
                resolved.init_script.lines().count(),
                if resolved.execute_init_script_as_root {
                    ", as root"
                } else {
                    ""
                }
            ),
        );
        ctx.kv(
            "virtual network:",
            resolved
                .network
                .virtual_network_name
                .as_deref()
                .unwrap_or("(default)"),
        );
        ctx.kv(
            "subnet:",
            resolved.network.subnet_name.as_deref().unwrap_or("(default)"),
        );
        ctx.kv("private ip:", yes_no(resolved.network.use_private_ip));
        ctx.kv("parallel jobs:", &resolved.parallel_jobs.to_string());
        ctx.kv("retention:", &format!("{} min", resolved.retention_minutes));
        ctx.kv("usage mode:", resolved.usage_mode.as_str());
        ctx.kv("labels:", &resolved.labels.join(" "));
        println!();
    }

    /// Render the verification status of a template.
    pub fn render_status(&self, template: &Template, status: &TemplateStatus) {
        let ctx = self.ctx;
        ctx.kv("Template:", &template.name);
        let state_style = match status.state {
            VerificationState::Verified => ctx.styles.success,
            VerificationState::Unverified => ctx.styles.warning,
            VerificationState::Failed { .. } => ctx.styles.error,
        };
        ctx.kv(
            "State:",
            &state_display(&status.state).style(state_style).to_string(),
        );
        if !status.status_details.is_empty() {
            ctx.kv("Details:", "");
            for line in status.status_details.lines() {
                if !ctx.quiet {
                    println!("    {line}");
                }
            }
        }
        ctx.kv("Disabled:", yes_no(template.disabled));
        if status.is_usable(template) {
            ctx.success("Usable for provisioning");
        } else {
            ctx.warn("Not usable for provisioning");
        }
    }

    /// Render a migration report; the upgraded record is printed when it was
    /// not written back.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized.
    pub fn render_migration(
        &self,
        report: &MigrationReport,
        record: &TemplateRecord,
        written: bool,
    ) -> Result<()> {
        if !report.changed() {
            self.ctx.info(&format!(
                "Template {} is already at schema version {}",
                report.template_name, report.to_version
            ));
            return Ok(());
        }
        if written {
            self.ctx.success(&format!(
                "Migrated {} from schema version {} to {}",
                report.template_name, report.from_version, report.to_version
            ));
        } else {
            let json = serde_json::to_string_pretty(record).context("serializing template record")?;
            println!("{json}");
        }
        Ok(())
    }

    /// Render a generated storage account name on its own line.
    pub fn render_storage_name(&self, name: &str) {
        println!("{}", name.style(self.ctx.styles.derived));
    }

    /// Render the current CLI settings.
    pub fn render_settings(&self, settings: &VmAgentSettings, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Settings ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        println!("  {:<24} {}", "cloud.name:", settings.cloud.name);
        println!("  {:<24} {}", "cloud.resource_group:", settings.cloud.resource_group);
        println!(
            "  {:<24} {}",
            "cloud.subscription_id:",
            settings.cloud.subscription_id.as_deref().unwrap_or("(not set)")
        );
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        println!(
            "    {:<22} {}",
            "VMAGENT_CONFIG:",
            std::env::var("VMAGENT_CONFIG").unwrap_or_else(|_| "(not set)".to_string())
        );
        println!(
            "    {:<22} {}",
            "RUST_LOG:",
            std::env::var("RUST_LOG").unwrap_or_else(|_| "(not set)".to_string())
        );
        println!();
    }
}

fn state_display(state: &VerificationState) -> &'static str {
    match state {
        VerificationState::Unverified => "unverified",
        VerificationState::Verified => "verified",
        VerificationState::Failed { .. } => "failed",
    }
}

fn image_display(image: &ImageSource) -> String {
    match image {
        ImageSource::Reference(r) => {
            format!("{}:{}:{}:{}", r.publisher, r.offer, r.sku, r.version)
        }
        ImageSource::Custom { image } => format!("custom {image}"),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
