//! `vmagent template`: resolve, migrate and inspect template records.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::services::settings::load_settings;
use crate::application::services::template::{
    bind_template, load_template, migrate_record, save_template,
};

/// Template subcommands.
#[derive(Subcommand)]
pub enum TemplateCommand {
    /// Bind a template to the configured cloud and print the resolved request
    Resolve {
        /// Template record (JSON, or YAML with a .yaml/.yml extension)
        file: PathBuf,
        /// Write the bound template (e.g. a generated storage account) back
        #[arg(long)]
        save: bool,
    },
    /// Upgrade a legacy template record to the current schema
    Migrate {
        /// Template record to upgrade
        file: PathBuf,
        /// Write the upgraded record back instead of printing it
        #[arg(long)]
        write: bool,
    },
    /// Show a template's verification status
    Status {
        /// Template record
        file: PathBuf,
    },
}

/// Run the template command.
///
/// # Errors
///
/// Returns an error if the record cannot be loaded, bound, or written.
pub async fn run(app: &AppContext, cmd: TemplateCommand) -> Result<ExitCode> {
    match cmd {
        TemplateCommand::Resolve { file, save } => resolve(app, &file, save).await,
        TemplateCommand::Migrate { file, write } => migrate(app, &file, write).await,
        TemplateCommand::Status { file } => status(app, &file).await,
    }
}

async fn resolve(app: &AppContext, file: &Path, save: bool) -> Result<ExitCode> {
    let settings = load_settings(&app.settings_store)?;
    let (mut template, mut status) = load_template(&app.templates, file).await?;

    bind_template(&mut template, &mut status, &settings.cloud, &app.reporter())?;
    let resolved = template.resolve(&settings.cloud.resource_group);

    if save {
        save_template(&app.templates, file, &template, &status).await?;
        tracing::info!(template = %template.name, path = %file.display(), "saved bound template");
    }

    app.renderer().render_resolved(&resolved, &status)?;
    Ok(ExitCode::SUCCESS)
}

async fn migrate(app: &AppContext, file: &Path, write: bool) -> Result<ExitCode> {
    let (report, record) = migrate_record(&app.templates, file, write).await?;
    let written = write && report.changed();
    app.renderer().render_migration(&report, &record, written)?;
    Ok(ExitCode::SUCCESS)
}

async fn status(app: &AppContext, file: &Path) -> Result<ExitCode> {
    let (template, status) = load_template(&app.templates, file).await?;
    app.renderer().render_status(&template, &status)?;
    Ok(ExitCode::SUCCESS)
}
