//! vmagent CLI - agent template resolution and verification

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vmagent_cli::cli::Cli;
use vmagent_cli::domain::error::{
    CredentialError, NamingError, ProvisioningError, SettingsError, TemplateError,
};
use vmagent_cli::output::json::format_error;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            let message = format!("{e:#}");
            match format_error(&message, error_code(&e)) {
                Ok(doc) if json => println!("{doc}"),
                _ => eprintln!("Error: {message}"),
            }
            ExitCode::FAILURE
        }
    }
}

/// Stable machine-readable code for `--json` error documents.
fn error_code(e: &anyhow::Error) -> &'static str {
    if let Some(err) = e.downcast_ref::<ProvisioningError>() {
        return match err {
            ProvisioningError::NotVerified { .. } => "not_verified",
            ProvisioningError::InvalidCount { .. } => "invalid_count",
            ProvisioningError::NotBound { .. } => "not_bound",
            ProvisioningError::MissingStorageAccount { .. } => "storage_name_unavailable",
        };
    }
    if let Some(err) = e.downcast_ref::<TemplateError>() {
        return match err {
            TemplateError::StorageAccountNameUnavailable { .. } => "storage_name_unavailable",
            TemplateError::AlreadyBound { .. } => "already_bound",
        };
    }
    if e.is::<NamingError>() {
        return "storage_name_unavailable";
    }
    if e.is::<SettingsError>() {
        return "invalid_setting";
    }
    if e.is::<CredentialError>() {
        return "credentials_not_found";
    }
    "error"
}
