//! `vmagent storage-name`: print the deterministic storage account name.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::CloudContext;
use crate::application::services::settings::load_settings;
use crate::domain::naming::generate_unique_storage_account_name;

/// Arguments for the storage-name command.
#[derive(Args)]
pub struct StorageNameArgs {
    /// Resource group (defaults to cloud.resource_group)
    pub resource_group: Option<String>,
    /// Subscription id (defaults to cloud.subscription_id)
    #[arg(long)]
    pub subscription: Option<String>,
}

/// Run the storage-name command.
///
/// # Errors
///
/// Returns an error if settings cannot be loaded or no name can be generated.
pub fn run(app: &AppContext, args: StorageNameArgs) -> Result<ExitCode> {
    let (resource_group, subscription) = match (args.resource_group, args.subscription) {
        (Some(rg), sub) => (rg, sub),
        (None, sub) => {
            let settings = load_settings(&app.settings_store)?;
            let sub = sub.or_else(|| settings.cloud.subscription_id().map(str::to_string));
            (settings.cloud.resource_group, sub)
        }
    };

    let name = generate_unique_storage_account_name(&resource_group, subscription.as_deref())?;
    app.renderer().render_storage_name(&resource_group, &name)?;
    Ok(ExitCode::SUCCESS)
}
