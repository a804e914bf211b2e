//! Application service: settings use-cases.

use anyhow::Result;

use crate::application::ports::SettingsStore;
use crate::domain::settings::VmAgentSettings;

/// Load settings.
pub fn load_settings(store: &impl SettingsStore) -> Result<VmAgentSettings> {
    store.load()
}

/// Validate and apply one setting, then persist.
///
/// # Errors
///
/// Returns an error if the key or value is invalid or the store fails.
pub fn update_setting(
    store: &impl SettingsStore,
    key: &str,
    value: &str,
) -> Result<VmAgentSettings> {
    let mut settings = store.load()?;
    settings.set(key, value)?;
    store.save(&settings)?;
    tracing::info!(key, "setting updated");
    Ok(settings)
}
