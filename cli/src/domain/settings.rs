//! Domain types and validators for vmagent CLI settings.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::SettingsError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_SETTINGS_KEYS: &[&str] =
    &["cloud.name", "cloud.resource_group", "cloud.subscription_id"];

/// Longest resource group name the provider accepts.
pub const MAX_RESOURCE_GROUP_LEN: usize = 90;

// ── Settings schema ──────────────────────────────────────────────────────────

/// Top-level settings stored in `~/.vmagent/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct VmAgentSettings {
    /// Cloud the CLI binds templates to.
    pub cloud: CloudSettings,
}

/// Owning cloud of the templates handled by this CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CloudSettings {
    pub name: String,
    pub resource_group: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            resource_group: "vmagent-rg".to_string(),
            subscription_id: None,
        }
    }
}

impl VmAgentSettings {
    /// Apply an already validated key/value pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not a known setting.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_settings_key(key)?;
        validate_settings_value(key, value)?;
        let value = value.trim().to_string();
        match key {
            "cloud.name" => self.cloud.name = value,
            "cloud.resource_group" => self.cloud.resource_group = value,
            "cloud.subscription_id" => self.cloud.subscription_id = Some(value),
            _ => anyhow::bail!("Unknown setting: {key}"),
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a settings key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_settings_key(key: &str) -> Result<()> {
    if !VALID_SETTINGS_KEYS.contains(&key) {
        return Err(SettingsError::UnknownKey {
            key: key.to_string(),
            valid: VALID_SETTINGS_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a settings value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_settings_value(key: &str, value: &str) -> Result<()> {
    let invalid = |reason: &str| SettingsError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid("Value must not be blank").into());
    }

    if key == "cloud.resource_group" {
        if trimmed.len() > MAX_RESOURCE_GROUP_LEN {
            return Err(invalid("Resource group names are at most 90 characters").into());
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '(' | ')' | '-'))
        {
            return Err(invalid(
                "Resource group names may contain only letters, digits, '.', '_', '(', ')' and '-'",
            )
            .into());
        }
        if trimmed.ends_with('.') {
            return Err(invalid("Resource group names cannot end with '.'").into());
        }
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
