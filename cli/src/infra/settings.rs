//! Infrastructure implementation of the `SettingsStore` port.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::application::ports::{CloudContext, SettingsStore};
use crate::domain::settings::{CloudSettings, VmAgentSettings};

/// Environment variable overriding the settings file location.
pub const CONFIG_ENV_VAR: &str = "VMAGENT_CONFIG";

/// Production implementation of `SettingsStore` that uses a YAML file on disk.
pub struct YamlSettingsStore {
    path: Option<PathBuf>,
}

impl YamlSettingsStore {
    /// Store at `$VMAGENT_CONFIG`, or `~/.vmagent/config.yaml` when unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            path: std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from),
        }
    }

    /// Store at an explicit path (used in tests).
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }
}

impl SettingsStore for YamlSettingsStore {
    fn load(&self) -> Result<VmAgentSettings> {
        let path = self.path()?;
        if !path.exists() {
            return Ok(VmAgentSettings::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(VmAgentSettings::default());
        }
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    fn save(&self, settings: &VmAgentSettings) -> Result<()> {
        let path = self.path()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(settings).context("cannot serialize settings")?;
        std::fs::write(&path, content)
            .with_context(|| format!("cannot write {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("cannot set permissions on {}", path.display()))?;
        }
        Ok(())
    }

    fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".vmagent").join("config.yaml"))
    }
}

impl CloudContext for CloudSettings {
    fn cloud_name(&self) -> &str {
        &self.name
    }

    fn resource_group_name(&self) -> &str {
        &self.resource_group
    }

    fn subscription_id(&self) -> Option<&str> {
        self.subscription_id.as_deref().filter(|s| !s.is_empty())
    }
}
