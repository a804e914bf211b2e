//! Infrastructure implementation of the `TemplateStore` port.
//!
//! Records are JSON, or YAML when the file ends in `.yaml`/`.yml`. Loads and
//! saves run on `tokio::task::spawn_blocking`; saves write a temp file and
//! rename it over the target so a crash never leaves a half-written record.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use vmagent_common::TemplateRecord;

use crate::application::ports::TemplateStore;

/// File-backed template record store.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateFileStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordFormat {
    Json,
    Yaml,
}

impl RecordFormat {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                RecordFormat::Yaml
            }
            _ => RecordFormat::Json,
        }
    }
}

impl TemplateFileStore {
    /// Synchronous load, used internally by `load_async` via `spawn_blocking`.
    fn load_sync(path: &Path) -> Result<TemplateRecord> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading template file {}", path.display()))?;
        match RecordFormat::for_path(path) {
            RecordFormat::Json => serde_json::from_str(&content)
                .with_context(|| format!("parsing template file {}", path.display())),
            RecordFormat::Yaml => serde_yaml::from_str(&content)
                .with_context(|| format!("parsing template file {}", path.display())),
        }
    }

    /// Synchronous save, used internally by `save_async` via `spawn_blocking`.
    fn save_sync(path: &Path, record: &TemplateRecord) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        let content = match RecordFormat::for_path(path) {
            RecordFormat::Json => {
                serde_json::to_string_pretty(record).context("serializing template record")?
            }
            RecordFormat::Yaml => {
                serde_yaml::to_string(record).context("serializing template record")?
            }
        };

        let temp_path = temp_path_for(path);
        std::fs::write(&temp_path, &content)
            .with_context(|| format!("writing temp file {}", temp_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
        }

        std::fs::rename(&temp_path, path)
            .with_context(|| format!("finalizing template file {}", path.display()))?;
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

impl TemplateStore for TemplateFileStore {
    async fn load_async(&self, path: &Path) -> Result<TemplateRecord> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || TemplateFileStore::load_sync(&path))
            .await
            .context("template load task panicked")?
    }

    async fn save_async(&self, path: &Path, record: &TemplateRecord) -> Result<()> {
        let path = path.to_path_buf();
        let record = record.clone();
        tokio::task::spawn_blocking(move || TemplateFileStore::save_sync(&path, &record))
            .await
            .context("template save task panicked")?
    }
}
