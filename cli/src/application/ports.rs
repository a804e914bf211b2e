//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use vmagent_common::TemplateRecord;

use crate::domain::settings::VmAgentSettings;
use crate::domain::template::ResolvedTemplate;

// ── Value Types ───────────────────────────────────────────────────────────────

/// Login material for the VMs created from a template.
#[derive(Clone, PartialEq, Eq)]
pub struct VmCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for VmCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VmCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Handle to an accepted deployment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentHandle {
    pub deployment_name: String,
    pub agent_count: u32,
    pub resource_group: String,
}

// ── Cloud Ports ───────────────────────────────────────────────────────────────

/// The cloud a template belongs to. Sync trait; values are already loaded.
pub trait CloudContext {
    /// Lookup key of the owning cloud.
    fn cloud_name(&self) -> &str;
    /// Resource group agents are deployed into.
    fn resource_group_name(&self) -> &str;
    /// Subscription used to salt generated storage account names.
    fn subscription_id(&self) -> Option<&str>;
}

/// Resolves a credential reference to VM login material.
#[allow(async_fn_in_trait)]
pub trait CredentialStore {
    /// Look up credentials by id.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::NotFound` for unknown ids, or a transport
    /// error if the store cannot be reached.
    async fn resolve(&self, credentials_id: &str) -> Result<VmCredentials>;
}

/// The cloud-facing collaborator that checks and deploys templates.
#[allow(async_fn_in_trait)]
pub trait ProvisioningService {
    /// Check a resolved template against the cloud.
    ///
    /// Returns the list of problems found; empty means the template is usable.
    /// `Err` is reserved for failures to perform the check at all.
    async fn verify(
        &self,
        template: &ResolvedTemplate,
        credentials: &VmCredentials,
    ) -> Result<Vec<String>>;

    /// Request `count` agents from a resolved template.
    async fn create_deployment(
        &self,
        template: &ResolvedTemplate,
        count: u32,
    ) -> Result<DeploymentHandle>;

    /// VM sizes offered in a location.
    async fn list_vm_sizes(&self, location: &str) -> Result<Vec<String>>;

    /// Locations offered to the subscription.
    async fn list_locations(&self) -> Result<Vec<String>>;
}

/// Queue of templates waiting for re-verification.
#[allow(async_fn_in_trait)]
pub trait VerificationQueue {
    /// Add a template. Idempotent; returns `true` if it was not queued yet.
    async fn register(&self, template_name: &str) -> Result<bool>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait; no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Persistence Ports ─────────────────────────────────────────────────────────

/// Abstracts template record persistence.
#[allow(async_fn_in_trait)]
pub trait TemplateStore {
    /// Load the record at `path`.
    async fn load_async(&self, path: &Path) -> Result<TemplateRecord>;
    /// Persist `record` at `path`, replacing it atomically.
    async fn save_async(&self, path: &Path, record: &TemplateRecord) -> Result<()>;
}

/// Abstracts CLI settings persistence.
pub trait SettingsStore {
    /// Load settings, falling back to defaults when none are stored.
    fn load(&self) -> Result<VmAgentSettings>;
    /// Persist settings.
    fn save(&self, settings: &VmAgentSettings) -> Result<()>;
    /// Location of the settings file.
    fn path(&self) -> Result<PathBuf>;
}
