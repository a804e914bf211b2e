//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Naming errors ─────────────────────────────────────────────────────────────

/// Errors from deterministic storage account name generation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NamingError {
    #[error("cannot generate storage account name: encoded digest has only {len} characters")]
    GenerationFailed { len: usize },
}

// ── Template errors ───────────────────────────────────────────────────────────

/// Errors raised while binding a template to its owning cloud.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{template}' has no storage account and one could not be generated")]
    StorageAccountNameUnavailable {
        template: String,
        #[source]
        source: NamingError,
    },

    #[error("Template '{template}' already belongs to cloud '{bound}', cannot bind to '{requested}'")]
    AlreadyBound {
        template: String,
        bound: String,
        requested: String,
    },
}

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Errors rejecting a provisioning request before any collaborator is called.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProvisioningError {
    #[error("Template '{template}' is not verified. Verify it before provisioning agents.")]
    NotVerified { template: String },

    #[error("Invalid agent count {count}: at least one agent must be requested")]
    InvalidCount { count: u32 },

    #[error("Template '{template}' is not bound to cloud '{cloud}'. Verify it against this cloud first.")]
    NotBound { template: String, cloud: String },

    #[error("Template '{template}' has no storage account name")]
    MissingStorageAccount { template: String },
}

// ── Credential errors ─────────────────────────────────────────────────────────

/// Errors from resolving a credential reference.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Credentials '{0}' not found")]
    NotFound(String),
}

// ── Settings errors ───────────────────────────────────────────────────────────

/// Errors related to settings key/value validation.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}
