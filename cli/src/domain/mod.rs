//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod error;
pub mod migration;
pub mod naming;
pub mod settings;
pub mod status;
pub mod template;

pub use error::{CredentialError, NamingError, ProvisioningError, SettingsError, TemplateError};
pub use naming::{generate_unique_storage_account_name, resolve_storage_account_name};
pub use settings::{CloudSettings, VmAgentSettings, validate_settings_key, validate_settings_value};
pub use status::{TemplateStatus, VerificationState, format_verification_report};
pub use template::{
    AdvancedImage, ImageReference, ImageSelection, ImageSource, NetworkPlacement,
    ResolvedTemplate, StorageAccount, Template,
};
