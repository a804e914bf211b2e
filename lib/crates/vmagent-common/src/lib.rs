//! Shared agent template types for vmagent.
//!
//! Holds the persisted record shape and the small enums both the CLI and any
//! future controller-side consumer need to agree on.

pub mod catalog;
pub mod record;
pub mod types;

pub use catalog::{BuiltInImage, ImageProperties};
pub use record::TemplateRecord;
pub use types::*;
