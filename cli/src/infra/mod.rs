//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: template files, the
//! settings file, and the in-process re-verification queue.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod queue;
pub mod settings;
pub mod template_store;
