//! Command implementations

pub mod config;
pub mod storage_name;
pub mod template;
pub mod version;
