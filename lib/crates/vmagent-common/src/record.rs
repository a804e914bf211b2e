//! Persisted shape of an agent template.
//!
//! Field names are the camelCase keys written by older controller releases,
//! so records exported from a running controller load unchanged. Every field
//! is optional on input; interpretation (defaults, axis inference) happens
//! when the record is turned into a template, never here.

use serde::{Deserialize, Deserializer, Serialize};

/// Raw template record as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateRecord {
    /// Upgrade-chain version. Records without one are treated as version 0.
    pub schema_version: u32,

    pub template_name: String,
    pub template_desc: String,
    pub labels: String,
    pub location: String,
    pub virtual_machine_size: String,

    /// `new`, `existing`, or blank (inferred from which name is set).
    pub storage_account_name_reference_type: String,
    pub storage_account_type: String,
    pub new_storage_account_name: String,
    pub existing_storage_account_name: String,
    /// Flat name used before new/existing were split.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub storage_account_name: String,

    #[serde(deserialize_with = "string_or_number")]
    pub no_of_parallel_jobs: String,
    #[serde(deserialize_with = "string_or_number")]
    pub retention_time_in_min: String,
    pub usage_mode: String,
    pub shutdown_on_idle: bool,

    /// `basic`, `advanced`, or blank on legacy records.
    pub image_top_level_type: String,
    pub built_in_image: String,
    pub image: String,
    pub os_type: String,
    pub image_publisher: String,
    pub image_offer: String,
    pub image_sku: String,
    pub image_version: String,

    pub agent_launch_method: String,
    pub init_script: String,
    pub credentials_id: String,
    pub agent_workspace: String,
    pub jvm_options: String,
    pub execute_init_script_as_root: bool,
    pub do_not_use_machine_if_init_fails: bool,

    pub virtual_network_name: String,
    pub virtual_network_resource_group_name: String,
    pub subnet_name: String,
    #[serde(rename = "usePrivateIP")]
    pub use_private_ip: bool,
    pub nsg_name: String,

    pub template_disabled: bool,
    pub template_verified: bool,
    pub template_status_details: String,
}

/// Accepts `"3"`, `3`, or `null` for fields the UI historically sent as text.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => String::new(),
        Some(Raw::Text(s)) => s,
        Some(Raw::Int(n)) => n.to_string(),
        Some(Raw::Float(f)) => f.to_string(),
    })
}
