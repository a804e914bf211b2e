//! Agent template model and resolution.
//!
//! A [`Template`] is built once from a raw [`TemplateRecord`]. Construction
//! never fails: malformed numbers and unknown enum names fall back to their
//! defaults. [`Template::resolve`] then flattens the tagged choices into the
//! single [`ResolvedTemplate`] handed to cloud collaborators.

use std::collections::BTreeSet;

use serde::Serialize;
use vmagent_common::{
    BuiltInImage, LaunchMethod, OsType, StorageSku, TemplateRecord, UsageMode,
};

use crate::domain::error::NamingError;
use crate::domain::migration::{self, CURRENT_SCHEMA_VERSION};
use crate::domain::naming::{
    REFERENCE_TYPE_EXISTING, REFERENCE_TYPE_NEW, generate_unique_storage_account_name,
    prefers_new_storage_account,
};
use crate::domain::status::TemplateStatus;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Idle retention applied when the configured value is blank or not a number.
pub const DEFAULT_RETENTION_MINUTES: u32 = 60;

/// Parallel jobs per agent when the configured value is blank, zero, or invalid.
pub const DEFAULT_PARALLEL_JOBS: u32 = 1;

pub const TOP_LEVEL_BASIC: &str = "basic";
pub const TOP_LEVEL_ADVANCED: &str = "advanced";

// ── Tagged choices ────────────────────────────────────────────────────────────

/// Marketplace image coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageReference {
    pub publisher: String,
    pub offer: String,
    pub sku: String,
    pub version: String,
}

/// Where an advanced image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageSource {
    Reference(ImageReference),
    Custom { image: String },
}

/// Fully specified image for an advanced template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvancedImage {
    pub source: ImageSource,
    pub os_type: OsType,
}

/// Top-level image choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSelection {
    /// One entry of the built-in catalog; everything else is implied.
    Basic { image: BuiltInImage },
    Advanced(AdvancedImage),
}

/// Storage account choice. Only the active variant's name is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageAccount {
    New(String),
    Existing(String),
}

impl StorageAccount {
    #[must_use]
    pub fn effective_name(&self) -> &str {
        match self {
            StorageAccount::New(name) | StorageAccount::Existing(name) => name,
        }
    }

    #[must_use]
    pub fn reference_type(&self) -> &'static str {
        match self {
            StorageAccount::New(_) => REFERENCE_TYPE_NEW,
            StorageAccount::Existing(_) => REFERENCE_TYPE_EXISTING,
        }
    }
}

/// Optional network placement. `None` means the provider default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkPlacement {
    pub virtual_network_name: Option<String>,
    pub virtual_network_resource_group_name: Option<String>,
    pub subnet_name: Option<String>,
    pub use_private_ip: bool,
    pub nsg_name: Option<String>,
}

/// How an agent is started once its VM exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSettings {
    pub method: LaunchMethod,
    pub init_script: String,
    pub init_script_as_root: bool,
    pub do_not_use_machine_if_init_fails: bool,
    pub agent_workspace: String,
    pub jvm_options: String,
    /// Opaque reference into the credential store.
    pub credentials_id: String,
}

// ── Template ──────────────────────────────────────────────────────────────────

/// Canonical agent template configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub description: String,
    labels: String,
    label_set: BTreeSet<String>,
    pub location: String,
    pub vm_size: String,
    pub storage: StorageAccount,
    pub storage_sku: StorageSku,
    pub image: ImageSelection,
    pub network: NetworkPlacement,
    pub launch: LaunchSettings,
    pub parallel_jobs: u32,
    pub retention_minutes: u32,
    pub shutdown_on_idle: bool,
    pub usage_mode: UsageMode,
    /// Administrator kill-switch, independent of verification.
    pub disabled: bool,
}

impl Template {
    /// Build a template from a record of the current schema.
    #[must_use]
    pub fn new(record: &TemplateRecord) -> Self {
        let storage = if prefers_new_storage_account(
            &record.storage_account_name_reference_type,
            &record.new_storage_account_name,
        ) {
            StorageAccount::New(record.new_storage_account_name.clone())
        } else {
            StorageAccount::Existing(record.existing_storage_account_name.clone())
        };

        Self {
            name: record.template_name.clone(),
            description: record.template_desc.clone(),
            labels: record.labels.clone(),
            label_set: parse_labels(&record.labels),
            location: record.location.clone(),
            vm_size: record.virtual_machine_size.clone(),
            storage,
            storage_sku: StorageSku::parse_lenient(&record.storage_account_type),
            image: parse_image_selection(record),
            network: NetworkPlacement {
                virtual_network_name: non_blank(&record.virtual_network_name),
                virtual_network_resource_group_name: non_blank(
                    &record.virtual_network_resource_group_name,
                ),
                subnet_name: non_blank(&record.subnet_name),
                use_private_ip: record.use_private_ip,
                nsg_name: non_blank(&record.nsg_name),
            },
            launch: LaunchSettings {
                method: LaunchMethod::parse_lenient(&record.agent_launch_method),
                init_script: record.init_script.clone(),
                init_script_as_root: record.execute_init_script_as_root,
                do_not_use_machine_if_init_fails: record.do_not_use_machine_if_init_fails,
                agent_workspace: record.agent_workspace.clone(),
                jvm_options: record.jvm_options.clone(),
                credentials_id: record.credentials_id.clone(),
            },
            parallel_jobs: parse_parallel_jobs(&record.no_of_parallel_jobs),
            retention_minutes: parse_retention(&record.retention_time_in_min),
            shutdown_on_idle: record.shutdown_on_idle,
            usage_mode: UsageMode::parse_lenient(&record.usage_mode),
            disabled: record.template_disabled,
        }
    }

    /// Upgrade a stored record to the current schema, then split it into
    /// configuration and runtime status.
    #[must_use]
    pub fn rehydrate(record: TemplateRecord) -> (Self, TemplateStatus) {
        let record = migration::upgrade(record);
        let template = Self::new(&record);
        let status = TemplateStatus::from_record(&record);
        (template, status)
    }

    /// Serialize back to a current-schema record, including runtime flags.
    #[must_use]
    pub fn to_record(&self, status: &TemplateStatus) -> TemplateRecord {
        let mut record = TemplateRecord {
            schema_version: CURRENT_SCHEMA_VERSION,
            template_name: self.name.clone(),
            template_desc: self.description.clone(),
            labels: self.labels.clone(),
            location: self.location.clone(),
            virtual_machine_size: self.vm_size.clone(),
            storage_account_name_reference_type: self.storage.reference_type().to_string(),
            storage_account_type: self.storage_sku.as_str().to_string(),
            no_of_parallel_jobs: self.parallel_jobs.to_string(),
            retention_time_in_min: self.retention_minutes.to_string(),
            usage_mode: self.usage_mode.as_str().to_string(),
            shutdown_on_idle: self.shutdown_on_idle,
            agent_launch_method: self.launch.method.as_str().to_string(),
            init_script: self.launch.init_script.clone(),
            credentials_id: self.launch.credentials_id.clone(),
            agent_workspace: self.launch.agent_workspace.clone(),
            jvm_options: self.launch.jvm_options.clone(),
            execute_init_script_as_root: self.launch.init_script_as_root,
            do_not_use_machine_if_init_fails: self.launch.do_not_use_machine_if_init_fails,
            virtual_network_name: self.network.virtual_network_name.clone().unwrap_or_default(),
            virtual_network_resource_group_name: self
                .network
                .virtual_network_resource_group_name
                .clone()
                .unwrap_or_default(),
            subnet_name: self.network.subnet_name.clone().unwrap_or_default(),
            use_private_ip: self.network.use_private_ip,
            nsg_name: self.network.nsg_name.clone().unwrap_or_default(),
            template_disabled: self.disabled,
            template_verified: status.is_verified(),
            template_status_details: status.status_details.clone(),
            ..TemplateRecord::default()
        };

        match &self.storage {
            StorageAccount::New(name) => record.new_storage_account_name.clone_from(name),
            StorageAccount::Existing(name) => {
                record.existing_storage_account_name.clone_from(name);
            }
        }

        match &self.image {
            ImageSelection::Basic { image } => {
                record.image_top_level_type = TOP_LEVEL_BASIC.to_string();
                record.built_in_image = image.as_str().to_string();
            }
            ImageSelection::Advanced(advanced) => {
                record.image_top_level_type = TOP_LEVEL_ADVANCED.to_string();
                record.os_type = advanced.os_type.as_str().to_string();
                match &advanced.source {
                    ImageSource::Reference(reference) => {
                        record.image_publisher.clone_from(&reference.publisher);
                        record.image_offer.clone_from(&reference.offer);
                        record.image_sku.clone_from(&reference.sku);
                        record.image_version.clone_from(&reference.version);
                    }
                    ImageSource::Custom { image } => record.image.clone_from(image),
                }
            }
        }

        record
    }

    #[must_use]
    pub fn is_basic(&self) -> bool {
        matches!(self.image, ImageSelection::Basic { .. })
    }

    /// Give the template a generated storage account when none is configured.
    ///
    /// Returns the generated name, or `None` if a name was already present.
    ///
    /// # Errors
    ///
    /// Returns [`NamingError`] if no name can be generated. The template is
    /// left unchanged in that case.
    pub fn ensure_storage_account(
        &mut self,
        resource_group: &str,
        subscription_id: Option<&str>,
    ) -> Result<Option<String>, NamingError> {
        if !self.storage.effective_name().trim().is_empty() {
            return Ok(None);
        }
        let generated = generate_unique_storage_account_name(resource_group, subscription_id)?;
        self.storage = StorageAccount::New(generated.clone());
        Ok(Some(generated))
    }

    /// Flatten the template into the request handed to collaborators.
    ///
    /// Basic templates take their image, OS, launch method and init script
    /// from the built-in catalog and run with fixed safe settings.
    #[must_use]
    pub fn resolve(&self, resource_group: &str) -> ResolvedTemplate {
        let base = ResolvedTemplate {
            template_name: self.name.clone(),
            location: self.location.clone(),
            vm_size: self.vm_size.clone(),
            resource_group: resource_group.to_string(),
            storage_account_name: self.storage.effective_name().to_string(),
            storage_account_type: self.storage_sku,
            image: ImageSource::Custom {
                image: String::new(),
            },
            os_type: OsType::default(),
            launch_method: self.launch.method,
            init_script: self.launch.init_script.clone(),
            execute_init_script_as_root: self.launch.init_script_as_root,
            do_not_use_machine_if_init_fails: self.launch.do_not_use_machine_if_init_fails,
            network: self.network.clone(),
            jvm_options: self.launch.jvm_options.clone(),
            agent_workspace: self.launch.agent_workspace.clone(),
            credentials_id: self.launch.credentials_id.clone(),
            parallel_jobs: self.parallel_jobs,
            retention_minutes: self.retention_minutes,
            shutdown_on_idle: self.shutdown_on_idle,
            usage_mode: self.usage_mode,
            labels: self.label_set.iter().cloned().collect(),
        };

        match &self.image {
            ImageSelection::Basic { image } => {
                let props = image.properties();
                ResolvedTemplate {
                    image: ImageSource::Reference(ImageReference {
                        publisher: props.publisher.to_string(),
                        offer: props.offer.to_string(),
                        sku: props.sku.to_string(),
                        version: props.version.to_string(),
                    }),
                    os_type: props.os_type,
                    launch_method: props.launch_method,
                    init_script: props.init_script.to_string(),
                    execute_init_script_as_root: true,
                    do_not_use_machine_if_init_fails: true,
                    network: NetworkPlacement::default(),
                    jvm_options: String::new(),
                    parallel_jobs: DEFAULT_PARALLEL_JOBS,
                    ..base
                }
            }
            ImageSelection::Advanced(advanced) => ResolvedTemplate {
                image: advanced.source.clone(),
                os_type: advanced.os_type,
                ..base
            },
        }
    }
}

// ── Resolved request ──────────────────────────────────────────────────────────

/// Every field a collaborator needs, with all choices already made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTemplate {
    pub template_name: String,
    pub location: String,
    pub vm_size: String,
    pub resource_group: String,
    pub storage_account_name: String,
    pub storage_account_type: StorageSku,
    pub image: ImageSource,
    pub os_type: OsType,
    pub launch_method: LaunchMethod,
    pub init_script: String,
    pub execute_init_script_as_root: bool,
    pub do_not_use_machine_if_init_fails: bool,
    pub network: NetworkPlacement,
    pub jvm_options: String,
    pub agent_workspace: String,
    pub credentials_id: String,
    pub parallel_jobs: u32,
    pub retention_minutes: u32,
    pub shutdown_on_idle: bool,
    pub usage_mode: UsageMode,
    pub labels: Vec<String>,
}

// ── Parsers ───────────────────────────────────────────────────────────────────

/// Parallel jobs per agent. Blank, non-numeric and zero all mean one.
#[must_use]
pub fn parse_parallel_jobs(raw: &str) -> u32 {
    match parse_digits(raw) {
        Some(0) | None => DEFAULT_PARALLEL_JOBS,
        Some(n) => n,
    }
}

/// Idle retention in minutes. Zero is kept; anything unparsable is the default.
#[must_use]
pub fn parse_retention(raw: &str) -> u32 {
    parse_digits(raw).unwrap_or(DEFAULT_RETENTION_MINUTES)
}

/// Split a label expression on whitespace.
#[must_use]
pub fn parse_labels(raw: &str) -> BTreeSet<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Digits only; surrounding whitespace is not a number.
fn parse_digits(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Any of the fields only an advanced image definition uses is set.
pub(crate) fn has_advanced_image_fields(record: &TemplateRecord) -> bool {
    [
        &record.image,
        &record.image_publisher,
        &record.image_offer,
        &record.image_sku,
    ]
    .iter()
    .any(|field| !field.trim().is_empty())
}

/// Pick the image axis. An explicit `basic`/`advanced` tag wins; otherwise
/// the presence of advanced-only fields decides.
fn parse_image_selection(record: &TemplateRecord) -> ImageSelection {
    let tag = record.image_top_level_type.trim();
    let advanced = if tag.eq_ignore_ascii_case(TOP_LEVEL_ADVANCED) {
        true
    } else if tag.eq_ignore_ascii_case(TOP_LEVEL_BASIC) {
        false
    } else {
        has_advanced_image_fields(record)
    };

    if !advanced {
        return ImageSelection::Basic {
            image: BuiltInImage::parse_lenient(&record.built_in_image),
        };
    }

    let source = if record.image.trim().is_empty() {
        ImageSource::Reference(ImageReference {
            publisher: record.image_publisher.clone(),
            offer: record.image_offer.clone(),
            sku: record.image_sku.clone(),
            version: record.image_version.clone(),
        })
    } else {
        ImageSource::Custom {
            image: record.image.clone(),
        }
    };

    ImageSelection::Advanced(AdvancedImage {
        source,
        os_type: OsType::parse_lenient(&record.os_type),
    })
}
