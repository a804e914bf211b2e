//! Versioned upgrade chain for stored template records.
//!
//! Each step only fills in values that are blank, so explicit settings are
//! never overwritten and every step can be re-run safely.

use std::mem;

use vmagent_common::{BuiltInImage, StorageSku, TemplateRecord};

use crate::domain::naming::REFERENCE_TYPE_NEW;
use crate::domain::template::{TOP_LEVEL_ADVANCED, TOP_LEVEL_BASIC, has_advanced_image_fields};

/// Schema version written by this release.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

type Step = fn(&mut TemplateRecord);

/// `(target version, step)` pairs, in order.
const STEPS: &[(u32, Step)] = &[
    (1, backfill_storage_account),
    (2, backfill_image_top_level),
];

/// Apply every step newer than the record's version.
///
/// Records from a newer release are returned untouched.
#[must_use]
pub fn upgrade(mut record: TemplateRecord) -> TemplateRecord {
    if record.schema_version >= CURRENT_SCHEMA_VERSION {
        return record;
    }
    for (version, step) in STEPS {
        if record.schema_version < *version {
            step(&mut record);
            record.schema_version = *version;
        }
    }
    record
}

/// Returns `true` if [`upgrade`] would change the record.
#[must_use]
pub fn needs_upgrade(record: &TemplateRecord) -> bool {
    record.schema_version < CURRENT_SCHEMA_VERSION
}

/// v0 to v1: default storage SKU and split the flat storage account name.
fn backfill_storage_account(record: &mut TemplateRecord) {
    if record.storage_account_type.trim().is_empty() {
        record.storage_account_type = StorageSku::default().as_str().to_string();
    }
    if record.new_storage_account_name.trim().is_empty()
        && record.existing_storage_account_name.trim().is_empty()
        && !record.storage_account_name.trim().is_empty()
    {
        record.new_storage_account_name = mem::take(&mut record.storage_account_name);
        record.storage_account_name_reference_type = REFERENCE_TYPE_NEW.to_string();
    }
}

/// v1 to v2: infer the image top-level type from advanced-only fields.
fn backfill_image_top_level(record: &mut TemplateRecord) {
    if !record.image_top_level_type.trim().is_empty() {
        return;
    }
    record.image_top_level_type = if has_advanced_image_fields(record) {
        TOP_LEVEL_ADVANCED
    } else {
        TOP_LEVEL_BASIC
    }
    .to_string();

    if record.built_in_image.trim().is_empty() {
        record.built_in_image = BuiltInImage::default().as_str().to_string();
    }
}
