//! Storage account naming.
//!
//! Pure functions only: choosing between the new/existing storage account
//! names of a template, and deriving a deterministic name for a resource
//! group when none was configured.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use md5::{Digest, Md5};

use crate::domain::error::NamingError;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Prefix of every generated storage account name.
pub const STORAGE_ACCOUNT_PREFIX: &str = "jn";

/// Number of encoded digest characters kept after the prefix.
pub const STORAGE_ACCOUNT_UID_LEN: usize = 22;

/// Reference-type tag selecting the new storage account name.
pub const REFERENCE_TYPE_NEW: &str = "new";

/// Reference-type tag selecting the existing storage account name.
pub const REFERENCE_TYPE_EXISTING: &str = "existing";

const FILLER: char = 'a';

// ── Resolution ────────────────────────────────────────────────────────────────

/// Returns `true` when the new-name axis is the active one.
///
/// The tag wins when it says `new` (any case). A blank tag defers to
/// whichever name is present, preferring the new one.
#[must_use]
pub fn prefers_new_storage_account(reference_type: &str, new_name: &str) -> bool {
    let tag = reference_type.trim();
    if tag.is_empty() {
        return !new_name.trim().is_empty();
    }
    tag.eq_ignore_ascii_case(REFERENCE_TYPE_NEW)
}

/// Effective storage account name for the given tag and candidate names.
#[must_use]
pub fn resolve_storage_account_name<'a>(
    reference_type: &str,
    new_name: &'a str,
    existing_name: &'a str,
) -> &'a str {
    if prefers_new_storage_account(reference_type, new_name) {
        new_name
    } else {
        existing_name
    }
}

// ── Generation ────────────────────────────────────────────────────────────────

/// Derive a storage account name from the subscription and resource group.
///
/// The same inputs always give the same 24-character name of `[a-z0-9]`,
/// starting with [`STORAGE_ACCOUNT_PREFIX`].
///
/// # Errors
///
/// Returns [`NamingError::GenerationFailed`] if the encoded digest is shorter
/// than [`STORAGE_ACCOUNT_UID_LEN`].
pub fn generate_unique_storage_account_name(
    resource_group: &str,
    subscription_id: Option<&str>,
) -> Result<String, NamingError> {
    let mut hasher = Md5::new();
    if let Some(subscription) = subscription_id.filter(|s| !s.is_empty()) {
        hasher.update(subscription.as_bytes());
    }
    hasher.update(resource_group.as_bytes());
    let encoded = STANDARD.encode(hasher.finalize());

    let uid = encoded
        .get(..STORAGE_ACCOUNT_UID_LEN)
        .ok_or(NamingError::GenerationFailed { len: encoded.len() })?;

    let mut name = String::with_capacity(STORAGE_ACCOUNT_PREFIX.len() + STORAGE_ACCOUNT_UID_LEN);
    name.push_str(STORAGE_ACCOUNT_PREFIX);
    name.extend(uid.chars().map(|c| {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            FILLER
        }
    }));
    Ok(name)
}
