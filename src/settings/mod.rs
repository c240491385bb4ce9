//! Settings payload types.
//!
//! A module's settings are a flat map of caller-chosen keys to
//! [`SettingValue`]s, persisted as one JSON blob per module row.

mod value;

pub use value::SettingValue;

use crate::error::SettingsError;
use std::collections::BTreeMap;

pub type Settings = BTreeMap<String, SettingValue>;

/// Decode the stored blob. A blank column is treated as an empty map.
pub fn decode_settings(raw: &str) -> Result<Settings, SettingsError> {
    if raw.trim().is_empty() {
        return Ok(Settings::new());
    }
    Ok(serde_json::from_str(raw)?)
}

pub fn encode_settings(settings: &Settings) -> Result<String, SettingsError> {
    Ok(serde_json::to_string(settings)?)
}

/// Keys are free-form (whitespace included) but must be non-empty.
pub fn validate_key(key: &str) -> Result<(), SettingsError> {
    if key.is_empty() {
        return Err(SettingsError::InvalidSettingKey(key.to_string()));
    }
    Ok(())
}

/// Rejects values that would not survive a trip through the JSON blob.
pub fn validate_value(key: &str, value: &SettingValue) -> Result<(), SettingsError> {
    if let Some(at) = value.non_finite_path() {
        return Err(SettingsError::InvalidSettingValue {
            key: key.to_string(),
            reason: format!("non-finite float at `{key}{at}`"),
        });
    }
    Ok(())
}
