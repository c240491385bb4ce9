//! Create/patch payloads for the `cms_modules` table.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::error::SettingsError;
use crate::settings::SettingValue;

/// Abstraction for applying a patch payload/envelope to the database.
#[async_trait]
pub trait DbPatchable {
    type Output;

    async fn apply_patch(&self, pool: &SqlitePool) -> Result<Self::Output, SettingsError>;
}

#[derive(Debug, Clone)]
pub struct ModuleCreate {
    pub name: String,
    pub managed: bool,
}

/// Key-level mutation of one module's settings blob.
///
/// Applied as a single read-modify-write inside a `BEGIN IMMEDIATE`
/// transaction, so writers never lose each other's keys.
#[derive(Debug, Clone)]
pub enum SettingsPatch {
    Set {
        module: String,
        key: String,
        value: SettingValue,
    },
    Delete {
        module: String,
        key: String,
    },
}

impl SettingsPatch {
    pub fn module(&self) -> &str {
        match self {
            SettingsPatch::Set { module, .. } | SettingsPatch::Delete { module, .. } => module,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            SettingsPatch::Set { key, .. } | SettingsPatch::Delete { key, .. } => key,
        }
    }
}
