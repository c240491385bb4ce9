use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::SettingsError;
use crate::settings::{Settings, decode_settings};

/// Raw `cms_modules` row as stored; `settings` is still the JSON text.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbCmsModule {
    pub id: i64,
    pub name: String,
    pub cms_managed: bool,
    pub settings: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A registered module with its settings decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub id: i64,
    pub name: String,
    /// `true` when the row was created by synchronization.
    pub managed: bool,
    pub settings: Settings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbCmsModule> for ModuleRecord {
    type Error = SettingsError;

    fn try_from(row: DbCmsModule) -> Result<Self, Self::Error> {
        Ok(Self {
            settings: decode_settings(&row.settings)?,
            id: row.id,
            name: row.name,
            managed: row.cms_managed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl std::fmt::Display for ModuleRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let settings = serde_json::to_string(&self.settings).map_err(|_| std::fmt::Error)?;
        write!(f, "{} => {}", self.name, settings)
    }
}
