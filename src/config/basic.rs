use serde::{Deserialize, Serialize};

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// Database URL for SQLite.
    /// TOML: `basic.database_url`. Default: `sqlite://bcms_settings.db`.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `basic.loglevel`. Default: `info`.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// Create the `cms_modules` table at startup when missing.
    /// TOML: `basic.init_schema`. Default: `true`.
    #[serde(default = "default_true")]
    pub init_schema: bool,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            loglevel: default_loglevel(),
            init_schema: true,
        }
    }
}

fn default_database_url() -> String {
    "sqlite://bcms_settings.db".to_string()
}

fn default_loglevel() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
