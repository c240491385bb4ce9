mod basic;
mod modules;

pub use basic::BasicConfig;
pub use modules::ModulesConfig;

use crate::error::SettingsError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Storage and logging (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Installed-module discovery and synchronization (see `modules` table).
    #[serde(default)]
    pub modules: ModulesConfig,
}

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Environment variables with this prefix override file values,
/// e.g. `BCMS_SETTINGS_BASIC__DATABASE_URL`.
pub const ENV_PREFIX: &str = "BCMS_SETTINGS_";

impl Config {
    /// Builds a Figment that merges defaults, a config TOML file (if present)
    /// and prefixed environment variables, in that order.
    pub fn figment_from(path: &Path) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if path.is_file() {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn figment() -> Figment {
        Self::figment_from(&PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Loads configuration from defaults, `config.toml` if present, and the environment.
    pub fn load() -> Result<Self, SettingsError> {
        Ok(Self::figment().extract()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        Ok(Self::figment_from(path).extract()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_a_file() {
        let cfg = Config::load_from(Path::new("/nonexistent/bcms/config.toml")).unwrap();
        assert_eq!(cfg.basic.loglevel, "info");
        assert!(cfg.basic.init_schema);
        assert_eq!(cfg.modules.prefix, "bcms_");
        assert_eq!(cfg.modules.exclude, vec!["bcms_settings".to_string()]);
        assert!(cfg.modules.synchronize_on_start);
        assert!(cfg.modules.manifest.is_none());
    }

    #[test]
    fn toml_overrides_defaults() {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(
                r#"
                [basic]
                database_url = "sqlite::memory:"

                [modules]
                installed = ["bcms_blog", "bcms_s3"]
                synchronize_on_start = false
                "#,
            ));
        let cfg: Config = figment.extract().unwrap();

        assert_eq!(cfg.basic.database_url, "sqlite::memory:");
        assert_eq!(cfg.basic.loglevel, "info");
        assert_eq!(cfg.modules.installed, vec!["bcms_blog", "bcms_s3"]);
        assert!(!cfg.modules.synchronize_on_start);
    }
}
