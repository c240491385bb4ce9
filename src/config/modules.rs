use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the list of installed bcms modules comes from.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModulesConfig {
    /// Only dependencies starting with this prefix count as bcms modules.
    /// TOML: `modules.prefix`. Default: `bcms_`.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Names never treated as installed modules.
    /// TOML: `modules.exclude`. Default: `["bcms_settings"]` (the store itself).
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Explicitly installed module names, merged with the manifest's.
    /// TOML: `modules.installed`. Default: empty.
    #[serde(default)]
    pub installed: Vec<String>,

    /// Optional TOML manifest whose `[dependencies]` table lists installed modules.
    /// TOML: `modules.manifest`. Default: unset.
    #[serde(default)]
    pub manifest: Option<PathBuf>,

    /// Reconcile registered modules with installed ones at startup.
    /// TOML: `modules.synchronize_on_start`. Default: `true`.
    #[serde(default = "default_true")]
    pub synchronize_on_start: bool,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            exclude: default_exclude(),
            installed: Vec::new(),
            manifest: None,
            synchronize_on_start: true,
        }
    }
}

fn default_prefix() -> String {
    "bcms_".to_string()
}

fn default_exclude() -> Vec<String> {
    vec!["bcms_settings".to_string()]
}

fn default_true() -> bool {
    true
}
