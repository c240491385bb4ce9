use super::InstalledModules;
use crate::error::SettingsError;
use figment::{
    Figment,
    providers::{Format, Toml},
    value::Value,
};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::{debug, info};

/// Reads installed bcms modules from the `[dependencies]` table of a TOML
/// manifest, the way the host framework's dependency list declares them.
///
/// Dependency names are normalized (`-` becomes `_`), kept only when they
/// start with `prefix`, and dropped when listed in `exclude`.
#[derive(Debug, Clone)]
pub struct ManifestModules {
    path: PathBuf,
    prefix: String,
    exclude: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    dependencies: BTreeMap<String, Value>,
}

impl ManifestModules {
    pub fn new(path: PathBuf, prefix: String, exclude: Vec<String>) -> Self {
        Self {
            path,
            prefix,
            exclude,
        }
    }

    fn filter(&self, manifest: Manifest) -> Vec<String> {
        manifest
            .dependencies
            .into_keys()
            .map(|name| name.replace('-', "_"))
            .filter(|name| name.starts_with(&self.prefix))
            .filter(|name| !self.exclude.iter().any(|ex| ex == name))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl InstalledModules for ManifestModules {
    fn installed_modules(&self) -> Result<Vec<String>, SettingsError> {
        if !self.path.is_file() {
            info!(path = %self.path.display(), "module manifest not found; no installed modules");
            return Ok(Vec::new());
        }
        let manifest: Manifest = Figment::from(Toml::file(&self.path)).extract()?;
        let names = self.filter(manifest);
        debug!(path = %self.path.display(), modules = ?names, "modules read from manifest");
        Ok(names)
    }
}
