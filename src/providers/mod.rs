//! Installed-module providers.
//!
//! The host decides which bcms modules are installed; these types turn that
//! decision into a plain list of names for [`crate::registry::Registry::synchronize`].

mod fixed;
mod manifest;

pub use fixed::FixedModules;
pub use manifest::ManifestModules;

use crate::config::ModulesConfig;
use crate::error::SettingsError;
use std::collections::HashSet;
use tracing::debug;

/// Source of currently installed module names.
pub trait InstalledModules: Send + Sync {
    fn installed_modules(&self) -> Result<Vec<String>, SettingsError>;
}

/// Several providers merged in order, duplicates and excluded names dropped.
pub struct CompositeModules {
    sources: Vec<Box<dyn InstalledModules>>,
    exclude: Vec<String>,
}

impl CompositeModules {
    pub fn new(sources: Vec<Box<dyn InstalledModules>>) -> Self {
        Self {
            sources,
            exclude: Vec::new(),
        }
    }

    /// Names dropped from the merged list whichever source reported them.
    #[must_use]
    pub fn excluding(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Builds the provider described by the `modules` config table: the
    /// explicit `installed` list followed by the manifest's dependencies, minus
    /// `exclude`.
    pub fn from_config(cfg: &ModulesConfig) -> Self {
        let mut sources: Vec<Box<dyn InstalledModules>> =
            vec![Box::new(FixedModules::new(cfg.installed.clone()))];
        if let Some(path) = cfg.manifest.as_ref() {
            sources.push(Box::new(ManifestModules::new(
                path.clone(),
                cfg.prefix.clone(),
                cfg.exclude.clone(),
            )));
        }
        Self::new(sources).excluding(cfg.exclude.clone())
    }
}

impl InstalledModules for CompositeModules {
    fn installed_modules(&self) -> Result<Vec<String>, SettingsError> {
        let mut all = Vec::new();
        for source in &self.sources {
            all.extend(source.installed_modules()?);
        }
        all.retain(|name| !self.exclude.contains(name));
        let merged = dedup_preserving_order(all);
        debug!(count = merged.len(), modules = ?merged, "installed modules resolved");
        Ok(merged)
    }
}

impl<T: InstalledModules + ?Sized> InstalledModules for Box<T> {
    fn installed_modules(&self) -> Result<Vec<String>, SettingsError> {
        (**self).installed_modules()
    }
}

pub(crate) fn dedup_preserving_order(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(names.len());
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_merges_in_order_without_duplicates() {
        let composite = CompositeModules::new(vec![
            Box::new(FixedModules::new(vec!["bcms_s3".into(), "bcms_blog".into()])),
            Box::new(FixedModules::new(vec!["bcms_blog".into(), "bcms_news".into()])),
        ]);

        assert_eq!(
            composite.installed_modules().unwrap(),
            vec!["bcms_s3", "bcms_blog", "bcms_news"]
        );
    }

    #[test]
    fn from_config_without_manifest_uses_installed_list() {
        let cfg = ModulesConfig {
            installed: vec!["bcms_blog".into()],
            ..ModulesConfig::default()
        };
        let composite = CompositeModules::from_config(&cfg);
        assert_eq!(composite.installed_modules().unwrap(), vec!["bcms_blog"]);
    }

    #[test]
    fn from_config_excludes_the_settings_module_from_the_installed_list() {
        let cfg = ModulesConfig {
            installed: vec!["bcms_settings".into(), "bcms_blog".into()],
            ..ModulesConfig::default()
        };
        let composite = CompositeModules::from_config(&cfg);
        assert_eq!(composite.installed_modules().unwrap(), vec!["bcms_blog"]);
    }
}
