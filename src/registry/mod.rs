//! Module registry: which bcms modules have a settings row, and how to reach
//! their settings.
//!
//! Rows come from two places. [`Registry::synchronize`] creates a *managed* row
//! for every installed module and removes managed rows whose module is gone.
//! [`Registry::register`] creates an *unmanaged* row that synchronization never
//! touches.

mod accessor;
mod name;
mod store;

pub use accessor::Accessor;
pub use name::{MODULE_NAME_RE, is_valid_module_name, validate_module_name};
pub use store::ModuleStore;

use moka::sync::Cache;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::db::{DbActorHandle, ModuleCreate, ModuleRecord};
use crate::error::SettingsError;
use crate::providers::{InstalledModules, dedup_preserving_order};

/// What a synchronization pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

pub struct Registry<S: ModuleStore = DbActorHandle> {
    store: S,
    installed: Box<dyn InstalledModules>,
    /// Names already resolved by [`Registry::module`].
    resolved: Cache<String, ()>,
}

impl<S: ModuleStore> Registry<S> {
    pub fn new(store: S, installed: impl InstalledModules + 'static) -> Self {
        Self {
            store,
            installed: Box::new(installed),
            resolved: Cache::builder().max_capacity(1024).build(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reconciles rows with the provider's installed modules.
    pub async fn synchronize(&self) -> Result<SyncReport, SettingsError> {
        let installed = self.installed.installed_modules()?;
        self.synchronize_with(&installed).await
    }

    /// Registers every installed module that has no row (as managed) and
    /// removes managed rows whose module is no longer installed.
    ///
    /// A store without the `cms_modules` table is left alone. All installed
    /// names are validated before anything is written.
    pub async fn synchronize_with(&self, installed: &[String]) -> Result<SyncReport, SettingsError> {
        if !self.store.is_initialized().await? {
            warn!("cms_modules table not found; skipping module synchronization");
            return Ok(SyncReport::default());
        }

        let installed = dedup_preserving_order(installed.to_vec());
        for name in &installed {
            validate_module_name(name)?;
        }

        let registered: HashSet<String> = self.store.list_names().await?.into_iter().collect();
        let installed_set: HashSet<&str> = installed.iter().map(String::as_str).collect();

        let to_add: Vec<String> = installed
            .iter()
            .filter(|name| !registered.contains(*name))
            .cloned()
            .collect();
        let to_remove: Vec<String> = self
            .store
            .list_managed_names()
            .await?
            .into_iter()
            .filter(|name| !installed_set.contains(name.as_str()))
            .collect();

        for name in &to_add {
            self.store
                .create(ModuleCreate {
                    name: name.clone(),
                    managed: true,
                })
                .await?;
        }
        for name in &to_remove {
            self.store.destroy(name).await?;
            self.resolved.invalidate(name);
        }

        let report = SyncReport {
            added: to_add,
            removed: to_remove,
        };
        info!(
            installed = installed.len(),
            added = ?report.added,
            removed = ?report.removed,
            "modules synchronized"
        );
        Ok(report)
    }

    /// Registers an unmanaged module; synchronization will never remove it.
    pub async fn register(&self, name: &str) -> Result<ModuleRecord, SettingsError> {
        self.register_with(name, false).await
    }

    pub async fn register_with(
        &self,
        name: &str,
        managed: bool,
    ) -> Result<ModuleRecord, SettingsError> {
        validate_module_name(name)?;
        let record = self
            .store
            .create(ModuleCreate {
                name: name.to_string(),
                managed,
            })
            .await?;
        info!(module = name, managed, "module registered");
        Ok(record)
    }

    /// Removes a module row, managed or not.
    pub async fn delete(&self, name: &str) -> Result<(), SettingsError> {
        validate_module_name(name)?;
        self.resolved.invalidate(name);
        if !self.store.destroy(name).await? {
            return Err(SettingsError::ModuleNotRegistered(name.to_string()));
        }
        info!(module = name, "module deleted");
        Ok(())
    }

    /// Registered module names in registration order.
    pub async fn modules(&self) -> Result<Vec<String>, SettingsError> {
        self.store.list_names().await
    }

    pub async fn managed_modules(&self) -> Result<Vec<String>, SettingsError> {
        self.store.list_managed_names().await
    }

    pub async fn resolve(&self, name: &str) -> Result<ModuleRecord, SettingsError> {
        self.store
            .find(name)
            .await?
            .ok_or_else(|| SettingsError::ModuleNotRegistered(name.to_string()))
    }

    /// Settings accessor for `name`.
    ///
    /// Names outside the `bcms_` convention are `UnknownOperation`; valid but
    /// unregistered names are `ModuleNotRegistered`. The row is looked up on
    /// every call, since another registry on the same store may have removed
    /// it; a failed lookup also forgets the memoized name.
    pub async fn module(&self, name: &str) -> Result<Accessor<S>, SettingsError> {
        if !is_valid_module_name(name) {
            return Err(SettingsError::UnknownOperation(name.to_string()));
        }
        match self.resolve(name).await {
            Ok(_) => {
                if !self.resolved.contains_key(name) {
                    self.resolved.insert(name.to_string(), ());
                    debug!(module = name, "module accessor memoized");
                }
            }
            Err(err) => {
                if matches!(err, SettingsError::ModuleNotRegistered(_)) {
                    self.resolved.invalidate(name);
                }
                return Err(err);
            }
        }
        Ok(Accessor::new(name, self.store.clone()))
    }

    /// Whether [`Registry::module`] has already resolved `name`.
    pub fn is_memoized(&self, name: &str) -> bool {
        self.resolved.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::FixedModules;
    use crate::registry::store::memory::MemoryStore;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn registry() -> Registry<MemoryStore> {
        Registry::new(MemoryStore::default(), FixedModules::default())
    }

    #[tokio::test]
    async fn synchronize_adds_then_removes_managed_rows() {
        let registry = registry();

        let report = registry
            .synchronize_with(&names(&["bcms_blog", "bcms_s3", "bcms_seo_sitemap"]))
            .await
            .unwrap();
        assert_eq!(report.added.len(), 3);
        assert_eq!(
            registry.managed_modules().await.unwrap(),
            names(&["bcms_blog", "bcms_s3", "bcms_seo_sitemap"])
        );

        let report = registry
            .synchronize_with(&names(&["bcms_blog", "bcms_s3"]))
            .await
            .unwrap();
        assert_eq!(report.removed, names(&["bcms_seo_sitemap"]));
        assert_eq!(
            registry.modules().await.unwrap(),
            names(&["bcms_blog", "bcms_s3"])
        );
    }

    #[tokio::test]
    async fn synchronize_is_idempotent() {
        let registry = registry();
        let installed = names(&["bcms_blog", "bcms_s3"]);

        registry.synchronize_with(&installed).await.unwrap();
        let second = registry.synchronize_with(&installed).await.unwrap();
        assert!(second.is_noop());
    }

    #[tokio::test]
    async fn synchronize_leaves_unmanaged_rows_alone() {
        let registry = registry();
        registry.register("bcms_blog").await.unwrap();

        let report = registry.synchronize_with(&[]).await.unwrap();
        assert!(report.is_noop());
        assert_eq!(registry.modules().await.unwrap(), names(&["bcms_blog"]));
    }

    #[tokio::test]
    async fn synchronize_validates_before_writing() {
        let registry = registry();
        let err = registry
            .synchronize_with(&names(&["bcms_blog", "Not Valid"]))
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidModuleName(n) if n == "Not Valid"));
        assert!(registry.modules().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn synchronize_skips_uninitialized_store() {
        let registry = Registry::new(
            MemoryStore::uninitialized(),
            FixedModules::from_iter(["bcms_blog"]),
        );
        assert!(registry.synchronize().await.unwrap().is_noop());
    }

    #[tokio::test]
    async fn synchronize_uses_the_provider() {
        let registry = Registry::new(
            MemoryStore::default(),
            FixedModules::from_iter(["bcms_s3", "bcms_blog"]),
        );
        let report = registry.synchronize().await.unwrap();
        assert_eq!(report.added, names(&["bcms_s3", "bcms_blog"]));
    }

    #[tokio::test]
    async fn module_memoizes_and_delete_forgets() {
        let registry = registry();
        registry.register("bcms_blog").await.unwrap();

        assert!(!registry.is_memoized("bcms_blog"));
        registry.module("bcms_blog").await.unwrap();
        assert!(registry.is_memoized("bcms_blog"));

        registry.delete("bcms_blog").await.unwrap();
        assert!(!registry.is_memoized("bcms_blog"));
        assert!(matches!(
            registry.module("bcms_blog").await,
            Err(SettingsError::ModuleNotRegistered(_))
        ));
    }

    #[tokio::test]
    async fn module_rechecks_rows_removed_behind_its_back() {
        let store = MemoryStore::default();
        let registry = Registry::new(store.clone(), FixedModules::default());
        registry.register("bcms_blog").await.unwrap();
        registry.module("bcms_blog").await.unwrap();
        assert!(registry.is_memoized("bcms_blog"));

        store.destroy("bcms_blog").await.unwrap();
        assert!(matches!(
            registry.module("bcms_blog").await,
            Err(SettingsError::ModuleNotRegistered(n)) if n == "bcms_blog"
        ));
        assert!(!registry.is_memoized("bcms_blog"));
    }

    #[tokio::test]
    async fn module_dispatch_errors() {
        let registry = registry();
        assert!(matches!(
            registry.module("wibble").await,
            Err(SettingsError::UnknownOperation(n)) if n == "wibble"
        ));
        assert!(matches!(
            registry.module("bcms_not_registered").await,
            Err(SettingsError::ModuleNotRegistered(_))
        ));
        assert!(!registry.is_memoized("bcms_not_registered"));
    }
}
