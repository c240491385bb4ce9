use async_trait::async_trait;

use crate::db::{DbActorHandle, ModuleCreate, ModuleRecord, SettingsPatch};
use crate::error::SettingsError;
use crate::settings::SettingValue;

/// Persistence seen by the registry and its accessors.
///
/// Implemented by [`DbActorHandle`]; handles are cheap to clone and every
/// accessor keeps its own copy.
#[async_trait]
pub trait ModuleStore: Clone + Send + Sync + 'static {
    /// `false` until the `cms_modules` table exists.
    async fn is_initialized(&self) -> Result<bool, SettingsError>;

    async fn list_names(&self) -> Result<Vec<String>, SettingsError>;

    async fn list_managed_names(&self) -> Result<Vec<String>, SettingsError>;

    async fn find(&self, name: &str) -> Result<Option<ModuleRecord>, SettingsError>;

    /// Fails with `ModuleAlreadyRegistered` when the name is taken.
    async fn create(&self, create: ModuleCreate) -> Result<ModuleRecord, SettingsError>;

    /// Returns whether a row was removed.
    async fn destroy(&self, name: &str) -> Result<bool, SettingsError>;

    /// Returns the key's previous value; `ModuleNotRegistered` if the row is gone.
    async fn apply(&self, patch: SettingsPatch) -> Result<Option<SettingValue>, SettingsError>;
}

#[async_trait]
impl ModuleStore for DbActorHandle {
    async fn is_initialized(&self) -> Result<bool, SettingsError> {
        DbActorHandle::is_initialized(self).await
    }

    async fn list_names(&self) -> Result<Vec<String>, SettingsError> {
        DbActorHandle::list_names(self).await
    }

    async fn list_managed_names(&self) -> Result<Vec<String>, SettingsError> {
        DbActorHandle::list_managed_names(self).await
    }

    async fn find(&self, name: &str) -> Result<Option<ModuleRecord>, SettingsError> {
        DbActorHandle::find(self, name).await
    }

    async fn create(&self, create: ModuleCreate) -> Result<ModuleRecord, SettingsError> {
        DbActorHandle::create(self, create).await
    }

    async fn destroy(&self, name: &str) -> Result<bool, SettingsError> {
        DbActorHandle::destroy(self, name).await
    }

    async fn apply(&self, patch: SettingsPatch) -> Result<Option<SettingValue>, SettingsError> {
        DbActorHandle::patch(self, patch).await
    }
}
