use tracing::debug;

use super::store::ModuleStore;
use crate::db::{DbActorHandle, ModuleRecord, SettingsPatch};
use crate::error::SettingsError;
use crate::settings::{SettingValue, Settings, validate_key, validate_value};

/// Key-level view over one module's settings.
///
/// Holds only the module name and a store handle. Reads always go to the
/// store and writes are persisted before the call returns.
#[derive(Clone)]
pub struct Accessor<S: ModuleStore = DbActorHandle> {
    name: String,
    store: S,
}

impl<S: ModuleStore> Accessor<S> {
    pub(crate) fn new(name: impl Into<String>, store: S) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full row as currently stored.
    pub async fn record(&self) -> Result<ModuleRecord, SettingsError> {
        self.store
            .find(&self.name)
            .await?
            .ok_or_else(|| SettingsError::ModuleNotRegistered(self.name.clone()))
    }

    pub async fn settings(&self) -> Result<Settings, SettingsError> {
        Ok(self.record().await?.settings)
    }

    /// `None` when the key was never set. The empty key can never be set, so
    /// it always reads as `None`.
    pub async fn get(&self, key: &str) -> Result<Option<SettingValue>, SettingsError> {
        Ok(self.settings().await?.remove(key))
    }

    /// Stores `value` under `key` and returns what was there before.
    pub async fn set(
        &self,
        key: &str,
        value: impl Into<SettingValue>,
    ) -> Result<Option<SettingValue>, SettingsError> {
        validate_key(key)?;
        let value = value.into();
        validate_value(key, &value)?;
        debug!(module = %self.name, key, kind = value.kind(), "setting value");
        self.store
            .apply(SettingsPatch::Set {
                module: self.name.clone(),
                key: key.to_string(),
                value,
            })
            .await
    }

    /// Removes `key`; a missing key is not an error.
    pub async fn delete(&self, key: &str) -> Result<Option<SettingValue>, SettingsError> {
        debug!(module = %self.name, key, "deleting setting");
        self.store
            .apply(SettingsPatch::Delete {
                module: self.name.clone(),
                key: key.to_string(),
            })
            .await
    }

    /// Method-name dispatch for callers that only know the operation at run time.
    ///
    /// - `"key"` with no arguments reads `key`;
    /// - `"key="` with one argument writes it and returns the new value;
    /// - `"delete"` with one string argument removes that key and returns it.
    ///
    /// Anything else is `UnsupportedOperation`.
    pub async fn call(
        &self,
        method: &str,
        mut args: Vec<SettingValue>,
    ) -> Result<Option<SettingValue>, SettingsError> {
        let unsupported = |arity| SettingsError::UnsupportedOperation {
            method: method.to_string(),
            arity,
        };
        let arity = args.len();

        if method == "delete" {
            return match args.pop() {
                Some(SettingValue::String(key)) if arity == 1 => self.delete(&key).await,
                _ => Err(unsupported(arity)),
            };
        }

        if let Some(key) = method.strip_suffix('=') {
            return match args.pop() {
                Some(value) if arity == 1 => {
                    self.set(key, value.clone()).await?;
                    Ok(Some(value))
                }
                _ => Err(unsupported(arity)),
            };
        }

        if arity == 0 {
            return self.get(method).await;
        }
        Err(unsupported(arity))
    }

    /// `bcms_s3 => {"account_id":"ACCOUNT_ID"}`
    pub async fn inspect(&self) -> Result<String, SettingsError> {
        Ok(self.record().await?.to_string())
    }
}

impl<S: ModuleStore> std::fmt::Debug for Accessor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accessor").field("name", &self.name).finish()
    }
}
