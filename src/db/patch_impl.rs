//! SettingsPatch -> DbPatchable implementation.
//!
//! This sits in the `db` module because it contains SQL/table knowledge.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::db::patch::{DbPatchable, SettingsPatch};
use crate::error::SettingsError;
use crate::settings::{SettingValue, decode_settings, encode_settings};
use crate::utils::logging::with_pretty_json_debug;

#[async_trait]
impl DbPatchable for SettingsPatch {
    /// The value the key held before the patch.
    type Output = Option<SettingValue>;

    /// Read-modify-write of one key under `BEGIN IMMEDIATE`, so the write lock
    /// is taken before the blob is read and another process cannot slip a
    /// write in between.
    async fn apply_patch(&self, pool: &SqlitePool) -> Result<Self::Output, SettingsError> {
        let mut conn = pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        match self.read_modify_write(&mut conn).await {
            Ok(previous) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                Ok(previous)
            }
            Err(err) => {
                if let Err(rollback) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                    warn!(module = self.module(), error = %rollback, "settings patch rollback failed");
                }
                Err(err)
            }
        }
    }
}

impl SettingsPatch {
    async fn read_modify_write(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<Option<SettingValue>, SettingsError> {
        let module = self.module();

        let raw: Option<String> =
            sqlx::query_scalar("SELECT settings FROM cms_modules WHERE name = ?")
                .bind(module)
                .fetch_optional(&mut *conn)
                .await?;
        let Some(raw) = raw else {
            return Err(SettingsError::ModuleNotRegistered(module.to_string()));
        };

        let mut settings = decode_settings(&raw)?;
        let previous = match self {
            SettingsPatch::Set { key, value, .. } => settings.insert(key.clone(), value.clone()),
            SettingsPatch::Delete { key, .. } => settings.remove(key),
        };

        let encoded = encode_settings(&settings)?;
        let updated_at = Utc::now();
        let res = sqlx::query(
            r#"
            UPDATE cms_modules
            SET settings = ?, updated_at = ?
            WHERE name = ?
            "#,
        )
        .bind(&encoded)
        .bind(updated_at)
        .bind(module)
        .execute(&mut *conn)
        .await?;

        let affected = res.rows_affected();
        debug!(
            module,
            key = self.key(),
            op = if matches!(self, SettingsPatch::Set { .. }) { "set" } else { "delete" },
            affected,
            had_previous = previous.is_some(),
            updated_at = %updated_at,
            "db settings patch applied"
        );
        with_pretty_json_debug(&settings, |json| {
            debug!(module, settings = %json, "settings after patch");
        });

        if affected == 0 {
            return Err(SettingsError::ModuleNotRegistered(module.to_string()));
        }

        Ok(previous)
    }
}
