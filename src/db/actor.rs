use crate::db::models::{DbCmsModule, ModuleRecord};
use crate::db::patch::{DbPatchable, ModuleCreate, SettingsPatch};
use crate::db::schema::{MODULES_TABLE, SQLITE_INIT};
use crate::error::SettingsError;
use crate::settings::SettingValue;
use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

/// How the database actor opens its pool.
#[derive(Debug, Clone)]
pub struct DbOptions {
    pub database_url: String,
    /// Apply `SQLITE_INIT` when the actor starts.
    pub init_schema: bool,
}

impl DbOptions {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            init_schema: true,
        }
    }

    pub fn without_schema(mut self) -> Self {
        self.init_schema = false;
        self
    }

    fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

#[derive(Debug)]
pub enum DbActorMessage {
    /// Apply the schema DDL (idempotent).
    InitSchema(RpcReplyPort<Result<(), SettingsError>>),

    /// Whether the `cms_modules` table exists.
    IsInitialized(RpcReplyPort<Result<bool, SettingsError>>),

    /// All module names, ordered by id.
    ListNames(RpcReplyPort<Result<Vec<String>, SettingsError>>),

    /// Names of modules created by synchronization (cms_managed=1).
    ListManagedNames(RpcReplyPort<Result<Vec<String>, SettingsError>>),

    /// Look up a module row by name.
    Find(String, RpcReplyPort<Result<Option<ModuleRecord>, SettingsError>>),

    /// Insert a module row with empty settings.
    Create(ModuleCreate, RpcReplyPort<Result<ModuleRecord, SettingsError>>),

    /// Delete a module row by name; replies whether a row was removed.
    Destroy(String, RpcReplyPort<Result<bool, SettingsError>>),

    /// Read-modify-write a single settings key.
    Patch(
        SettingsPatch,
        RpcReplyPort<Result<Option<SettingValue>, SettingsError>>,
    ),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn init_schema(&self) -> Result<(), SettingsError> {
        ractor::call!(self.actor, DbActorMessage::InitSchema).map_err(|e| {
            SettingsError::RactorError(format!("DbActor InitSchema RPC failed: {e}"))
        })?
    }

    pub async fn is_initialized(&self) -> Result<bool, SettingsError> {
        ractor::call!(self.actor, DbActorMessage::IsInitialized).map_err(|e| {
            SettingsError::RactorError(format!("DbActor IsInitialized RPC failed: {e}"))
        })?
    }

    pub async fn list_names(&self) -> Result<Vec<String>, SettingsError> {
        ractor::call!(self.actor, DbActorMessage::ListNames)
            .map_err(|e| SettingsError::RactorError(format!("DbActor ListNames RPC failed: {e}")))?
    }

    pub async fn list_managed_names(&self) -> Result<Vec<String>, SettingsError> {
        ractor::call!(self.actor, DbActorMessage::ListManagedNames).map_err(|e| {
            SettingsError::RactorError(format!("DbActor ListManagedNames RPC failed: {e}"))
        })?
    }

    pub async fn find(&self, name: &str) -> Result<Option<ModuleRecord>, SettingsError> {
        ractor::call!(self.actor, DbActorMessage::Find, name.to_string())
            .map_err(|e| SettingsError::RactorError(format!("DbActor Find RPC failed: {e}")))?
    }

    pub async fn create(&self, create: ModuleCreate) -> Result<ModuleRecord, SettingsError> {
        ractor::call!(self.actor, DbActorMessage::Create, create)
            .map_err(|e| SettingsError::RactorError(format!("DbActor Create RPC failed: {e}")))?
    }

    pub async fn destroy(&self, name: &str) -> Result<bool, SettingsError> {
        ractor::call!(self.actor, DbActorMessage::Destroy, name.to_string())
            .map_err(|e| SettingsError::RactorError(format!("DbActor Destroy RPC failed: {e}")))?
    }

    pub async fn patch(&self, patch: SettingsPatch) -> Result<Option<SettingValue>, SettingsError> {
        ractor::call!(self.actor, DbActorMessage::Patch, patch)
            .map_err(|e| SettingsError::RactorError(format!("DbActor Patch RPC failed: {e}")))?
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = DbOptions;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        options: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(options.database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        // An in-memory database lives as long as its connection, so pin one.
        let pool_opts = if options.is_in_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_opts
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        if options.init_schema {
            apply_schema(&pool)
                .await
                .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;
        }

        info!(init_schema = options.init_schema, "DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DbActorMessage::InitSchema(reply) => {
                let res = apply_schema(&state.pool).await;
                let _ = reply.send(res);
            }
            DbActorMessage::IsInitialized(reply) => {
                let res = self.is_initialized(&state.pool).await;
                let _ = reply.send(res);
            }
            DbActorMessage::ListNames(reply) => {
                let res = self.list_names(&state.pool, false).await;
                let _ = reply.send(res);
            }
            DbActorMessage::ListManagedNames(reply) => {
                let res = self.list_names(&state.pool, true).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Find(name, reply) => {
                let res = self.find(&state.pool, &name).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Create(create, reply) => {
                let res = self.create_module(&state.pool, create).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Destroy(name, reply) => {
                let res = self.destroy(&state.pool, &name).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Patch(patch, reply) => {
                let res = patch.apply_patch(&state.pool).await;
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

impl DbActor {
    async fn is_initialized(&self, pool: &SqlitePool) -> Result<bool, SettingsError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(MODULES_TABLE)
                .fetch_one(pool)
                .await?;
        Ok(count > 0)
    }

    async fn list_names(
        &self,
        pool: &SqlitePool,
        managed_only: bool,
    ) -> Result<Vec<String>, SettingsError> {
        let sql = if managed_only {
            "SELECT name FROM cms_modules WHERE cms_managed = 1 ORDER BY id"
        } else {
            "SELECT name FROM cms_modules ORDER BY id"
        };
        let names = sqlx::query_scalar::<_, String>(sql).fetch_all(pool).await?;
        Ok(names)
    }

    async fn find(
        &self,
        pool: &SqlitePool,
        name: &str,
    ) -> Result<Option<ModuleRecord>, SettingsError> {
        let row = sqlx::query_as::<_, DbCmsModule>(
            r#"
        SELECT id, name, cms_managed, settings, created_at, updated_at
        FROM cms_modules
        WHERE name = ?
        "#,
        )
        .bind(name)
        .fetch_optional(pool)
        .await?;

        row.map(ModuleRecord::try_from).transpose()
    }

    async fn create_module(
        &self,
        pool: &SqlitePool,
        create: ModuleCreate,
    ) -> Result<ModuleRecord, SettingsError> {
        let now = Utc::now();
        let res = sqlx::query_as::<_, DbCmsModule>(
            r#"
        INSERT INTO cms_modules (name, cms_managed, settings, created_at, updated_at)
        VALUES (?, ?, '{}', ?, ?)
        RETURNING id, name, cms_managed, settings, created_at, updated_at
        "#,
        )
        .bind(&create.name)
        .bind(create.managed)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await;

        let row = match res {
            Ok(row) => row,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(SettingsError::ModuleAlreadyRegistered(create.name));
            }
            Err(e) => return Err(e.into()),
        };

        debug!(module = %row.name, id = row.id, managed = row.cms_managed, "db module created");
        ModuleRecord::try_from(row)
    }

    async fn destroy(&self, pool: &SqlitePool, name: &str) -> Result<bool, SettingsError> {
        let res = sqlx::query("DELETE FROM cms_modules WHERE name = ?")
            .bind(name)
            .execute(pool)
            .await?;
        let affected = res.rows_affected();
        debug!(module = name, affected, "db module destroyed");
        Ok(affected > 0)
    }
}

/// Spawn the database actor and return a cloneable handle.
///
/// The actor is unnamed, so several stores can live in one process.
pub async fn spawn_with(options: DbOptions) -> Result<DbActorHandle, SettingsError> {
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, options)
        .await
        .map_err(|e| SettingsError::RactorError(format!("failed to spawn DbActor: {e}")))?;

    Ok(DbActorHandle { actor })
}

/// Spawn the database actor with the schema applied.
pub async fn spawn(database_url: &str) -> Result<DbActorHandle, SettingsError> {
    spawn_with(DbOptions::new(database_url)).await
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), SettingsError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
