//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `patch.rs`: create/patch payloads, applied by the actor

pub mod actor;
pub mod models;
pub mod patch;
pub mod schema;

mod patch_impl;

pub use models::{DbCmsModule, ModuleRecord};
pub use patch::{DbPatchable, ModuleCreate, SettingsPatch};
pub use schema::SQLITE_INIT;

pub use actor::{DbActorHandle, DbOptions, spawn, spawn_with};
