pub mod config;
pub mod db;
pub mod error;
pub mod providers;
pub mod registry;
pub mod settings;
pub mod utils;

pub use db::{DbActorHandle, ModuleRecord};
pub use error::SettingsError;
pub use registry::{Accessor, Registry, SyncReport};
pub use settings::{SettingValue, Settings};
