use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum SettingsError {
    /// Name does not follow the `bcms_[a-z0-9_]+` convention. Raised before
    /// anything is written.
    #[error("{0} is not a valid BrowserCMS module name. No modules were registered or deleted.")]
    InvalidModuleName(String),

    #[error("The module {0} is already registered.")]
    ModuleAlreadyRegistered(String),

    #[error("The module '{0}' is not registered. Register it first.")]
    ModuleNotRegistered(String),

    #[error("Unsupported settings operation `{method}` with {arity} argument(s)")]
    UnsupportedOperation { method: String, arity: usize },

    #[error("Unknown operation `{0}`")]
    UnknownOperation(String),

    #[error("Invalid settings key: {0:?}")]
    InvalidSettingKey(String),

    #[error("Invalid value for settings key {key:?}: {reason}")]
    InvalidSettingValue { key: String, reason: String },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] Box<figment::Error>),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl SettingsError {
    /// Stable machine-readable code for logs and callers that match on strings.
    pub fn code(&self) -> &'static str {
        match self {
            SettingsError::InvalidModuleName(_) => "INVALID_MODULE_NAME",
            SettingsError::ModuleAlreadyRegistered(_) => "MODULE_ALREADY_REGISTERED",
            SettingsError::ModuleNotRegistered(_) => "MODULE_NOT_REGISTERED",
            SettingsError::UnsupportedOperation { .. } => "UNSUPPORTED_OPERATION",
            SettingsError::UnknownOperation(_) => "UNKNOWN_OPERATION",
            SettingsError::InvalidSettingKey(_) => "INVALID_SETTING_KEY",
            SettingsError::InvalidSettingValue { .. } => "INVALID_SETTING_VALUE",
            SettingsError::JsonError(_) => "BAD_SETTINGS_PAYLOAD",
            SettingsError::IoError(_)
            | SettingsError::ConfigError(_)
            | SettingsError::RactorError(_)
            | SettingsError::DatabaseError(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<figment::Error> for SettingsError {
    fn from(err: figment::Error) -> Self {
        SettingsError::ConfigError(Box::new(err))
    }
}
