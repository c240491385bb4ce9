mod settings;

pub use settings::SettingsError;
