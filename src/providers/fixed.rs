use super::{InstalledModules, dedup_preserving_order};
use crate::error::SettingsError;

/// A list of installed modules known up front.
#[derive(Debug, Clone, Default)]
pub struct FixedModules {
    names: Vec<String>,
}

impl FixedModules {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names: dedup_preserving_order(names),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for FixedModules {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

impl InstalledModules for FixedModules {
    fn installed_modules(&self) -> Result<Vec<String>, SettingsError> {
        Ok(self.names.clone())
    }
}
