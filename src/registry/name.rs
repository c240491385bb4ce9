use regex::Regex;
use std::sync::LazyLock;

use crate::error::SettingsError;

/// Lowercase, `bcms_` prefix, then letters, digits and underscores only.
pub static MODULE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^bcms_[a-z0-9_]+$").expect("module name pattern is valid"));

pub fn is_valid_module_name(name: &str) -> bool {
    MODULE_NAME_RE.is_match(name)
}

pub fn validate_module_name(name: &str) -> Result<(), SettingsError> {
    if is_valid_module_name(name) {
        Ok(())
    } else {
        Err(SettingsError::InvalidModuleName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bcms_names() {
        for name in ["bcms_blog", "bcms_s3", "bcms_seo_sitemap", "bcms_2fa", "bcms__x"] {
            assert!(is_valid_module_name(name), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_everything_else() {
        for name in [
            "",
            "bcms_",
            "bcms s3",
            "BCMS_S3",
            "s3",
            "bcms-s3",
            "invalid name",
            "bcms_blog!",
            "bcms_blog\nbcms_x",
            " bcms_blog",
        ] {
            assert!(!is_valid_module_name(name), "{name:?} should be invalid");
        }
    }

    #[test]
    fn validation_error_carries_the_name() {
        match validate_module_name("wibble") {
            Err(SettingsError::InvalidModuleName(name)) => assert_eq!(name, "wibble"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
