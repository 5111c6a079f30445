//! Descriptor validation.
//!
//! Checks run in a fixed order and every violation is collected, so callers
//! can show the whole list at once.

use super::descriptor::{AppDescriptor, WindowSize};
use crate::config::RegistryConfig;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Lowercase letters, digits, dashes and underscores.
static APP_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9_-]+$").unwrap());

/// `major.minor.patch` prefix; anything may follow.
static VERSION_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+").unwrap());

/// Outcome of validating a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Check whether `id` is an acceptable app identifier.
pub fn is_valid_app_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= RegistryConfig::MAX_ID_LENGTH && APP_ID.is_match(id)
}

/// Validate a candidate descriptor.
pub fn validate(descriptor: &AppDescriptor) -> ValidationReport {
    let mut errors = Vec::new();

    // Required fields. Category is enforced by the type.
    let id = descriptor.id.trim();
    let name = descriptor.name.trim();
    let version = descriptor.version.trim();
    if id.is_empty() {
        errors.push("id is required".to_string());
    }
    if name.is_empty() {
        errors.push("name is required".to_string());
    }
    if version.is_empty() {
        errors.push("version is required".to_string());
    }

    if !id.is_empty() {
        if !APP_ID.is_match(&descriptor.id) {
            errors.push(
                "id must contain only lowercase letters, digits, dashes and underscores"
                    .to_string(),
            );
        }
        if descriptor.id.len() > RegistryConfig::MAX_ID_LENGTH {
            errors.push(format!(
                "id must be at most {} characters",
                RegistryConfig::MAX_ID_LENGTH
            ));
        }
    }

    if descriptor.name.chars().count() > RegistryConfig::MAX_NAME_LENGTH {
        errors.push(format!(
            "name must be at most {} characters",
            RegistryConfig::MAX_NAME_LENGTH
        ));
    }

    if !version.is_empty() && !VERSION_PREFIX.is_match(&descriptor.version) {
        errors.push(format!(
            "version '{}' must follow the major.minor.patch format",
            descriptor.version
        ));
    }

    check_positive(&mut errors, "defaultSize", &descriptor.default_size);
    check_positive(&mut errors, "minSize", &descriptor.min_size);
    if let Some(max) = &descriptor.max_size {
        check_positive(&mut errors, "maxSize", max);
        if !max.covers(&descriptor.min_size) {
            errors.push(format!(
                "maxSize ({}x{}) must be at least minSize ({}x{})",
                max.width, max.height, descriptor.min_size.width, descriptor.min_size.height
            ));
        }
    }

    ValidationReport::from_errors(errors)
}

fn check_positive(errors: &mut Vec<String>, field: &str, size: &WindowSize) {
    if !size.is_positive() {
        errors.push(format!(
            "{} width and height must be positive (got {}x{})",
            field, size.width, size.height
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::descriptor::AppCategory;

    fn counter() -> AppDescriptor {
        let mut d = AppDescriptor::new("app1", "Counter", AppCategory::Utilities);
        d.default_size = WindowSize::new(600, 500);
        d.min_size = WindowSize::new(400, 300);
        d
    }

    #[test]
    fn test_valid_descriptor_passes() {
        let report = validate(&counter());
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_missing_required_fields() {
        let mut d = counter();
        d.id.clear();
        d.name = "   ".into();
        d.version.clear();

        let report = validate(&d);
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec!["id is required", "name is required", "version is required"]
        );
    }

    #[test]
    fn test_id_pattern_and_length() {
        let mut d = counter();
        d.id = "My App".into();
        assert!(validate(&d).errors[0].contains("lowercase"));

        d.id = "a".repeat(51);
        let report = validate(&d);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("at most 50"));

        d.id = "a".repeat(50);
        assert!(validate(&d).valid);

        d.id = "file_explorer-2".into();
        assert!(validate(&d).valid);
    }

    #[test]
    fn test_name_length() {
        let mut d = counter();
        d.name = "n".repeat(101);
        assert!(validate(&d).errors[0].contains("name must be at most 100"));
    }

    #[test]
    fn test_version_prefix() {
        let mut d = counter();
        for ok in ["1.0.0", "10.20.30", "2.0.0-beta.1", "1.2.3.4"] {
            d.version = ok.into();
            assert!(validate(&d).valid, "{ok} should pass");
        }
        for bad in ["1.0", "v1.0.0", "one.two.three", "1..0"] {
            d.version = bad.into();
            let report = validate(&d);
            assert!(!report.valid, "{bad} should fail");
            assert!(report.errors[0].contains("major.minor.patch"));
        }
    }

    #[test]
    fn test_non_positive_sizes() {
        let mut d = counter();
        d.default_size = WindowSize::new(0, 500);
        let report = validate(&d);
        assert!(!report.valid);
        assert!(report.errors[0].starts_with("defaultSize"));

        let mut d = counter();
        d.min_size = WindowSize::new(400, 0);
        let report = validate(&d);
        assert!(report.errors.iter().any(|e| e.starts_with("minSize")));
    }

    #[test]
    fn test_max_smaller_than_min() {
        let mut d = counter();
        d.max_size = Some(WindowSize::new(300, 1000));
        let report = validate(&d);
        assert!(!report.valid);
        assert!(report.errors[0].contains("must be at least minSize"));

        d.max_size = Some(WindowSize::new(400, 300));
        assert!(validate(&d).valid);
    }

    #[test]
    fn test_zero_max_reports_both_checks() {
        let mut d = counter();
        d.max_size = Some(WindowSize::new(0, 0));
        let report = validate(&d);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].starts_with("maxSize width"));
    }

    #[test]
    fn test_is_valid_app_id() {
        assert!(is_valid_app_id("terminal"));
        assert!(!is_valid_app_id(""));
        assert!(!is_valid_app_id("Terminal"));
        assert!(!is_valid_app_id("term/inal"));
    }
}
