//! App descriptor schema.
//!
//! Defines the metadata record for one installable app, as stored in the
//! registry and as read from descriptor JSON files.

use crate::config::WindowConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad grouping used by the launcher and the stats view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppCategory {
    System,
    Productivity,
    Utilities,
    Development,
    Media,
    Games,
    Communication,
    Other,
}

impl AppCategory {
    pub const ALL: [AppCategory; 8] = [
        AppCategory::System,
        AppCategory::Productivity,
        AppCategory::Utilities,
        AppCategory::Development,
        AppCategory::Media,
        AppCategory::Games,
        AppCategory::Communication,
        AppCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppCategory::System => "system",
            AppCategory::Productivity => "productivity",
            AppCategory::Utilities => "utilities",
            AppCategory::Development => "development",
            AppCategory::Media => "media",
            AppCategory::Games => "games",
            AppCategory::Communication => "communication",
            AppCategory::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for AppCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Action an app may perform on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionAction {
    Read,
    Write,
    Execute,
}

/// A resource/action grant requested by an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Resource name (e.g., "filesystem", "notifications").
    pub resource: String,
    pub action: PermissionAction,
}

impl Permission {
    pub fn new(resource: impl Into<String>, action: PermissionAction) -> Self {
        Self {
            resource: resource.into(),
            action,
        }
    }
}

/// Window dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_positive(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// True when both dimensions are at least those of `other`.
    pub fn covers(&self, other: &WindowSize) -> bool {
        self.width >= other.width && self.height >= other.height
    }

    pub fn default_window() -> Self {
        Self::new(WindowConfig::DEFAULT_WIDTH, WindowConfig::DEFAULT_HEIGHT)
    }

    pub fn default_min() -> Self {
        Self::new(WindowConfig::MIN_WIDTH, WindowConfig::MIN_HEIGHT)
    }
}

/// Complete app descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDescriptor {
    /// Unique app identifier (e.g., "terminal", "file-explorer").
    #[serde(default)]
    pub id: String,
    /// Display name for window titles and the launcher.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Semantic version, `major.minor.patch` with optional suffix.
    #[serde(default)]
    pub version: String,
    /// Icon reference (lucide icon identifier or asset path).
    #[serde(default)]
    pub icon: String,
    pub category: AppCategory,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    /// Whether several windows of this app may be open at once.
    #[serde(default)]
    pub multi_instance: bool,
    #[serde(default = "WindowSize::default_window")]
    pub default_size: WindowSize,
    #[serde(default = "WindowSize::default_min")]
    pub min_size: WindowSize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<WindowSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    /// Help page reference shown from the window menu.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_url: Option<String>,
}

impl AppDescriptor {
    /// Create a descriptor with the builder defaults for everything but
    /// identity and category.
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: AppCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            version: WindowConfig::DEFAULT_VERSION.to_string(),
            icon: WindowConfig::DEFAULT_ICON.to_string(),
            category,
            permissions: Vec::new(),
            multi_instance: false,
            default_size: WindowSize::default_window(),
            min_size: WindowSize::default_min(),
            max_size: None,
            author: None,
            keywords: None,
            help_url: None,
        }
    }

    /// Case-insensitive substring match over name, description and keywords.
    ///
    /// `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        if self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
        {
            return true;
        }

        self.keywords
            .as_ref()
            .map(|keywords| keywords.iter().any(|k| k.to_lowercase().contains(needle)))
            .unwrap_or(false)
    }

    /// Apply a patch in place. The id is never touched.
    pub fn apply(&mut self, patch: DescriptorPatch) {
        let DescriptorPatch {
            name,
            description,
            version,
            icon,
            category,
            permissions,
            multi_instance,
            default_size,
            min_size,
            max_size,
            author,
            keywords,
            help_url,
        } = patch;

        if let Some(v) = name {
            self.name = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = version {
            self.version = v;
        }
        if let Some(v) = icon {
            self.icon = v;
        }
        if let Some(v) = category {
            self.category = v;
        }
        if let Some(v) = permissions {
            self.permissions = v;
        }
        if let Some(v) = multi_instance {
            self.multi_instance = v;
        }
        if let Some(v) = default_size {
            self.default_size = v;
        }
        if let Some(v) = min_size {
            self.min_size = v;
        }
        if max_size.is_some() {
            self.max_size = max_size;
        }
        if author.is_some() {
            self.author = author;
        }
        if keywords.is_some() {
            self.keywords = keywords;
        }
        if help_url.is_some() {
            self.help_url = help_url;
        }
    }
}

/// Partial descriptor fields, merged over an existing descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DescriptorPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub icon: Option<String>,
    pub category: Option<AppCategory>,
    pub permissions: Option<Vec<Permission>>,
    pub multi_instance: Option<bool>,
    pub default_size: Option<WindowSize>,
    pub min_size: Option<WindowSize>,
    pub max_size: Option<WindowSize>,
    pub author: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub help_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_descriptor() {
        let json = r#"{
            "id": "app1",
            "name": "Counter",
            "version": "1.0.0",
            "category": "utilities",
            "defaultSize": {"width": 600, "height": 500},
            "minSize": {"width": 400, "height": 300},
            "permissions": [{"resource": "storage", "action": "write"}],
            "multiInstance": true,
            "keywords": ["count", "tally"]
        }"#;

        let desc: AppDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(desc.id, "app1");
        assert_eq!(desc.category, AppCategory::Utilities);
        assert_eq!(desc.default_size, WindowSize::new(600, 500));
        assert_eq!(desc.permissions[0].action, PermissionAction::Write);
        assert!(desc.multi_instance);
        assert!(desc.max_size.is_none());
        assert_eq!(desc.description, "");
    }

    #[test]
    fn test_missing_identity_defaults_to_empty() {
        let desc: AppDescriptor = serde_json::from_str(r#"{"category": "games"}"#).unwrap();
        assert!(desc.id.is_empty());
        assert!(desc.version.is_empty());
        assert_eq!(desc.default_size, WindowSize::default_window());
    }

    #[test]
    fn test_unknown_category_rejected() {
        let result: Result<AppDescriptor, _> =
            serde_json::from_str(r#"{"id": "x", "category": "spreadsheets"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(AppCategory::from_str("Media"), Some(AppCategory::Media));
        assert_eq!(AppCategory::from_str("nope"), None);
    }

    #[test]
    fn test_apply_patch_keeps_id() {
        let mut desc = AppDescriptor::new("notes", "Notes", AppCategory::Productivity);
        desc.apply(DescriptorPatch {
            name: Some("Sticky Notes".into()),
            max_size: Some(WindowSize::new(1200, 900)),
            ..Default::default()
        });

        assert_eq!(desc.id, "notes");
        assert_eq!(desc.name, "Sticky Notes");
        assert_eq!(desc.max_size, Some(WindowSize::new(1200, 900)));
        assert_eq!(desc.version, "1.0.0");
    }

    #[test]
    fn test_matches_skips_absent_keywords() {
        let mut desc = AppDescriptor::new("calc", "Calculator", AppCategory::Utilities);
        assert!(desc.matches_lowercase("calc"));
        assert!(!desc.matches_lowercase("math"));

        desc.keywords = Some(vec!["Math".into()]);
        assert!(desc.matches_lowercase("math"));
    }
}
