//! Translation from registry descriptors to window-manager metadata.

use super::descriptor::{AppCategory, AppDescriptor, WindowSize};
use serde::{Deserialize, Serialize};

/// The shape the window manager consumes when opening an app window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowMetadata {
    pub title: String,
    /// App id the window belongs to.
    pub app_name: String,
    pub icon: String,
    pub default_size: WindowSize,
    pub min_size: WindowSize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<WindowSize>,
    pub allow_multiple: bool,
    pub category: AppCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_url: Option<String>,
}

impl From<&AppDescriptor> for WindowMetadata {
    fn from(descriptor: &AppDescriptor) -> Self {
        Self {
            title: descriptor.name.clone(),
            app_name: descriptor.id.clone(),
            icon: descriptor.icon.clone(),
            default_size: descriptor.default_size,
            min_size: descriptor.min_size,
            max_size: descriptor.max_size,
            allow_multiple: descriptor.multi_instance,
            category: descriptor.category,
            help_url: descriptor.help_url.clone(),
        }
    }
}

/// Map a descriptor to window metadata. Assumes the descriptor is valid.
pub fn window_metadata(descriptor: &AppDescriptor) -> WindowMetadata {
    WindowMetadata::from(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::catalog::BuiltinApp;

    #[test]
    fn test_maps_fields() {
        let desc = BuiltinApp::Calculator.descriptor();
        let meta = window_metadata(&desc);

        assert_eq!(meta.title, "Calculator");
        assert_eq!(meta.app_name, "calculator");
        assert_eq!(meta.icon, "calculator");
        assert_eq!(meta.min_size, desc.min_size);
        assert_eq!(meta.max_size, Some(WindowSize::new(640, 800)));
        assert!(!meta.allow_multiple);
        assert_eq!(meta.category, AppCategory::Utilities);
    }

    #[test]
    fn test_serialized_shape() {
        let meta = window_metadata(&BuiltinApp::Terminal.descriptor());
        let json = serde_json::to_value(&meta).unwrap();

        assert_eq!(json["allowMultiple"], true);
        assert_eq!(json["appName"], "terminal");
        assert_eq!(json["defaultSize"]["width"], 800);
        assert!(json.get("maxSize").is_none());
        assert!(json.get("helpUrl").is_none());
    }
}
