//! Built-in apps shipped with the shell.
//!
//! Each variant maps to a descriptor-producing function at compile time, so
//! discovery never builds paths or imports modules by name.

use super::descriptor::{AppCategory, AppDescriptor, Permission, PermissionAction, WindowSize};
use super::loader::DescriptorSource;
use crate::error::{DeskError, Result};
use async_trait::async_trait;
use std::fmt;

/// Apps bundled with the desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinApp {
    Settings,
    FileExplorer,
    Terminal,
    TextEditor,
    Calculator,
    ImageViewer,
}

impl BuiltinApp {
    pub const ALL: [BuiltinApp; 6] = [
        BuiltinApp::Settings,
        BuiltinApp::FileExplorer,
        BuiltinApp::Terminal,
        BuiltinApp::TextEditor,
        BuiltinApp::Calculator,
        BuiltinApp::ImageViewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltinApp::Settings => "settings",
            BuiltinApp::FileExplorer => "file-explorer",
            BuiltinApp::Terminal => "terminal",
            BuiltinApp::TextEditor => "text-editor",
            BuiltinApp::Calculator => "calculator",
            BuiltinApp::ImageViewer => "image-viewer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|app| app.as_str() == s)
    }

    pub fn descriptor(&self) -> AppDescriptor {
        match self {
            BuiltinApp::Settings => settings(),
            BuiltinApp::FileExplorer => file_explorer(),
            BuiltinApp::Terminal => terminal(),
            BuiltinApp::TextEditor => text_editor(),
            BuiltinApp::Calculator => calculator(),
            BuiltinApp::ImageViewer => image_viewer(),
        }
    }
}

impl fmt::Display for BuiltinApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn keywords(words: &[&str]) -> Option<Vec<String>> {
    Some(words.iter().map(|w| w.to_string()).collect())
}

fn settings() -> AppDescriptor {
    AppDescriptor {
        description: "Appearance, account and desktop preferences".into(),
        icon: "settings".into(),
        permissions: vec![
            Permission::new("preferences", PermissionAction::Read),
            Permission::new("preferences", PermissionAction::Write),
        ],
        default_size: WindowSize::new(720, 540),
        min_size: WindowSize::new(480, 360),
        keywords: keywords(&["preferences", "theme", "wallpaper", "account"]),
        help_url: Some("/help/settings".into()),
        ..AppDescriptor::new("settings", "Settings", AppCategory::System)
    }
}

fn file_explorer() -> AppDescriptor {
    AppDescriptor {
        description: "Browse and organize files in your workspace".into(),
        icon: "folder".into(),
        permissions: vec![
            Permission::new("filesystem", PermissionAction::Read),
            Permission::new("filesystem", PermissionAction::Write),
        ],
        multi_instance: true,
        default_size: WindowSize::new(900, 600),
        min_size: WindowSize::new(480, 320),
        keywords: keywords(&["files", "folders", "documents"]),
        help_url: Some("/help/file-explorer".into()),
        ..AppDescriptor::new("file-explorer", "File Explorer", AppCategory::System)
    }
}

fn terminal() -> AppDescriptor {
    AppDescriptor {
        description: "Command line shell".into(),
        icon: "terminal".into(),
        permissions: vec![Permission::new("shell", PermissionAction::Execute)],
        multi_instance: true,
        default_size: WindowSize::new(800, 480),
        min_size: WindowSize::new(400, 240),
        keywords: keywords(&["console", "shell", "command"]),
        ..AppDescriptor::new("terminal", "Terminal", AppCategory::Development)
    }
}

fn text_editor() -> AppDescriptor {
    AppDescriptor {
        description: "Edit plain text and markdown documents".into(),
        icon: "file-text".into(),
        permissions: vec![
            Permission::new("filesystem", PermissionAction::Read),
            Permission::new("filesystem", PermissionAction::Write),
        ],
        multi_instance: true,
        keywords: keywords(&["notes", "markdown", "writing"]),
        ..AppDescriptor::new("text-editor", "Text Editor", AppCategory::Productivity)
    }
}

fn calculator() -> AppDescriptor {
    AppDescriptor {
        description: "Basic and scientific calculator".into(),
        icon: "calculator".into(),
        default_size: WindowSize::new(320, 480),
        min_size: WindowSize::new(280, 400),
        max_size: Some(WindowSize::new(640, 800)),
        keywords: keywords(&["math", "arithmetic"]),
        ..AppDescriptor::new("calculator", "Calculator", AppCategory::Utilities)
    }
}

fn image_viewer() -> AppDescriptor {
    AppDescriptor {
        description: "View images and slideshows".into(),
        icon: "image".into(),
        permissions: vec![Permission::new("filesystem", PermissionAction::Read)],
        multi_instance: true,
        default_size: WindowSize::new(960, 720),
        min_size: WindowSize::new(320, 240),
        ..AppDescriptor::new("image-viewer", "Image Viewer", AppCategory::Media)
    }
}

/// [`DescriptorSource`] over every [`BuiltinApp`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

#[async_trait]
impl DescriptorSource for BuiltinCatalog {
    fn name(&self) -> &str {
        "builtin"
    }

    async fn app_ids(&self) -> Result<Vec<String>> {
        Ok(BuiltinApp::ALL
            .iter()
            .map(|app| app.as_str().to_string())
            .collect())
    }

    async fn load(&self, id: &str) -> Result<AppDescriptor> {
        BuiltinApp::from_str(id)
            .map(|app| app.descriptor())
            .ok_or_else(|| DeskError::DescriptorLoad {
                id: id.to_string(),
                message: "not a built-in app".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::validator::validate;

    #[test]
    fn test_builtin_descriptors_are_valid() {
        for app in BuiltinApp::ALL {
            let desc = app.descriptor();
            assert_eq!(desc.id, app.as_str());
            let report = validate(&desc);
            assert!(report.valid, "{}: {:?}", app, report.errors);
        }
    }

    #[test]
    fn test_from_str_roundtrip() {
        for app in BuiltinApp::ALL {
            assert_eq!(BuiltinApp::from_str(app.as_str()), Some(app));
        }
        assert_eq!(BuiltinApp::from_str("minesweeper"), None);
    }

    #[tokio::test]
    async fn test_catalog_source() {
        let catalog = BuiltinCatalog;
        let ids = catalog.app_ids().await.unwrap();
        assert_eq!(ids.len(), BuiltinApp::ALL.len());
        assert_eq!(catalog.load("terminal").await.unwrap().name, "Terminal");
        assert!(catalog.load("minesweeper").await.is_err());
    }
}
