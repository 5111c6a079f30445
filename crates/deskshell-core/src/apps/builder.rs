//! App creation, cloning and update.
//!
//! Every operation here reports failure through its return value: a
//! [`BuildResult`] with `success: false` and the reasons, or `false` for
//! updates. Callers branch on the flag instead of matching errors.

use super::descriptor::{AppCategory, AppDescriptor, DescriptorPatch};
use super::registry::{AppRegistry, RegisterOptions};
use super::validator::{is_valid_app_id, validate};
use crate::config::{RegistryConfig, WindowConfig};
use crate::error::{DeskError, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

/// A generated file, path relative to the scaffold root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaffoldFile {
    pub path: String,
    pub contents: String,
}

/// File contents and directory names for a new app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scaffold {
    /// The app's own directory (e.g., `apps/notes`).
    pub directory: String,
    /// Every directory to create, parents first.
    pub directories: Vec<String>,
    pub files: Vec<ScaffoldFile>,
}

impl Scaffold {
    /// Materialize the scaffold under `root`.
    ///
    /// Existing files are never overwritten. Every target is checked before
    /// anything is written, and if a write still fails the files written so
    /// far are removed. Returns the paths of the files written.
    pub fn write_to(&self, root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let root = root.as_ref();

        let targets: Vec<PathBuf> = self.files.iter().map(|f| root.join(&f.path)).collect();
        for path in &targets {
            if path
                .try_exists()
                .map_err(|e| DeskError::io_with_path(e, path))?
            {
                return Err(DeskError::Io {
                    message: "Scaffold file already exists".to_string(),
                    path: Some(path.clone()),
                    source: None,
                });
            }
        }

        for dir in &self.directories {
            let path = root.join(dir);
            std::fs::create_dir_all(&path).map_err(|e| DeskError::Io {
                message: format!("Failed to create scaffold directory: {}", e),
                path: Some(path.clone()),
                source: Some(e),
            })?;
        }

        let mut written: Vec<PathBuf> = Vec::with_capacity(targets.len());
        for (file, path) in self.files.iter().zip(targets) {
            if let Err(e) = write_new(&path, &file.contents) {
                for done in &written {
                    if let Err(cleanup) = std::fs::remove_file(done) {
                        warn!("Could not remove {}: {}", done.display(), cleanup);
                    }
                }
                return Err(e);
            }
            written.push(path);
        }

        info!("Wrote scaffold {} ({} files)", self.directory, written.len());
        Ok(written)
    }
}

fn write_new(path: &Path, contents: &str) -> Result<()> {
    let mut handle = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| DeskError::io_with_path(e, path))?;
    handle
        .write_all(contents.as_bytes())
        .map_err(|e| DeskError::io_with_path(e, path))
}

/// Knobs for the generated layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScaffoldLayout {
    /// Extra subdirectories inside the app directory (e.g., "components").
    pub extra_dirs: Vec<String>,
    pub include_readme: bool,
}

impl Default for ScaffoldLayout {
    fn default() -> Self {
        Self {
            extra_dirs: Vec::new(),
            include_readme: true,
        }
    }
}

/// Produces scaffold contents for a descriptor.
pub trait ScaffoldGenerator: Send + Sync {
    fn generate(&self, descriptor: &AppDescriptor, layout: &ScaffoldLayout) -> Result<Scaffold>;
}

/// Emits `apps/<id>/app.json`, an optional README and the requested dirs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultScaffold;

impl ScaffoldGenerator for DefaultScaffold {
    fn generate(&self, descriptor: &AppDescriptor, layout: &ScaffoldLayout) -> Result<Scaffold> {
        let directory = format!("{}/{}", WindowConfig::SCAFFOLD_ROOT, descriptor.id);

        let mut directories = vec![directory.clone()];
        for extra in &layout.extra_dirs {
            if !is_plain_relative(extra) {
                return Err(DeskError::InvalidParams {
                    message: format!("scaffold directory '{}' must be a relative path", extra),
                });
            }
            directories.push(format!("{}/{}", directory, extra.trim_matches('/')));
        }

        let mut files = vec![ScaffoldFile {
            path: format!("{}/app.{}", directory, RegistryConfig::DESCRIPTOR_EXTENSION),
            contents: serde_json::to_string_pretty(descriptor)?,
        }];

        if layout.include_readme {
            files.push(ScaffoldFile {
                path: format!("{}/README.md", directory),
                contents: format!(
                    "# {}\n\n{}\n\nVersion {} ({})\n",
                    descriptor.name, descriptor.description, descriptor.version, descriptor.category
                ),
            });
        }

        Ok(Scaffold {
            directory,
            directories,
            files,
        })
    }
}

fn is_plain_relative(dir: &str) -> bool {
    let path = Path::new(dir.trim_matches('/'));
    !dir.trim_matches('/').is_empty()
        && path.components().all(|c| matches!(c, Component::Normal(_)))
}

/// Input for [`AppBuilder::create`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateAppRequest {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Fields layered over the builder defaults.
    pub overrides: DescriptorPatch,
    /// Insert the descriptor into the registry.
    #[serde(default = "default_register")]
    pub register: bool,
    /// Replace an existing app with the same id.
    pub overwrite: bool,
    /// Generate file scaffolding with this layout.
    pub scaffold: Option<ScaffoldLayout>,
    /// Write the generated scaffold under the builder's scaffold root.
    pub write_scaffold: bool,
}

fn default_register() -> bool {
    true
}

impl CreateAppRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            register: true,
            ..Default::default()
        }
    }
}

/// Outcome of a create or clone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<AppDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaffold: Option<Scaffold>,
    /// Files written to disk, when the scaffold was written.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub written: Vec<PathBuf>,
    pub errors: Vec<String>,
}

impl BuildResult {
    fn failure(errors: Vec<String>) -> Self {
        Self {
            success: false,
            descriptor: None,
            scaffold: None,
            written: Vec::new(),
            errors,
        }
    }

    fn built(descriptor: AppDescriptor, scaffold: Option<Scaffold>) -> Self {
        Self {
            success: true,
            descriptor: Some(descriptor),
            scaffold,
            written: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Creates, clones and updates app descriptors against a registry.
pub struct AppBuilder {
    generator: Box<dyn ScaffoldGenerator>,
    scaffold_root: Option<PathBuf>,
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::with_generator(DefaultScaffold)
    }

    pub fn with_generator(generator: impl ScaffoldGenerator + 'static) -> Self {
        Self {
            generator: Box::new(generator),
            scaffold_root: None,
        }
    }

    /// Directory that `write_scaffold` requests write under. Without one,
    /// such requests fail.
    pub fn with_scaffold_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scaffold_root = Some(root.into());
        self
    }

    pub fn scaffold_root(&self) -> Option<&Path> {
        self.scaffold_root.as_deref()
    }

    /// Build a descriptor from defaults plus the request's overrides.
    pub fn create(&self, registry: &mut AppRegistry, request: CreateAppRequest) -> BuildResult {
        let CreateAppRequest {
            id,
            name,
            description,
            overrides,
            register,
            overwrite,
            scaffold,
            write_scaffold,
        } = request;

        if let Some(errors) = check_new_id(registry, &id, overwrite) {
            return BuildResult::failure(errors);
        }

        let mut descriptor = AppDescriptor::new(id, name, AppCategory::Utilities);
        if let Some(description) = description {
            descriptor.description = description;
        }
        descriptor.apply(overrides);

        let report = validate(&descriptor);
        if !report.valid {
            return BuildResult::failure(report.errors);
        }

        // Writing implies generating, with the default layout if none was given
        let layout = match (scaffold, write_scaffold) {
            (Some(layout), _) => Some(layout),
            (None, true) => Some(ScaffoldLayout::default()),
            (None, false) => None,
        };
        let scaffold = match layout {
            Some(layout) => match self.generator.generate(&descriptor, &layout) {
                Ok(s) => Some(s),
                Err(e) => return BuildResult::failure(vec![e.to_string()]),
            },
            None => None,
        };

        let mut written = Vec::new();
        if write_scaffold {
            let Some(root) = self.scaffold_root.as_deref() else {
                return BuildResult::failure(vec![
                    "Writing scaffolds is not enabled: no scaffold root configured".to_string(),
                ]);
            };
            if let Some(scaffold) = &scaffold {
                match scaffold.write_to(root) {
                    Ok(paths) => written = paths,
                    Err(e) => return BuildResult::failure(vec![e.to_string()]),
                }
            }
        }

        if register {
            if let Err(e) = registry.register(descriptor.clone(), RegisterOptions { overwrite }) {
                return BuildResult::failure(vec![e.to_string()]);
            }
            info!("Created app: {} ({})", descriptor.name, descriptor.id);
        }

        BuildResult {
            written,
            ..BuildResult::built(descriptor, scaffold)
        }
    }

    /// Copy an existing descriptor under a new id and register the copy.
    ///
    /// Without `new_name` the copy is named "<name> (Copy)".
    pub fn clone_app(
        &self,
        registry: &mut AppRegistry,
        source_id: &str,
        new_id: &str,
        new_name: Option<String>,
    ) -> BuildResult {
        let Some(source) = registry.get(source_id) else {
            return BuildResult::failure(vec![format!("App '{}' not found", source_id)]);
        };

        let mut descriptor = source.clone();
        if let Some(errors) = check_new_id(registry, new_id, false) {
            return BuildResult::failure(errors);
        }

        descriptor.id = new_id.to_string();
        descriptor.name = new_name.unwrap_or_else(|| format!("{} (Copy)", descriptor.name));

        if let Err(e) = registry.register(descriptor.clone(), RegisterOptions::default()) {
            return BuildResult::failure(match e {
                DeskError::InvalidDescriptor { errors, .. } => errors,
                other => vec![other.to_string()],
            });
        }

        info!("Cloned app {} as {}", source_id, new_id);
        BuildResult::built(descriptor, None)
    }

    /// Merge `patch` into an existing app. Returns whether it was applied.
    pub fn update_app(&self, registry: &mut AppRegistry, id: &str, patch: DescriptorPatch) -> bool {
        match registry.update(id, patch) {
            Ok(_) => true,
            Err(e) => {
                warn!("Update of app '{}' rejected: {}", id, e);
                false
            }
        }
    }
}

fn check_new_id(registry: &AppRegistry, id: &str, overwrite: bool) -> Option<Vec<String>> {
    let mut errors = Vec::new();
    if !is_valid_app_id(id) {
        errors.push(format!(
            "Invalid app id '{}': use up to {} lowercase letters, digits, dashes or underscores",
            id,
            RegistryConfig::MAX_ID_LENGTH
        ));
    } else if !overwrite && registry.contains(id) {
        errors.push(format!("App '{}' already exists", id));
    }

    if errors.is_empty() {
        None
    } else {
        Some(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::descriptor::WindowSize;
    use tempfile::TempDir;

    #[test]
    fn test_create_fills_defaults_and_registers() {
        let mut registry = AppRegistry::new();
        let builder = AppBuilder::new();

        let result = builder.create(&mut registry, CreateAppRequest::new("notes", "Notes"));
        assert!(result.success, "{:?}", result.errors);

        let desc = registry.get("notes").unwrap();
        assert_eq!(desc.version, "1.0.0");
        assert_eq!(desc.icon, "app-window");
        assert_eq!(desc.category, AppCategory::Utilities);
        assert_eq!(desc.default_size, WindowSize::new(800, 600));
        assert_eq!(desc.min_size, WindowSize::new(400, 300));
        assert_eq!(result.descriptor.as_ref(), Some(desc));
        assert!(result.scaffold.is_none());
    }

    #[test]
    fn test_create_applies_overrides() {
        let mut registry = AppRegistry::new();
        let request = CreateAppRequest {
            description: Some("Music player".into()),
            overrides: DescriptorPatch {
                category: Some(AppCategory::Media),
                multi_instance: Some(true),
                keywords: Some(vec!["audio".into()]),
                ..Default::default()
            },
            ..CreateAppRequest::new("player", "Player")
        };

        let result = AppBuilder::new().create(&mut registry, request);
        let desc = result.descriptor.unwrap();
        assert_eq!(desc.description, "Music player");
        assert_eq!(desc.category, AppCategory::Media);
        assert!(desc.multi_instance);
    }

    #[test]
    fn test_create_rejects_bad_id_and_collision() {
        let mut registry = AppRegistry::new();
        let builder = AppBuilder::new();

        let result = builder.create(&mut registry, CreateAppRequest::new("Bad Id", "Bad"));
        assert!(!result.success);
        assert!(result.errors[0].contains("Invalid app id"));

        assert!(builder.create(&mut registry, CreateAppRequest::new("notes", "Notes")).success);
        let result = builder.create(&mut registry, CreateAppRequest::new("notes", "Other"));
        assert!(!result.success);
        assert_eq!(result.errors, vec!["App 'notes' already exists"]);
        assert_eq!(registry.get("notes").unwrap().name, "Notes");

        let request = CreateAppRequest {
            overwrite: true,
            ..CreateAppRequest::new("notes", "Other")
        };
        assert!(builder.create(&mut registry, request).success);
        assert_eq!(registry.get("notes").unwrap().name, "Other");
    }

    #[test]
    fn test_create_invalid_override_writes_nothing() {
        let mut registry = AppRegistry::new();
        let request = CreateAppRequest {
            overrides: DescriptorPatch {
                max_size: Some(WindowSize::new(100, 100)),
                ..Default::default()
            },
            ..CreateAppRequest::new("tiny", "Tiny")
        };

        let result = AppBuilder::new().create(&mut registry, request);
        assert!(!result.success);
        assert!(result.errors[0].contains("maxSize"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_create_without_register() {
        let mut registry = AppRegistry::new();
        let request = CreateAppRequest {
            register: false,
            ..CreateAppRequest::new("draft", "Draft")
        };

        let result = AppBuilder::new().create(&mut registry, request);
        assert!(result.success);
        assert!(!registry.contains("draft"));
    }

    #[test]
    fn test_scaffold_contents() {
        let mut registry = AppRegistry::new();
        let request = CreateAppRequest {
            scaffold: Some(ScaffoldLayout {
                extra_dirs: vec!["components".into()],
                include_readme: true,
            }),
            ..CreateAppRequest::new("notes", "Notes")
        };

        let scaffold = AppBuilder::new()
            .create(&mut registry, request)
            .scaffold
            .unwrap();
        assert_eq!(scaffold.directory, "apps/notes");
        assert_eq!(scaffold.directories, vec!["apps/notes", "apps/notes/components"]);
        assert_eq!(scaffold.files[0].path, "apps/notes/app.json");

        let parsed: AppDescriptor = serde_json::from_str(&scaffold.files[0].contents).unwrap();
        assert_eq!(&parsed, registry.get("notes").unwrap());
        assert!(scaffold.files[1].contents.starts_with("# Notes"));
    }

    #[test]
    fn test_scaffold_rejects_escaping_dirs() {
        let mut registry = AppRegistry::new();
        let request = CreateAppRequest {
            scaffold: Some(ScaffoldLayout {
                extra_dirs: vec!["../outside".into()],
                include_readme: false,
            }),
            ..CreateAppRequest::new("notes", "Notes")
        };

        let result = AppBuilder::new().create(&mut registry, request);
        assert!(!result.success);
        assert!(!registry.contains("notes"));
    }

    #[test]
    fn test_scaffold_write_to_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let desc = AppDescriptor::new("notes", "Notes", AppCategory::Productivity);
        let scaffold = DefaultScaffold
            .generate(&desc, &ScaffoldLayout::default())
            .unwrap();

        let written = scaffold.write_to(temp_dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(temp_dir.path().join("apps/notes/app.json").exists());

        assert!(scaffold.write_to(temp_dir.path()).is_err());
    }

    #[test]
    fn test_scaffold_write_to_collision_leaves_nothing_behind() {
        let temp_dir = TempDir::new().unwrap();
        let desc = AppDescriptor::new("notes", "Notes", AppCategory::Productivity);
        let scaffold = DefaultScaffold
            .generate(&desc, &ScaffoldLayout::default())
            .unwrap();

        let readme = temp_dir.path().join("apps/notes/README.md");
        std::fs::create_dir_all(readme.parent().unwrap()).unwrap();
        std::fs::write(&readme, "mine").unwrap();

        assert!(scaffold.write_to(temp_dir.path()).is_err());
        assert!(!temp_dir.path().join("apps/notes/app.json").exists());
        assert_eq!(std::fs::read_to_string(&readme).unwrap(), "mine");
    }

    #[test]
    fn test_create_writes_scaffold_under_root() {
        let temp_dir = TempDir::new().unwrap();
        let builder = AppBuilder::new().with_scaffold_root(temp_dir.path());
        let mut registry = AppRegistry::new();

        let request = CreateAppRequest {
            write_scaffold: true,
            ..CreateAppRequest::new("notes", "Notes")
        };
        let result = builder.create(&mut registry, request);
        assert!(result.success, "{:?}", result.errors);
        assert_eq!(result.written.len(), 2);
        assert!(temp_dir.path().join("apps/notes/app.json").exists());
        assert!(registry.contains("notes"));

        // Files already there: nothing registered
        let request = CreateAppRequest {
            write_scaffold: true,
            overwrite: true,
            ..CreateAppRequest::new("notes", "Renamed")
        };
        let result = builder.create(&mut registry, request);
        assert!(!result.success);
        assert_eq!(registry.get("notes").unwrap().name, "Notes");
    }

    #[test]
    fn test_create_write_scaffold_requires_root() {
        let mut registry = AppRegistry::new();
        let request = CreateAppRequest {
            write_scaffold: true,
            ..CreateAppRequest::new("notes", "Notes")
        };

        let result = AppBuilder::new().create(&mut registry, request);
        assert!(!result.success);
        assert!(result.errors[0].contains("scaffold root"));
        assert!(!registry.contains("notes"));
    }

    #[test]
    fn test_clone_app() {
        let mut registry = AppRegistry::new();
        let builder = AppBuilder::new();
        builder.create(&mut registry, CreateAppRequest::new("notes", "Notes"));

        let result = builder.clone_app(&mut registry, "notes", "notes-2", None);
        assert!(result.success);
        let copy = registry.get("notes-2").unwrap();
        assert_eq!(copy.name, "Notes (Copy)");
        assert_eq!(copy.version, registry.get("notes").unwrap().version);

        let result = builder.clone_app(&mut registry, "notes", "notes-2", None);
        assert_eq!(result.errors, vec!["App 'notes-2' already exists"]);

        let result = builder.clone_app(&mut registry, "ghost", "ghost-2", None);
        assert_eq!(result.errors, vec!["App 'ghost' not found"]);

        let result = builder.clone_app(&mut registry, "notes", "Notes 3", None);
        assert!(!result.success);
    }

    #[test]
    fn test_update_app_returns_flag() {
        let mut registry = AppRegistry::new();
        let builder = AppBuilder::new();
        builder.create(&mut registry, CreateAppRequest::new("notes", "Notes"));

        assert!(builder.update_app(
            &mut registry,
            "notes",
            DescriptorPatch {
                icon: Some("sticky-note".into()),
                ..Default::default()
            }
        ));
        assert_eq!(registry.get("notes").unwrap().icon, "sticky-note");

        assert!(!builder.update_app(
            &mut registry,
            "notes",
            DescriptorPatch {
                default_size: Some(WindowSize::new(0, 0)),
                ..Default::default()
            }
        ));
        assert!(!builder.update_app(&mut registry, "ghost", DescriptorPatch::default()));
    }
}
