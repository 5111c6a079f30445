//! Descriptor discovery.
//!
//! A [`DescriptorSource`] enumerates the app ids it knows about and produces
//! one descriptor per id. The registry drives a source sequentially and
//! records per-id failures instead of aborting the batch.

use super::descriptor::AppDescriptor;
use crate::config::RegistryConfig;
use crate::error::{DeskError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A provider of app descriptors.
#[async_trait]
pub trait DescriptorSource: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// The app ids this source can produce, in load order.
    ///
    /// Failing here fails the whole load.
    async fn app_ids(&self) -> Result<Vec<String>>;

    /// Produce the descriptor for one id.
    async fn load(&self, id: &str) -> Result<AppDescriptor>;
}

/// Loads descriptors from `<dir>/<id>.json` files.
///
/// Every JSON file in the directory is one app; its file stem is the id.
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn descriptor_path(&self, id: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", id, RegistryConfig::DESCRIPTOR_EXTENSION))
    }
}

#[async_trait]
impl DescriptorSource for JsonDirSource {
    fn name(&self) -> &str {
        "json-dir"
    }

    async fn app_ids(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| DeskError::Io {
                message: format!("Failed to read apps directory: {}", e),
                path: Some(self.dir.clone()),
                source: Some(e),
            })?;

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DeskError::io_with_path(e, &self.dir))?
        {
            let path = entry.path();

            // Only process .json files
            if path
                .extension()
                .map(|e| e != RegistryConfig::DESCRIPTOR_EXTENSION)
                .unwrap_or(true)
            {
                continue;
            }

            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }

        ids.sort();
        debug!("Found {} descriptor files in {}", ids.len(), self.dir.display());
        Ok(ids)
    }

    async fn load(&self, id: &str) -> Result<AppDescriptor> {
        let path = self.descriptor_path(id);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| DeskError::DescriptorLoad {
                id: id.to_string(),
                message: format!("cannot read {}: {}", path.display(), e),
            })?;

        let descriptor: AppDescriptor =
            serde_json::from_str(&content).map_err(|e| DeskError::DescriptorLoad {
                id: id.to_string(),
                message: format!("cannot parse {}: {}", path.display(), e),
            })?;

        if descriptor.id != id {
            return Err(DeskError::DescriptorLoad {
                id: id.to_string(),
                message: format!(
                    "descriptor in {} declares id '{}'",
                    path.display(),
                    descriptor.id
                ),
            });
        }

        Ok(descriptor)
    }
}
