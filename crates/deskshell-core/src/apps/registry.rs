//! In-memory app registry.
//!
//! The registry is an ordinary value: construct one, initialize it from a
//! [`DescriptorSource`], and hand it (usually behind a lock) to whoever
//! needs it. Tests build as many isolated registries as they like.

use super::descriptor::{AppCategory, AppDescriptor, DescriptorPatch};
use super::loader::DescriptorSource;
use super::validator::validate;
use crate::error::{DeskError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Lifecycle of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryState {
    Uninitialized,
    Loading,
    Initialized,
}

/// Lifecycle snapshot for status queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStatus {
    pub state: RegistryState,
    pub initialized: bool,
    pub loading: bool,
    pub app_count: usize,
    /// Last initialization error, kept until the next successful initialize.
    pub last_error: Option<String>,
}

/// Aggregate counts over the registered apps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total_apps: usize,
    /// Only categories with at least one app appear.
    pub categories: BTreeMap<AppCategory, usize>,
}

/// Options for [`AppRegistry::register`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Replace an existing descriptor with the same id.
    pub overwrite: bool,
}

impl RegisterOptions {
    pub fn overwrite() -> Self {
        Self { overwrite: true }
    }
}

/// One id that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadFailure {
    pub id: String,
    pub reason: String,
}

/// Result of a best-effort bulk load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub failed: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// What [`AppRegistry::initialize`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Loaded(LoadReport),
    AlreadyInitialized,
}

/// Registry of app descriptors keyed by id.
#[derive(Debug)]
pub struct AppRegistry {
    apps: BTreeMap<String, AppDescriptor>,
    state: RegistryState,
    last_error: Option<String>,
}

impl Default for AppRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AppRegistry {
    pub fn new() -> Self {
        Self {
            apps: BTreeMap::new(),
            state: RegistryState::Uninitialized,
            last_error: None,
        }
    }

    /// Populate the registry from `source` once.
    ///
    /// Calling this on an initialized registry does nothing. Per-app
    /// failures end up in the returned report; only a failure to enumerate
    /// the source is an error, in which case the registry goes back to
    /// `Uninitialized` so the call can be retried. Dropping the future
    /// mid-load has the same effect and discards the partial load.
    pub async fn initialize(&mut self, source: &dyn DescriptorSource) -> Result<InitOutcome> {
        match self.state {
            RegistryState::Initialized => {
                debug!("Registry already initialized, skipping");
                return Ok(InitOutcome::AlreadyInitialized);
            }
            RegistryState::Loading => {
                return Err(DeskError::Registry {
                    message: "registry initialization already in progress".to_string(),
                });
            }
            RegistryState::Uninitialized => {}
        }

        let mut guard = LoadingGuard::enter(self);
        match guard.registry.load_from(source).await {
            Ok(report) => {
                guard.complete();
                info!(
                    "Registry initialized from {}: {} loaded, {} failed",
                    source.name(),
                    report.loaded.len(),
                    report.failed.len()
                );
                Ok(InitOutcome::Loaded(report))
            }
            Err(e) => {
                warn!("Registry initialization from {} failed: {}", source.name(), e);
                guard.fail(e.to_string());
                Err(DeskError::Registry {
                    message: format!("initialization from {} failed: {}", source.name(), e),
                })
            }
        }
    }

    /// Load every descriptor `source` offers, skipping the ones that fail.
    ///
    /// Does not change the lifecycle state. Descriptors are fetched one at
    /// a time in the order the source lists them.
    pub async fn load_from(&mut self, source: &dyn DescriptorSource) -> Result<LoadReport> {
        let ids = source.app_ids().await?;
        let mut report = LoadReport::default();

        for id in ids {
            let outcome = match source.load(&id).await {
                Ok(descriptor) => self.register(descriptor, RegisterOptions::default()),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => report.loaded.push(id),
                Err(e) => {
                    warn!("Skipping app '{}' from {}: {}", id, source.name(), e);
                    report.failed.push(LoadFailure {
                        id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Validate and insert a descriptor.
    ///
    /// Nothing is written unless validation passes and the id is free (or
    /// `overwrite` is set).
    pub fn register(&mut self, descriptor: AppDescriptor, options: RegisterOptions) -> Result<()> {
        let report = validate(&descriptor);
        if !report.valid {
            return Err(DeskError::InvalidDescriptor {
                id: descriptor.id,
                errors: report.errors,
            });
        }

        if !options.overwrite && self.apps.contains_key(&descriptor.id) {
            return Err(DeskError::DuplicateApp { id: descriptor.id });
        }

        debug!("Registered app: {} ({})", descriptor.name, descriptor.id);
        self.apps.insert(descriptor.id.clone(), descriptor);
        Ok(())
    }

    /// Merge `patch` into the descriptor for `id` and re-validate.
    ///
    /// The stored descriptor is replaced only if the merged one is valid.
    pub fn update(&mut self, id: &str, patch: DescriptorPatch) -> Result<&AppDescriptor> {
        let current = self.apps.get(id).ok_or_else(|| DeskError::AppNotFound {
            id: id.to_string(),
        })?;

        let mut merged = current.clone();
        merged.apply(patch);

        let report = validate(&merged);
        if !report.valid {
            return Err(DeskError::InvalidDescriptor {
                id: id.to_string(),
                errors: report.errors,
            });
        }

        debug!("Updated app: {}", id);
        self.apps.insert(id.to_string(), merged);
        self.apps.get(id).ok_or_else(|| DeskError::AppNotFound {
            id: id.to_string(),
        })
    }

    pub fn get(&self, id: &str) -> Option<&AppDescriptor> {
        self.apps.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.apps.contains_key(id)
    }

    /// All descriptors, ordered by id.
    pub fn list(&self) -> Vec<&AppDescriptor> {
        self.apps.values().collect()
    }

    pub fn by_category(&self, category: AppCategory) -> Vec<&AppDescriptor> {
        self.apps
            .values()
            .filter(|d| d.category == category)
            .collect()
    }

    /// Case-insensitive substring search over name, description and keywords.
    pub fn search(&self, query: &str) -> Vec<&AppDescriptor> {
        let needle = query.to_lowercase();
        self.apps
            .values()
            .filter(|d| d.matches_lowercase(&needle))
            .collect()
    }

    pub fn stats(&self) -> RegistryStats {
        let mut categories = BTreeMap::new();
        for descriptor in self.apps.values() {
            *categories.entry(descriptor.category).or_insert(0) += 1;
        }

        RegistryStats {
            total_apps: self.apps.len(),
            categories,
        }
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Remove every descriptor and return to `Uninitialized`.
    pub fn clear(&mut self) {
        info!("Clearing registry ({} apps)", self.apps.len());
        self.apps.clear();
        self.state = RegistryState::Uninitialized;
        self.last_error = None;
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == RegistryState::Initialized
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn status(&self) -> RegistryStatus {
        RegistryStatus {
            state: self.state,
            initialized: self.state == RegistryState::Initialized,
            loading: self.state == RegistryState::Loading,
            app_count: self.apps.len(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Holds a registry in `Loading` for the length of one initialize call.
///
/// Unless `complete` runs, dropping the guard restores the apps present
/// before the call and returns the registry to `Uninitialized`.
struct LoadingGuard<'a> {
    registry: &'a mut AppRegistry,
    snapshot: BTreeMap<String, AppDescriptor>,
    error: Option<String>,
    completed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn enter(registry: &'a mut AppRegistry) -> Self {
        registry.state = RegistryState::Loading;
        registry.last_error = None;
        let snapshot = registry.apps.clone();
        Self {
            registry,
            snapshot,
            error: None,
            completed: false,
        }
    }

    fn complete(mut self) {
        self.completed = true;
        self.registry.state = RegistryState::Initialized;
    }

    fn fail(mut self, error: String) {
        self.error = Some(error);
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        if self.error.is_none() {
            warn!("Registry initialization cancelled, rolling back");
        }
        self.registry.apps = std::mem::take(&mut self.snapshot);
        self.registry.state = RegistryState::Uninitialized;
        self.registry.last_error = Some(
            self.error
                .take()
                .unwrap_or_else(|| "initialization cancelled".to_string()),
        );
    }
}
