//! App registry subsystem.
//!
//! Descriptors describe one installable app each. They come from a
//! [`DescriptorSource`] (the built-in catalog or a directory of JSON files),
//! pass through the validator, and live in an [`AppRegistry`]. The window
//! manager reads them through [`WindowMetadata`]; the [`AppBuilder`]
//! creates, clones and updates them at runtime.

mod adapter;
mod builder;
mod catalog;
mod descriptor;
mod loader;
mod registry;
mod validator;

pub use adapter::{window_metadata, WindowMetadata};
pub use builder::{
    AppBuilder, BuildResult, CreateAppRequest, DefaultScaffold, Scaffold, ScaffoldFile,
    ScaffoldGenerator, ScaffoldLayout,
};
pub use catalog::{BuiltinApp, BuiltinCatalog};
pub use descriptor::{
    AppCategory, AppDescriptor, DescriptorPatch, Permission, PermissionAction, WindowSize,
};
pub use loader::{DescriptorSource, JsonDirSource};
pub use registry::{
    AppRegistry, InitOutcome, LoadFailure, LoadReport, RegisterOptions, RegistryState,
    RegistryStats, RegistryStatus,
};
pub use validator::{is_valid_app_id, validate, ValidationReport};
