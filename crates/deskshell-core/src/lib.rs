//! deskshell core - app registry and mail delivery for the deskshell desktop.
//!
//! The desktop shell renders windows for apps described by [`AppDescriptor`]s.
//! This crate owns those descriptors: validating them, keeping them in an
//! [`AppRegistry`], translating them for the window manager, and creating new
//! ones at runtime. It also owns transactional mail (verification, password
//! reset, welcome) behind a provider-agnostic [`MailService`].
//!
//! No HTTP or RPC layer lives here; see the `deskshell-rpc` crate for that.
//!
//! # Example
//!
//! ```rust,ignore
//! use deskshell_core::{AppRegistry, BuiltinCatalog, InitOutcome};
//!
//! #[tokio::main]
//! async fn main() -> deskshell_core::Result<()> {
//!     let mut registry = AppRegistry::new();
//!     if let InitOutcome::Loaded(report) = registry.initialize(&BuiltinCatalog).await? {
//!         println!("Loaded {} apps", report.loaded.len());
//!     }
//!
//!     for app in registry.search("file") {
//!         println!("{} ({})", app.name, app.id);
//!     }
//!     Ok(())
//! }
//! ```

pub mod apps;
pub mod config;
pub mod error;
pub mod mail;

// Re-export commonly used types
pub use apps::{
    validate, window_metadata, AppBuilder, AppCategory, AppDescriptor, AppRegistry, BuildResult,
    BuiltinApp, BuiltinCatalog, CreateAppRequest, DescriptorPatch, DescriptorSource,
    InitOutcome, JsonDirSource, LoadReport, RegisterOptions, RegistryState, RegistryStats,
    RegistryStatus, ValidationReport, WindowMetadata, WindowSize,
};
pub use error::{DeskError, Result};
pub use mail::{DeliveryOutcome, MailService, MailSettings, MailTemplate};
