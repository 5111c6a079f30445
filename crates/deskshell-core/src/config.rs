//! Centralized configuration for deskshell.
//!
//! Limits, defaults and endpoints used by the registry, the mail layer and
//! the RPC host.

use std::time::Duration;

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "deskshell";
    pub const USER_AGENT: &'static str = "deskshell-core";
}

/// Limits enforced on app descriptors.
pub struct RegistryConfig;

impl RegistryConfig {
    pub const MAX_ID_LENGTH: usize = 50;
    pub const MAX_NAME_LENGTH: usize = 100;
    pub const DESCRIPTOR_EXTENSION: &'static str = "json";
}

/// Defaults applied when the builder fills in a descriptor.
pub struct WindowConfig;

impl WindowConfig {
    pub const DEFAULT_WIDTH: u32 = 800;
    pub const DEFAULT_HEIGHT: u32 = 600;
    pub const MIN_WIDTH: u32 = 400;
    pub const MIN_HEIGHT: u32 = 300;
    pub const DEFAULT_VERSION: &'static str = "1.0.0";
    pub const DEFAULT_ICON: &'static str = "app-window";
    pub const SCAFFOLD_ROOT: &'static str = "apps";
}

/// Mail delivery configuration.
pub struct MailConfig;

impl MailConfig {
    pub const RESEND_API_BASE: &'static str = "https://api.resend.com";
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
    pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_FROM: &'static str = "deskshell <noreply@localhost>";
}

/// RPC host configuration.
pub struct RpcConfig;

impl RpcConfig {
    pub const DEFAULT_HOST: &'static str = "127.0.0.1";
    pub const PORT_ANNOUNCE_PREFIX: &'static str = "RPC_PORT=";
}
