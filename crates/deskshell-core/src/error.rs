//! Error types for deskshell.
//!
//! Registry and builder operations that the shell surfaces to users report
//! failures as structured results instead; the variants here cover the
//! paths that genuinely fail (I/O, parsing, provider calls, initialization).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the deskshell core.
#[derive(Debug, Error)]
pub enum DeskError {
    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Registry errors
    #[error("Invalid descriptor for '{id}': {}", .errors.join("; "))]
    InvalidDescriptor { id: String, errors: Vec<String> },

    #[error("App already registered: {id}")]
    DuplicateApp { id: String },

    #[error("App not found: {id}")]
    AppNotFound { id: String },

    #[error("Failed to load descriptor for '{id}': {message}")]
    DescriptorLoad { id: String, message: String },

    #[error("Registry error: {message}")]
    Registry { message: String },

    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    // Mail errors
    #[error("Mail provider {provider} failed: {message}")]
    Mail { provider: String, message: String },

    #[error("Template error: {message}")]
    Template { message: String },

    // Request errors
    #[error("Method not found: {method}")]
    MethodNotFound { method: String },

    #[error("Invalid parameters: {message}")]
    InvalidParams { message: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for deskshell operations.
pub type Result<T> = std::result::Result<T, DeskError>;

impl From<std::io::Error> for DeskError {
    fn from(err: std::io::Error) -> Self {
        DeskError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for DeskError {
    fn from(err: serde_json::Error) -> Self {
        DeskError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for DeskError {
    fn from(err: reqwest::Error) -> Self {
        DeskError::Network {
            message: err.to_string(),
            cause: err.url().map(|u| u.to_string()),
        }
    }
}

impl DeskError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        DeskError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Convert to a JSON-RPC error code.
    ///
    /// Custom error codes (application-defined, -32000 to -32099):
    /// - -32000: Network/connectivity or mail provider error
    /// - -32001: App not found
    /// - -32002: Duplicate app
    /// - -32003: Descriptor load or registry initialization failure
    /// - -32005: Validation error
    ///
    /// Unknown methods and malformed params map to the standard -32601
    /// and -32602.
    pub fn to_rpc_error_code(&self) -> i32 {
        match self {
            DeskError::Network { .. } | DeskError::Mail { .. } => -32000,

            DeskError::AppNotFound { .. } => -32001,

            DeskError::DuplicateApp { .. } => -32002,

            DeskError::DescriptorLoad { .. } | DeskError::Registry { .. } => -32003,

            DeskError::InvalidDescriptor { .. } | DeskError::Template { .. } => -32005,

            DeskError::MethodNotFound { .. } => -32601,

            DeskError::InvalidParams { .. } => -32602,

            _ => -32603,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DeskError::AppNotFound { id: "notes".into() };
        assert_eq!(err.to_string(), "App not found: notes");

        let err = DeskError::InvalidDescriptor {
            id: "x".into(),
            errors: vec!["name is required".into(), "version is required".into()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid descriptor for 'x': name is required; version is required"
        );
    }

    #[test]
    fn test_rpc_error_codes() {
        assert_eq!(
            DeskError::AppNotFound { id: "a".into() }.to_rpc_error_code(),
            -32001
        );
        assert_eq!(
            DeskError::InvalidParams {
                message: "missing id".into()
            }
            .to_rpc_error_code(),
            -32602
        );
        assert_eq!(DeskError::Other("boom".into()).to_rpc_error_code(), -32603);
    }
}
