//! Error types for Clashpilot
//!
//! Operation-level errors are turned into tool error reports at the tool
//! boundary; only startup errors reach `main`.

use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file {path}: {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config file {path}: {reason}")]
    ConfigValidationFailed { path: String, reason: String },

    #[error("Request to daemon {path} failed: {source}")]
    DaemonUnreachable {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Daemon returned HTTP {status} for {path}: {body}")]
    DaemonStatus {
        path: String,
        status: u16,
        body: String,
    },

    #[error("Malformed daemon response for {path}: {reason}")]
    DaemonResponse { path: String, reason: String },

    #[error("Cannot read group [{group}]: {reason}")]
    GroupLookup { group: String, reason: String },

    #[error("Failed to access profile file {path}: {source}")]
    ProfileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid profile YAML in {path}: {source}")]
    ProfileFormat {
        path: String,
        #[source]
        source: serde_yml::Error,
    },

    #[error("Profile '{query}' not found")]
    ProfileNotFound { query: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the daemon answered with a 404-equivalent
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::DaemonStatus { status, .. } => *status == 404,
            Self::GroupLookup { reason, .. } => reason.contains("HTTP 404"),
            _ => false,
        }
    }

    /// Upstream HTTP status, if the daemon produced one
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::DaemonStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;
