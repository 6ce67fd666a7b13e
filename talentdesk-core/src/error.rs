//! src/error.rs
//! ============================================================================
//! # `AppError`: Unified Error Type for the Recruiting Console
//!
//! The in-memory table engine never fails (pages clamp, unknown filters are
//! ignored, double dismissal is a no-op). Everything that touches the outside
//! world (config files, workspace JSON, the terminal, the async runtime)
//! reports through this enum.

use std::{io, path::PathBuf};
use thiserror::Error;

/// Unified error type for all fallible operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// TOML config serialization error.
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Config file I/O error with path.
    #[error("Failed to access config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A config value that parses but cannot be used.
    #[error("Invalid config: {field} - {message}")]
    InvalidConfig {
        field: String, // "table.items_per_page", "ui.tick_rate", etc.
        message: String,
    },

    /// Serialization or deserialization error (e.g., JSON).
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Workspace data file could not be read or parsed.
    #[error("Failed to load workspace {path:?}: {reason}")]
    Dataset { path: PathBuf, reason: String },

    /// Timers need a Tokio runtime to be scheduled on.
    #[error("No async runtime available: {0}")]
    Runtime(String),

    /// Raw mode, alternate screen, mouse capture or drawing failed.
    #[error("Terminal error while trying to {operation}: {source}")]
    Terminal {
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl AppError {
    /// Create an invalid configuration error
    pub fn invalid_config<S1: Into<String>, S2: Into<String>>(field: S1, message: S2) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Wrap a failed terminal call; `operation` reads as "... while trying to <operation>".
    #[must_use]
    pub fn terminal(operation: &'static str, source: io::Error) -> Self {
        Self::Terminal { operation, source }
    }

    /// Create a workspace load failure error
    pub fn dataset<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::Dataset {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
