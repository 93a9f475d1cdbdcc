//! Error types for settings loading.
//!
//! The merge engine itself is infallible; only strict settings loading reports errors.

use std::path::PathBuf;

use thiserror::Error;

/// Failure modes of [`crate::try_load_settings`].
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Settings file could not be read.
    #[error("failed to read settings file {}: {source}", .path.display())]
    Read {
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// JSON document is malformed.
    #[error("invalid JSON settings in {}: {source}", .path.display())]
    ParseJson {
        /// Offending path.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// YAML document is malformed.
    #[error("invalid YAML settings in {}: {source}", .path.display())]
    ParseYaml {
        /// Offending path.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_yaml::Error,
    },

    /// Extension is neither `.json`, `.yaml` nor `.yml`.
    #[error(
        "unsupported settings format: {} (expected .json, .yaml or .yml)",
        .path.display()
    )]
    UnsupportedFormat {
        /// Offending path.
        path: PathBuf,
    },
}
