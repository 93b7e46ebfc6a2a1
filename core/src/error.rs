//! Error types for loading configuration and record files.

use std::path::PathBuf;

/// Errors that stop an inventory build before evaluation begins.
///
/// Data-shape problems found during evaluation are never errors; see
/// [`Diagnostic`](crate::Diagnostic) for compile-time warnings.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem I/O error.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parse/deserialization error.
    #[error("YAML parse error in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// JSON parse/deserialization error.
    #[error("JSON parse error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The records file is valid YAML but not a list.
    #[error("{}: expected a list of records, found a {found}", path.display())]
    NotAList { path: PathBuf, found: &'static str },
}

/// Result alias for loading operations.
pub type Result<T> = std::result::Result<T, Error>;
