//! Error types for archive packaging, the trajectory catalog, and the widget.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while assembling an MVSX archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Scene state is invalid: {0}")]
    State(String),

    #[error("Failed to serialize scene state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Entry name '{0}' is reserved for the scene manifest")]
    ReservedEntry(String),

    #[error("Archive has no {0} entry")]
    MissingManifest(&'static str),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the trajectory catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Testdata directory not found: {}", .0.display())]
    DirectoryMissing(PathBuf),

    #[error("Trajectory not found: {0}")]
    NotFound(String),

    #[error("Failed to scan '{}': {source}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build MVSX for '{id}': {source}")]
    Build {
        id: String,
        #[source]
        source: ArchiveError,
    },
}

/// Errors raised when constructing or updating a widget.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("mvsx_base64 cannot be set when using builder input")]
    ConflictingSources,

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("Unknown widget attribute: {0}")]
    UnknownAttribute(String),

    #[error("Invalid value for '{name}': expected {expected}")]
    InvalidValue { name: String, expected: &'static str },

    #[error("Host update must be a JSON object")]
    NotAnObject,

    #[error("mvsx_base64 is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Errors raised while loading server configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },
}
