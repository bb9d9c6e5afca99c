//! Error types used throughout trailforge.
//!
//! Scanning distinguishes two failure shapes: a configured root that cannot
//! be read at all (unmounted share, typo in the config) and a single media
//! folder that vanished between listing and inspection. Callers must be able
//! to tell them apart from an ordinary "no trailer here" result.

use std::path::{Path, PathBuf};

/// Error type for the scanning core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configured root directory is missing or unreadable.
    #[error("Path unavailable: {path}: {source}")]
    PathUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A media folder does not exist or is not a directory.
    #[error("Not found: {0}")]
    NotFound(PathBuf),

    /// A required external tool is not on PATH.
    #[error("Tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new PathUnavailable error for a scan root.
    pub fn path_unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::PathUnavailable {
            path: path.into(),
            source,
        }
    }

    /// Create a new NotFound error for a media folder.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// True if this error means the scan root itself was unreachable.
    pub fn is_path_unavailable(&self) -> bool {
        matches!(self, Self::PathUnavailable { .. })
    }

    /// True if this error means a single media folder was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// The path the error refers to, when it carries one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::PathUnavailable { path, .. } => Some(path),
            Self::NotFound(path) => Some(path),
            Self::ToolNotFound { .. } | Self::Io(_) => None,
        }
    }
}

/// Result type alias using the trailforge Error type.
pub type Result<T> = std::result::Result<T, Error>;
