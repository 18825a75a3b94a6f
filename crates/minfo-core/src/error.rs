//! Error types for minfo-core.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by sessions and the collaborator boundary.
///
/// An empty or missing field value is never an error; it is simply
/// absent from the result tree.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The native library could not be located or loaded.
    #[error("media library unavailable: {0}")]
    LibraryUnavailable(String),

    /// Bad caller input, detected before any library call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The library rejected the file.
    #[error("file not loaded: {}", path.display())]
    LoadFailure { path: PathBuf },

    /// A call across the library boundary failed.
    #[error("library call failed: {0}")]
    Library(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn load_failure(path: impl Into<PathBuf>) -> Self {
        Self::LoadFailure { path: path.into() }
    }
}
