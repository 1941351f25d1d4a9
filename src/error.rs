//! Error types for the operations that report failures to the caller.
//!
//! Collaborator failures (catalog search, thumbnail download, image
//! processing) never reach these types; they are logged and degraded at the
//! library boundary.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure reading or writing the games document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document exists but could not be decoded. It must not be
    /// overwritten until the user has dealt with it.
    #[error("games document {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode games document: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Failure starting the runner process.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("'{0}' has no executable path set")]
    MissingExecutable(String),

    #[error("runner '{0}' was not found; is umu-launcher installed?")]
    RunnerNotFound(String),

    #[error("failed to start '{runner}': {source}")]
    Spawn {
        runner: String,
        #[source]
        source: io::Error,
    },
}

/// Failure of a collection mutation.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("no game at index {index} (library has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Launch(#[from] LaunchError),
}
