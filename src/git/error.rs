//! Error types for git queries

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running a git query
#[derive(Debug, Error)]
pub enum GitError {
    /// The git program could not be launched at all
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// git ran but exited unsuccessfully
    #[error("git {args} exited with status {code:?}: {stderr}")]
    NonZeroExit {
        args: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The directory to run in does not exist or is not a directory
    #[error("working directory not accessible: {}", path.display())]
    MissingDirectory { path: PathBuf },
}
