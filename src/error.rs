//! Errors that end an inventory run.
//!
//! Everything that goes wrong for a single file is absorbed into that file's
//! record instead; only these reach the caller.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Your selected input path ({}) is not a valid directory", .path.display())]
    InvalidRoot { path: PathBuf },

    #[error("failed to write inventory to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("inventory run was cancelled before completion")]
    Cancelled,

    #[error("inventory task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl InventoryError {
    pub fn write(path: impl Into<PathBuf>, source: impl Into<std::io::Error>) -> Self {
        Self::Write {
            path: path.into(),
            source: source.into(),
        }
    }
}
