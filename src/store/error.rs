use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The configured working directory exists but is a file.
    #[error("working directory {path} exists but is not a directory; remove it or choose another location")]
    NotADirectory { path: PathBuf },

    #[error("could not create working directory {path}: {source}; check permissions or choose another location")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not list working directory {path}: {source}")]
    List {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not remove {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StoreError {
    /// Configuration problems need the user to act; the rest are I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            StoreError::NotADirectory { .. } | StoreError::CreateDir { .. }
        )
    }
}
