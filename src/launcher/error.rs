use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("no editor configured; set `editor` in the preferences")]
    NotConfigured,

    #[error("editor {path} does not exist; check the `editor` preference")]
    NotFound { path: PathBuf },

    #[error("editor {path} is a directory, not a program; point `editor` at the executable")]
    IsDirectory { path: PathBuf },

    #[error("editor {path} is not executable; fix its permissions or choose another editor")]
    NotExecutable { path: PathBuf },

    #[error("could not start editor {path}: {source}")]
    Spawn {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl LaunchError {
    /// Errors the user fixes by changing the `editor` preference.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, LaunchError::Spawn { .. })
    }
}
