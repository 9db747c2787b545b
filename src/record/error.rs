use thiserror::Error;

use crate::launcher::error::LaunchError;
use crate::store::error::StoreError;

/// Failure of an `edit()` request. The file written before a launch
/// failure stays on disk.
#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Launch(#[from] LaunchError),
}

impl EditError {
    pub fn is_configuration(&self) -> bool {
        match self {
            EditError::Store(e) => e.is_configuration(),
            EditError::Launch(e) => e.is_configuration(),
        }
    }
}
