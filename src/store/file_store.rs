use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use crate::config::store::ConfigPort;
use crate::ports::fs::{FileStamp, FileSystemPort};
use crate::store::error::StoreError;
use crate::store::naming::BaseName;

/// Name of the working directory under the platform data directory.
pub const WORKING_DIR_NAME: &str = "itsalltext";

/// A file on disk that already belongs to some base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingFile {
    pub path: PathBuf,
    pub extension: String,
    pub stamp: FileStamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupPolicy {
    /// Remove entries last modified longer ago than this.
    OlderThan(Duration),
    /// Remove everything.
    Force,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub kept: usize,
    pub failed: usize,
}

/// Owns the shared working directory holding every field's file.
pub struct FileStore {
    fs: Rc<dyn FileSystemPort>,
    config: Rc<dyn ConfigPort>,
    /// (configured path, resolved path) from the last successful resolve.
    resolved: RefCell<Option<(Option<PathBuf>, PathBuf)>>,
}

impl FileStore {
    pub fn new(fs: Rc<dyn FileSystemPort>, config: Rc<dyn ConfigPort>) -> Self {
        FileStore {
            fs,
            config,
            resolved: RefCell::new(None),
        }
    }

    pub fn fs(&self) -> &dyn FileSystemPort {
        self.fs.as_ref()
    }

    /// Configured directory, or `<data dir>/itsalltext`.
    pub fn default_working_directory() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(WORKING_DIR_NAME)
    }

    /// Return the working directory, creating it owner-only if absent.
    pub fn resolve_working_directory(&self) -> Result<PathBuf, StoreError> {
        let configured = self.config.snapshot().working_directory;

        if let Some((cached_for, path)) = self.resolved.borrow().as_ref() {
            if *cached_for == configured && self.fs.is_dir(path) {
                return Ok(path.clone());
            }
        }

        let path = configured
            .clone()
            .unwrap_or_else(Self::default_working_directory);

        if self.fs.exists(&path) {
            if !self.fs.is_dir(&path) {
                return Err(StoreError::NotADirectory { path });
            }
        } else {
            self.fs
                .create_private_dir(&path)
                .map_err(|source| StoreError::CreateDir {
                    path: path.clone(),
                    source,
                })?;
            tracing::info!(path = %path.display(), "created working directory");
        }

        *self.resolved.borrow_mut() = Some((configured, path.clone()));
        Ok(path)
    }

    /// Path for `base` + `extension`. Does not create the file.
    pub fn file_for(&self, base: &BaseName, extension: &str) -> Result<PathBuf, StoreError> {
        Ok(self.resolve_working_directory()?.join(base.file_name(extension)))
    }

    /// Most recently modified file already on disk for `base`, ignoring
    /// backup and temp siblings.
    pub fn find_existing(&self, base: &BaseName) -> Option<ExistingFile> {
        self.files_of(base)
            .into_iter()
            .max_by_key(|existing| existing.stamp.modified)
    }

    /// Every file on disk for `base` under any extension, backups excluded.
    pub fn files_of(&self, base: &BaseName) -> Vec<ExistingFile> {
        let Ok(dir) = self.resolve_working_directory() else {
            return Vec::new();
        };
        let entries = match self.fs.list(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "could not scan working directory");
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .filter(|entry| !entry.is_dir)
            .filter_map(|entry| {
                let extension = base.extension_of(&entry.name)?;
                Some(ExistingFile {
                    path: entry.path,
                    extension,
                    stamp: entry.stamp,
                })
            })
            .collect()
    }

    /// Delete the files of `base` other than `keep`. Failures are logged and
    /// skipped. Returns how many were removed.
    pub fn remove_siblings(&self, base: &BaseName, keep: &Path) -> usize {
        let mut removed = 0;
        for sibling in self.files_of(base) {
            if sibling.path == keep {
                continue;
            }
            match self.fs.remove(&sibling.path) {
                Ok(()) => {
                    tracing::debug!(path = %sibling.path.display(), "removed superseded file");
                    removed += 1;
                }
                Err(e) => {
                    tracing::warn!(path = %sibling.path.display(), error = %e, "could not remove superseded file");
                }
            }
        }
        removed
    }

    /// Remove stale entries. Individual failures are logged and skipped.
    pub fn cleanup(&self, policy: CleanupPolicy) -> Result<CleanupReport, StoreError> {
        let dir = self.resolve_working_directory()?;
        let entries = self.fs.list(&dir).map_err(|source| StoreError::List {
            path: dir.clone(),
            source,
        })?;

        let now = SystemTime::now();
        let mut report = CleanupReport::default();

        for entry in entries {
            let stale = match policy {
                CleanupPolicy::Force => true,
                CleanupPolicy::OlderThan(window) => now
                    .duration_since(entry.stamp.modified)
                    .is_ok_and(|age| age > window),
            };

            if !stale {
                report.kept += 1;
                continue;
            }

            match self.fs.remove(&entry.path) {
                Ok(()) => {
                    tracing::debug!(path = %entry.path.display(), "removed stale file");
                    report.removed.push(entry.path);
                }
                Err(e) => {
                    tracing::warn!(path = %entry.path.display(), error = %e, "could not remove stale file");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            removed = report.removed.len(),
            kept = report.kept,
            failed = report.failed,
            "working directory cleanup finished"
        );
        Ok(report)
    }

    /// Best-effort delete of one file.
    pub fn remove(&self, path: &Path) -> Result<(), StoreError> {
        self.fs.remove(path).map_err(|source| StoreError::Remove {
            path: path.to_path_buf(),
            source,
        })
    }
}
