use std::rc::Rc;

use crate::config::preferences::Preferences;
use crate::config::store::{ConfigPort, PrefStore};
use crate::launcher::editor::EditorLauncher;
use crate::ports::fs::{FileSystemPort, LocalFs};
use crate::ports::process::{ProcessPort, SystemProcess};
use crate::store::error::StoreError;
use crate::store::file_store::{CleanupPolicy, CleanupReport, FileStore};

/// Process-wide context shared by the tracker, monitor and field records.
pub struct Session {
    config: Rc<dyn ConfigPort>,
    fs: Rc<dyn FileSystemPort>,
    store: FileStore,
    launcher: EditorLauncher,
}

impl Session {
    pub fn new(
        config: Rc<dyn ConfigPort>,
        fs: Rc<dyn FileSystemPort>,
        process: Box<dyn ProcessPort>,
    ) -> Self {
        Session {
            store: FileStore::new(fs.clone(), config.clone()),
            launcher: EditorLauncher::new(process, fs.clone()),
            config,
            fs,
        }
    }

    /// Local disk, real processes, in-memory preferences.
    pub fn local(prefs: Preferences) -> Self {
        Session::new(
            Rc::new(PrefStore::new(prefs)),
            Rc::new(LocalFs),
            Box::new(SystemProcess::new()),
        )
    }

    pub fn config(&self) -> &Rc<dyn ConfigPort> {
        &self.config
    }

    pub fn prefs(&self) -> Preferences {
        self.config.snapshot()
    }

    pub fn fs(&self) -> &dyn FileSystemPort {
        self.fs.as_ref()
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn launcher(&self) -> &EditorLauncher {
        &self.launcher
    }

    /// Prune the working directory: everything on first run, otherwise
    /// files older than the retention window.
    pub fn startup(&self, first_run: bool) -> Result<CleanupReport, StoreError> {
        let policy = if first_run {
            CleanupPolicy::Force
        } else {
            CleanupPolicy::OlderThan(self.prefs().retention())
        };
        self.store.cleanup(policy)
    }
}
