use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::launcher::error::LaunchError;
use crate::ports::fs::FileSystemPort;
use crate::ports::process::{ProcessExit, ProcessId, ProcessPort};

/// Helper used to open application bundles on macOS.
pub const BUNDLE_OPENER: &str = "/usr/bin/open";

/// Program and arguments for one editor run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

/// Build the invocation opening `file` in `editor`.
///
/// With `bundle_convention`, an `.app` bundle is opened through
/// `open -a <bundle> <file>` instead of being executed directly.
pub fn build_invocation(editor: &Path, file: &Path, bundle_convention: bool) -> Invocation {
    if bundle_convention && is_bundle(editor) {
        return Invocation {
            program: PathBuf::from(BUNDLE_OPENER),
            args: vec!["-a".into(), editor.as_os_str().to_owned(), file.as_os_str().to_owned()],
        };
    }
    Invocation {
        program: editor.to_path_buf(),
        args: vec![file.as_os_str().to_owned()],
    }
}

fn is_bundle(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("app"))
}

/// Completed editor run, reported once per launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub file: PathBuf,
    pub exit: ProcessExit,
}

/// Starts the external editor and collects its exit notifications.
pub struct EditorLauncher {
    process: Box<dyn ProcessPort>,
    fs: Rc<dyn FileSystemPort>,
    bundle_convention: bool,
    pending: RefCell<HashMap<ProcessId, PathBuf>>,
}

impl EditorLauncher {
    pub fn new(process: Box<dyn ProcessPort>, fs: Rc<dyn FileSystemPort>) -> Self {
        EditorLauncher {
            process,
            fs,
            bundle_convention: cfg!(target_os = "macos"),
            pending: RefCell::new(HashMap::new()),
        }
    }

    pub fn with_bundle_convention(mut self, enabled: bool) -> Self {
        self.bundle_convention = enabled;
        self
    }

    /// Check the editor path and spawn it on `file`. Does not wait for exit.
    pub fn launch(&self, editor: Option<&Path>, file: &Path) -> Result<ProcessId, LaunchError> {
        let editor = editor.ok_or(LaunchError::NotConfigured)?;
        self.validate(editor)?;

        let invocation = build_invocation(editor, file, self.bundle_convention);
        let id = self
            .process
            .spawn(&invocation.program, &invocation.args)
            .map_err(|source| classify_spawn_error(editor, source))?;

        tracing::info!(
            editor = %editor.display(),
            file = %file.display(),
            pid = id,
            "launched editor"
        );
        self.pending.borrow_mut().insert(id, file.to_path_buf());
        Ok(id)
    }

    /// Exit notifications since the last call. Informational only: a failed
    /// run is logged and never changes record state.
    pub fn drain_completions(&self) -> Vec<LaunchOutcome> {
        let mut outcomes = Vec::new();
        for exit in self.process.poll_exits() {
            let Some(file) = self.pending.borrow_mut().remove(&exit.id) else {
                continue;
            };
            if exit.success() {
                tracing::debug!(file = %file.display(), "editor exited");
            } else {
                tracing::warn!(
                    file = %file.display(),
                    program = %exit.program.display(),
                    code = ?exit.code,
                    "editor exited with failure"
                );
            }
            outcomes.push(LaunchOutcome { file, exit });
        }
        outcomes
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    fn validate(&self, editor: &Path) -> Result<(), LaunchError> {
        if !self.fs.exists(editor) {
            return Err(LaunchError::NotFound {
                path: editor.to_path_buf(),
            });
        }
        if self.fs.is_dir(editor) {
            if self.bundle_convention && is_bundle(editor) {
                return Ok(());
            }
            return Err(LaunchError::IsDirectory {
                path: editor.to_path_buf(),
            });
        }
        if !self.fs.is_executable(editor) {
            return Err(LaunchError::NotExecutable {
                path: editor.to_path_buf(),
            });
        }
        Ok(())
    }
}

fn classify_spawn_error(editor: &Path, source: io::Error) -> LaunchError {
    let path = editor.to_path_buf();
    match source.kind() {
        io::ErrorKind::NotFound => LaunchError::NotFound { path },
        io::ErrorKind::PermissionDenied => LaunchError::NotExecutable { path },
        _ => LaunchError::Spawn { path, source },
    }
}
