use std::cell::{Cell, RefCell};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};

pub type ProcessId = u64;

/// Completion notification for a spawned process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessExit {
    pub id: ProcessId,
    pub program: PathBuf,
    /// `None` when terminated by a signal.
    pub code: Option<i32>,
}

impl ProcessExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Process spawning with non-blocking completion polling.
pub trait ProcessPort {
    fn spawn(&self, program: &Path, args: &[OsString]) -> io::Result<ProcessId>;

    /// Exits observed since the last call. Never blocks.
    fn poll_exits(&self) -> Vec<ProcessExit>;
}

/// `ProcessPort` backed by `std::process::Command`.
#[derive(Debug, Default)]
pub struct SystemProcess {
    next_id: Cell<ProcessId>,
    children: RefCell<Vec<(ProcessId, PathBuf, Child)>>,
}

impl SystemProcess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn running(&self) -> usize {
        self.children.borrow().len()
    }
}

impl ProcessPort for SystemProcess {
    fn spawn(&self, program: &Path, args: &[OsString]) -> io::Result<ProcessId> {
        let child = Command::new(program).args(args).spawn()?;
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.children
            .borrow_mut()
            .push((id, program.to_path_buf(), child));
        Ok(id)
    }

    fn poll_exits(&self) -> Vec<ProcessExit> {
        let mut exits = Vec::new();
        self.children.borrow_mut().retain_mut(|(id, program, child)| {
            match child.try_wait() {
                Ok(Some(status)) => {
                    exits.push(ProcessExit {
                        id: *id,
                        program: program.clone(),
                        code: status.code(),
                    });
                    false
                }
                Ok(None) => true,
                Err(e) => {
                    tracing::warn!(pid = *id, error = %e, "lost track of editor process");
                    false
                }
            }
        });
        exits
    }
}
