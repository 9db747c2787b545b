use std::cell::RefCell;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use itsalltext::config::preferences::Preferences;
use itsalltext::config::store::PrefStore;
use itsalltext::dom::memory::{MemoryDocument, MemoryField};
use itsalltext::dom::{Document, TextField};
use itsalltext::ports::fs::LocalFs;
use itsalltext::ports::process::{ProcessExit, ProcessId, ProcessPort};
use itsalltext::session::Session;
use tempfile::TempDir;

// =========================================================================
// Fake process port
// =========================================================================

#[derive(Debug, Clone)]
pub struct Spawned {
    pub id: ProcessId,
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

/// Shared view of what a `RecordingProcess` was asked to do.
#[derive(Debug, Default)]
pub struct ProcessLog {
    pub spawned: Vec<Spawned>,
    pub exits: Vec<ProcessExit>,
    pub fail_with: Option<io::ErrorKind>,
}

/// Records spawn requests instead of running anything.
pub struct RecordingProcess {
    log: Rc<RefCell<ProcessLog>>,
}

impl RecordingProcess {
    pub fn new() -> (Self, Rc<RefCell<ProcessLog>>) {
        let log = Rc::new(RefCell::new(ProcessLog::default()));
        (RecordingProcess { log: log.clone() }, log)
    }
}

impl ProcessPort for RecordingProcess {
    fn spawn(&self, program: &Path, args: &[OsString]) -> io::Result<ProcessId> {
        let mut log = self.log.borrow_mut();
        if let Some(kind) = log.fail_with {
            return Err(io::Error::from(kind));
        }
        let id = log.spawned.len() as ProcessId + 1;
        log.spawned.push(Spawned {
            id,
            program: program.to_path_buf(),
            args: args.to_vec(),
        });
        Ok(id)
    }

    fn poll_exits(&self) -> Vec<ProcessExit> {
        std::mem::take(&mut self.log.borrow_mut().exits)
    }
}

// =========================================================================
// Sessions
// =========================================================================

pub struct Fixture {
    pub dir: TempDir,
    pub session: Rc<Session>,
    pub config: Rc<PrefStore>,
    pub process: Rc<RefCell<ProcessLog>>,
}

impl Fixture {
    pub fn work_dir(&self) -> PathBuf {
        self.dir.path().join("work")
    }
}

/// Session over a temp working directory with a recording process port.
/// The editor points at the running test binary, which exists and is
/// executable on every platform.
pub fn fixture() -> Fixture {
    fixture_with(|_| {})
}

pub fn fixture_with(tweak: impl FnOnce(&mut Preferences)) -> Fixture {
    let dir = TempDir::new().unwrap();
    let mut prefs = Preferences {
        working_directory: Some(dir.path().join("work")),
        editor: Some(std::env::current_exe().unwrap()),
        ..Preferences::default()
    };
    tweak(&mut prefs);

    let config = Rc::new(PrefStore::new(prefs));
    let (process, log) = RecordingProcess::new();
    let session = Rc::new(Session::new(config.clone(), Rc::new(LocalFs), Box::new(process)));

    Fixture {
        dir,
        session,
        config,
        process: log,
    }
}

// =========================================================================
// Documents
// =========================================================================

pub fn page(url: &str) -> Rc<MemoryDocument> {
    MemoryDocument::new(url).unwrap()
}

pub fn add_field(doc: &Rc<MemoryDocument>, id: Option<&str>, value: &str) -> Rc<MemoryField> {
    let field = MemoryField::new(id, value);
    doc.insert_field(field.clone());
    field
}

pub fn as_doc(doc: &Rc<MemoryDocument>) -> Rc<dyn Document> {
    doc.clone()
}

pub fn as_field(field: &Rc<MemoryField>) -> Rc<dyn TextField> {
    field.clone()
}

// =========================================================================
// Files
// =========================================================================

/// Simulate an editor saving `text` to `path`.
pub fn external_write(path: &Path, text: &str) {
    std::fs::write(path, text).unwrap();
}

/// Set the modification time of `path` to `age` ago.
pub fn age_file(path: &Path, age: Duration) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
}

pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);
