use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Modification state of a file, compared to detect external edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub modified: SystemTime,
    pub len: u64,
}

#[derive(Debug, Clone)]
pub struct DirEntryInfo {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub stamp: FileStamp,
}

/// File system access needed by the store and field records.
pub trait FileSystemPort {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn is_readable(&self, path: &Path) -> bool;
    fn is_executable(&self, path: &Path) -> bool;

    /// Create `path` (and parents) readable only by the owner.
    fn create_private_dir(&self, path: &Path) -> io::Result<()>;

    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>>;
    fn remove(&self, path: &Path) -> io::Result<()>;
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
    fn stat(&self, path: &Path) -> io::Result<FileStamp>;
}

/// `FileSystemPort` over the local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileSystemPort for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_readable(&self, path: &Path) -> bool {
        fs::File::open(path).is_ok()
    }

    fn is_executable(&self, path: &Path) -> bool {
        let Ok(metadata) = fs::metadata(path) else {
            return false;
        };
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
        }
        #[cfg(not(unix))]
        {
            metadata.is_file()
        }
    }

    fn create_private_dir(&self, path: &Path) -> io::Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        builder.create(path)
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let metadata = match entry.metadata() {
                Ok(m) => m,
                // Removed between readdir and stat
                Err(_) => continue,
            };
            entries.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path(),
                is_dir: metadata.is_dir(),
                stamp: FileStamp {
                    modified: metadata.modified()?,
                    len: metadata.len(),
                },
            });
        }
        Ok(entries)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        if path.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        fs::write(path, bytes)
    }

    fn stat(&self, path: &Path) -> io::Result<FileStamp> {
        let metadata = fs::metadata(path)?;
        Ok(FileStamp {
            modified: metadata.modified()?,
            len: metadata.len(),
        })
    }
}

/// True when `err` reports a path component longer than the platform allows.
pub fn is_name_too_long(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::InvalidFilename
}
