// backend.rs — Filesystem traversal seam for the eraser.
//
// The eraser's recursion, retry, and error policy are written once against
// FsBackend. Each platform supplies a backend that knows how to list a
// directory and remove its nodes; PlatformBackend names the one for the
// current build target.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Which stage of directory-stream processing failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOp {
    /// The directory could not be opened.
    Open,
    /// Reading the next entry failed.
    Read,
    /// The type of an entry could not be determined.
    Stat,
}

impl fmt::Display for StreamOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamOp::Open => write!(f, "opening directory for clean"),
            StreamOp::Read => write!(f, "reading directory for clean"),
            StreamOp::Stat => write!(f, "getting file status for clean"),
        }
    }
}

/// A directory-stream failure reported by a backend.
#[derive(Debug)]
pub struct StreamError {
    pub op: StreamOp,
    pub path: PathBuf,
    pub source: io::Error,
}

impl StreamError {
    pub fn new(op: StreamOp, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            op,
            path: path.into(),
            source,
        }
    }
}

/// Classification of one directory entry during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// `.`
    CurrentMarker,
    /// `..`
    ParentMarker,
    RegularFile,
    Directory,
    /// Symlinks, fifos, sockets, devices. Removed without being followed.
    Other,
}

impl EntryKind {
    /// Classify an entry from its name and (non-following) file type.
    pub fn classify(name: &OsStr, file_type: fs::FileType) -> Self {
        if name == OsStr::new(".") {
            EntryKind::CurrentMarker
        } else if name == OsStr::new("..") {
            EntryKind::ParentMarker
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::RegularFile
        } else {
            EntryKind::Other
        }
    }

    pub fn is_marker(self) -> bool {
        matches!(self, EntryKind::CurrentMarker | EntryKind::ParentMarker)
    }
}

/// One classified entry of a directory listing.
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: OsString,
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Platform operations the eraser needs.
///
/// `list` returns every entry of `dir` already classified; the order is
/// whatever the underlying directory stream yields. Errors from `list` are
/// directory-stream failures and are fatal to the caller. Errors from the
/// remove operations are per-entry and may be retried.
pub trait FsBackend {
    fn list(&self, dir: &Path) -> Result<Vec<DirEntry>, StreamError>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    fn remove_dir(&self, path: &Path) -> io::Result<()>;

    /// Backend name (for logging).
    fn name(&self) -> &str;
}

impl<B: FsBackend + ?Sized> FsBackend for &B {
    fn list(&self, dir: &Path) -> Result<Vec<DirEntry>, StreamError> {
        (**self).list(dir)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        (**self).remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        (**self).remove_dir(path)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Read and classify a directory with `std::fs`.
///
/// Entry types come from `DirEntry::file_type`, which does not follow
/// symlinks, so a link to a directory is classified as `Other` and is
/// unlinked rather than recursed into.
fn list_std(dir: &Path) -> Result<Vec<DirEntry>, StreamError> {
    let stream = fs::read_dir(dir).map_err(|e| StreamError::new(StreamOp::Open, dir, e))?;

    let mut entries = Vec::new();
    for entry in stream {
        let entry = entry.map_err(|e| StreamError::new(StreamOp::Read, dir, e))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| StreamError::new(StreamOp::Stat, &path, e))?;
        let name = entry.file_name();
        let kind = EntryKind::classify(&name, file_type);
        entries.push(DirEntry { name, path, kind });
    }
    Ok(entries)
}

/// POSIX backend.
#[cfg(unix)]
#[derive(Debug, Default, Clone, Copy)]
pub struct UnixBackend;

#[cfg(unix)]
impl FsBackend for UnixBackend {
    fn list(&self, dir: &Path) -> Result<Vec<DirEntry>, StreamError> {
        list_std(dir)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }

    fn name(&self) -> &str {
        "unix"
    }
}

/// Windows backend.
///
/// Deleting a read-only file fails with access denied, so a failed delete
/// clears the read-only attribute and tries once more before handing the
/// error back to the eraser's retry loop. A directory symlink or junction is
/// unlinked with `RemoveDirectory`, which never touches the target.
#[cfg(windows)]
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsBackend;

#[cfg(windows)]
impl FsBackend for WindowsBackend {
    fn list(&self, dir: &Path) -> Result<Vec<DirEntry>, StreamError> {
        list_std(dir)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        use std::os::windows::fs::FileTypeExt;

        match fs::remove_file(path) {
            Err(e) if fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink_dir()) => {
                tracing::debug!("{} is a directory link ({}), unlinking as dir", path.display(), e);
                fs::remove_dir(path)
            }
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                let mut perms = fs::symlink_metadata(path)?.permissions();
                if perms.readonly() {
                    #[allow(clippy::permissions_set_readonly_false)]
                    perms.set_readonly(false);
                    fs::set_permissions(path, perms)?;
                    return fs::remove_file(path);
                }
                Err(e)
            }
            other => other,
        }
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }

    fn name(&self) -> &str {
        "windows"
    }
}

#[cfg(unix)]
pub type PlatformBackend = UnixBackend;

#[cfg(windows)]
pub type PlatformBackend = WindowsBackend;
