// guard.rs — SandboxGuard: owns the sandbox root for the whole run.
//
// The guard is the only component that creates, cleans, or removes the
// sandbox, and every fixture write goes through it so nothing lands outside
// the root. Confinement is a byte check on the path as given: the root must
// be a prefix and be followed immediately by a separator. Paths with `..`
// components are rejected outright.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use crate::backend::{FsBackend, PlatformBackend};
use crate::eraser::{DirectoryEraser, EraseReport};
use crate::error::SandboxError;
use crate::resolver::SandboxRoot;
use crate::sleeper::{RealSleeper, Sleeper};

/// Owner of the sandbox directory tree.
pub struct SandboxGuard<B = PlatformBackend, S = RealSleeper> {
    root: SandboxRoot,
    eraser: DirectoryEraser<B, S>,
}

impl SandboxGuard {
    /// Create (or reuse) the sandbox at `root` and scrub stale contents,
    /// using the platform eraser with the default retry policy.
    pub fn create(root: SandboxRoot) -> Result<Self, SandboxError> {
        Self::create_with(root, DirectoryEraser::new())
    }
}

impl<B: FsBackend, S: Sleeper> SandboxGuard<B, S> {
    /// Create (or reuse) the sandbox at `root` using the given eraser.
    ///
    /// An existing directory is accepted; its contents from an interrupted
    /// earlier run are erased.
    pub fn create_with(
        root: SandboxRoot,
        eraser: DirectoryEraser<B, S>,
    ) -> Result<Self, SandboxError> {
        match fs::create_dir(root.path()) {
            Ok(()) => tracing::info!("created sandbox {}", root),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::debug!("sandbox {} already exists", root)
            }
            Err(source) => {
                return Err(SandboxError::CreateDir {
                    path: root.path().to_path_buf(),
                    source,
                })
            }
        }

        if let Err(e) = restrict_permissions(root.path()) {
            tracing::warn!("cannot set permissions on {}: {}", root, e);
        }

        let guard = Self { root, eraser };
        let report = guard.erase()?;
        if report.files_removed + report.dirs_removed > 0 {
            tracing::info!(
                "removed stale sandbox contents: {} file(s), {} dir(s)",
                report.files_removed,
                report.dirs_removed
            );
        }
        Ok(guard)
    }

    pub fn root(&self) -> &SandboxRoot {
        &self.root
    }

    /// Join `relative` onto the sandbox root.
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.path().join(relative)
    }

    /// Empty the sandbox, keeping the root directory.
    pub fn erase(&self) -> Result<EraseReport, SandboxError> {
        self.eraser.erase_contents(self.root.path())
    }

    /// Erase the tree and remove the root itself.
    ///
    /// Failing to remove the emptied root is tolerated.
    pub fn remove(self) -> Result<EraseReport, SandboxError> {
        let report = self.erase()?;
        match fs::remove_dir(self.root.path()) {
            Ok(()) => tracing::info!("removed sandbox {}", self.root),
            Err(e) => tracing::debug!("sandbox root {} left in place: {}", self.root, e),
        }
        Ok(report)
    }

    /// True if `path` lies strictly below the sandbox root.
    pub fn contains(&self, path: &Path) -> bool {
        let root = self.root.path().as_os_str().as_encoded_bytes();
        let candidate = path.as_os_str().as_encoded_bytes();
        match candidate.strip_prefix(root) {
            Some([b'/' | b'\\', ..]) => {}
            _ => return false,
        }
        !path.components().any(|c| c == Component::ParentDir)
    }

    fn check_scoped(&self, path: &Path) -> Result<(), SandboxError> {
        if self.contains(path) {
            Ok(())
        } else {
            Err(SandboxError::OutsideSandbox {
                path: path.to_path_buf(),
            })
        }
    }

    /// Write a text fixture, truncating any existing file.
    pub fn write_scoped_file(
        &self,
        path: impl AsRef<Path>,
        text: &str,
    ) -> Result<(), SandboxError> {
        self.write_scoped_bytes(path, text.as_bytes())
    }

    /// Write an exact byte sequence, embedded zero bytes included.
    ///
    /// Used for UTF-16/UTF-32 fixtures that a text write would mangle.
    pub fn write_scoped_bytes(
        &self,
        path: impl AsRef<Path>,
        bytes: &[u8],
    ) -> Result<(), SandboxError> {
        let path = path.as_ref();
        self.check_scoped(path)?;

        let mut file = File::create(path).map_err(|source| SandboxError::OpenForWrite {
            path: path.to_path_buf(),
            source,
        })?;
        file.write_all(bytes)
            .and_then(|()| file.flush())
            .map_err(|source| SandboxError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!("wrote {} byte(s) to {}", bytes.len(), path.display());
        Ok(())
    }

    /// Create a directory (and its parents) inside the sandbox.
    pub fn create_scoped_dir(&self, path: impl AsRef<Path>) -> Result<(), SandboxError> {
        let path = path.as_ref();
        self.check_scoped(path)?;
        fs::create_dir_all(path).map_err(|source| SandboxError::CreateDir {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Remove one file. A file that is already gone is not an error.
    pub fn remove_scoped_file(&self, path: impl AsRef<Path>) -> Result<(), SandboxError> {
        let path = path.as_ref();
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SandboxError::RemoveFile {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Write an options file for the console under test.
    ///
    /// Unlike the fixture writers this never fails the run: a problem is
    /// logged and reported as `false` so the calling case can fail itself.
    pub fn write_options_file(&self, path: impl AsRef<Path>, text: &str) -> bool {
        let path = path.as_ref();
        match self.write_scoped_file(path, text) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("cannot write options test file: {}", e);
                false
            }
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o770))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
