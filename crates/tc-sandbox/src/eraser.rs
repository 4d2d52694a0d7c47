// eraser.rs — Recursive sandbox erasure with bounded retry.
//
// DirectoryEraser empties a directory: every file and subdirectory below it
// is removed, the directory itself is left in place. Traversal is
// depth-first post-order so a directory is never removed before its contents.
//
// Two failure classes:
// - Directory-stream errors (open/read/stat) are fatal and returned as
//   SandboxError: the sandbox itself is unreachable.
// - A single entry that refuses to go away is retried, pausing between
//   attempts because some platforms release handles asynchronously. If every
//   retry fails the entry is logged and recorded in the EraseReport and the
//   walk continues; the next run's clean pass gets another chance at it.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backend::{DirEntry, EntryKind, FsBackend, PlatformBackend};
use crate::error::SandboxError;
use crate::sleeper::{RealSleeper, Sleeper};

/// How long to keep retrying a removal that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    pause: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;
    pub const DEFAULT_PAUSE: Duration = Duration::from_secs(1);

    pub fn new(max_attempts: u32, pause: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            pause,
        }
    }

    /// Retries after the first failed attempt. Always at least 1.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Pause before each retry.
    pub fn pause(&self) -> Duration {
        self.pause
    }

    /// Upper bound on the time spent waiting for one entry.
    pub fn max_wait(&self) -> Duration {
        self.pause.saturating_mul(self.max_attempts)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_PAUSE)
    }
}

/// An entry that survived every removal attempt.
#[derive(Debug)]
pub struct RemovalFailure {
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Total attempts made, including the first one.
    pub attempts: u32,
    pub error: io::Error,
}

/// Outcome of one erase pass.
#[derive(Debug, Default)]
pub struct EraseReport {
    pub files_removed: usize,
    pub dirs_removed: usize,
    pub failures: Vec<RemovalFailure>,
}

impl EraseReport {
    /// True when nothing was left behind.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record_removed(&mut self, kind: EntryKind) {
        match kind {
            EntryKind::Directory => self.dirs_removed += 1,
            _ => self.files_removed += 1,
        }
    }
}

/// Empties directories through an [`FsBackend`].
///
/// Generic over the backend and the sleeper so tests can inject failing
/// removals and skip the real pauses.
pub struct DirectoryEraser<B = PlatformBackend, S = RealSleeper> {
    backend: B,
    sleeper: S,
    policy: RetryPolicy,
}

impl DirectoryEraser {
    /// Platform backend, real pauses, default retry policy.
    pub fn new() -> Self {
        Self::with_parts(PlatformBackend::default(), RealSleeper::new(), RetryPolicy::default())
    }
}

impl Default for DirectoryEraser {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: FsBackend, S: Sleeper> DirectoryEraser<B, S> {
    pub fn with_parts(backend: B, sleeper: S, policy: RetryPolicy) -> Self {
        Self {
            backend,
            sleeper,
            policy,
        }
    }

    /// Replace the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Remove everything inside `dir`, leaving `dir` itself empty.
    ///
    /// Returns the report of what was removed and what could not be. Only
    /// directory-stream failures produce an error.
    pub fn erase_contents(&self, dir: &Path) -> Result<EraseReport, SandboxError> {
        tracing::debug!(
            "erasing contents of {} ({} backend)",
            dir.display(),
            self.backend.name()
        );
        let mut report = EraseReport::default();
        self.erase_into(dir, &mut report)?;
        tracing::debug!(
            "erased {}: {} file(s), {} dir(s), {} failure(s)",
            dir.display(),
            report.files_removed,
            report.dirs_removed,
            report.failures.len()
        );
        Ok(report)
    }

    fn erase_into(&self, dir: &Path, report: &mut EraseReport) -> Result<(), SandboxError> {
        let entries = self
            .backend
            .list(dir)
            .map_err(|e| SandboxError::DirectoryStream {
                op: e.op,
                path: e.path,
                source: e.source,
            })?;

        for entry in &entries {
            match entry.kind {
                EntryKind::CurrentMarker | EntryKind::ParentMarker => continue,
                EntryKind::Directory => {
                    self.erase_into(&entry.path, report)?;
                    self.remove_with_retry(entry, report);
                }
                EntryKind::RegularFile | EntryKind::Other => {
                    self.remove_with_retry(entry, report);
                }
            }
        }
        Ok(())
    }

    fn remove_once(&self, entry: &DirEntry) -> io::Result<()> {
        match entry.kind {
            EntryKind::Directory => self.backend.remove_dir(&entry.path),
            _ => self.backend.remove_file(&entry.path),
        }
    }

    fn remove_with_retry(&self, entry: &DirEntry, report: &mut EraseReport) {
        let mut last_error = match self.remove_once(entry) {
            Ok(()) => {
                report.record_removed(entry.kind);
                return;
            }
            Err(e) => e,
        };

        tracing::debug!(
            "cannot remove {} yet ({}), retrying",
            entry.path.display(),
            last_error
        );

        for retry in 1..=self.policy.max_attempts() {
            self.sleeper.pause(self.policy.pause());
            match self.remove_once(entry) {
                Ok(()) => {
                    tracing::debug!("removed {} after {} retry(s)", entry.path.display(), retry);
                    report.record_removed(entry.kind);
                    return;
                }
                Err(e) => last_error = e,
            }
        }

        tracing::warn!(
            "cannot remove {} for clean: {}",
            entry.path.display(),
            last_error
        );
        report.failures.push(RemovalFailure {
            path: entry.path.clone(),
            kind: entry.kind,
            attempts: self.policy.max_attempts() + 1,
            error: last_error,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{StreamError, StreamOp};
    use crate::sleeper::MockSleeper;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    /// Wraps the platform backend and refuses to remove selected names.
    ///
    /// A name mapped to `None` never goes away; `Some(n)` fails `n` times
    /// and then succeeds.
    struct StubbornBackend {
        inner: PlatformBackend,
        stuck: RefCell<HashMap<String, Option<u32>>>,
    }

    impl StubbornBackend {
        fn new(stuck: &[(&str, Option<u32>)]) -> Self {
            Self {
                inner: PlatformBackend::default(),
                stuck: RefCell::new(
                    stuck
                        .iter()
                        .map(|(name, n)| (name.to_string(), *n))
                        .collect(),
                ),
            }
        }

        fn check(&self, path: &Path) -> io::Result<()> {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            let mut stuck = self.stuck.borrow_mut();
            match stuck.get_mut(&name) {
                Some(None) => Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked")),
                Some(Some(0)) => Ok(()),
                Some(Some(n)) => {
                    *n -= 1;
                    Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"))
                }
                None => Ok(()),
            }
        }
    }

    impl FsBackend for StubbornBackend {
        fn list(&self, dir: &Path) -> Result<Vec<DirEntry>, StreamError> {
            self.inner.list(dir)
        }

        fn remove_file(&self, path: &Path) -> io::Result<()> {
            self.check(path)?;
            self.inner.remove_file(path)
        }

        fn remove_dir(&self, path: &Path) -> io::Result<()> {
            self.check(path)?;
            self.inner.remove_dir(path)
        }

        fn name(&self) -> &str {
            "stubborn"
        }
    }

    struct UnreadableBackend;

    impl FsBackend for UnreadableBackend {
        fn list(&self, dir: &Path) -> Result<Vec<DirEntry>, StreamError> {
            Err(StreamError::new(
                StreamOp::Read,
                dir,
                io::Error::new(io::ErrorKind::Other, "stream broke"),
            ))
        }

        fn remove_file(&self, _path: &Path) -> io::Result<()> {
            Ok(())
        }

        fn remove_dir(&self, _path: &Path) -> io::Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "unreadable"
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(0))
    }

    #[test]
    fn erase_empty_directory_is_noop() {
        let dir = tempdir().unwrap();
        let report = DirectoryEraser::new().erase_contents(dir.path()).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.files_removed, 0);
        assert_eq!(report.dirs_removed, 0);
        assert!(dir.path().exists());
    }

    #[test]
    fn erase_removes_files_and_subdirectories() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("a/b.txt"), b"b").unwrap();
        fs::create_dir(dir.path().join("c")).unwrap();

        let report = DirectoryEraser::new().erase_contents(dir.path()).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.files_removed, 1);
        assert_eq!(report.dirs_removed, 2);
        assert!(dir.path().exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn erase_deep_tree() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("one/two/three/four")).unwrap();
        fs::write(dir.path().join("one/two/three/four/leaf.txt"), b"x").unwrap();
        fs::write(dir.path().join("one/top.txt"), b"y").unwrap();

        let report = DirectoryEraser::new().erase_contents(dir.path()).unwrap();

        assert_eq!(report.dirs_removed, 4);
        assert_eq!(report.files_removed, 2);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn erase_twice_yields_same_state() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), b"f").unwrap();

        let eraser = DirectoryEraser::new();
        eraser.erase_contents(dir.path()).unwrap();
        let second = eraser.erase_contents(dir.path()).unwrap();

        assert!(second.is_clean());
        assert_eq!(second.files_removed, 0);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn stuck_file_gives_up_and_continues() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("locked.txt"), b"locked").unwrap();
        fs::write(dir.path().join("free.txt"), b"free").unwrap();

        let sleeper = MockSleeper::new();
        let eraser = DirectoryEraser::with_parts(
            StubbornBackend::new(&[("locked.txt", None)]),
            &sleeper,
            fast_policy(5),
        );
        let report = eraser.erase_contents(dir.path()).unwrap();

        assert_eq!(sleeper.pauses(), 5);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].attempts, 6);
        assert_eq!(report.failures[0].path, dir.path().join("locked.txt"));
        assert_eq!(report.files_removed, 1);
        assert!(!dir.path().join("free.txt").exists());
        assert!(dir.path().join("locked.txt").exists());
    }

    #[test]
    fn late_release_is_removed_without_failure() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("slow")).unwrap();

        let sleeper = MockSleeper::new();
        let eraser = DirectoryEraser::with_parts(
            StubbornBackend::new(&[("slow", Some(2))]),
            &sleeper,
            fast_policy(20),
        );
        let report = eraser.erase_contents(dir.path()).unwrap();

        assert!(report.is_clean());
        assert_eq!(sleeper.pauses(), 2);
        assert_eq!(report.dirs_removed, 1);
        assert!(!dir.path().join("slow").exists());
    }

    #[test]
    fn stuck_directory_keeps_going_with_siblings() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("held/inner")).unwrap();
        fs::write(dir.path().join("held/inner/x.txt"), b"x").unwrap();
        fs::write(dir.path().join("other.txt"), b"o").unwrap();

        let sleeper = MockSleeper::new();
        let eraser = DirectoryEraser::with_parts(
            StubbornBackend::new(&[("held", None)]),
            &sleeper,
            fast_policy(3),
        );
        let report = eraser.erase_contents(dir.path()).unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, EntryKind::Directory);
        // Contents of the stuck directory are still gone.
        assert!(!dir.path().join("held/inner").exists());
        assert!(!dir.path().join("other.txt").exists());
    }

    #[test]
    fn stream_error_is_fatal() {
        let dir = tempdir().unwrap();
        let eraser =
            DirectoryEraser::with_parts(UnreadableBackend, MockSleeper::new(), fast_policy(1));

        let err = eraser.erase_contents(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            SandboxError::DirectoryStream {
                op: StreamOp::Read,
                ..
            }
        ));
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = tempdir().unwrap();
        let err = DirectoryEraser::new()
            .erase_contents(&dir.path().join("gone"))
            .unwrap_err();
        assert!(matches!(
            err,
            SandboxError::DirectoryStream {
                op: StreamOp::Open,
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_to_outside_directory_is_unlinked_not_followed() {
        let tmp = tempdir().unwrap();
        let outside = tmp.path().join("outside");
        let root = tmp.path().join("sandbox");
        fs::create_dir(&outside).unwrap();
        fs::write(outside.join("keep.txt"), b"keep").unwrap();
        fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();

        let sleeper = MockSleeper::new();
        let eraser =
            DirectoryEraser::with_parts(PlatformBackend::default(), &sleeper, fast_policy(1));
        let report = eraser.erase_contents(&root).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.files_removed, 1);
        assert_eq!(report.dirs_removed, 0);
        assert!(fs::symlink_metadata(root.join("link")).is_err());
        assert_eq!(fs::read(outside.join("keep.txt")).unwrap(), b"keep");
        assert_eq!(sleeper.pauses(), 0);
    }

    #[test]
    fn retry_policy_clamps_to_one_attempt() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.max_wait(), Duration::from_secs(1));
    }

    #[test]
    fn default_policy_waits_at_most_twenty_seconds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 20);
        assert_eq!(policy.pause(), Duration::from_secs(1));
        assert_eq!(policy.max_wait(), Duration::from_secs(20));
    }
}
