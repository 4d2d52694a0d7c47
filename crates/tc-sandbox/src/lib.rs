//! # tc-sandbox
//!
//! Sandbox directory lifecycle for the console test harness.
//!
//! Every test run gets one dedicated directory tree (the sandbox) below the
//! user's home directory. It is created and scrubbed before the first case
//! runs and erased after the last one, and fixture files may only be written
//! inside it.
//!
//! ## Key components
//!
//! - [`resolver`] — expands the home-directory token of a path template into
//!   the concrete [`SandboxRoot`].
//! - [`DirectoryEraser`] — depth-first recursive erasure with a bounded retry
//!   loop for entries the OS releases late.
//! - [`FsBackend`] — the traversal seam the eraser is written against, with
//!   one backend per platform.
//! - [`SandboxGuard`] — owns the root; create/remove plus confined fixture
//!   writers.
//!
//! Nothing in this crate terminates the process. Fatal conditions come back
//! as [`SandboxError`] and the harness binary decides what to do with them.

pub mod backend;
pub mod eraser;
pub mod error;
pub mod guard;
pub mod resolver;
pub mod sleeper;

pub use backend::{DirEntry, EntryKind, FsBackend, PlatformBackend, StreamError, StreamOp};
pub use eraser::{DirectoryEraser, EraseReport, RemovalFailure, RetryPolicy};
pub use error::SandboxError;
pub use guard::SandboxGuard;
pub use resolver::{current_directory, EnvToken, SandboxRoot, SandboxTemplate};
pub use sleeper::{MockSleeper, RealSleeper, Sleeper};
