// error.rs — Error types for the sandbox subsystem.
//
// Every variant here is a fatal harness defect: the test environment itself
// is unusable. Recoverable per-entry deletion failures never become a
// SandboxError; they are collected in an EraseReport instead.

use std::path::PathBuf;
use thiserror::Error;

use crate::backend::StreamOp;

/// Errors that can occur while resolving, preparing, or using the sandbox.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The home-directory environment variable is not set.
    #[error("environment variable {token} is not set")]
    EnvVarUnset { token: String },

    /// The path template does not contain the expected token.
    #[error("cannot find environment variable {token} in template '{template}'")]
    TokenNotFound { token: String, template: String },

    /// The resolved path has no directory separator.
    #[error("cannot find ending separator: {path}")]
    NoSeparator { path: String },

    /// The directory that should contain the sandbox does not exist.
    #[error("primary directory does not exist: {}", .path.display())]
    PrimaryDirMissing { path: PathBuf },

    /// The working directory of the process cannot be determined.
    #[error("cannot get current directory: {source}")]
    CurrentDirUnavailable { source: std::io::Error },

    /// The sandbox root could not be created.
    #[error("cannot create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A directory stream could not be opened, read, or one of its entries
    /// could not be stat'ed.
    #[error("{op} failed for {}: {source}", .path.display())]
    DirectoryStream {
        op: StreamOp,
        path: PathBuf,
        source: std::io::Error,
    },

    /// A fixture write targeted a path outside the sandbox.
    #[error("file not written to test directory: {}", .path.display())]
    OutsideSandbox { path: PathBuf },

    /// A fixture file could not be opened for writing.
    #[error("cannot open output file {}: {source}", .path.display())]
    OpenForWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A test file could not be removed.
    #[error("cannot remove test file {}: {source}", .path.display())]
    RemoveFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Any other I/O failure on a sandbox path.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
