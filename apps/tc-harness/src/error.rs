// error.rs — Fatal harness errors with the source location they came from.
//
// A HarnessError means the run cannot continue. Each variant carries the
// file and line where it was raised: the `From` conversions are
// #[track_caller], so a plain `?` on a SandboxError or anyhow::Error records
// the location of that `?`.

use std::fmt;
use std::panic::Location;

use tc_sandbox::SandboxError;
use thiserror::Error;

/// File and line of the code that raised a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
}

impl SourceLocation {
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.file, self.line)
    }
}

#[derive(Debug, Error)]
pub enum HarnessError {
    /// The sandbox could not be resolved, prepared, or used.
    #[error("{source}")]
    Fatal {
        source: SandboxError,
        location: SourceLocation,
    },

    /// Configuration could not be loaded.
    #[error("{error:#}")]
    Config {
        error: anyhow::Error,
        location: SourceLocation,
    },

    /// A case found the harness itself unusable.
    #[error("{message}")]
    Defect {
        message: String,
        location: SourceLocation,
    },
}

impl HarnessError {
    #[track_caller]
    pub fn defect(message: impl Into<String>) -> Self {
        HarnessError::Defect {
            message: message.into(),
            location: SourceLocation::caller(),
        }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            HarnessError::Fatal { location, .. }
            | HarnessError::Config { location, .. }
            | HarnessError::Defect { location, .. } => *location,
        }
    }
}

impl From<SandboxError> for HarnessError {
    #[track_caller]
    fn from(source: SandboxError) -> Self {
        HarnessError::Fatal {
            source,
            location: SourceLocation::caller(),
        }
    }
}

impl From<anyhow::Error> for HarnessError {
    #[track_caller]
    fn from(error: anyhow::Error) -> Self {
        HarnessError::Config {
            error,
            location: SourceLocation::caller(),
        }
    }
}
