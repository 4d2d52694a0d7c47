// resolver.rs — Sandbox path resolution.
//
// The sandbox location is written as a template that starts from the user's
// home directory, e.g. `$HOME/Projects/FmtTest/ut-testcon`. Resolution
// substitutes the token once at startup and checks that the directory which
// will contain the sandbox exists. The sandbox leaf itself may not exist yet.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::SandboxError;

/// An environment-variable placeholder inside a path template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvToken {
    raw: &'static str,
    var: &'static str,
}

impl EnvToken {
    pub const HOME_UNIX: EnvToken = EnvToken {
        raw: "$HOME",
        var: "HOME",
    };

    pub const HOME_WINDOWS: EnvToken = EnvToken {
        raw: "%USERPROFILE%",
        var: "USERPROFILE",
    };

    /// The home-directory token for the build target.
    pub fn platform_home() -> Self {
        if cfg!(windows) {
            Self::HOME_WINDOWS
        } else {
            Self::HOME_UNIX
        }
    }

    /// The token as it appears in a template (`$HOME`).
    pub fn raw(&self) -> &'static str {
        self.raw
    }

    /// The variable to look up (`HOME`).
    pub fn var(&self) -> &'static str {
        self.var
    }
}

/// The resolved, absolute sandbox directory.
///
/// Created once by [`SandboxTemplate::resolve`] and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxRoot(PathBuf);

impl SandboxRoot {
    /// Wrap an already-resolved path. Used by tests and by callers that
    /// bypass the template (for example a temp directory).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// The directory that contains the sandbox.
    pub fn primary_dir(&self) -> Option<&Path> {
        self.0.parent()
    }
}

impl AsRef<Path> for SandboxRoot {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for SandboxRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// A sandbox path template containing one [`EnvToken`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxTemplate {
    template: String,
    token: EnvToken,
}

impl SandboxTemplate {
    /// Name of the sandbox leaf directory.
    pub const LEAF: &'static str = "ut-testcon";

    pub fn new(template: impl Into<String>, token: EnvToken) -> Self {
        Self {
            template: template.into(),
            token,
        }
    }

    /// The standard layout: `<home>/Projects/<product>Test/ut-testcon`.
    pub fn for_product(product: &str) -> Self {
        let token = EnvToken::platform_home();
        let sep = std::path::MAIN_SEPARATOR;
        let template = format!(
            "{token}{sep}Projects{sep}{product}Test{sep}{leaf}",
            token = token.raw(),
            leaf = Self::LEAF,
        );
        Self::new(template, token)
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn token(&self) -> EnvToken {
        self.token
    }

    /// Resolve against the process environment.
    pub fn resolve(&self) -> Result<SandboxRoot, SandboxError> {
        self.resolve_with(|var| std::env::var(var).ok())
    }

    /// Resolve with an explicit variable lookup.
    ///
    /// A variable that is unset or not valid Unicode counts as unset.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<SandboxRoot, SandboxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = self.token.raw();
        let value = lookup(self.token.var()).ok_or_else(|| SandboxError::EnvVarUnset {
            token: raw.to_string(),
        })?;

        if !self.template.contains(raw) {
            return Err(SandboxError::TokenNotFound {
                token: raw.to_string(),
                template: self.template.clone(),
            });
        }
        let resolved = self.template.replacen(raw, &value, 1);

        let split = resolved
            .rfind(|c: char| c == '/' || c == '\\')
            .ok_or_else(|| SandboxError::NoSeparator {
                path: resolved.clone(),
            })?;
        let primary = Path::new(&resolved[..split]);
        if !primary.is_dir() {
            return Err(SandboxError::PrimaryDirMissing {
                path: primary.to_path_buf(),
            });
        }

        tracing::debug!("sandbox path resolved to {}", resolved);
        Ok(SandboxRoot(PathBuf::from(resolved)))
    }
}

/// The working directory of the process.
pub fn current_directory() -> Result<PathBuf, SandboxError> {
    std::env::current_dir().map_err(|source| SandboxError::CurrentDirUnavailable { source })
}
