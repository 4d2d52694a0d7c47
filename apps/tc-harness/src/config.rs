//! Harness configuration.
//!
//! Read from a TOML file named by `--config` or `$UT_TESTCON_CONFIG`; every
//! field has a default, so an absent file means built-in behaviour.
//!
//! ```toml
//! product = "Fmt"
//! pause_on_defect = false
//!
//! [retry]
//! max_attempts = 20
//! pause_ms = 1000
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tc_console::DefectPolicy;
use tc_sandbox::{EnvToken, RetryPolicy, SandboxTemplate};

/// Environment variable naming a configuration file.
pub const CONFIG_ENV_VAR: &str = "UT_TESTCON_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Product name; the sandbox lives in `<home>/Projects/<product>Test/`.
    #[serde(default = "default_product")]
    pub product: String,

    /// Full sandbox path template, overriding `product`. Must contain the
    /// platform home token (`$HOME` or `%USERPROFILE%`).
    #[serde(default)]
    pub sandbox_template: Option<String>,

    /// Wait for ENTER after each usage defect.
    #[serde(default)]
    pub pause_on_defect: bool,

    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            product: default_product(),
            sandbox_template: None,
            pause_on_defect: false,
            retry: RetryConfig::default(),
        }
    }
}

/// Retry settings for entries that resist deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            pause_ms: default_pause_ms(),
        }
    }
}

fn default_product() -> String {
    "Fmt".to_string()
}

fn default_max_attempts() -> u32 {
    RetryPolicy::DEFAULT_MAX_ATTEMPTS
}

fn default_pause_ms() -> u64 {
    RetryPolicy::DEFAULT_PAUSE.as_millis() as u64
}

impl HarnessConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("cannot parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Find the configuration for this run: the explicit path, else the
    /// environment variable, else defaults.
    pub fn locate(explicit: Option<&Path>) -> anyhow::Result<Self> {
        Self::locate_with(explicit, std::env::var_os(CONFIG_ENV_VAR))
    }

    pub fn locate_with(explicit: Option<&Path>, from_env: Option<OsString>) -> anyhow::Result<Self> {
        let path = match (explicit, from_env) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(value)) if !value.is_empty() => PathBuf::from(value),
            _ => {
                tracing::debug!("no config file, using defaults");
                return Ok(Self::default());
            }
        };
        tracing::debug!("loading config from {}", path.display());
        Self::load(&path)
    }

    pub fn template(&self) -> SandboxTemplate {
        match &self.sandbox_template {
            Some(template) => SandboxTemplate::new(template.clone(), EnvToken::platform_home()),
            None => SandboxTemplate::for_product(&self.product),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.pause_ms),
        )
    }

    pub fn defect_policy(&self) -> DefectPolicy {
        if self.pause_on_defect {
            DefectPolicy::Pause
        } else {
            DefectPolicy::Warn
        }
    }
}
