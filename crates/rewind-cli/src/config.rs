#![forbid(unsafe_code)]

//! File-backed settings for the `rewind` shell.
//!
//! ```toml
//! # rewind.toml
//! [history]
//! max_depth = 50
//!
//! [log]
//! level = "info"
//!
//! [seed]
//! path = "grudges.json"
//! ```
//!
//! Every section is optional. A missing `max_depth` keeps unlimited history,
//! and a relative seed path is resolved against the config file's directory.

use std::path::{Path, PathBuf};

use rewind_runtime::HistoryConfig;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::{CliError, Result};

pub const DEFAULT_LOG_LEVEL: &str = "warn";

// ---------------------------------------------------------------------------
// RewindConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewindConfig {
    pub history: HistoryPolicyConfig,
    pub log: LogConfig,
    pub seed: SeedConfig,
}

/// `[history]`: retention policy for the undo stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryPolicyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

impl HistoryPolicyConfig {
    #[must_use]
    pub fn to_history_config(&self) -> HistoryConfig {
        self.max_depth
            .map_or_else(HistoryConfig::unlimited, HistoryConfig::new)
    }
}

/// `[log]`: fallback filter when `RUST_LOG` is unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// `[seed]`: initial snapshot loaded before the first command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl RewindConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file, resolving a relative seed path against the
    /// file's directory.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        if let (Some(seed), Some(dir)) = (config.seed.path.as_mut(), path.parent())
            && seed.is_relative()
        {
            *seed = dir.join(&*seed);
        }
        Ok(config)
    }

    /// Load `path` if given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_toml_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate all values. An empty list means the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.log.level.trim().is_empty() {
            errors.push("log.level must not be empty".into());
        } else if let Err(err) = EnvFilter::try_new(&self.log.level) {
            errors.push(format!("log.level {:?} is not a valid filter: {err}", self.log.level));
        }

        if let Some(path) = &self.seed.path
            && path.as_os_str().is_empty()
        {
            errors.push("seed.path must not be empty".into());
        }

        errors
    }

    /// Like [`validate`](Self::validate), as a single error.
    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CliError::InvalidConfig { errors })
        }
    }
}
