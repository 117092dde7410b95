#![forbid(unsafe_code)]

use std::path::PathBuf;

use rewind_grudges::GrudgeError;
use thiserror::Error;

use crate::shell::ParseCommandError;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    #[error("invalid config: {}", .errors.join("; "))]
    InvalidConfig { errors: Vec<String> },

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load seed {path}: {source}")]
    Seed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("logging setup failed: {message}")]
    Logging { message: String },

    #[error("line {line}: {source}")]
    Command {
        line: usize,
        #[source]
        source: ParseCommandError,
    },

    #[error("line {line}: {source}")]
    Grudge {
        line: usize,
        #[source]
        source: GrudgeError,
    },
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigParse(_) | Self::InvalidConfig { .. } => 2,
            Self::Command { .. } | Self::Grudge { .. } => 3,
            _ => 1,
        }
    }

    /// Whether a non-strict session reports this error and keeps reading.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Command { .. } | Self::Grudge { .. })
    }
}
