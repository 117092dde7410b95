#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod shell;

pub use cli::run_from_env;
pub use error::{CliError, Result};
