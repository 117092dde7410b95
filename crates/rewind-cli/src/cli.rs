#![forbid(unsafe_code)]

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::RewindConfig;
use crate::error::Result;
use crate::shell::{ShellArgs, run_shell};

#[derive(Debug, Parser)]
#[command(
    name = "rewind",
    about = "Keep a list of grudges with full undo and redo",
    version
)]
pub struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Read grudge commands from stdin or a script.
    Shell(ShellArgs),

    /// Print the effective config as TOML.
    #[command(name = "show-config")]
    ShowConfig,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let config = RewindConfig::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Shell(args) => run_shell(config, args),
        Commands::ShowConfig => {
            config.ensure_valid()?;
            let text = config.to_toml_string()?;
            std::io::stdout().lock().write_all(text.as_bytes())?;
            Ok(())
        }
    }
}
