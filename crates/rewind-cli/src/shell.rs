#![forbid(unsafe_code)]

//! Line-oriented front end for a grudge [`Store`].
//!
//! Each input line is one command. Changes go through the store, so the
//! list printed after a command is always the store's present snapshot.
//!
//! ```text
//!   stdin / --script
//!        |
//!        v
//!   ShellCommand::from_str ----> Store<GrudgeReducer>
//!                                   |  dispatch / undo / redo
//!                                   v
//!                     Selector<Summary>  Selector<(can_undo, can_redo)>
//!                                   |
//!                                   v
//!                           stdout (list, status)
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Args;
use rewind_grudges::{
    GrudgeAction, GrudgeId, GrudgeReducer, Grudges, Summary, parse_seed, render_list,
};
use rewind_runtime::{Selector, Store};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::RewindConfig;
use crate::error::{CliError, Result};
use crate::logging;

pub const HELP: &str = "\
commands:
  add <person> | <reason>   record a new grudge
  forgive <id>              toggle the forgiven flag of a grudge
  undo                      step back one change
  redo                      step forward one change
  list                      print all grudges
  status                    print counts and undo/redo availability
  help                      print this text
  quit                      end the session
";

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Args)]
pub struct ShellArgs {
    /// JSON seed file with the initial grudges (overrides `seed.path`).
    #[arg(long)]
    pub seed: Option<PathBuf>,

    /// Read commands from this file instead of stdin.
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Maximum number of undo steps kept (overrides `history.max_depth`).
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Log filter used when RUST_LOG is unset (overrides `log.level`).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Stop at the first rejected command and exit non-zero.
    #[arg(long)]
    pub strict: bool,
}

impl ShellArgs {
    /// Fold command-line overrides into `config`.
    pub fn apply_to(&self, config: &mut RewindConfig) {
        if let Some(depth) = self.max_depth {
            config.history.max_depth = Some(depth);
        }
        if let Some(level) = &self.log_level {
            config.log.level.clone_from(level);
        }
        if let Some(seed) = &self.seed {
            config.seed.path = Some(seed.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Add { person: String, reason: String },
    Forgive(GrudgeId),
    Undo,
    Redo,
    List,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command {word:?} (try `help`)")]
    Unknown { word: String },

    #[error("usage: {usage}")]
    Usage { usage: &'static str },

    #[error("invalid grudge id {input:?}")]
    InvalidId { input: String },

    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

impl FromStr for ShellCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let bare = |command: Self, usage: &'static str| {
            if rest.is_empty() {
                Ok(command)
            } else {
                Err(ParseCommandError::Usage { usage })
            }
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Err(ParseCommandError::Empty),
            "add" => parse_add(rest),
            "forgive" => parse_id(rest).map(Self::Forgive),
            "undo" => bare(Self::Undo, "undo"),
            "redo" => bare(Self::Redo, "redo"),
            "list" | "ls" => bare(Self::List, "list"),
            "status" => bare(Self::Status, "status"),
            "help" | "?" => bare(Self::Help, "help"),
            "quit" | "exit" => bare(Self::Quit, "quit"),
            _ => Err(ParseCommandError::Unknown {
                word: word.to_string(),
            }),
        }
    }
}

fn parse_add(rest: &str) -> std::result::Result<ShellCommand, ParseCommandError> {
    const USAGE: &str = "add <person> | <reason>";
    let Some((person, reason)) = rest.split_once('|') else {
        return Err(ParseCommandError::Usage { usage: USAGE });
    };
    let (person, reason) = (person.trim(), reason.trim());
    if person.is_empty() || reason.is_empty() {
        return Err(ParseCommandError::Usage { usage: USAGE });
    }
    Ok(ShellCommand::Add {
        person: person.to_string(),
        reason: reason.to_string(),
    })
}

fn parse_id(rest: &str) -> std::result::Result<GrudgeId, ParseCommandError> {
    if rest.is_empty() {
        return Err(ParseCommandError::Usage {
            usage: "forgive <id>",
        });
    }
    rest.strip_prefix('#')
        .unwrap_or(rest)
        .parse::<u64>()
        .map(GrudgeId)
        .map_err(|_| ParseCommandError::InvalidId {
            input: rest.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Shell
// ---------------------------------------------------------------------------

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub executed: usize,
    pub rejected: usize,
}

/// Drives a [`Store`] from text commands, writing results to `out`.
pub struct Shell<W> {
    store: Store<GrudgeReducer>,
    out: W,
    strict: bool,
    prompt: bool,
    summary: Selector<Summary>,
    availability: Selector<(bool, bool)>,
}

impl<W: Write> Shell<W> {
    pub fn new(store: Store<GrudgeReducer>, out: W) -> Self {
        let summary = store.select(
            |h| Summary::of(h.present()),
            |summary| info!(%summary, "grudge list changed"),
        );
        let availability = store.select_availability(|&(can_undo, can_redo)| {
            debug!(can_undo, can_redo, "undo availability changed");
        });
        Self {
            store,
            out,
            strict: false,
            prompt: false,
            summary,
            availability,
        }
    }

    /// Abort on the first rejected command instead of reporting it.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Print a `> ` prompt before each command.
    #[must_use]
    pub fn prompt(mut self, prompt: bool) -> Self {
        self.prompt = prompt;
        self
    }

    #[must_use]
    pub fn store(&self) -> &Store<GrudgeReducer> {
        &self.store
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Run commands from `input` until it ends or `quit` is read.
    pub fn run(&mut self, mut input: impl BufRead) -> Result<SessionReport> {
        let mut report = SessionReport::default();
        let mut buf = Vec::new();
        let mut line = 0;
        self.show_prompt()?;
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line += 1;

            let outcome = match std::str::from_utf8(&buf) {
                Ok(text) => {
                    let text = text.trim();
                    if text.is_empty() || text.starts_with('#') {
                        self.show_prompt()?;
                        continue;
                    }
                    text.parse::<ShellCommand>()
                        .map_err(|source| CliError::Command { line, source })
                        .and_then(|command| self.execute(line, command))
                }
                Err(_) => Err(CliError::Command {
                    line,
                    source: ParseCommandError::InvalidUtf8,
                }),
            };
            match outcome {
                Ok(Flow::Continue) => report.executed += 1,
                Ok(Flow::Quit) => break,
                Err(err) if err.is_recoverable() && !self.strict => {
                    report.rejected += 1;
                    writeln!(self.out, "error: {err}")?;
                }
                Err(err) => return Err(err),
            }
            self.show_prompt()?;
        }

        info!(
            executed = report.executed,
            rejected = report.rejected,
            version = self.store.version(),
            "session finished"
        );
        Ok(report)
    }

    /// Run one command.
    pub fn execute(&mut self, line: usize, command: ShellCommand) -> Result<Flow> {
        debug!(line, ?command, "shell command");
        match command {
            ShellCommand::Add { person, reason } => {
                self.dispatch(line, GrudgeAction::add(person, reason))?;
                self.print_list()?;
            }
            ShellCommand::Forgive(id) => {
                self.dispatch(line, GrudgeAction::toggle(id))?;
                self.print_list()?;
            }
            ShellCommand::Undo => {
                if self.store.undo() {
                    self.print_list()?;
                } else {
                    writeln!(self.out, "nothing to undo")?;
                }
            }
            ShellCommand::Redo => {
                if self.store.redo() {
                    self.print_list()?;
                } else {
                    writeln!(self.out, "nothing to redo")?;
                }
            }
            ShellCommand::List => self.print_list()?,
            ShellCommand::Status => self.print_status()?,
            ShellCommand::Help => self.out.write_all(HELP.as_bytes())?,
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn dispatch(&self, line: usize, action: GrudgeAction) -> Result<()> {
        self.store
            .dispatch(action)
            .map_err(|source| CliError::Grudge { line, source })
    }

    fn print_list(&mut self) -> Result<()> {
        let list = render_list(&self.store.present());
        self.out.write_all(list.as_bytes())?;
        Ok(())
    }

    fn print_status(&mut self) -> Result<()> {
        let (can_undo, can_redo) = self.availability.get();
        let (past, future) = self
            .store
            .with_history(|h| (h.past_depth(), h.future_depth()));
        writeln!(self.out, "{}", self.summary.get())?;
        writeln!(
            self.out,
            "undo: {} ({past} steps), redo: {} ({future} steps)",
            yes_no(can_undo),
            yes_no(can_redo),
        )?;
        Ok(())
    }

    fn show_prompt(&mut self) -> Result<()> {
        if self.prompt {
            write!(self.out, "> ")?;
            self.out.flush()?;
        }
        Ok(())
    }
}

/// What the session loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Read and number a JSON seed file.
pub fn load_seed(path: &Path) -> Result<Grudges> {
    let json = std::fs::read_to_string(path).map_err(|source| CliError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_seed(&json).map_err(|source| CliError::Seed {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the store described by `config`.
pub fn build_store(config: &RewindConfig) -> Result<Store<GrudgeReducer>> {
    let initial = match &config.seed.path {
        Some(path) => load_seed(path)?,
        None => Grudges::new(),
    };
    let history = config.history.to_history_config();
    info!(
        grudges = initial.len(),
        max_depth = ?config.history.max_depth,
        "starting grudge store"
    );
    Ok(Store::with_config(GrudgeReducer, initial, history))
}

pub fn run_shell(mut config: RewindConfig, args: ShellArgs) -> Result<()> {
    args.apply_to(&mut config);
    config.ensure_valid()?;
    logging::init(&config.log.level)?;

    let store = build_store(&config)?;
    let stdout = io::stdout();

    let report = match &args.script {
        Some(path) => {
            let file = File::open(path).map_err(|source| CliError::ReadFile {
                path: path.clone(),
                source,
            })?;
            let input = BufReader::new(file);
            Shell::new(store, stdout.lock())
                .strict(args.strict)
                .run(input)?
        }
        None => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            Shell::new(store, stdout.lock())
                .strict(args.strict)
                .prompt(interactive)
                .run(stdin.lock())?
        }
    };
    debug!(?report, "shell exited");
    Ok(())
}
