//! CLI interface for RLM
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::repl::{is_posix_shell, POSIX_SHELLS};

/// Recursive task decomposition over a local Ollama model
///
/// Splits a task into sub-tasks, answers each against the supplied context
/// and aggregates the results. The smart variant tries a single direct
/// answer first and only decomposes when the model is unsure.
#[derive(Parser, Debug)]
#[command(name = "rlm")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Shorthand for --log debug
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Log level requested on the command line, if any
    pub fn log_level(&self) -> Option<&str> {
        match (&self.log, self.verbose) {
            (Some(level), _) => Some(level.as_str()),
            (None, true) => Some("debug"),
            (None, false) => None,
        }
    }
}

/// Arguments shared by both pipeline variants
#[derive(Args, Debug, Clone)]
pub struct TaskArgs {
    /// The task to solve
    #[arg(short, long)]
    pub task: String,

    /// Context text, or a path to a file holding it
    #[arg(short, long, default_value = "")]
    pub context: String,

    /// Ollama model (overrides config and RLM_MODEL)
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full pipeline: split, process each sub-task, aggregate
    Run {
        #[command(flatten)]
        args: TaskArgs,
    },

    /// Try a direct answer first, fall back to the full pipeline
    Smart {
        #[command(flatten)]
        args: TaskArgs,

        /// Minimum confidence for an early exit (0.0-1.0)
        #[arg(long, value_parser = parse_confidence)]
        confidence: Option<f64>,
    },

    /// Manage stored per-user context
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Execute a snippet in the local execution environment
    Exec {
        /// Code to execute
        #[arg(long, conflicts_with = "file")]
        code: Option<String>,

        /// File holding the code to execute
        #[arg(long)]
        file: Option<PathBuf>,

        /// POSIX-compatible shell used to run the code (sh, bash, dash, ...)
        #[arg(long, default_value = "sh", value_parser = parse_interpreter)]
        interpreter: String,
    },
}

/// Context store actions
#[derive(Subcommand, Debug)]
pub enum ContextAction {
    /// Save a file's contents as a user's context
    Save {
        /// User identifier
        #[arg(long)]
        user_id: String,

        /// File to read
        #[arg(long)]
        file: PathBuf,

        /// Kind of context, recorded in the metadata
        #[arg(long, default_value = "chat")]
        kind: String,
    },

    /// Print (or write out) a user's context
    Load {
        /// User identifier
        #[arg(long)]
        user_id: String,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List stored contexts
    List,

    /// Remove a user's context and metadata
    Clear {
        /// User identifier
        #[arg(long)]
        user_id: String,
    },

    /// Store a named context file (logs, source files, ...)
    Put {
        /// Name relative to the store directory
        #[arg(long)]
        name: String,

        /// File to read
        #[arg(long)]
        file: PathBuf,
    },
}

fn parse_confidence(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} is not in 0.0..=1.0", value))
    }
}

fn parse_interpreter(raw: &str) -> Result<String, String> {
    if is_posix_shell(raw) {
        Ok(raw.to_string())
    } else {
        Err(format!(
            "'{}' is not a POSIX shell; expected one of: {}",
            raw,
            POSIX_SHELLS.join(", ")
        ))
    }
}
