//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Editor to LSP bridge
///
/// Registers a language with an editor surface and answers its outline,
/// hover and diagnostic needs from a Language Server Protocol backend.
#[derive(Debug, Parser)]
#[command(name = "edls")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, searches for edls.toml in:
    /// 1. $EDLS_CONFIG environment variable
    /// 2. Current directory
    /// 3. ~/.config/edls/edls.toml
    #[arg(short, long, global = true, value_name = "FILE", env = "EDLS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level
    ///
    /// Valid values: trace, debug, info, warn, error
    #[arg(short, long, global = true, default_value = "info", env = "EDLS_LOG")]
    pub log_level: String,

    /// Output logs as JSON (for structured logging)
    #[arg(long, global = true, default_value = "false", env = "EDLS_LOG_JSON")]
    pub log_json: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the language descriptor and grammar registered with the editor
    Describe {
        /// Print the whole effective configuration as TOML instead
        #[arg(long)]
        toml: bool,
    },

    /// Replay an editor session against a scripted backend
    ///
    /// Prints one JSON line per observable result: opened documents,
    /// edits, hover and outline answers, and marker updates.
    Replay {
        /// JSON script describing backend responses and editor steps
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
    },
}
