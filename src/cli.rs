//! Command-line interface for flowprompt
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Voice-following teleprompter for the terminal
#[derive(Parser, Debug)]
#[command(
    name = "flowprompt",
    version,
    about = "Voice-following teleprompter for the terminal"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Script file to prompt from (reads stdin when omitted)
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Countdown before capture starts, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub countdown: Option<u8>,

    /// Save the finished recording to this file
    #[arg(long, value_name = "PATH")]
    pub recording: Option<PathBuf>,

    /// Skip the remote analyzer and chunk locally
    #[arg(long)]
    pub no_analyze: bool,
}

/// Parse a target duration string into milliseconds.
///
/// Supports any duration format accepted by `humantime`: bare numbers
/// (seconds), single-unit (`90s`, `3m`), and compound (`1m30s`).
pub fn parse_target_ms(s: &str) -> Result<u64, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs * 1000);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_millis() as u64)
        .map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chunk a script locally and print the result
    Chunk {
        /// Script file (reads stdin when omitted)
        #[arg(value_name = "SCRIPT")]
        file: Option<PathBuf>,

        /// Rescale duration estimates to a target total. Examples: 90, 90s, 1m30s
        #[arg(long, value_name = "DURATION", value_parser = parse_target_ms)]
        target: Option<u64>,

        /// Print the chunked script as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze a script with the remote service (falls back to local chunking)
    Analyze {
        /// Script file (reads stdin when omitted)
        #[arg(value_name = "SCRIPT")]
        file: Option<PathBuf>,

        /// Print the analyzed script as JSON
        #[arg(long)]
        json: bool,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Dump a configuration template with defaults
    Dump,
}
