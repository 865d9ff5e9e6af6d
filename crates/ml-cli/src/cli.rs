//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Live soccer match event recorder.
///
/// Runs the match clock, tags events against either team and exports the
/// timeline and totals as JSON or CSV.
#[derive(Debug, Parser)]
#[command(name = "mlog", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Open the interactive match console.
    Record {
        /// Home team name for this match, overriding the configured one.
        #[arg(long)]
        home: Option<String>,
    },

    /// List the event kinds that can be recorded.
    Kinds,
}
