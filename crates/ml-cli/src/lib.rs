//! Match recorder CLI library.
//!
//! This crate provides the CLI interface for the match recorder.

mod cli;
pub mod commands;
mod config;
pub mod console;
pub mod sink;
pub mod ticker;

pub use cli::{Cli, Commands};
pub use config::Config;
