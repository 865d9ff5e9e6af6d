//! CLI subcommand implementations.

pub mod kinds;
pub mod record;
