//! Record command: the interactive match console on stdin/stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use ml_core::{MemoryStore, Recorder, SessionStore, SystemWallClock, TeamName};
use tokio::io::BufReader;

use crate::Config;
use crate::console::Console;
use crate::sink::DirectorySink;

/// Runs the console until `quit` or end of input.
pub fn run(config: &Config, home: Option<&str>) -> Result<()> {
    let home_team = TeamName::new(home.unwrap_or(&config.home_team))
        .context("home team name must not be blank")?;
    tracing::debug!(home = %home_team, export_dir = %config.export_dir.display(), "opening console");

    // One thread: every transition runs to completion before the next line is read.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::new());
    let sink = DirectorySink::new(&config.export_dir);
    let result = runtime.block_on(async move {
        let recorder = Recorder::open(home_team, Arc::new(SystemWallClock), store);
        let mut console = Console::new(recorder, Box::new(sink), std::io::stdout());
        console.run(BufReader::new(tokio::io::stdin())).await
    });

    // A blocking stdin read may still be parked; don't wait for it.
    runtime.shutdown_background();
    result
}
