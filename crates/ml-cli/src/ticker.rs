//! Once-a-second publication of the match clock while it is running.
//!
//! The ticker never touches the session. It holds a copy of the clock taken
//! when it was started, which stays accurate because the clock only changes
//! on transitions, and every transition restarts or stops the ticker.

use std::sync::Arc;
use std::time::Duration;

use ml_core::{Clock, WallClock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Publishes elapsed seconds through a watch channel.
#[derive(Debug)]
pub struct Ticker {
    tx: Arc<watch::Sender<u64>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Creates a stopped ticker and a receiver for its readings.
    pub fn new() -> (Self, watch::Receiver<u64>) {
        let (tx, rx) = watch::channel(0);
        (
            Self {
                tx: Arc::new(tx),
                handle: None,
            },
            rx,
        )
    }

    /// Starts publishing readings of `clock`, replacing any running task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self, clock: Clock, wall: Arc<dyn WallClock>) {
        self.stop();
        self.tx.send_replace(clock.elapsed_seconds(wall.now()));

        let tx = Arc::clone(&self.tx);
        self.handle = Some(tokio::spawn(async move {
            let mut ticks = interval(TICK_PERIOD);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                let elapsed = clock.elapsed_seconds(wall.now());
                tracing::trace!(elapsed, "tick");
                tx.send_replace(elapsed);
            }
        }));
        tracing::debug!("ticker started");
    }

    /// Stops the periodic task. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("ticker stopped");
        }
    }

    /// Publishes a reading without starting the task.
    pub fn publish(&self, elapsed: u64) {
        self.tx.send_replace(elapsed);
    }

    pub const fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
