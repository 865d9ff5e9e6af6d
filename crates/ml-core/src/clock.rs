//! Match clock: elapsed seconds of play derived from wall-clock instants.
//!
//! The clock never accumulates paused time. While ticking, elapsed time is
//! recomputed from an anchor instant; resuming re-bases that anchor so the
//! elapsed value is continuous across the pause.

use chrono::{DateTime, Duration, Utc};

/// Source of wall-clock instants.
pub trait WallClock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(any(test, feature = "test-util"))]
pub use manual::ManualWallClock;

#[cfg(any(test, feature = "test-util"))]
mod manual {
    use std::sync::atomic::{AtomicI64, Ordering};

    use chrono::{DateTime, Duration, TimeDelta, Utc};

    use super::WallClock;

    /// Wall clock that only moves when told to. A test double for
    /// [`SystemWallClock`](super::SystemWallClock).
    #[derive(Debug)]
    pub struct ManualWallClock {
        millis: AtomicI64,
    }

    impl ManualWallClock {
        /// Creates a clock frozen at `start`.
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                millis: AtomicI64::new(start.timestamp_millis()),
            }
        }

        /// Moves the clock by `delta`, which may be negative to simulate skew.
        pub fn advance(&self, delta: TimeDelta) {
            self.millis
                .fetch_add(delta.num_milliseconds(), Ordering::SeqCst);
        }

        /// Moves the clock forward by whole seconds.
        pub fn advance_secs(&self, secs: i64) {
            self.advance(Duration::seconds(secs));
        }
    }

    impl WallClock for ManualWallClock {
        fn now(&self) -> DateTime<Utc> {
            let millis = self.millis.load(Ordering::SeqCst);
            DateTime::from_timestamp_millis(millis).unwrap_or(DateTime::UNIX_EPOCH)
        }
    }
}

/// Elapsed-time accounting for one match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    /// Wall time corresponding to elapsed = 0 for the current running segment.
    anchor: Option<DateTime<Utc>>,
    /// Last observed elapsed seconds, authoritative while not ticking.
    frozen_seconds: u64,
    ticking: bool,
}

impl Clock {
    /// Starts counting from zero at `now`.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.anchor = Some(now);
        self.frozen_seconds = 0;
        self.ticking = true;
    }

    /// Elapsed whole seconds of play at `now`. Never negative.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        match self.anchor {
            Some(anchor) if self.ticking => {
                let millis = (now - anchor).num_milliseconds();
                // Wall-clock skew can put `now` before the anchor.
                u64::try_from(millis.div_euclid(1000)).unwrap_or(0)
            }
            _ => self.frozen_seconds,
        }
    }

    /// Freezes elapsed time at `now`.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        if !self.ticking {
            return;
        }
        self.frozen_seconds = self.elapsed_seconds(now);
        self.ticking = false;
    }

    /// Continues counting from the frozen value.
    ///
    /// A clock that is already ticking, or was never started, is left alone.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        if self.ticking || self.anchor.is_none() {
            return;
        }
        let frozen = i64::try_from(self.frozen_seconds).unwrap_or(i64::MAX);
        self.anchor = Some(now - Duration::seconds(frozen));
        self.ticking = true;
    }

    /// Freezes the current value as final.
    pub fn stop(&mut self, now: DateTime<Utc>) {
        self.pause(now);
    }

    /// Whether elapsed time is currently advancing.
    pub const fn is_ticking(&self) -> bool {
        self.ticking
    }
}
