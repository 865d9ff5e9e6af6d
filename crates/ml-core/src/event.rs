//! Recorded match events.

use chrono::{DateTime, Utc};

use crate::event_kind::EventKind;
use crate::types::Side;

/// One tagged event, stamped with the match clock at the moment it was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEvent {
    /// Assignment order, unique within a match. Never reused after undo.
    pub sequence_id: u64,
    /// Wall-clock instant of recording.
    pub recorded_at: DateTime<Utc>,
    pub elapsed_minute: u64,
    /// Always in `0..60`.
    pub elapsed_second_in_minute: u8,
    pub kind: EventKind,
    pub side: Side,
    pub player: Option<String>,
    pub description: String,
}

impl MatchEvent {
    /// Total elapsed seconds of play when the event was recorded.
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_minute * 60 + u64::from(self.elapsed_second_in_minute)
    }

    /// Clock reading formatted as `MM:SS`.
    pub fn clock_label(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.elapsed_minute, self.elapsed_second_in_minute
        )
    }
}

/// Splits elapsed seconds into whole minutes and the remaining seconds.
pub(crate) fn split_elapsed(elapsed_seconds: u64) -> (u64, u8) {
    let second = u8::try_from(elapsed_seconds % 60).unwrap_or_default();
    (elapsed_seconds / 60, second)
}
