//! Ordered log of recorded events with single-step undo.

use chrono::{DateTime, Utc};

use crate::event::{MatchEvent, split_elapsed};
use crate::event_kind::EventKind;
use crate::types::Side;

/// Fields supplied by the caller when appending an event.
#[derive(Debug, Clone)]
pub(crate) struct EventDraft {
    pub recorded_at: DateTime<Utc>,
    pub elapsed_seconds: u64,
    pub kind: EventKind,
    pub side: Side,
    pub player: Option<String>,
    pub description: String,
}

/// Append-only sequence of events; the only removal is of the newest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    events: Vec<MatchEvent>,
    next_sequence_id: u64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            next_sequence_id: 1,
        }
    }
}

impl Ledger {
    /// Appends an event and assigns the next sequence ID.
    pub(crate) fn append(&mut self, draft: EventDraft) -> &MatchEvent {
        let (elapsed_minute, elapsed_second_in_minute) = split_elapsed(draft.elapsed_seconds);
        let event = MatchEvent {
            sequence_id: self.next_sequence_id,
            recorded_at: draft.recorded_at,
            elapsed_minute,
            elapsed_second_in_minute,
            kind: draft.kind,
            side: draft.side,
            player: draft.player,
            description: draft.description,
        };
        self.next_sequence_id += 1;
        self.events.push(event);
        &self.events[self.events.len() - 1]
    }

    /// Removes and returns the most recently appended event.
    pub(crate) fn pop_last(&mut self) -> Option<MatchEvent> {
        self.events.pop()
    }

    /// Events in recording order, oldest first.
    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
