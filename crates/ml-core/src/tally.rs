//! Per-kind, per-side counters and the running score.
//!
//! The tally is updated incrementally as events are appended and undone.
//! [`Tally::from_events`] recounts a ledger from scratch; the two must always
//! agree, and only the incremental path runs during a match.

use crate::event::MatchEvent;
use crate::event_kind::EventKind;
use crate::types::Side;

/// Goals per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub const fn get(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    const fn slot(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }
}

/// One row of the totals table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TallyRow {
    pub kind: EventKind,
    pub home: u32,
    pub away: u32,
}

impl TallyRow {
    pub const fn total(&self) -> u32 {
        self.home + self.away
    }
}

/// Derived aggregate over a ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: [[u32; 2]; EventKind::COUNT],
    score: Score,
}

impl Tally {
    /// Recounts every event. Test oracle for the incremental path.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a MatchEvent>) -> Self {
        let mut tally = Self::default();
        for event in events {
            tally.apply(event.kind, event.side);
        }
        tally
    }

    pub const fn count(&self, kind: EventKind, side: Side) -> u32 {
        self.counts[kind.index()][side.index()]
    }

    pub const fn score(&self) -> Score {
        self.score
    }

    /// Rows for every kind in canonical order.
    pub fn rows(&self) -> impl Iterator<Item = TallyRow> + '_ {
        EventKind::ALL.into_iter().map(|kind| TallyRow {
            kind,
            home: self.count(kind, Side::Home),
            away: self.count(kind, Side::Away),
        })
    }

    pub(crate) fn apply(&mut self, kind: EventKind, side: Side) {
        self.counts[kind.index()][side.index()] += 1;
        if kind.counts_toward_score() {
            *self.score.slot(side) += 1;
        }
    }

    /// Inverse of [`Tally::apply`], clamped at zero.
    ///
    /// Undo only ever removes the newest event, so reaching the clamp means
    /// the tally had already drifted from the ledger.
    pub(crate) fn revert(&mut self, kind: EventKind, side: Side) {
        let counter = &mut self.counts[kind.index()][side.index()];
        if *counter == 0 {
            tracing::error!(%kind, %side, "tally counter already zero on undo");
        }
        *counter = counter.saturating_sub(1);

        if kind.counts_toward_score() {
            let goals = self.score.slot(side);
            if *goals == 0 {
                tracing::error!(%side, "score already zero on undo");
            }
            *goals = goals.saturating_sub(1);
        }
    }
}
