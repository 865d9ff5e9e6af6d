//! Match lifecycle state machine.
//!
//! A [`Session`] owns the clock, the ledger and the tally, and is the only
//! place they are mutated. Ledger and tally always change together.
//!
//! Guard violations never fail loudly: the transition is skipped, state is
//! left untouched, and the reason is returned as an [`Ignored`] value that
//! callers are free to drop.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::clock::Clock;
use crate::event::MatchEvent;
use crate::event_kind::EventKind;
use crate::ledger::{EventDraft, Ledger};
use crate::tally::{Score, Tally};
use crate::types::{MatchId, Side, TeamName};

/// Stage of the match lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatchPhase {
    #[default]
    Setup,
    Running,
    Paused,
    Stopped,
}

impl MatchPhase {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a requested transition did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Ignored {
    /// `start` needs a non-blank opponent name.
    #[error("enter an opponent name before starting the match")]
    BlankOpponent,
    /// The transition is only valid from another phase.
    #[error("cannot {action} while the match is {phase}")]
    WrongPhase {
        action: &'static str,
        phase: MatchPhase,
    },
    /// There is nothing to undo.
    #[error("no events to undo")]
    EmptyLedger,
}

/// State of one match: phase, clock, ledger and tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    phase: MatchPhase,
    home_team: TeamName,
    opponent: Option<TeamName>,
    match_id: Option<MatchId>,
    clock: Clock,
    ledger: Ledger,
    tally: Tally,
    selected_player: Option<String>,
}

impl Session {
    /// Creates a session in `Setup` for the given home team.
    pub fn new(home_team: TeamName) -> Self {
        Self {
            phase: MatchPhase::Setup,
            home_team,
            opponent: None,
            match_id: None,
            clock: Clock::default(),
            ledger: Ledger::default(),
            tally: Tally::default(),
            selected_player: None,
        }
    }

    /// Starts the match clock against `opponent`.
    pub fn start(&mut self, opponent: &str, now: DateTime<Utc>) -> Result<(), Ignored> {
        let Ok(opponent) = TeamName::new(opponent) else {
            tracing::warn!("start rejected: blank opponent name");
            return Err(Ignored::BlankOpponent);
        };
        self.require(MatchPhase::Setup, "start")?;

        self.clock.start(now);
        self.match_id = Some(MatchId::from_start(now));
        tracing::info!(opponent = %opponent, "match started");
        self.opponent = Some(opponent);
        self.phase = MatchPhase::Running;
        Ok(())
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), Ignored> {
        self.require(MatchPhase::Running, "pause")?;
        self.clock.pause(now);
        self.phase = MatchPhase::Paused;
        tracing::debug!(elapsed = self.clock.elapsed_seconds(now), "match paused");
        Ok(())
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), Ignored> {
        self.require(MatchPhase::Paused, "resume")?;
        self.clock.resume(now);
        self.phase = MatchPhase::Running;
        tracing::debug!(elapsed = self.clock.elapsed_seconds(now), "match resumed");
        Ok(())
    }

    /// Freezes the clock for good. Valid from any phase.
    pub fn stop(&mut self, now: DateTime<Utc>) {
        self.clock.stop(now);
        self.phase = MatchPhase::Stopped;
        tracing::info!(
            elapsed = self.clock.elapsed_seconds(now),
            events = self.ledger.len(),
            "match stopped"
        );
    }

    /// Discards clock, ledger and tally and returns to `Setup`.
    ///
    /// The configured home team is kept.
    pub fn reset(&mut self) {
        let home_team = self.home_team.clone();
        *self = Self::new(home_team);
        tracing::info!("match reset");
    }

    /// Records an event at the current clock reading.
    ///
    /// `player` falls back to the selected player and `description` to the
    /// kind's label; blank strings count as absent.
    pub fn record_event(
        &mut self,
        kind: EventKind,
        side: Side,
        player: Option<&str>,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<&MatchEvent, Ignored> {
        self.require(MatchPhase::Running, "record events")?;

        let player = non_blank(player)
            .or_else(|| non_blank(self.selected_player.as_deref()))
            .map(str::to_string);
        let description = non_blank(description).unwrap_or(kind.label()).to_string();

        self.tally.apply(kind, side);
        let event = self.ledger.append(EventDraft {
            recorded_at: now,
            elapsed_seconds: self.clock.elapsed_seconds(now),
            kind,
            side,
            player,
            description,
        });
        tracing::debug!(
            sequence_id = event.sequence_id,
            %kind,
            %side,
            clock = %event.clock_label(),
            "event recorded"
        );
        Ok(event)
    }

    /// Removes the most recent event and reverses its tally effect.
    pub fn undo_last(&mut self) -> Result<MatchEvent, Ignored> {
        let Some(event) = self.ledger.pop_last() else {
            tracing::debug!("undo ignored: ledger empty");
            return Err(Ignored::EmptyLedger);
        };
        self.tally.revert(event.kind, event.side);
        tracing::debug!(sequence_id = event.sequence_id, kind = %event.kind, "event undone");
        Ok(event)
    }

    /// Sets or clears the player attached to subsequently recorded events.
    pub fn select_player(&mut self, player: Option<&str>) {
        self.selected_player = non_blank(player).map(str::to_string);
    }

    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        self.clock.elapsed_seconds(now)
    }

    pub const fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub const fn home_team(&self) -> &TeamName {
        &self.home_team
    }

    pub const fn opponent(&self) -> Option<&TeamName> {
        self.opponent.as_ref()
    }

    pub const fn clock(&self) -> Clock {
        self.clock
    }

    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub const fn tally(&self) -> &Tally {
        &self.tally
    }

    pub const fn score(&self) -> Score {
        self.tally.score()
    }

    pub fn selected_player(&self) -> Option<&str> {
        self.selected_player.as_deref()
    }

    /// Whether the incrementally maintained tally matches a full recount.
    pub fn tally_is_consistent(&self) -> bool {
        Tally::from_events(self.ledger.events()) == self.tally
    }

    /// Frozen copy of everything an export needs.
    pub fn snapshot(&self, now: DateTime<Utc>) -> MatchSnapshot {
        MatchSnapshot {
            match_id: self.match_id.clone(),
            home_team: self.home_team.clone(),
            opponent: self.opponent.clone(),
            elapsed_seconds: self.clock.elapsed_seconds(now),
            events: self.ledger.events().to_vec(),
            tally: self.tally.clone(),
        }
    }

    fn require(&self, expected: MatchPhase, action: &'static str) -> Result<(), Ignored> {
        if self.phase == expected {
            Ok(())
        } else {
            tracing::debug!(action, phase = %self.phase, "transition ignored");
            Err(Ignored::WrongPhase {
                action,
                phase: self.phase,
            })
        }
    }
}

/// Owned, read-only view of a session at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSnapshot {
    pub match_id: Option<MatchId>,
    pub home_team: TeamName,
    pub opponent: Option<TeamName>,
    pub elapsed_seconds: u64,
    pub events: Vec<MatchEvent>,
    pub tally: Tally,
}

impl MatchSnapshot {
    /// Display name for the team on `side`.
    pub fn team_label(&self, side: Side) -> &str {
        match side {
            Side::Home => self.home_team.as_str(),
            Side::Away => self.opponent.as_ref().map_or("", TeamName::as_str),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
