//! Core domain logic for the live match recorder.
//!
//! This crate contains the fundamental types and logic for:
//! - Clock: elapsed playing time across pauses
//! - Ledger and tally: recorded events with per-kind, per-side counts kept in sync
//! - Session: the match lifecycle state machine
//! - Export: JSON and CSV timeline/totals artifacts

pub mod clock;
pub mod event;
pub mod event_kind;
pub mod export;
pub mod ledger;
mod recorder;
pub mod session;
pub mod store;
pub mod tally;
pub mod types;

#[cfg(any(test, feature = "test-util"))]
pub use clock::ManualWallClock;
pub use clock::{Clock, SystemWallClock, WallClock};
pub use event::MatchEvent;
pub use event_kind::{EventKind, UnknownEventKind};
pub use export::{Artifact, ExportError, ExportFile, ExportFormat};
pub use ledger::Ledger;
pub use recorder::Recorder;
pub use session::{Ignored, MatchPhase, MatchSnapshot, Session};
pub use store::{MemoryStore, SessionStore};
pub use tally::{Score, Tally, TallyRow};
pub use types::{MatchId, Side, TeamName, ValidationError};
