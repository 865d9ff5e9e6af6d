//! Session bound to a wall clock and a session store.
//!
//! The [`Recorder`] is what front ends drive. It stamps every transition
//! with the current wall time and mirrors the session into its store after
//! each mutation, so a rebuilt front end can pick up where it left off.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::clock::WallClock;
use crate::event::MatchEvent;
use crate::event_kind::EventKind;
use crate::export::{self, ExportError, ExportFile, ExportFormat};
use crate::session::{Ignored, MatchPhase, MatchSnapshot, Session};
use crate::store::SessionStore;
use crate::types::{Side, TeamName};

pub struct Recorder {
    session: Session,
    wall: Arc<dyn WallClock>,
    store: Arc<dyn SessionStore>,
}

impl Recorder {
    /// Resumes the stored session, or begins a fresh one for `home_team`.
    ///
    /// A stored session keeps its own home team; a differing `home_team` is
    /// logged and otherwise ignored.
    pub fn open(
        home_team: TeamName,
        wall: Arc<dyn WallClock>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let session = match store.load() {
            Some(session) => {
                if session.home_team() != &home_team {
                    tracing::warn!(
                        stored = %session.home_team(),
                        requested = %home_team,
                        "keeping home team of recovered session"
                    );
                }
                tracing::info!(
                    phase = %session.phase(),
                    events = session.ledger().len(),
                    "recovered session from store"
                );
                session
            }
            None => Session::new(home_team),
        };
        Self {
            session,
            wall,
            store,
        }
    }

    pub fn start(&mut self, opponent: &str) -> Result<(), Ignored> {
        let now = self.now();
        self.session.start(opponent, now)?;
        self.persist();
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), Ignored> {
        let now = self.now();
        self.session.pause(now)?;
        self.persist();
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), Ignored> {
        let now = self.now();
        self.session.resume(now)?;
        self.persist();
        Ok(())
    }

    pub fn stop(&mut self) {
        let now = self.now();
        self.session.stop(now);
        self.persist();
    }

    /// Resets the session and empties the store.
    pub fn reset(&mut self) {
        self.session.reset();
        self.store.clear();
    }

    pub fn record_event(
        &mut self,
        kind: EventKind,
        side: Side,
        player: Option<&str>,
        description: Option<&str>,
    ) -> Result<MatchEvent, Ignored> {
        let now = self.now();
        let event = self
            .session
            .record_event(kind, side, player, description, now)?
            .clone();
        self.persist();
        Ok(event)
    }

    pub fn undo_last(&mut self) -> Result<MatchEvent, Ignored> {
        let event = self.session.undo_last()?;
        self.persist();
        Ok(event)
    }

    pub fn select_player(&mut self, player: Option<&str>) {
        self.session.select_player(player);
        self.persist();
    }

    /// Renders both artifacts in `format` from a snapshot taken now.
    pub fn export(&self, format: ExportFormat) -> Result<[ExportFile; 2], ExportError> {
        let now = self.now();
        export::export(&self.session.snapshot(now), format, now)
    }

    /// Renders both artifacts in every format from a snapshot taken now.
    pub fn export_all(&self) -> Result<Vec<ExportFile>, ExportError> {
        let now = self.now();
        export::export_all(&self.session.snapshot(now), now)
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        self.session.snapshot(self.now())
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.session.elapsed_seconds(self.now())
    }

    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> MatchPhase {
        self.session.phase()
    }

    /// Shared handle to the wall clock, for periodic readers.
    pub fn wall(&self) -> Arc<dyn WallClock> {
        Arc::clone(&self.wall)
    }

    fn now(&self) -> DateTime<Utc> {
        self.wall.now()
    }

    /// Mirrors the session into the store once it has left `Setup`.
    fn persist(&self) {
        if self.session.phase() != MatchPhase::Setup {
            self.store.save(&self.session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    use crate::clock::ManualWallClock;
    use crate::store::MemoryStore;

    struct Harness {
        wall: Arc<ManualWallClock>,
        store: Arc<MemoryStore>,
    }

    impl Harness {
        fn new() -> Self {
            let kickoff = Utc.with_ymd_and_hms(2026, 10, 16, 14, 0, 0).unwrap();
            Self {
                wall: Arc::new(ManualWallClock::new(kickoff)),
                store: Arc::new(MemoryStore::new()),
            }
        }

        fn open(&self) -> Recorder {
            Recorder::open(
                TeamName::new("Lions").unwrap(),
                self.wall.clone(),
                self.store.clone(),
            )
        }
    }

    #[test]
    fn setup_session_is_not_stored() {
        let harness = Harness::new();
        let mut recorder = harness.open();
        assert!(recorder.start("   ").is_err());
        recorder.select_player(Some("Ada"));
        assert!(harness.store.load().is_none());
    }

    #[test]
    fn reopened_recorder_recovers_match() {
        let harness = Harness::new();
        let mut recorder = harness.open();
        recorder.start("Wildcats").unwrap();
        harness.wall.advance_secs(65);
        recorder
            .record_event(EventKind::Goal, Side::Home, None, None)
            .unwrap();
        drop(recorder);

        harness.wall.advance_secs(10);
        let recorder = harness.open();
        assert_eq!(recorder.phase(), MatchPhase::Running);
        assert_eq!(recorder.session().score().home, 1);
        assert_eq!(recorder.elapsed_seconds(), 75);
    }

    #[test]
    fn recovered_session_keeps_its_home_team() {
        let harness = Harness::new();
        let mut recorder = harness.open();
        recorder.start("Wildcats").unwrap();
        drop(recorder);

        let recorder = Recorder::open(
            TeamName::new("Tigers").unwrap(),
            harness.wall.clone(),
            harness.store.clone(),
        );
        assert_eq!(recorder.session().home_team().as_str(), "Lions");
        assert_eq!(recorder.phase(), MatchPhase::Running);
    }

    #[test]
    fn reset_clears_store() {
        let harness = Harness::new();
        let mut recorder = harness.open();
        recorder.start("Wildcats").unwrap();
        assert!(harness.store.load().is_some());

        recorder.reset();
        assert!(harness.store.load().is_none());
        assert_eq!(recorder.phase(), MatchPhase::Setup);

        let recorder = harness.open();
        assert_eq!(recorder.phase(), MatchPhase::Setup);
    }

    #[test]
    fn export_uses_wall_clock() {
        let harness = Harness::new();
        let mut recorder = harness.open();
        assert!(matches!(
            recorder.export(ExportFormat::Csv),
            Err(ExportError::EmptyLedger)
        ));

        recorder.start("Wildcats").unwrap();
        harness.wall.advance_secs(65);
        recorder
            .record_event(EventKind::Goal, Side::Away, None, None)
            .unwrap();
        harness.wall.advance_secs(5);
        recorder
            .record_event(EventKind::RedCard, Side::Home, None, None)
            .unwrap();

        let [_, totals] = recorder.export(ExportFormat::Csv).unwrap();
        assert!(totals.contents.contains("\"goal\",\"0\",\"1\",\"1\""));
        assert!(totals.contents.contains("\"red_card\",\"1\",\"0\",\"1\""));
        assert_eq!(recorder.export_all().unwrap().len(), 4);
    }

    #[test]
    fn pause_resume_through_recorder() {
        let harness = Harness::new();
        let mut recorder = harness.open();
        recorder.start("Wildcats").unwrap();
        harness.wall.advance_secs(30);
        recorder.pause().unwrap();
        harness.wall.advance_secs(120);
        assert_eq!(recorder.elapsed_seconds(), 30);
        recorder.resume().unwrap();
        assert!(recorder.resume().is_err());
        harness.wall.advance_secs(1);
        assert_eq!(recorder.elapsed_seconds(), 31);

        let undo = recorder.undo_last();
        assert_eq!(undo, Err(Ignored::EmptyLedger));
    }
}
