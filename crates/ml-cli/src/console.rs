//! Interactive match console.
//!
//! Reads one command per line, applies it to the [`Recorder`] and prints the
//! outcome. Commands rejected by the match state machine are reported and
//! otherwise ignored; only I/O failures end the session.

use std::io::Write;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use ml_core::{
    EventKind, ExportError, ExportFile, ExportFormat, Ignored, MatchEvent, MatchPhase, Recorder,
    Side,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;

use crate::sink::ArtifactSink;
use crate::ticker::Ticker;

/// One console input line.
#[derive(Debug, Parser)]
#[command(name = "mlog", no_binary_name = true, disable_version_flag = true)]
struct ConsoleLine {
    #[command(subcommand)]
    command: ConsoleCommand,
}

#[derive(Debug, Subcommand)]
enum ConsoleCommand {
    /// Start the match clock against an opponent.
    Start {
        /// Opponent team name.
        opponent: Vec<String>,
    },
    /// Pause the match clock.
    Pause,
    /// Resume the match clock.
    Resume,
    /// Stop the match for good.
    Stop,
    /// Discard the match and return to setup.
    Reset,
    /// Record an event for one side.
    #[command(visible_alias = "r")]
    Record {
        /// Event kind, e.g. goal or red_card.
        kind: EventKind,
        /// home or away.
        side: Side,
        /// Player involved, overriding the selected player.
        #[arg(short, long)]
        player: Option<String>,
        /// Free-text description; defaults to the kind label.
        description: Vec<String>,
    },
    /// Remove the most recent event.
    Undo,
    /// Select the player for subsequent events; no name clears it.
    Player { name: Vec<String> },
    /// Show clock, score and totals.
    Status,
    /// List recorded events.
    Events,
    /// Save the timeline and totals files.
    Export {
        #[arg(value_enum, default_value_t = ExportTarget::All)]
        format: ExportTarget,
    },
    /// Leave the console.
    #[command(visible_alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportTarget {
    Json,
    Csv,
    All,
}

/// Whether the console should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Console<W> {
    recorder: Recorder,
    sink: Box<dyn ArtifactSink>,
    ticker: Ticker,
    display: watch::Receiver<u64>,
    out: W,
}

impl<W: Write> Console<W> {
    /// Creates a console; must be called from within a Tokio runtime.
    pub fn new(recorder: Recorder, sink: Box<dyn ArtifactSink>, out: W) -> Self {
        let (ticker, display) = Ticker::new();
        let mut console = Self {
            recorder,
            sink,
            ticker,
            display,
            out,
        };
        console.sync_ticker();
        console
    }

    /// Processes lines from `input` until `quit` or end of input.
    pub async fn run<R>(&mut self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        writeln!(
            self.out,
            "Match recorder for {}. Type 'help' for commands.",
            self.recorder.session().home_team()
        )?;
        let mut lines = input.lines();
        loop {
            self.prompt()?;
            let Some(line) = lines.next_line().await? else {
                writeln!(self.out)?;
                break;
            };
            if self.execute(&line)? == Flow::Quit {
                break;
            }
        }
        self.ticker.stop();
        Ok(())
    }

    /// Parses and applies a single command line.
    ///
    /// Words are split shell-style, so quoted values keep their spaces.
    pub fn execute(&mut self, line: &str) -> Result<Flow> {
        let Some(tokens) = shlex::split(line) else {
            writeln!(self.out, "error: unbalanced quotes")?;
            return Ok(Flow::Continue);
        };
        if tokens.is_empty() {
            return Ok(Flow::Continue);
        }
        let command = match ConsoleLine::try_parse_from(tokens) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                write!(self.out, "{}", e.render())?;
                return Ok(Flow::Continue);
            }
        };
        tracing::debug!(?command, "console command");

        let flow = self.apply(command)?;
        self.sync_ticker();
        Ok(flow)
    }

    fn apply(&mut self, command: ConsoleCommand) -> Result<Flow> {
        match command {
            ConsoleCommand::Start { opponent } => match self.recorder.start(&opponent.join(" ")) {
                Ok(()) => {
                    let session = self.recorder.session();
                    writeln!(
                        self.out,
                        "Kick-off: {} vs {}",
                        session.home_team(),
                        session.opponent().map_or("", |o| o.as_str())
                    )?;
                }
                Err(Ignored::BlankOpponent) => {
                    writeln!(self.out, "warning: {}", Ignored::BlankOpponent)?;
                }
                Err(ignored) => self.report_ignored(ignored)?,
            },
            ConsoleCommand::Pause => match self.recorder.pause() {
                Ok(()) => {
                    let clock = clock_label(self.recorder.elapsed_seconds());
                    writeln!(self.out, "Paused at {clock}")?;
                }
                Err(ignored) => self.report_ignored(ignored)?,
            },
            ConsoleCommand::Resume => match self.recorder.resume() {
                Ok(()) => {
                    let clock = clock_label(self.recorder.elapsed_seconds());
                    writeln!(self.out, "Resumed at {clock}")?;
                }
                Err(ignored) => self.report_ignored(ignored)?,
            },
            ConsoleCommand::Stop => {
                self.recorder.stop();
                let clock = clock_label(self.recorder.elapsed_seconds());
                let score = self.score_line();
                writeln!(self.out, "Full time at {clock}. {score}")?;
            }
            ConsoleCommand::Reset => {
                self.recorder.reset();
                writeln!(self.out, "Match reset")?;
            }
            ConsoleCommand::Record {
                kind,
                side,
                player,
                description,
            } => {
                let description = description.join(" ");
                match self.recorder.record_event(
                    kind,
                    side,
                    player.as_deref(),
                    Some(description.as_str()),
                ) {
                    Ok(event) => {
                        let line = self.event_line(&event);
                        writeln!(self.out, "{line}")?;
                    }
                    Err(ignored) => self.report_ignored(ignored)?,
                }
            }
            ConsoleCommand::Undo => match self.recorder.undo_last() {
                Ok(event) => {
                    let line = self.event_line(&event);
                    writeln!(self.out, "Undid {line}")?;
                }
                Err(ignored) => self.report_ignored(ignored)?,
            },
            ConsoleCommand::Player { name } => {
                let name = name.join(" ");
                self.recorder.select_player(Some(name.as_str()));
                match self.recorder.session().selected_player() {
                    Some(player) => writeln!(self.out, "Player set to {player}")?,
                    None => writeln!(self.out, "Player cleared")?,
                }
            }
            ConsoleCommand::Status => self.print_status()?,
            ConsoleCommand::Events => self.print_events()?,
            ConsoleCommand::Export { format } => self.export(format)?,
            ConsoleCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn export(&mut self, target: ExportTarget) -> Result<()> {
        let rendered: Result<Vec<ExportFile>, ExportError> = match target {
            ExportTarget::Json => self.recorder.export(ExportFormat::Json).map(Vec::from),
            ExportTarget::Csv => self.recorder.export(ExportFormat::Csv).map(Vec::from),
            ExportTarget::All => self.recorder.export_all(),
        };
        let files = match rendered {
            Ok(files) => files,
            Err(e) => {
                writeln!(self.out, "error: {e}")?;
                return Ok(());
            }
        };

        for file in &files {
            match self.sink.save(file) {
                Ok(path) => writeln!(self.out, "Saved {}", path.display())?,
                Err(e) => {
                    tracing::warn!(file = %file.file_name, error = %e, "export failed");
                    writeln!(self.out, "error: {e:#}")?;
                }
            }
        }
        Ok(())
    }

    fn print_status(&mut self) -> Result<()> {
        let session = self.recorder.session();
        let phase = session.phase();
        let clock = clock_label(self.recorder.elapsed_seconds());
        let score = self.score_line();
        let player = session.selected_player().unwrap_or("none").to_string();
        let events = session.ledger().len();
        let rows: Vec<_> = session.tally().rows().filter(|r| r.total() > 0).collect();

        writeln!(self.out, "Phase:  {phase}")?;
        writeln!(self.out, "Clock:  {clock}")?;
        writeln!(self.out, "Score:  {score}")?;
        writeln!(self.out, "Player: {player}")?;
        writeln!(self.out, "Events: {events}")?;
        for row in rows {
            writeln!(
                self.out,
                "  {:<24}{:>4}{:>4}",
                row.kind.label(),
                row.home,
                row.away
            )?;
        }
        Ok(())
    }

    fn print_events(&mut self) -> Result<()> {
        let lines: Vec<String> = self
            .recorder
            .session()
            .ledger()
            .events()
            .iter()
            .map(|event| self.event_line(event))
            .collect();
        if lines.is_empty() {
            writeln!(self.out, "No events recorded.")?;
        }
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn report_ignored(&mut self, ignored: Ignored) -> Result<()> {
        writeln!(self.out, "ignored: {ignored}")?;
        Ok(())
    }

    fn prompt(&mut self) -> Result<()> {
        let elapsed = *self.display.borrow();
        let phase = self.recorder.phase();
        let score = self.recorder.session().score();
        write!(
            self.out,
            "[{} {phase} {}-{}] > ",
            clock_label(elapsed),
            score.home,
            score.away
        )?;
        self.out.flush()?;
        Ok(())
    }

    /// Runs the ticker exactly while the match is running.
    fn sync_ticker(&mut self) {
        if self.recorder.phase() == MatchPhase::Running {
            if !self.ticker.is_running() {
                self.ticker
                    .start(self.recorder.session().clock(), self.recorder.wall());
            }
        } else {
            self.ticker.stop();
            self.ticker.publish(self.recorder.elapsed_seconds());
        }
    }

    fn score_line(&self) -> String {
        let session = self.recorder.session();
        let score = session.score();
        format!(
            "{} {} - {} {}",
            session.home_team(),
            score.home,
            score.away,
            session.opponent().map_or("?", |o| o.as_str())
        )
    }

    fn event_line(&self, event: &MatchEvent) -> String {
        let session = self.recorder.session();
        let team = match event.side {
            Side::Home => session.home_team().as_str(),
            Side::Away => session.opponent().map_or("?", |o| o.as_str()),
        };
        let mut line = format!(
            "[{}] #{} {} - {}",
            event.clock_label(),
            event.sequence_id,
            event.kind.label(),
            team
        );
        if let Some(player) = &event.player {
            line.push_str(&format!(" ({player})"));
        }
        if event.description != event.kind.label() {
            line.push_str(&format!(": {}", event.description));
        }
        line
    }

    /// Consumes the console, returning its output writer.
    pub fn into_output(mut self) -> W {
        self.ticker.stop();
        self.out
    }
}

fn clock_label(elapsed_seconds: u64) -> String {
    format!("{:02}:{:02}", elapsed_seconds / 60, elapsed_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use insta::assert_snapshot;
    use ml_core::{ManualWallClock, MemoryStore, SessionStore, TeamName};

    use crate::sink::DirectorySink;

    struct Harness {
        wall: Arc<ManualWallClock>,
        store: Arc<MemoryStore>,
        _temp: tempfile::TempDir,
        export_dir: PathBuf,
    }

    impl Harness {
        fn new() -> Self {
            let kickoff = Utc.with_ymd_and_hms(2026, 10, 16, 14, 0, 0).unwrap();
            let temp = tempfile::tempdir().unwrap();
            let export_dir = temp.path().join("exports");
            Self {
                wall: Arc::new(ManualWallClock::new(kickoff)),
                store: Arc::new(MemoryStore::new()),
                _temp: temp,
                export_dir,
            }
        }

        fn console(&self) -> Console<Vec<u8>> {
            let recorder = Recorder::open(
                TeamName::new("Lions").unwrap(),
                self.wall.clone(),
                self.store.clone(),
            );
            let sink = DirectorySink::new(&self.export_dir);
            Console::new(recorder, Box::new(sink), Vec::new())
        }
    }

    fn output(console: Console<Vec<u8>>) -> String {
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn console_grammar_is_valid() {
        use clap::CommandFactory;
        ConsoleLine::command().debug_assert();
    }

    #[tokio::test]
    async fn match_flow_output() {
        let harness = Harness::new();
        let mut console = harness.console();

        console.execute("start").unwrap();
        console.execute("start Wildcats").unwrap();
        harness.wall.advance_secs(65);
        console.execute("record goal home header from corner").unwrap();
        console.execute("player Ada").unwrap();
        harness.wall.advance_secs(5);
        console.execute("r red_card away").unwrap();
        console.execute("pause").unwrap();
        harness.wall.advance_secs(300);
        console.execute("record goal away").unwrap();
        console.execute("resume").unwrap();
        console.execute("undo").unwrap();
        console.execute("events").unwrap();
        console.execute("status").unwrap();
        console.execute("stop").unwrap();

        assert_snapshot!(output(console), @r"
        warning: enter an opponent name before starting the match
        Kick-off: Lions vs Wildcats
        [01:05] #1 Goal - Lions: header from corner
        Player set to Ada
        [01:10] #2 Red Card - Wildcats (Ada)
        Paused at 01:10
        ignored: cannot record events while the match is paused
        Resumed at 01:10
        Undid [01:10] #2 Red Card - Wildcats (Ada)
        [01:05] #1 Goal - Lions: header from corner
        Phase:  running
        Clock:  01:10
        Score:  Lions 1 - 0 Wildcats
        Player: Ada
        Events: 1
          Goal                       1   0
        Full time at 01:10. Lions 1 - 0 Wildcats
        ");
    }

    #[tokio::test]
    async fn export_writes_files() {
        let harness = Harness::new();
        let mut console = harness.console();

        console.execute("export").unwrap();
        console.execute("start Wildcats").unwrap();
        harness.wall.advance_secs(65);
        console.execute("record goal away").unwrap();
        console.execute("record red_card home").unwrap();
        console.execute("export csv").unwrap();

        let totals = std::fs::read_to_string(
            harness
                .export_dir
                .join("Lions-vs-wildcats-totals-2026-10-16.csv"),
        )
        .unwrap();
        assert!(totals.contains("\"goal\",\"0\",\"1\",\"1\""));
        assert!(totals.contains("\"red_card\",\"1\",\"0\",\"1\""));
        assert!(
            harness
                .export_dir
                .join("Lions-vs-wildcats-events-2026-10-16.csv")
                .exists()
        );

        let out = output(console);
        assert!(out.starts_with("error: nothing to export: no events recorded\n"));
        assert_eq!(out.matches("Saved ").count(), 2);
    }

    #[tokio::test]
    async fn quoted_words_stay_together() {
        let harness = Harness::new();
        let mut console = harness.console();

        console.execute("start 'AC Juniors'").unwrap();
        console
            .execute(r#"record goal home -p "Ada Lovelace" "header   from corner""#)
            .unwrap();
        console.execute(r#"player "Grace Hopper""#).unwrap();
        console.execute("record goal 'home").unwrap();

        assert_eq!(console.recorder.session().ledger().len(), 1);
        assert_snapshot!(output(console), @r"
        Kick-off: Lions vs AC Juniors
        [00:00] #1 Goal - Lions (Ada Lovelace): header   from corner
        Player set to Grace Hopper
        error: unbalanced quotes
        ");
    }

    #[tokio::test]
    async fn export_with_slash_in_opponent_name() {
        let harness = Harness::new();
        let mut console = harness.console();

        console.execute("start AC/DC Juniors").unwrap();
        console.execute("record goal home").unwrap();
        console.execute("export csv").unwrap();

        let mut files: Vec<_> = std::fs::read_dir(&harness.export_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        files.sort();
        assert_eq!(
            files,
            vec![
                "Lions-vs-ac-dc-juniors-events-2026-10-16.csv",
                "Lions-vs-ac-dc-juniors-totals-2026-10-16.csv",
            ]
        );
        let out = output(console);
        assert!(!out.contains("error:"), "{out}");
    }

    #[tokio::test]
    async fn ticker_follows_phase() {
        let harness = Harness::new();
        let mut console = harness.console();
        assert!(!console.ticker.is_running());

        console.execute("start Wildcats").unwrap();
        assert!(console.ticker.is_running());

        harness.wall.advance_secs(42);
        console.execute("pause").unwrap();
        assert!(!console.ticker.is_running());
        assert_eq!(*console.display.borrow(), 42);

        console.execute("resume").unwrap();
        assert!(console.ticker.is_running());

        console.execute("reset").unwrap();
        assert!(!console.ticker.is_running());
        assert_eq!(*console.display.borrow(), 0);
    }

    #[tokio::test]
    async fn rebuilt_console_recovers_match() {
        let harness = Harness::new();
        let mut console = harness.console();
        console.execute("start Wildcats").unwrap();
        console.execute("record goal home").unwrap();
        drop(console);

        let console = harness.console();
        assert!(console.ticker.is_running());
        assert_eq!(console.recorder.session().score().home, 1);
        assert!(harness.store.load().is_some());
    }

    #[tokio::test]
    async fn unknown_input_keeps_console_alive() {
        let harness = Harness::new();
        let mut console = harness.console();
        assert_eq!(console.execute("").unwrap(), Flow::Continue);
        assert_eq!(console.execute("dance").unwrap(), Flow::Continue);
        assert_eq!(console.execute("record yellow_card home").unwrap(), Flow::Continue);
        assert_eq!(console.execute("exit").unwrap(), Flow::Quit);

        let out = output(console);
        assert!(out.contains("dance"));
        assert!(out.contains("yellow_card"));
    }

    #[tokio::test]
    async fn run_reads_until_quit() {
        let harness = Harness::new();
        let mut console = harness.console();
        let input: &[u8] = b"start Wildcats\nrecord goal home\nquit\nrecord goal home\n";
        console.run(input).await.unwrap();

        assert_eq!(console.recorder.session().ledger().len(), 1);
        let out = output(console);
        assert!(out.starts_with("Match recorder for Lions."));
        assert!(out.contains("[00:00 setup 0-0] > Kick-off: Lions vs Wildcats"));
        assert!(out.contains("[00:00] #1 Goal - Lions"));
    }
}
