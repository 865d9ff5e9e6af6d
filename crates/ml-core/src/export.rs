//! Serialization of a match snapshot into timeline and totals artifacts.
//!
//! Every export produces two files, an event timeline and per-kind totals,
//! in either JSON or CSV. Field order is fixed so output is byte-for-byte
//! reproducible for a given snapshot and export instant.

use std::fmt;
use std::string::FromUtf8Error;
use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use serde::ser::SerializeMap;
use thiserror::Error;

use crate::event_kind::EventKind;
use crate::session::MatchSnapshot;
use crate::tally::{Score, Tally};
use crate::types::Side;

/// Marker written when an event has no player attached.
pub const UNKNOWN_PLAYER: &str = "Unknown";

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static FILE_NAME_UNSAFE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[/\\:*?"<>|\x00-\x1f]"#).unwrap());

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    /// There are no events to export.
    #[error("nothing to export: no events recorded")]
    EmptyLedger,
    /// The snapshot has no opponent or match ID.
    #[error("match has not been started")]
    NotStarted,
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV output: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output was not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

/// Output serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub const ALL: [Self; 2] = [Self::Json, Self::Csv];

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Which of the two artifacts a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Events,
    Totals,
}

impl Artifact {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Totals => "totals",
        }
    }
}

/// A rendered file ready to be handed to whatever saves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub artifact: Artifact,
    pub format: ExportFormat,
    pub file_name: String,
    pub contents: String,
}

/// Renders the timeline and totals artifacts for `snapshot` in `format`.
pub fn export(
    snapshot: &MatchSnapshot,
    format: ExportFormat,
    exported_at: DateTime<Utc>,
) -> Result<[ExportFile; 2], ExportError> {
    let header = Header::from_snapshot(snapshot, exported_at)?;

    let (events, totals) = match format {
        ExportFormat::Json => (
            events_json(snapshot, &header)?,
            totals_json(&snapshot.tally, &header)?,
        ),
        ExportFormat::Csv => (events_csv(snapshot)?, totals_csv(&snapshot.tally)?),
    };
    tracing::debug!(
        %format,
        events = snapshot.events.len(),
        "rendered export"
    );

    Ok([
        ExportFile {
            artifact: Artifact::Events,
            format,
            file_name: header.file_name(Artifact::Events, format),
            contents: events,
        },
        ExportFile {
            artifact: Artifact::Totals,
            format,
            file_name: header.file_name(Artifact::Totals, format),
            contents: totals,
        },
    ])
}

/// Renders both artifacts in every format.
pub fn export_all(
    snapshot: &MatchSnapshot,
    exported_at: DateTime<Utc>,
) -> Result<Vec<ExportFile>, ExportError> {
    let mut files = Vec::with_capacity(ExportFormat::ALL.len() * 2);
    for format in ExportFormat::ALL {
        files.extend(export(snapshot, format, exported_at)?);
    }
    Ok(files)
}

/// Lowercases `name` and collapses whitespace runs into single hyphens.
pub fn slug(name: &str) -> String {
    WHITESPACE_RE
        .replace_all(&name.to_lowercase(), "-")
        .into_owned()
}

/// Replaces characters that cannot appear in a single file name with hyphens.
fn file_name_part(name: &str) -> String {
    FILE_NAME_UNSAFE_RE.replace_all(name, "-").into_owned()
}

/// Metadata shared by both artifacts.
struct Header<'a> {
    id: &'a str,
    home: &'a str,
    opponent: &'a str,
    score: Score,
    duration: u64,
    exported_at: DateTime<Utc>,
}

impl<'a> Header<'a> {
    fn from_snapshot(
        snapshot: &'a MatchSnapshot,
        exported_at: DateTime<Utc>,
    ) -> Result<Self, ExportError> {
        if snapshot.events.is_empty() {
            return Err(ExportError::EmptyLedger);
        }
        let (Some(id), Some(opponent)) = (&snapshot.match_id, &snapshot.opponent) else {
            return Err(ExportError::NotStarted);
        };
        Ok(Self {
            id: id.as_str(),
            home: snapshot.home_team.as_str(),
            opponent: opponent.as_str(),
            score: snapshot.tally.score(),
            duration: snapshot.elapsed_seconds,
            exported_at,
        })
    }

    fn file_name(&self, artifact: Artifact, format: ExportFormat) -> String {
        format!(
            "{}-vs-{}-{}-{}.{}",
            file_name_part(self.home),
            file_name_part(&slug(self.opponent)),
            artifact.as_str(),
            self.exported_at.format("%Y-%m-%d"),
            format.extension()
        )
    }

    fn game_info(&self, with_duration: bool) -> GameInfo<'a> {
        GameInfo {
            id: self.id,
            date: iso_instant(self.exported_at),
            duration: with_duration.then_some(self.duration),
            teams: Teams {
                home: self.home,
                opponent: self.opponent,
            },
            final_score: SideCounts {
                home: self.score.home,
                opponent: self.score.away,
            },
        }
    }
}

fn iso_instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ========== JSON ==========

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GameInfo<'a> {
    id: &'a str,
    date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<u64>,
    teams: Teams<'a>,
    final_score: SideCounts,
}

#[derive(Serialize)]
struct Teams<'a> {
    home: &'a str,
    opponent: &'a str,
}

#[derive(Serialize)]
struct SideCounts {
    home: u32,
    opponent: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventsDocument<'a> {
    game_info: GameInfo<'a>,
    actions: Vec<ActionRecord<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionRecord<'a> {
    sequence_id: u64,
    timestamp: String,
    elapsed_minute: u64,
    elapsed_second_in_minute: u8,
    kind: EventKind,
    side: Side,
    player: &'a str,
    description: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TotalsDocument<'a> {
    game_info: GameInfo<'a>,
    statistics: Statistics<'a>,
}

/// Serializes as a map keyed by kind tag, in canonical kind order.
struct Statistics<'a>(&'a Tally);

impl Serialize for Statistics<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(EventKind::COUNT))?;
        for row in self.0.rows() {
            map.serialize_entry(
                row.kind.tag(),
                &SideCounts {
                    home: row.home,
                    opponent: row.away,
                },
            )?;
        }
        map.end()
    }
}

fn events_json(snapshot: &MatchSnapshot, header: &Header<'_>) -> Result<String, ExportError> {
    let actions = snapshot
        .events
        .iter()
        .map(|event| ActionRecord {
            sequence_id: event.sequence_id,
            timestamp: iso_instant(event.recorded_at),
            elapsed_minute: event.elapsed_minute,
            elapsed_second_in_minute: event.elapsed_second_in_minute,
            kind: event.kind,
            side: event.side,
            player: event.player.as_deref().unwrap_or(UNKNOWN_PLAYER),
            description: &event.description,
        })
        .collect();
    let document = EventsDocument {
        game_info: header.game_info(true),
        actions,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

fn totals_json(tally: &Tally, header: &Header<'_>) -> Result<String, ExportError> {
    let document = TotalsDocument {
        game_info: header.game_info(false),
        statistics: Statistics(tally),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

// ========== CSV ==========

fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer.into_inner().map_err(csv::IntoInnerError::into_error)?;
    Ok(String::from_utf8(bytes)?)
}

fn events_csv(snapshot: &MatchSnapshot) -> Result<String, ExportError> {
    let mut writer = csv_writer();
    writer.write_record([
        "Game Minute",
        "Game Second",
        "Timestamp",
        "Action Type",
        "Player",
        "Team",
        "Description",
    ])?;
    for event in &snapshot.events {
        writer.write_record([
            event.elapsed_minute.to_string().as_str(),
            event.elapsed_second_in_minute.to_string().as_str(),
            iso_instant(event.recorded_at).as_str(),
            event.kind.tag(),
            event.player.as_deref().unwrap_or(UNKNOWN_PLAYER),
            snapshot.team_label(event.side),
            event.description.as_str(),
        ])?;
    }
    finish_csv(writer)
}

fn totals_csv(tally: &Tally) -> Result<String, ExportError> {
    let mut writer = csv_writer();
    writer.write_record(["Action Type", "Home", "Opponent", "Total"])?;
    for row in tally.rows() {
        writer.write_record([
            row.kind.tag(),
            row.home.to_string().as_str(),
            row.away.to_string().as_str(),
            row.total().to_string().as_str(),
        ])?;
    }
    finish_csv(writer)
}
