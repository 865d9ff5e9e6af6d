//! Event kind enum as the single source of truth for event tags and labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of events an operator can tag during a match.
///
/// Variant order is the canonical order used for grouping and for every
/// exported totals table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Goal,
    Substitution,
    RedCard,
    FinalThirdEntry,
    OpenPlayFirstContact,
    OpenPlaySecondContact,
    SetPieceFirstContact,
    SetPieceSecondContact,
    PassIntoSeam3,
    AttackWon,
    AttackLost,
}

impl EventKind {
    /// Number of kinds.
    pub const COUNT: usize = 11;

    /// Every kind in canonical order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Goal,
        Self::Substitution,
        Self::RedCard,
        Self::FinalThirdEntry,
        Self::OpenPlayFirstContact,
        Self::OpenPlaySecondContact,
        Self::SetPieceFirstContact,
        Self::SetPieceSecondContact,
        Self::PassIntoSeam3,
        Self::AttackWon,
        Self::AttackLost,
    ];

    /// Machine-readable tag used in exports and console input.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Goal => "goal",
            Self::Substitution => "substitution",
            Self::RedCard => "red_card",
            Self::FinalThirdEntry => "final_third_entry",
            Self::OpenPlayFirstContact => "open_play_first_contact",
            Self::OpenPlaySecondContact => "open_play_second_contact",
            Self::SetPieceFirstContact => "set_piece_first_contact",
            Self::SetPieceSecondContact => "set_piece_second_contact",
            Self::PassIntoSeam3 => "pass_into_seam_3",
            Self::AttackWon => "attack_won",
            Self::AttackLost => "attack_lost",
        }
    }

    /// Human-readable label, also the default event description.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Goal => "Goal",
            Self::Substitution => "Substitution",
            Self::RedCard => "Red Card",
            Self::FinalThirdEntry => "Final Third Entry",
            Self::OpenPlayFirstContact => "Open Play 1st Contact",
            Self::OpenPlaySecondContact => "Open Play 2nd Contact",
            Self::SetPieceFirstContact => "Set Piece 1st Contact",
            Self::SetPieceSecondContact => "Set Piece 2nd Contact",
            Self::PassIntoSeam3 => "Pass into Seam 3",
            Self::AttackWon => "Attack Won",
            Self::AttackLost => "Attack Lost",
        }
    }

    /// Whether recording this kind changes the score.
    #[must_use]
    pub const fn counts_toward_score(self) -> bool {
        matches!(self, Self::Goal)
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == normalized)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

impl Serialize for EventKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown event kind strings.
#[derive(Debug, Clone)]
pub struct UnknownEventKind(String);

impl fmt::Display for UnknownEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event kind: {}", self.0)
    }
}

impl std::error::Error for UnknownEventKind {}
