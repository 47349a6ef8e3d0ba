//! Enumeration types for the caucus simulation.
//!
//! Every enumeration here is closed: labels outside the listed variants
//! are rejected at parse time with a [`ParseEnumError`] so that unknown
//! parties or chambers fail fast at roster load instead of mid-run.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseEnumError;

// ---------------------------------------------------------------------------
// Party
// ---------------------------------------------------------------------------

/// A political party label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    /// The Democratic party.
    Democratic,
    /// The Republican party.
    Republican,
    /// Any other party or independent.
    Other,
}

impl Party {
    /// All parties in a fixed order.
    pub const ALL: [Self; 3] = [Self::Democratic, Self::Republican, Self::Other];
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Democratic => "democratic",
            Self::Republican => "republican",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

impl FromStr for Party {
    type Err = ParseEnumError;

    /// Accepts the roster spellings `DEMOCRAT`/`DEMOCRATIC`, `REPUBLICAN`
    /// and `OTHER`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "democrat" | "democratic" => Ok(Self::Democratic),
            "republican" => Ok(Self::Republican),
            "other" => Ok(Self::Other),
            _ => Err(ParseEnumError::UnknownPartyLabel(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Chamber
// ---------------------------------------------------------------------------

/// A voting body of the legislature.
///
/// Chambers vote in declaration order: a bill reaches the [`Chamber::Senate`]
/// only after passing the [`Chamber::House`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chamber {
    /// The lower chamber.
    House,
    /// The upper chamber.
    Senate,
}

impl Chamber {
    /// Both chambers in voting order.
    pub const ALL: [Self; 2] = [Self::House, Self::Senate];

    /// Prefix used for roster-assigned actor labels (`HR` or `SR`).
    pub const fn label_prefix(self) -> &'static str {
        match self {
            Self::House => "HR",
            Self::Senate => "SR",
        }
    }
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::House => f.write_str("house"),
            Self::Senate => f.write_str("senate"),
        }
    }
}

impl FromStr for Chamber {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "house" => Ok(Self::House),
            "senate" => Ok(Self::Senate),
            _ => Err(ParseEnumError::UnknownVotingBody(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// FinancialClass
// ---------------------------------------------------------------------------

/// Where an entity's campaign money comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialClass {
    /// Many small donors; tracks bill popularity.
    SmallDollar,
    /// Few large donors; tracks the inverse of bill popularity.
    BigDollar,
}

impl fmt::Display for FinancialClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SmallDollar => f.write_str("small_dollar"),
            Self::BigDollar => f.write_str("big_dollar"),
        }
    }
}

impl FromStr for FinancialClass {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small_dollar" => Ok(Self::SmallDollar),
            "big_dollar" => Ok(Self::BigDollar),
            _ => Err(ParseEnumError::UnknownFinancialClass(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// EventTag
// ---------------------------------------------------------------------------

/// A scheduler event emitted for a tick.
///
/// The simulation core reacts to [`EventTag::NewLegislature`] and
/// [`EventTag::OpinionFormation`]; the remaining tags are forwarded to
/// collaborators outside the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventTag {
    /// Bills are generated and voted on.
    NewLegislature,
    /// New poll results are published.
    NewPolls,
    /// Actors join, leave, and form coalitions.
    OpinionFormation,
    /// Elections for the lower chamber.
    HouseElection,
    /// Elections for the upper chamber.
    SenateElection,
    /// Election of the executive.
    PresidentialElection,
}

impl EventTag {
    /// Whether the simulation core handles this tag itself.
    pub const fn is_core(self) -> bool {
        matches!(self, Self::NewLegislature | Self::OpinionFormation)
    }
}

impl fmt::Display for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NewLegislature => "NEW_LEGISLATURE",
            Self::NewPolls => "NEW_POLLS",
            Self::OpinionFormation => "OPINION_FORMATION",
            Self::HouseElection => "HOUSE_ELECTION",
            Self::SenateElection => "SENATE_ELECTION",
            Self::PresidentialElection => "PRESIDENTIAL_ELECTION",
        };
        f.write_str(label)
    }
}

impl FromStr for EventTag {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NEW_LEGISLATURE" => Ok(Self::NewLegislature),
            "NEW_POLLS" => Ok(Self::NewPolls),
            "OPINION_FORMATION" => Ok(Self::OpinionFormation),
            "HOUSE_ELECTION" => Ok(Self::HouseElection),
            "SENATE_ELECTION" => Ok(Self::SenateElection),
            "PRESIDENTIAL_ELECTION" => Ok(Self::PresidentialElection),
            _ => Err(ParseEnumError::UnknownEventTag(s.to_owned())),
        }
    }
}
