//! Roster loading and chamber seating.
//!
//! A [`RosterSource`] supplies the ordered roster entries of a chamber for
//! a starting year. Two sources exist: [`JsonRoster`], which reads one
//! year-keyed JSON file per chamber, and [`SyntheticRoster`], which
//! fabricates a deterministic roster of the configured size when no files
//! are configured.
//!
//! [`seat_chamber`] turns entries into actors, drawing each actor's
//! position, incentive and importance from the run's random source.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use caucus_agents::{ActorParams, ActorRoster, AgentError, RosterFields};
use caucus_types::{Chamber, ParseEnumError, Party, PolicyError, PolicyPoint, RosterEntry};
use rand::Rng;
use tracing::info;

use crate::config::{ChambersConfig, SamplingConfig};
use crate::sampling::{initial_importance, initial_incentive, initial_position};

/// Errors raised while loading a roster or seating a chamber.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// A roster file could not be read.
    #[error("failed to read roster {}: {source}", .path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A roster file is not valid JSON of the expected shape.
    #[error("failed to parse roster JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The roster has no entries for the requested year.
    #[error("no {chamber} roster for year {year}")]
    YearNotFound {
        /// Chamber requested.
        chamber: Chamber,
        /// Year requested.
        year: u32,
    },

    /// An entry carries a party label outside the closed set.
    #[error("roster entry {name:?}: {source}")]
    UnknownPartyLabel {
        /// Name on the offending entry.
        name: String,
        /// The parse failure.
        source: ParseEnumError,
    },

    /// Seating an actor failed.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// A sampled value was rejected.
    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// Supplier of roster entries per chamber and starting year.
pub trait RosterSource {
    /// Entries of `chamber` for `year`, in seating order.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::YearNotFound`] when the source has no roster
    /// for that year.
    fn entries(&self, chamber: Chamber, year: u32) -> Result<Vec<RosterEntry>, RosterError>;
}

// ---------------------------------------------------------------------------
// JSON files
// ---------------------------------------------------------------------------

/// Per-year rosters keyed by year, as stored in a roster file:
///
/// ```json
/// { "2010": [ { "state": "AL", "district": "1", "name": "...", "party": "REPUBLICAN" } ] }
/// ```
pub type YearRosters = BTreeMap<u32, Vec<RosterEntry>>;

/// Rosters read from one JSON file per chamber.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonRoster {
    house: YearRosters,
    senate: YearRosters,
}

impl JsonRoster {
    /// Wrap already-parsed rosters.
    pub const fn new(house: YearRosters, senate: YearRosters) -> Self {
        Self { house, senate }
    }

    /// Read both chamber files.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Io`] or [`RosterError::Json`].
    pub fn from_files(house: &Path, senate: &Path) -> Result<Self, RosterError> {
        Ok(Self::new(read_year_rosters(house)?, read_year_rosters(senate)?))
    }

    /// Parse both chamber rosters from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Json`] on malformed input.
    pub fn parse(house: &str, senate: &str) -> Result<Self, RosterError> {
        Ok(Self::new(serde_json::from_str(house)?, serde_json::from_str(senate)?))
    }
}

fn read_year_rosters(path: &Path) -> Result<YearRosters, RosterError> {
    let text = std::fs::read_to_string(path).map_err(|source| RosterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

impl RosterSource for JsonRoster {
    fn entries(&self, chamber: Chamber, year: u32) -> Result<Vec<RosterEntry>, RosterError> {
        let rosters = match chamber {
            Chamber::House => &self.house,
            Chamber::Senate => &self.senate,
        };
        rosters
            .get(&year)
            .cloned()
            .ok_or(RosterError::YearNotFound { chamber, year })
    }
}

// ---------------------------------------------------------------------------
// Synthetic
// ---------------------------------------------------------------------------

/// Deterministic stand-in roster of a given size.
///
/// Seats alternate Democratic and Republican; every tenth seat is Other.
/// Senate seats come two per state, House seats carry a district number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticRoster {
    house_seats: u32,
    senate_seats: u32,
}

impl SyntheticRoster {
    /// Roster with the given seat counts.
    pub const fn new(house_seats: u32, senate_seats: u32) -> Self {
        Self {
            house_seats,
            senate_seats,
        }
    }

    const fn seats(&self, chamber: Chamber) -> u32 {
        match chamber {
            Chamber::House => self.house_seats,
            Chamber::Senate => self.senate_seats,
        }
    }
}

fn synthetic_party(seat: u32) -> &'static str {
    if seat.checked_rem(10) == Some(9) {
        "OTHER"
    } else if seat.checked_rem(2) == Some(0) {
        "DEMOCRAT"
    } else {
        "REPUBLICAN"
    }
}

impl RosterSource for SyntheticRoster {
    fn entries(&self, chamber: Chamber, _year: u32) -> Result<Vec<RosterEntry>, RosterError> {
        let entries = (0..self.seats(chamber))
            .map(|seat| {
                let number = seat.saturating_add(1);
                let (state, district) = match chamber {
                    Chamber::House => (
                        format!("S{:02}", seat.checked_div(9).unwrap_or(0)),
                        Some(number.to_string()),
                    ),
                    Chamber::Senate => (format!("S{:02}", seat.checked_div(2).unwrap_or(0)), None),
                };
                RosterEntry {
                    state,
                    district,
                    name: format!("{} Member {number}", chamber.label_prefix()),
                    party: synthetic_party(seat).to_owned(),
                }
            })
            .collect();
        Ok(entries)
    }
}

/// The roster source a config asks for: JSON files when both chamber
/// paths are set, otherwise a synthetic roster of the configured size.
///
/// # Errors
///
/// Returns [`RosterError::Io`] or [`RosterError::Json`] when a configured
/// file cannot be loaded.
pub fn roster_source(config: &ChambersConfig) -> Result<Box<dyn RosterSource>, RosterError> {
    match (&config.house_roster, &config.senate_roster) {
        (Some(house), Some(senate)) => {
            info!(house = %house.display(), senate = %senate.display(), "Loading roster files");
            Ok(Box::new(JsonRoster::from_files(house, senate)?))
        }
        _ => {
            info!(
                house_seats = config.house_seats,
                senate_seats = config.senate_seats,
                "No roster files configured, using synthetic roster"
            );
            Ok(Box::new(SyntheticRoster::new(config.house_seats, config.senate_seats)))
        }
    }
}

// ---------------------------------------------------------------------------
// Seating
// ---------------------------------------------------------------------------

/// Seat every entry as an actor of `chamber`, joined at `tick`.
///
/// Actors are labelled `{prefix}_0_{n}` with `n` counting from 1. All party
/// labels are checked before anything is drawn from `rng`, so a bad roster
/// leaves the random stream untouched.
///
/// # Errors
///
/// Returns [`RosterError::UnknownPartyLabel`] for an unrecognised party,
/// or the sampling/seating error otherwise.
pub fn seat_chamber<P: PolicyPoint>(
    chamber: Chamber,
    entries: &[RosterEntry],
    sampling: &SamplingConfig,
    tick: u64,
    rng: &mut impl Rng,
) -> Result<ActorRoster<P>, RosterError> {
    let parties = entries
        .iter()
        .map(|entry| {
            entry
                .party
                .parse::<Party>()
                .map_err(|source| RosterError::UnknownPartyLabel {
                    name: entry.name.clone(),
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut roster = ActorRoster::new();
    for (seat, (entry, party)) in entries.iter().zip(parties).enumerate() {
        let position = initial_position::<P>(party, rng)?;
        let incentive = initial_incentive(sampling, rng)?;
        let base_importance = initial_importance(sampling.importance_exponent, rng);
        roster.seat(ActorParams {
            chamber,
            roster: RosterFields {
                label: format!("{}_0_{}", chamber.label_prefix(), seat.saturating_add(1)),
                state: entry.state.clone(),
                district: entry.district.clone(),
                name: entry.name.clone(),
            },
            party,
            position,
            incentive,
            base_importance,
            joined_at: tick,
        })?;
    }
    Ok(roster)
}
