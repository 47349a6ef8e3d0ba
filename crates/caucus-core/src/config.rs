//! Configuration loading and typed config structures for the caucus simulation.
//!
//! The canonical configuration lives in `caucus-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads the file. Every section and
//! every field is optional; missing values fall back to the defaults
//! documented on each field.

use std::path::{Path, PathBuf};

use caucus_agents::{CoalitionModel, FormationConfig};
use caucus_congress::{DEFAULT_VOTE_THRESHOLD, VotingRule, VotingWeights};
use caucus_types::Party;
use serde::Deserialize;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "CAUCUS_CONFIG";

/// Default config file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "caucus-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is unusable.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `caucus-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Run length, seed, and bill volume.
    #[serde(default)]
    pub simulation: RunConfig,

    /// Coalition formation tunables.
    #[serde(default)]
    pub formation: FormationSection,

    /// Voting weights and threshold.
    #[serde(default)]
    pub voting: VotingSection,

    /// Chamber sizes, thresholds, and roster files.
    #[serde(default)]
    pub chambers: ChambersConfig,

    /// Distributions for initial actor state and bills.
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// The executive.
    #[serde(default)]
    pub executive: ExecutiveConfig,

    /// The nested bloc model.
    #[serde(default)]
    pub nested: NestedConfig,

    /// Logging and snapshot output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Where to look for the config file: `$CAUCUS_CONFIG`, or
    /// `caucus-config.yaml` in the working directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
    }

    /// Reject values the simulation cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.end_year < self.simulation.start_year {
            return Err(ConfigError::Invalid {
                field: "simulation.end_year",
                reason: format!("precedes start_year {}", self.simulation.start_year),
            });
        }
        unit_interval("sampling.big_dollar_share", self.sampling.big_dollar_share)?;
        unit_interval("executive.same_party_approval", self.executive.same_party_approval)?;
        unit_interval("executive.other_party_approval", self.executive.other_party_approval)?;
        non_negative("sampling.region_wiggle", self.sampling.region_wiggle)?;
        non_negative("formation.join_factor", self.formation.join_factor)?;
        non_negative("formation.leave_factor", self.formation.leave_factor)?;
        let synthetic =
            self.chambers.house_roster.is_none() || self.chambers.senate_roster.is_none();
        let (house_seats, senate_seats) = if synthetic {
            (Some(self.chambers.house_seats), Some(self.chambers.senate_seats))
        } else {
            (None, None)
        };
        seat_threshold("chambers.house_threshold", self.chambers.house_threshold, house_seats)?;
        seat_threshold("chambers.senate_threshold", self.chambers.senate_threshold, senate_seats)?;
        if !self.sampling.importance_exponent.is_finite()
            || self.sampling.importance_exponent <= 0.0
        {
            return Err(ConfigError::Invalid {
                field: "sampling.importance_exponent",
                reason: format!("{} is not positive", self.sampling.importance_exponent),
            });
        }
        Ok(())
    }

    /// The voting rule for legislators.
    pub fn voting_rule(&self) -> VotingRule {
        VotingRule {
            weights: self.voting.weights.clone(),
            threshold: self.voting.threshold,
        }
    }

    /// The voting rule for a metric executive: legislator weights, with the
    /// executive's own threshold when set.
    pub fn executive_rule(&self) -> VotingRule {
        VotingRule {
            weights: self.voting.weights.clone(),
            threshold: self.executive.threshold.unwrap_or(self.voting.threshold),
        }
    }
}

fn unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is outside [0, 1]"),
        })
    }
}

/// A chamber needs at least one yea to pass a bill, and no more yeas than
/// it has seats. Seat counts only bind the synthetic roster.
fn seat_threshold(
    field: &'static str,
    threshold: usize,
    seats: Option<u32>,
) -> Result<(), ConfigError> {
    if threshold == 0 {
        return Err(ConfigError::Invalid {
            field,
            reason: "a threshold of 0 passes every bill".to_owned(),
        });
    }
    match seats {
        Some(seats) if usize::try_from(seats).is_ok_and(|seats| threshold > seats) => {
            Err(ConfigError::Invalid {
                field,
                reason: format!("{threshold} exceeds the {seats} seats"),
            })
        }
        _ => Ok(()),
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is negative or not finite"),
        })
    }
}

/// Run length, seed, and bill volume.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Seed of the single random source.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// First simulated year (January).
    #[serde(default = "default_start_year")]
    pub start_year: u32,

    /// Last simulated year (December, inclusive).
    #[serde(default = "default_end_year")]
    pub end_year: u32,

    /// Bills introduced on every new-legislature tick.
    #[serde(default = "default_bills_per_tick")]
    pub bills_per_tick: usize,

    /// Optional cap on the number of ticks, below the calendar length.
    #[serde(default)]
    pub max_ticks: Option<u64>,

    /// Voting ticks of bills and vote lists to retain (`null` keeps all).
    #[serde(default = "default_history_ticks")]
    pub history_ticks: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            start_year: default_start_year(),
            end_year: default_end_year(),
            bills_per_tick: default_bills_per_tick(),
            max_ticks: None,
            history_ticks: default_history_ticks(),
        }
    }
}

/// Coalition formation tunables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FormationSection {
    /// Flat coalitions or nested blocs.
    #[serde(default)]
    pub model: CoalitionModel,

    /// Join-distance factor.
    #[serde(default = "default_join_factor")]
    pub join_factor: f64,

    /// Leave-distance factor.
    #[serde(default = "default_leave_factor")]
    pub leave_factor: f64,

    /// Whether joining requires a matching financial class.
    #[serde(default = "default_true")]
    pub require_financial_match: bool,
}

impl FormationSection {
    /// The agents-layer formation config.
    pub fn to_formation_config(&self) -> FormationConfig {
        FormationConfig {
            join_factor: self.join_factor,
            leave_factor: self.leave_factor,
            require_financial_match: self.require_financial_match,
        }
    }
}

impl Default for FormationSection {
    fn default() -> Self {
        Self {
            model: CoalitionModel::default(),
            join_factor: default_join_factor(),
            leave_factor: default_leave_factor(),
            require_financial_match: true,
        }
    }
}

/// Voting weights and threshold.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VotingSection {
    /// A weighted score at or above this votes yes.
    #[serde(default = "default_vote_threshold")]
    pub threshold: f64,

    /// Metric weights.
    #[serde(default)]
    pub weights: VotingWeights,
}

impl Default for VotingSection {
    fn default() -> Self {
        Self {
            threshold: default_vote_threshold(),
            weights: VotingWeights::default(),
        }
    }
}

/// Chamber sizes, thresholds, and roster files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChambersConfig {
    /// Seats in the House when no roster file is given.
    #[serde(default = "default_house_seats")]
    pub house_seats: u32,

    /// Yeas needed to pass the House.
    #[serde(default = "default_house_threshold")]
    pub house_threshold: usize,

    /// Seats in the Senate when no roster file is given.
    #[serde(default = "default_senate_seats")]
    pub senate_seats: u32,

    /// Yeas needed to pass the Senate.
    #[serde(default = "default_senate_threshold")]
    pub senate_threshold: usize,

    /// JSON roster of the House, keyed by year.
    #[serde(default)]
    pub house_roster: Option<PathBuf>,

    /// JSON roster of the Senate, keyed by year.
    #[serde(default)]
    pub senate_roster: Option<PathBuf>,
}

impl Default for ChambersConfig {
    fn default() -> Self {
        Self {
            house_seats: default_house_seats(),
            house_threshold: default_house_threshold(),
            senate_seats: default_senate_seats(),
            senate_threshold: default_senate_threshold(),
            house_roster: None,
            senate_roster: None,
        }
    }
}

/// Distributions for initial actor state and bills.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SamplingConfig {
    /// Probability that an actor is big-dollar funded.
    #[serde(default = "default_big_dollar_share")]
    pub big_dollar_share: f64,

    /// Maximum reach of a bill's acceptance region from its sponsor, per
    /// axis and side.
    #[serde(default = "default_region_wiggle")]
    pub region_wiggle: f64,

    /// Exponent `a` of the power distribution of initial importance.
    #[serde(default = "default_importance_exponent")]
    pub importance_exponent: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            big_dollar_share: default_big_dollar_share(),
            region_wiggle: default_region_wiggle(),
            importance_exponent: default_importance_exponent(),
        }
    }
}

/// How the executive decides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutiveKind {
    /// Same scoring as legislators.
    #[default]
    Metric,
    /// Party-biased coin flip.
    Partisan,
}

/// The executive.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExecutiveConfig {
    /// Party of the executive.
    #[serde(default = "default_executive_party")]
    pub party: Party,

    /// Decision model.
    #[serde(default)]
    pub kind: ExecutiveKind,

    /// Partisan approval probability for own-party sponsors.
    #[serde(default = "default_same_party_approval")]
    pub same_party_approval: f64,

    /// Partisan approval probability for other sponsors.
    #[serde(default = "default_other_party_approval")]
    pub other_party_approval: f64,

    /// Metric threshold; the voting threshold when absent.
    #[serde(default)]
    pub threshold: Option<f64>,
}

impl Default for ExecutiveConfig {
    fn default() -> Self {
        Self {
            party: default_executive_party(),
            kind: ExecutiveKind::default(),
            same_party_approval: default_same_party_approval(),
            other_party_approval: default_other_party_approval(),
            threshold: None,
        }
    }
}

/// The nested bloc model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NestedConfig {
    /// Number of evenly spaced voters.
    #[serde(default = "default_nested_voters")]
    pub voters: u32,

    /// Step cap.
    #[serde(default = "default_nested_max_ticks")]
    pub max_ticks: u64,
}

impl Default for NestedConfig {
    fn default() -> Self {
        Self {
            voters: default_nested_voters(),
            max_ticks: default_nested_max_ticks(),
        }
    }
}

/// Logging and snapshot output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit log lines as JSON objects instead of plain text.
    #[serde(default)]
    pub json: bool,

    /// Directory for per-tick network snapshots (none written when absent).
    #[serde(default)]
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            snapshot_dir: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (required by serde's `default = "..."` attribute)
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_start_year() -> u32 {
    2010
}

const fn default_end_year() -> u32 {
    2020
}

const fn default_bills_per_tick() -> usize {
    500
}

#[allow(clippy::unnecessary_wraps)]
const fn default_history_ticks() -> Option<usize> {
    Some(12)
}

const fn default_join_factor() -> f64 {
    0.05
}

const fn default_leave_factor() -> f64 {
    0.1
}

const fn default_vote_threshold() -> f64 {
    DEFAULT_VOTE_THRESHOLD
}

const fn default_house_seats() -> u32 {
    435
}

const fn default_house_threshold() -> usize {
    218
}

const fn default_senate_seats() -> u32 {
    100
}

const fn default_senate_threshold() -> usize {
    51
}

const fn default_big_dollar_share() -> f64 {
    0.5
}

const fn default_region_wiggle() -> f64 {
    0.2
}

const fn default_importance_exponent() -> f64 {
    5.0
}

const fn default_executive_party() -> Party {
    Party::Democratic
}

const fn default_same_party_approval() -> f64 {
    0.9
}

const fn default_other_party_approval() -> f64 {
    0.1
}

const fn default_nested_voters() -> u32 {
    51
}

const fn default_nested_max_ticks() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.simulation.bills_per_tick, 500);
        assert_eq!(config.chambers.house_threshold, 218);
        assert_eq!(config.chambers.senate_threshold, 51);
        assert_eq!(config.formation.model, CoalitionModel::Flat);
        assert_eq!(config.executive.kind, ExecutiveKind::Metric);
        assert!((config.voting.threshold - 2.0).abs() < f64::EPSILON);
        config.validate().unwrap();
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
simulation:
  seed: 7
  start_year: 2012
  end_year: 2014
  bills_per_tick: 20
  max_ticks: 6
  history_ticks: null

formation:
  model: nested
  join_factor: 0.08
  leave_factor: 0.2
  require_financial_match: false

voting:
  threshold: 0.6
  weights:
    ideology: 0.4
    finance: 0.4
    party_pressure: 0.2

chambers:
  house_seats: 40
  house_threshold: 21
  senate_seats: 10
  senate_threshold: 6
  house_roster: data/house.json

sampling:
  big_dollar_share: 0.25
  region_wiggle: 0.1
  importance_exponent: 3.0

executive:
  party: republican
  kind: partisan
  same_party_approval: 0.8
  other_party_approval: 0.2
  threshold: 0.7

nested:
  voters: 11
  max_ticks: 50

logging:
  level: debug
  json: true
  snapshot_dir: out/networks
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.simulation.start_year, 2012);
        assert_eq!(config.simulation.max_ticks, Some(6));
        assert_eq!(config.simulation.history_ticks, None);
        assert_eq!(config.formation.model, CoalitionModel::Nested);
        assert!(!config.formation.require_financial_match);
        assert!((config.voting.weights.finance - 0.4).abs() < f64::EPSILON);
        assert_eq!(config.chambers.house_roster, Some(PathBuf::from("data/house.json")));
        assert!(config.chambers.senate_roster.is_none());
        assert_eq!(config.executive.party, Party::Republican);
        assert_eq!(config.executive.kind, ExecutiveKind::Partisan);
        assert!((config.executive_rule().threshold - 0.7).abs() < f64::EPSILON);
        assert!((config.voting_rule().threshold - 0.6).abs() < f64::EPSILON);
        assert_eq!(config.nested.voters, 11);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("simulation:\n  seed: 9\n").unwrap();
        assert_eq!(config.simulation.seed, 9);
        assert_eq!(config.simulation.end_year, 2020);
        assert_eq!(config.simulation.history_ticks, Some(12));
        assert!((config.formation.join_factor - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(SimulationConfig::parse("").is_ok());
    }

    #[test]
    fn executive_threshold_defaults_to_voting_threshold() {
        let config = SimulationConfig::parse("voting:\n  threshold: 0.55\n").unwrap();
        assert!((config.executive_rule().threshold - 0.55).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = SimulationConfig::parse("sampling:\n  big_dollar_share: 1.5\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "sampling.big_dollar_share",
                ..
            }
        ));
        assert!(
            SimulationConfig::parse("simulation:\n  start_year: 2020\n  end_year: 2010\n").is_err()
        );
        assert!(SimulationConfig::parse("sampling:\n  importance_exponent: 0\n").is_err());
    }

    #[test]
    fn chamber_thresholds_must_fit_the_seats() {
        let err = SimulationConfig::parse("chambers:\n  house_threshold: 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "chambers.house_threshold",
                ..
            }
        ));
        let err = SimulationConfig::parse("chambers:\n  senate_seats: 50\n  senate_threshold: 51\n")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "chambers.senate_threshold",
                ..
            }
        ));
        let full_house = "chambers:\n  house_seats: 218\n  house_threshold: 218\n";
        assert!(SimulationConfig::parse(full_house).is_ok());
    }

    #[test]
    fn roster_files_lift_the_seat_bound() {
        let yaml = "chambers:\n  house_seats: 10\n  house_threshold: 218\n  \
                    house_roster: h.json\n  senate_roster: s.json\n";
        assert!(SimulationConfig::parse(yaml).is_ok());
        let yaml =
            "chambers:\n  house_threshold: 0\n  house_roster: h.json\n  senate_roster: s.json\n";
        assert!(SimulationConfig::parse(yaml).is_err());
    }

    #[test]
    fn unknown_party_fails_to_parse() {
        assert!(matches!(
            SimulationConfig::parse("executive:\n  party: whig\n"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(DEFAULT_CONFIG_FILE);
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
