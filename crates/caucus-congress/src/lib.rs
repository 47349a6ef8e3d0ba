//! Bills, voting, and the two-chamber pipeline for the caucus simulation.
//!
//! This crate turns the actors and coalitions of `caucus-agents` into a
//! legislature: bills are introduced by sponsors from either chamber,
//! voted on with the incentive-weighted procedure, and passed House
//! first, Senate second, executive last.
//!
//! # Modules
//!
//! - [`bill`] -- Bills, sponsors, and the write-once outcome flags
//! - [`chamber`] -- One chamber ([`VotingBody`]) and its tallies
//! - [`congress`] -- Both chambers and the bill pipeline ([`Congress`])
//! - [`error`] -- Error types for congress operations ([`CongressError`])
//! - [`executive`] -- The final decision-maker ([`Executive`])
//! - [`party`] -- Party position aggregates ([`PartyRegistry`])
//! - [`sampling`] -- The random-draw seam ([`Sampler`])
//! - [`voting`] -- Metrics, weights, and the yes threshold ([`VotingRule`])

pub mod bill;
pub mod chamber;
pub mod congress;
pub mod error;
pub mod executive;
pub mod party;
pub mod sampling;
pub mod voting;

pub use bill::{Bill, Sponsor, Stage};
pub use chamber::VotingBody;
pub use congress::{Congress, PassingReport};
pub use error::CongressError;
pub use executive::{Executive, MetricExecutive, PartisanExecutive};
pub use party::{PartyAggregate, PartyRegistry};
pub use sampling::Sampler;
pub use voting::{DEFAULT_VOTE_THRESHOLD, Votable, VoteMetrics, VotingRule, VotingWeights};
