//! Actors, coalitions, and coalition formation for the caucus simulation.
//!
//! This crate contains the logic layer for voting entities -- everything
//! that operates on actor and coalition state without touching I/O or
//! randomness. It sits between `caucus-types` (which defines the value
//! types) and the congress/core crates (which vote on bills and drive
//! the tick loop).
//!
//! # Modules
//!
//! - [`actor`] -- Leaf actors, aging, and the per-chamber [`ActorRoster`]
//! - [`coalition`] -- Coalitions and the [`CoalitionArena`] that owns them
//! - [`config`] -- Formation tunables ([`FormationConfig`]) and model choice
//! - [`error`] -- Error types for all agent operations ([`AgentError`])
//! - [`formation`] -- The per-tick join/leave/dissolve/pair step
//! - [`matcher`] -- Mutual-nearest-neighbour pairing
//! - [`nested`] -- The nested bloc model ([`NestedModel`])

pub mod actor;
pub mod coalition;
pub mod config;
pub mod error;
pub mod formation;
pub mod matcher;
pub mod nested;

// Re-export primary types at crate root for convenience.
pub use actor::{Actor, ActorParams, ActorRoster, RosterFields, aging_factor};
pub use coalition::{Coalition, CoalitionArena};
pub use config::{CoalitionModel, FormationConfig};
pub use error::AgentError;
pub use formation::{FormationReport, apply_aging, run_formation_step};
pub use matcher::{mutual_pairs, nearest_neighbours};
pub use nested::{BlocNode, NestedModel, NestedOutcome, NestedStepReport};
