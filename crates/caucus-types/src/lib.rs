//! Shared value types for the caucus simulation.
//!
//! This crate is the leaf of the workspace: it defines the identifiers,
//! closed enumerations, policy-space points, incentive profiles, and the
//! records exchanged with external collaborators (roster loaders,
//! renderers, executives). It contains no simulation logic.
//!
//! # Modules
//!
//! - [`ids`] -- Strongly typed identifiers for actors, coalitions, bills, bloc nodes
//! - [`enums`] -- Party, chamber, financial class, and scheduler event tags
//! - [`error`] -- Validation errors for policy values and enum labels
//! - [`incentive`] -- The [`Incentive`] profile attached to every voting entity
//! - [`policy`] -- Policy-space points ([`LinearPolicy`], [`Policy`]) and [`PolicyRange`]
//! - [`structs`] -- Roster entries, vote tallies, and renderer snapshots

pub mod enums;
pub mod error;
pub mod ids;
pub mod incentive;
pub mod policy;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Chamber, EventTag, FinancialClass, Party};
pub use error::{ParseEnumError, PolicyError};
pub use ids::{ActorId, BillId, CoalitionId, NodeId};
pub use incentive::Incentive;
pub use policy::{LinearPolicy, Policy, PolicyPoint, PolicyRange, weighted_mean};
pub use structs::{NetworkSnapshot, RosterEntry, SnapshotEdge, SnapshotNode, Vote};
