//! Error types for the caucus-agents crate.
//!
//! All operations that can fail return typed errors rather than panicking.
//! This module defines the error hierarchy used across actor construction,
//! coalition membership changes, and aggregate recomputation.

use caucus_types::{ActorId, CoalitionId, NodeId, PolicyError};

/// Errors that can occur during actor and coalition operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AgentError {
    /// An importance weight was negative or not finite.
    #[error("invalid importance {value} for actor {actor}")]
    InvalidImportance {
        /// The actor being constructed.
        actor: ActorId,
        /// The rejected importance.
        value: f64,
    },

    /// Actor with the given ID is not in the roster.
    #[error("actor not found: {0}")]
    ActorNotFound(ActorId),

    /// Coalition with the given ID is not active.
    #[error("coalition not found: {0}")]
    CoalitionNotFound(CoalitionId),

    /// Bloc node with the given ID does not exist.
    #[error("bloc node not found: {0}")]
    NodeNotFound(NodeId),

    /// The roster cannot hold more actors.
    #[error("roster is full")]
    RosterFull,

    /// A coalition's members have zero total importance, so its position
    /// cannot be aggregated. The coalition must be dissolved.
    #[error("coalition {coalition} has zero total importance")]
    EmptyCoalitionDivision {
        /// The coalition that could not be aggregated.
        coalition: CoalitionId,
    },

    /// Attempted to add an actor that already belongs to a coalition.
    #[error("actor {actor} already belongs to coalition {coalition}")]
    AlreadyAffiliated {
        /// The actor.
        actor: ActorId,
        /// The coalition it already belongs to.
        coalition: CoalitionId,
    },

    /// Attempted to put actors of different parties into one coalition.
    #[error("actor {actor} does not share the party of coalition {coalition}")]
    PartyMismatch {
        /// The actor.
        actor: ActorId,
        /// The coalition.
        coalition: CoalitionId,
    },

    /// The actor/coalition back-references disagree.
    #[error("inconsistent membership for actor {actor}: {reason}")]
    InconsistentMembership {
        /// The actor whose membership is inconsistent.
        actor: ActorId,
        /// Description of the mismatch.
        reason: String,
    },

    /// A policy-space operation failed.
    #[error("policy error: {source}")]
    Policy {
        /// The underlying policy error.
        #[from]
        source: PolicyError,
    },
}
