//! Type-safe identifier wrappers.
//!
//! Every entity in the simulation has a strongly-typed ID to prevent
//! accidental mixing of identifiers at compile time. Actor, bill, and bloc
//! node IDs are ordinals assigned in creation order, so iteration over
//! ordered maps keyed by them follows roster order.
//!
//! Coalition IDs are derived from the formation tick and a per-step
//! sequence number, which keeps them stable across replays with the same
//! seed and makes their natural ordering equal to creation order.

use serde::{Deserialize, Serialize};

/// Generates an ordinal newtype wrapper around `u32` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident, $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Create an identifier from its ordinal.
            pub const fn new(ordinal: u32) -> Self {
                Self(ordinal)
            }

            /// Return the inner ordinal.
            pub const fn into_inner(self) -> u32 {
                self.0
            }

            /// Return the ordinal as a collection index.
            pub fn index(self) -> usize {
                usize::try_from(self.0).unwrap_or(usize::MAX)
            }

            /// Build an identifier from a collection index.
            ///
            /// Returns `None` if the index does not fit in a `u32`.
            pub fn from_index(index: usize) -> Option<Self> {
                u32::try_from(index).ok().map(Self)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl From<u32> for $name {
            fn from(ordinal: u32) -> Self {
                Self(ordinal)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique, stable identifier for an actor (voter or representative).
    ///
    /// The ordinal is the actor's position in its chamber roster.
    ActorId, "A"
}

define_id! {
    /// Unique identifier for a bill introduced during the run.
    BillId, "B"
}

define_id! {
    /// Identifier for a node (voter or bloc) in the nested bloc model.
    NodeId, "N"
}

/// Identifier for a coalition, derived from its formation tick and the
/// order in which it was formed within that tick's formation step.
///
/// Displays as `CO_{tick}_{sequence}`; sequences start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CoalitionId {
    /// The tick in which the coalition was formed.
    pub formed_at: u64,
    /// 1-based position among the coalitions formed in that tick.
    pub sequence: u32,
}

impl CoalitionId {
    /// Create a coalition identifier.
    pub const fn new(formed_at: u64, sequence: u32) -> Self {
        Self {
            formed_at,
            sequence,
        }
    }
}

impl core::fmt::Display for CoalitionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "CO_{}_{}", self.formed_at, self.sequence)
    }
}
