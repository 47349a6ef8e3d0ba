//! Records exchanged with collaborators outside the simulation core.
//!
//! - [`RosterEntry`] -- one row supplied by a roster loader.
//! - [`Vote`] -- the immutable tally of one chamber vote on one bill.
//! - [`NetworkSnapshot`] -- the read-only coalition network handed to a
//!   renderer.

use serde::{Deserialize, Serialize};

use crate::enums::Chamber;
use crate::ids::{ActorId, BillId};

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// One representative as supplied by a roster loader.
///
/// The party is kept as the raw label; it is parsed (and rejected if
/// unknown) when the actor is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// State or region represented.
    pub state: String,
    /// Electoral district, for lower-chamber seats.
    #[serde(default)]
    pub district: Option<String>,
    /// Display name.
    pub name: String,
    /// Raw party label, e.g. `DEMOCRAT`.
    pub party: String,
}

// ---------------------------------------------------------------------------
// Vote tally
// ---------------------------------------------------------------------------

/// The tally of a single chamber vote on a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// The chamber that voted.
    pub chamber: Chamber,
    /// The bill voted on.
    pub bill: BillId,
    /// Actors that voted in favour, in casting order.
    pub yeas: Vec<ActorId>,
    /// Actors that voted against, in casting order.
    pub nays: Vec<ActorId>,
    /// The tick at which the vote took place.
    pub tick: u64,
    /// Yeas required for the bill to pass.
    pub threshold: usize,
}

impl Vote {
    /// Whether the bill passed: at least `threshold` yeas.
    pub fn passed(&self) -> bool {
        self.yeas.len() >= self.threshold
    }

    /// Total number of votes cast.
    pub fn turnout(&self) -> usize {
        self.yeas.len().saturating_add(self.nays.len())
    }
}

// ---------------------------------------------------------------------------
// Renderer snapshot
// ---------------------------------------------------------------------------

/// A node of the coalition network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    /// Display identifier of the actor or bloc.
    pub id: String,
    /// First policy coordinate.
    pub x: f64,
    /// Second policy coordinate (0 in a one-axis space, or a depth for
    /// nested blocs).
    pub y: f64,
    /// Coalition the node currently belongs to, if any.
    pub coalition: Option<String>,
}

/// An undirected membership edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEdge {
    /// One endpoint.
    pub source: String,
    /// The other endpoint.
    pub target: String,
}

/// A read-only view of the coalition network at the end of a tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    /// The tick the snapshot was taken after.
    pub tick: u64,
    /// The chamber depicted, if the snapshot is chamber-scoped.
    pub chamber: Option<Chamber>,
    /// All nodes.
    pub nodes: Vec<SnapshotNode>,
    /// All membership edges.
    pub edges: Vec<SnapshotEdge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(yeas: u32, nays: u32, threshold: usize) -> Vote {
        Vote {
            chamber: Chamber::Senate,
            bill: BillId::new(1),
            yeas: (0..yeas).map(ActorId::new).collect(),
            nays: (yeas..yeas.saturating_add(nays)).map(ActorId::new).collect(),
            tick: 0,
            threshold,
        }
    }

    #[test]
    fn exactly_threshold_passes() {
        assert!(tally(51, 49, 51).passed());
    }

    #[test]
    fn one_short_fails() {
        assert!(!tally(50, 50, 51).passed());
        assert_eq!(tally(50, 50, 51).turnout(), 100);
    }

    #[test]
    fn roster_entry_district_is_optional() {
        let json = r#"{"state":"VT","name":"Jane Roe","party":"OTHER"}"#;
        let entry: Result<RosterEntry, _> = serde_json::from_str(json);
        assert!(entry.is_ok_and(|e| e.district.is_none()));
    }
}
