//! Renderer snapshots.
//!
//! Builds the read-only [`NetworkSnapshot`] handed to a renderer after a
//! tick. Nothing here mutates simulation state.

use std::collections::HashMap;

use caucus_agents::{Actor, NestedModel};
use caucus_congress::{Congress, VotingBody};
use caucus_types::{Chamber, NetworkSnapshot, NodeId, PolicyPoint, SnapshotEdge, SnapshotNode};

/// Snapshot of one chamber: every actor as a node at its policy
/// coordinates, and an edge between every pair of members of each
/// coalition.
pub fn chamber_snapshot<P: PolicyPoint>(body: &VotingBody<P>, tick: u64) -> NetworkSnapshot {
    let mut snapshot = NetworkSnapshot {
        tick,
        chamber: Some(body.chamber()),
        ..NetworkSnapshot::default()
    };
    append_chamber(&mut snapshot, body);
    snapshot
}

/// Snapshot of both chambers in one network (House first).
pub fn congress_snapshot<P: PolicyPoint>(congress: &Congress<P>, tick: u64) -> NetworkSnapshot {
    let mut snapshot = NetworkSnapshot {
        tick,
        ..NetworkSnapshot::default()
    };
    for chamber in Chamber::ALL {
        append_chamber(&mut snapshot, congress.chamber(chamber));
    }
    snapshot
}

fn append_chamber<P: PolicyPoint>(snapshot: &mut NetworkSnapshot, body: &VotingBody<P>) {
    let roster = body.roster();
    snapshot.nodes.extend(roster.iter().map(|actor| {
        let (x, y) = actor.position().plane();
        SnapshotNode {
            id: actor.label().to_owned(),
            x,
            y,
            coalition: actor.coalition().map(|c| c.to_string()),
        }
    }));

    for coalition in body.coalitions().iter() {
        let labels: Vec<&str> = coalition
            .members()
            .iter()
            .filter_map(|id| roster.get(*id))
            .map(Actor::label)
            .collect();
        for (i, source) in labels.iter().enumerate() {
            for target in labels.iter().skip(i.saturating_add(1)) {
                snapshot.edges.push(SnapshotEdge {
                    source: (*source).to_owned(),
                    target: (*target).to_owned(),
                });
            }
        }
    }
}

/// Snapshot of the nested bloc model.
///
/// Voters sit at `y = 0`; a bloc formed at step `t` sits at `y = -(t + 1)`
/// so later blocs render lower. Each node's `coalition` is the bloc that
/// absorbed it, and every bloc links to its two constituents.
pub fn nested_snapshot<P: PolicyPoint>(model: &NestedModel<P>, tick: u64) -> NetworkSnapshot {
    let mut parent: HashMap<NodeId, &str> = HashMap::new();
    let mut edges = Vec::new();
    for node in model.nodes() {
        if let Some((a, b)) = node.constituents() {
            for child in [a, b] {
                parent.insert(child, node.label());
                if let Some(child) = model.node(child) {
                    edges.push(SnapshotEdge {
                        source: node.label().to_owned(),
                        target: child.label().to_owned(),
                    });
                }
            }
        }
    }

    let nodes = model
        .nodes()
        .iter()
        .map(|node| SnapshotNode {
            id: node.label().to_owned(),
            x: node.position().plane().0,
            y: node.formed_at().map_or(0.0, depth),
            coalition: parent.get(&node.id()).map(|label| (*label).to_owned()),
        })
        .collect();

    NetworkSnapshot {
        tick,
        chamber: None,
        nodes,
        edges,
    }
}

fn depth(formed_at: u64) -> f64 {
    let level = u32::try_from(formed_at.saturating_add(1)).unwrap_or(u32::MAX);
    -f64::from(level)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use caucus_agents::{ActorParams, ActorRoster, FormationConfig, RosterFields};
    use caucus_types::{FinancialClass, Incentive, LinearPolicy, Party};

    use super::*;

    fn body(positions: &[f64]) -> VotingBody<LinearPolicy> {
        let mut roster = ActorRoster::new();
        for (i, p) in positions.iter().enumerate() {
            roster
                .seat(ActorParams {
                    chamber: Chamber::House,
                    roster: RosterFields {
                        label: format!("HR_0_{}", i.saturating_add(1)),
                        state: "AL".to_owned(),
                        district: None,
                        name: String::new(),
                    },
                    party: Party::Democratic,
                    position: LinearPolicy::new(*p).unwrap(),
                    incentive: Incentive::new(FinancialClass::SmallDollar, 0.5, 0.5).unwrap(),
                    base_importance: 1.0,
                    joined_at: 0,
                })
                .unwrap();
        }
        VotingBody::new(Chamber::House, roster, 2)
    }

    #[test]
    fn unaffiliated_chamber_has_no_edges() {
        let snap = chamber_snapshot(&body(&[0.1, 0.5]), 0);
        assert_eq!(snap.chamber, Some(Chamber::House));
        assert_eq!(snap.nodes.len(), 2);
        assert!(snap.edges.is_empty());
        let first = snap.nodes.first().unwrap();
        assert_eq!(first.id, "HR_0_1");
        assert!((first.x - 0.1).abs() < 1e-12);
        assert!(first.y.abs() < 1e-12);
        assert_eq!(first.coalition, None);
    }

    #[test]
    fn coalition_members_are_linked() {
        let mut chamber = body(&[0.1, 0.12, 0.9, 0.95]);
        chamber.form_coalitions(1, &FormationConfig::default()).unwrap();
        let snap = chamber_snapshot(&chamber, 1);
        assert_eq!(snap.edges.len(), 2);
        assert_eq!(snap.edges.first().unwrap().source, "HR_0_1");
        assert_eq!(snap.edges.first().unwrap().target, "HR_0_2");
        assert_eq!(snap.nodes.first().unwrap().coalition.as_deref(), Some("CO_1_1"));

        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"CO_1_2\""));
    }

    #[test]
    fn nested_blocs_link_to_constituents() {
        let positions = [0.1, 0.12, 0.9].map(|v| LinearPolicy::new(v).unwrap());
        let mut model = NestedModel::new(positions).unwrap();
        model.step(0).unwrap();
        let snap = nested_snapshot(&model, 0);
        // Three voters plus the (1|2) bloc.
        assert_eq!(snap.nodes.len(), 4);
        assert_eq!(snap.edges.len(), 2);
        let bloc = snap.nodes.last().unwrap();
        assert_eq!(bloc.id, "(1|2)");
        assert!((bloc.y + 1.0).abs() < 1e-12);
        let absorbed = snap
            .nodes
            .iter()
            .filter(|n| n.coalition.as_deref() == Some(bloc.id.as_str()))
            .count();
        assert_eq!(absorbed, 2);
    }
}
