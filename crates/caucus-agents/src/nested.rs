//! Nested bloc model.
//!
//! The simplest coalition model: a set of voters on a policy axis, with
//! no parties or incentives. Every step, each active node (voter or bloc)
//! is paired with its mutual nearest neighbour and the pair merges into a
//! new bloc that replaces both. A bloc holding a strict majority of the
//! original voters retires from the active set. The process stops when
//! fewer than two nodes remain active.
//!
//! Blocs nest: a bloc may be formed from two blocs, so the finished model
//! is a forest whose leaves are the voters. A bloc's position is the mean
//! of its two constituents weighted by how many voters each contains,
//! which equals the unweighted mean over its voters.

use caucus_types::{LinearPolicy, NodeId, PolicyPoint, weighted_mean};
use tracing::{debug, info};

use crate::error::AgentError;
use crate::matcher::mutual_pairs;

/// A voter or bloc.
#[derive(Debug, Clone)]
pub struct BlocNode<P> {
    id: NodeId,
    label: String,
    position: P,
    voters: u32,
    constituents: Option<(NodeId, NodeId)>,
    formed_at: Option<u64>,
    retired_at: Option<u64>,
}

impl<P: PolicyPoint> BlocNode<P> {
    /// Node id.
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Display label: the voter number, or `(a|b)` for a bloc.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Policy position.
    pub const fn position(&self) -> &P {
        &self.position
    }

    /// Number of voters contained (1 for a voter).
    pub const fn voters(&self) -> u32 {
        self.voters
    }

    /// The two nodes merged into this bloc; `None` for a voter.
    pub const fn constituents(&self) -> Option<(NodeId, NodeId)> {
        self.constituents
    }

    /// Step the bloc formed at; `None` for a voter.
    pub const fn formed_at(&self) -> Option<u64> {
        self.formed_at
    }

    /// Step the bloc retired with a majority, if it did.
    pub const fn retired_at(&self) -> Option<u64> {
        self.retired_at
    }

    /// Whether this node is an original voter.
    pub const fn is_voter(&self) -> bool {
        self.constituents.is_none()
    }
}

/// What happened during one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestedStepReport {
    /// The step index.
    pub tick: u64,
    /// Blocs formed this step.
    pub formed: Vec<NodeId>,
    /// Blocs retired with a majority this step.
    pub retired: Vec<NodeId>,
}

/// Result of running the model to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedOutcome {
    /// Steps executed.
    pub steps: u64,
    /// Whether fewer than two nodes remained active at the end.
    pub finished: bool,
    /// Every bloc that retired with a majority, in retirement order.
    pub retired: Vec<NodeId>,
}

/// Voters, blocs, and the active set.
#[derive(Debug, Clone)]
pub struct NestedModel<P> {
    nodes: Vec<BlocNode<P>>,
    active: Vec<NodeId>,
    retired: Vec<NodeId>,
    voters: u32,
}

impl<P: PolicyPoint> NestedModel<P> {
    /// Create a model with one voter per position, labelled `1..=n`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::RosterFull`] if node ids are exhausted.
    pub fn new(positions: impl IntoIterator<Item = P>) -> Result<Self, AgentError> {
        let mut nodes = Vec::new();
        for (index, position) in positions.into_iter().enumerate() {
            let id = NodeId::from_index(index).ok_or(AgentError::RosterFull)?;
            nodes.push(BlocNode {
                id,
                label: index.saturating_add(1).to_string(),
                position,
                voters: 1,
                constituents: None,
                formed_at: None,
                retired_at: None,
            });
        }
        let voters = u32::try_from(nodes.len()).map_err(|_| AgentError::RosterFull)?;
        let active = nodes.iter().map(BlocNode::id).collect();
        Ok(Self {
            nodes,
            active,
            retired: Vec::new(),
            voters,
        })
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&BlocNode<P>> {
        self.nodes.get(id.index())
    }

    /// Every node ever created, voters first, then blocs in formation order.
    pub fn nodes(&self) -> &[BlocNode<P>] {
        &self.nodes
    }

    /// Active node ids.
    pub fn active(&self) -> &[NodeId] {
        &self.active
    }

    /// Retired blocs in retirement order.
    pub fn retired(&self) -> &[NodeId] {
        &self.retired
    }

    /// Number of original voters.
    pub const fn voter_count(&self) -> u32 {
        self.voters
    }

    /// Whether the model has run to completion.
    pub fn is_finished(&self) -> bool {
        self.active.len() < 2
    }

    /// Whether a node holds a strict majority of the voters.
    fn has_majority(&self, node: &BlocNode<P>) -> bool {
        u64::from(node.voters).saturating_mul(2) > u64::from(self.voters)
    }

    /// Run one pairing step.
    ///
    /// New blocs are appended to the active set in pairing order after
    /// their constituents are removed; blocs with a majority then retire.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NodeNotFound`] if the active set refers to a
    /// missing node, or a policy error if a bloc position cannot be
    /// computed.
    pub fn step(&mut self, tick: u64) -> Result<NestedStepReport, AgentError> {
        let mut report = NestedStepReport {
            tick,
            ..NestedStepReport::default()
        };

        let candidates = self
            .active
            .iter()
            .map(|id| self.node(*id).ok_or(AgentError::NodeNotFound(*id)))
            .collect::<Result<Vec<_>, AgentError>>()?;
        let pairs = mutual_pairs(
            &candidates,
            |a, b| a.position.distance(&b.position),
            |_, _| true,
        );

        let mut merged = Vec::with_capacity(pairs.len().saturating_mul(2));
        let mut blocs = Vec::with_capacity(pairs.len());
        for (i, j) in pairs {
            let (Some(a), Some(b)) = (candidates.get(i), candidates.get(j)) else {
                continue;
            };
            let id = NodeId::from_index(self.nodes.len().saturating_add(blocs.len()))
                .ok_or(AgentError::RosterFull)?;
            let position = weighted_mean([
                (a.position, f64::from(a.voters)),
                (b.position, f64::from(b.voters)),
            ])?;
            blocs.push(BlocNode {
                id,
                label: format!("({}|{})", a.label, b.label),
                position,
                voters: a.voters.saturating_add(b.voters),
                constituents: Some((a.id, b.id)),
                formed_at: Some(tick),
                retired_at: None,
            });
            merged.push(a.id);
            merged.push(b.id);
        }

        self.active.retain(|id| !merged.contains(id));
        for bloc in blocs {
            debug!(tick, bloc = %bloc.label, voters = bloc.voters, "bloc formed");
            report.formed.push(bloc.id);
            self.active.push(bloc.id);
            self.nodes.push(bloc);
        }

        let majority: Vec<NodeId> = self
            .active
            .iter()
            .filter_map(|id| self.node(*id))
            .filter(|n| !n.is_voter() && self.has_majority(n))
            .map(BlocNode::id)
            .collect();
        for id in majority {
            self.active.retain(|a| *a != id);
            if let Some(node) = self.nodes.get_mut(id.index()) {
                node.retired_at = Some(tick);
                info!(tick, bloc = %node.label, voters = node.voters, "bloc reached a majority");
            }
            self.retired.push(id);
            report.retired.push(id);
        }

        Ok(report)
    }

    /// Step until finished or until `max_ticks` steps have run.
    ///
    /// # Errors
    ///
    /// Propagates the first error from [`NestedModel::step`].
    pub fn run(&mut self, max_ticks: u64) -> Result<NestedOutcome, AgentError> {
        let mut steps = 0;
        while steps < max_ticks && !self.is_finished() {
            self.step(steps)?;
            steps = steps.saturating_add(1);
        }
        Ok(NestedOutcome {
            steps,
            finished: self.is_finished(),
            retired: self.retired.clone(),
        })
    }
}

impl NestedModel<LinearPolicy> {
    /// `n` voters evenly spaced on the axis: voter `i` (1-based) at
    /// `i / (n + 1)`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::RosterFull`] if `n` exceeds the id space.
    pub fn evenly_spaced(n: u32) -> Result<Self, AgentError> {
        let denominator = f64::from(n.saturating_add(1));
        let positions = (1..=n)
            .map(|i| LinearPolicy::new(f64::from(i) / denominator))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(positions)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn linear(values: &[f64]) -> NestedModel<LinearPolicy> {
        NestedModel::new(values.iter().map(|v| LinearPolicy::new(*v).unwrap())).unwrap()
    }

    #[test]
    fn first_step_pairs_close_voters() {
        let mut model = linear(&[0.1, 0.12, 0.9, 0.95]);
        let report = model.step(0).unwrap();
        assert_eq!(report.formed.len(), 2);

        let first = model.node(*report.formed.first().unwrap()).unwrap();
        assert_eq!(first.label(), "(1|2)");
        assert!((first.position().value() - 0.11).abs() < 1e-9);
        assert_eq!(first.voters(), 2);
        assert_eq!(model.active().len(), 2);
    }

    #[test]
    fn majority_bloc_retires_and_model_finishes() {
        let mut model = linear(&[0.1, 0.2, 0.7, 0.95]);
        let outcome = model.run(100).unwrap();
        assert!(outcome.finished);
        assert_eq!(outcome.retired.len(), 1);
        let winner = model.node(*outcome.retired.first().unwrap()).unwrap();
        // 4 voters: a majority needs 3.
        assert_eq!(winner.voters(), 4);
        assert!(winner.retired_at().is_some());
    }

    #[test]
    fn bloc_position_is_voter_mean() {
        // Step 0 forms (1|2) at 0.15 and (4|5); step 1 merges voter 3
        // into (1|2), which then holds 3 of 5 voters.
        let mut model = linear(&[0.1, 0.2, 0.5, 0.9, 0.99]);
        model.step(0).unwrap();
        let report = model.step(1).unwrap();
        let bloc = model.node(*report.formed.first().unwrap()).unwrap();
        assert_eq!(bloc.label(), "(3|(1|2))");
        assert!((bloc.position().value() - 0.8 / 3.0).abs() < 1e-9);
        assert_eq!(report.retired, vec![bloc.id()]);
    }

    #[test]
    fn evenly_spaced_voters_terminate() {
        let mut model = NestedModel::evenly_spaced(51).unwrap();
        assert_eq!(model.voter_count(), 51);
        let outcome = model.run(1000).unwrap();
        assert!(outcome.finished);
        assert!(outcome.steps <= 51);
        for id in &outcome.retired {
            assert!(model.node(*id).unwrap().voters() >= 26);
        }
    }

    #[test]
    fn identical_voters_stall_until_cap() {
        let mut model = linear(&[0.5, 0.5, 0.5]);
        let outcome = model.run(10).unwrap();
        assert!(!outcome.finished);
        assert_eq!(outcome.steps, 10);
        assert!(model.nodes().iter().all(BlocNode::is_voter));
    }

    #[test]
    fn random_voters_keep_every_voter_in_one_tree() {
        let mut rng = SmallRng::seed_from_u64(3);
        let values: Vec<f64> = (0..40).map(|_| rng.random::<f64>()).collect();
        let mut model = linear(&values);
        model.run(1000).unwrap();
        for node in model.nodes().iter().filter(|n| !n.is_voter()) {
            let (a, b) = node.constituents().unwrap();
            let total = model.node(a).unwrap().voters() + model.node(b).unwrap().voters();
            assert_eq!(node.voters(), total);
        }
    }
}
