//! The executive: the last stage a bill must clear.
//!
//! Only bills that passed both chambers reach the executive. Two
//! decision-makers are provided:
//!
//! - [`MetricExecutive`] scores each bill with the same incentive-weighted
//!   procedure as legislators, using its own position and incentive and
//!   its party's position across both chambers.
//! - [`PartisanExecutive`] approves at random, with a higher probability
//!   when the sponsor shares its party.

use caucus_types::{Incentive, Party, PolicyPoint};

use crate::bill::Bill;
use crate::party::PartyRegistry;
use crate::sampling::Sampler;
use crate::voting::{Votable, VotingRule};

/// A single decision-maker consulted after both chambers.
pub trait Executive<P> {
    /// The executive's party.
    fn party(&self) -> Party;

    /// Whether to sign the bill into law.
    fn approve(
        &mut self,
        bill: &Bill<P>,
        parties: &PartyRegistry<P>,
        sampler: &mut dyn Sampler,
    ) -> bool;
}

// ---------------------------------------------------------------------------
// Metric executive
// ---------------------------------------------------------------------------

/// Executive voting with the legislators' metric.
#[derive(Debug, Clone)]
pub struct MetricExecutive<P> {
    party: Party,
    position: P,
    incentive: Incentive,
    rule: VotingRule,
}

impl<P: PolicyPoint> MetricExecutive<P> {
    /// Create a metric executive.
    pub const fn new(party: Party, position: P, incentive: Incentive, rule: VotingRule) -> Self {
        Self {
            party,
            position,
            incentive,
            rule,
        }
    }
}

impl<P: PolicyPoint> Votable<P> for MetricExecutive<P> {
    fn position(&self) -> &P {
        &self.position
    }

    fn incentive(&self) -> &Incentive {
        &self.incentive
    }

    fn party(&self) -> Party {
        self.party
    }
}

impl<P: PolicyPoint> Executive<P> for MetricExecutive<P> {
    fn party(&self) -> Party {
        self.party
    }

    fn approve(
        &mut self,
        bill: &Bill<P>,
        parties: &PartyRegistry<P>,
        _sampler: &mut dyn Sampler,
    ) -> bool {
        let party_position = parties.position(self.party, None);
        let voter: &Self = self;
        voter.rule.vote(voter, bill, party_position)
    }
}

// ---------------------------------------------------------------------------
// Partisan executive
// ---------------------------------------------------------------------------

/// Executive approving by coin flip, biased towards its own party.
#[derive(Debug, Clone, PartialEq)]
pub struct PartisanExecutive {
    party: Party,
    same_party_approval: f64,
    other_party_approval: f64,
}

impl PartisanExecutive {
    /// Create a partisan executive. Probabilities are clamped to `[0, 1]`.
    pub fn new(party: Party, same_party_approval: f64, other_party_approval: f64) -> Self {
        Self {
            party,
            same_party_approval: same_party_approval.clamp(0.0, 1.0),
            other_party_approval: other_party_approval.clamp(0.0, 1.0),
        }
    }
}

impl<P: PolicyPoint> Executive<P> for PartisanExecutive {
    fn party(&self) -> Party {
        self.party
    }

    fn approve(
        &mut self,
        bill: &Bill<P>,
        _parties: &PartyRegistry<P>,
        sampler: &mut dyn Sampler,
    ) -> bool {
        let p = if bill.sponsor_party() == self.party {
            self.same_party_approval
        } else {
            self.other_party_approval
        };
        sampler.chance(p)
    }
}
