//! The incentive-weighted voting procedure.
//!
//! Every voting entity (actor, coalition, executive) scores a bill on
//! three metrics and votes yes when the weighted sum reaches the rule's
//! threshold:
//!
//! | Metric | Value |
//! |--------|-------|
//! | ideological | `incentive.ideological` if the entity's position is in the bill's acceptance region, else 0 |
//! | finance | `popularity` for small-dollar entities, `1 - popularity` for big-dollar ones |
//! | party pressure | `incentive.ideological` if the party's current position is in the acceptance region and the entity is big-dollar, else 0 |
//!
//! The party-pressure metric takes the ideological weight, not the
//! party-pressure sensitivity.
//!
//! With the default weights (0.5, 0.3, 0.2) the score never exceeds 1.0,
//! so the default threshold of 2.0 rejects every bill. The threshold is a
//! configuration value for that reason.

use caucus_agents::{Actor, Coalition};
use caucus_types::{FinancialClass, Incentive, Party, PolicyPoint};
use serde::Deserialize;

use crate::bill::Bill;

/// Default yes threshold.
pub const DEFAULT_VOTE_THRESHOLD: f64 = 2.0;

/// Anything that can vote on a bill.
pub trait Votable<P> {
    /// Policy position.
    fn position(&self) -> &P;
    /// Incentive profile.
    fn incentive(&self) -> &Incentive;
    /// Party affiliation.
    fn party(&self) -> Party;
}

impl<P: PolicyPoint> Votable<P> for Actor<P> {
    fn position(&self) -> &P {
        Self::position(self)
    }

    fn incentive(&self) -> &Incentive {
        Self::incentive(self)
    }

    fn party(&self) -> Party {
        Self::party(self)
    }
}

impl<P: PolicyPoint> Votable<P> for Coalition<P> {
    fn position(&self) -> &P {
        Self::position(self)
    }

    fn incentive(&self) -> &Incentive {
        Self::incentive(self)
    }

    fn party(&self) -> Party {
        Self::party(self)
    }
}

/// Linear weights of the three metrics.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VotingWeights {
    /// Weight of the ideological metric (default: 0.5).
    pub ideology: f64,
    /// Weight of the finance metric (default: 0.3).
    pub finance: f64,
    /// Weight of the party-pressure metric (default: 0.2).
    pub party_pressure: f64,
}

impl Default for VotingWeights {
    fn default() -> Self {
        Self {
            ideology: 0.5,
            finance: 0.3,
            party_pressure: 0.2,
        }
    }
}

/// The three metrics for one entity and one bill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoteMetrics {
    /// Ideological agreement.
    pub ideological: f64,
    /// Popularity-driven finance metric.
    pub finance: f64,
    /// Party-line pressure.
    pub party_pressure: f64,
}

impl VoteMetrics {
    /// Compute the metrics.
    ///
    /// `party_position` is the current aggregate position of the voter's
    /// party in its chamber; `None` (no members) yields zero pressure.
    pub fn compute<P, V>(voter: &V, bill: &Bill<P>, party_position: Option<&P>) -> Self
    where
        P: PolicyPoint,
        V: Votable<P> + ?Sized,
    {
        let incentive = voter.incentive();
        let acceptance = bill.acceptance();
        let big_dollar = incentive.financial() == FinancialClass::BigDollar;

        let ideological = if acceptance.contains(voter.position()) {
            incentive.ideological()
        } else {
            0.0
        };
        let finance = if big_dollar {
            1.0 - bill.popularity()
        } else {
            bill.popularity()
        };
        let party_in_range = party_position.is_some_and(|p| acceptance.contains(p));
        let party_pressure = if party_in_range && big_dollar {
            incentive.ideological()
        } else {
            0.0
        };

        Self {
            ideological,
            finance,
            party_pressure,
        }
    }
}

/// Weights plus the yes threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct VotingRule {
    /// Metric weights.
    pub weights: VotingWeights,
    /// A score at or above this votes yes.
    pub threshold: f64,
}

impl Default for VotingRule {
    fn default() -> Self {
        Self {
            weights: VotingWeights::default(),
            threshold: DEFAULT_VOTE_THRESHOLD,
        }
    }
}

impl VotingRule {
    /// Rule with default weights and the given threshold.
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// Weighted sum of the metrics.
    pub fn score(&self, metrics: &VoteMetrics) -> f64 {
        self.weights.ideology * metrics.ideological
            + self.weights.finance * metrics.finance
            + self.weights.party_pressure * metrics.party_pressure
    }

    /// Whether the metrics amount to a yes.
    pub fn decide(&self, metrics: &VoteMetrics) -> bool {
        self.score(metrics) >= self.threshold
    }

    /// Score and decide in one go.
    pub fn vote<P, V>(&self, voter: &V, bill: &Bill<P>, party_position: Option<&P>) -> bool
    where
        P: PolicyPoint,
        V: Votable<P> + ?Sized,
    {
        self.decide(&VoteMetrics::compute(voter, bill, party_position))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use caucus_types::{ActorId, BillId, Chamber, LinearPolicy, PolicyRange};

    use super::*;
    use crate::bill::Sponsor;

    struct Voter {
        position: LinearPolicy,
        incentive: Incentive,
        party: Party,
    }

    impl Votable<LinearPolicy> for Voter {
        fn position(&self) -> &LinearPolicy {
            &self.position
        }
        fn incentive(&self) -> &Incentive {
            &self.incentive
        }
        fn party(&self) -> Party {
            self.party
        }
    }

    fn voter(position: f64, financial: FinancialClass, ideological: f64) -> Voter {
        Voter {
            position: LinearPolicy::new(position).unwrap(),
            incentive: Incentive::new(financial, ideological, 0.3).unwrap(),
            party: Party::Democratic,
        }
    }

    fn bill(lo: f64, hi: f64, popularity: f64) -> Bill<LinearPolicy> {
        Bill::new(
            BillId::new(1),
            Sponsor::Actor {
                chamber: Chamber::House,
                id: ActorId::new(0),
            },
            Party::Democratic,
            popularity,
            PolicyRange::from_bounds(&[(lo, hi)]).unwrap(),
            0,
        )
        .unwrap()
    }

    fn pos(v: f64) -> LinearPolicy {
        LinearPolicy::new(v).unwrap()
    }

    #[test]
    fn agreeable_popular_bill_passes_low_threshold() {
        let rule = VotingRule {
            weights: VotingWeights::default(),
            threshold: 0.6,
        };
        let v = voter(0.5, FinancialClass::SmallDollar, 1.0);
        let metrics = VoteMetrics::compute(&v, &bill(0.4, 0.6, 0.9), None);
        // 0.5 * 1.0 + 0.3 * 0.9 = 0.77
        assert!((rule.score(&metrics) - 0.77).abs() < 1e-9);
        assert!(rule.decide(&metrics));
    }

    #[test]
    fn disjoint_unpopular_bill_fails_same_threshold() {
        let rule = VotingRule::with_threshold(0.6);
        let v = voter(0.5, FinancialClass::SmallDollar, 1.0);
        assert!(!rule.vote(&v, &bill(0.8, 0.9, 0.1), None));
    }

    #[test]
    fn threshold_of_one_is_out_of_reach_for_small_dollar() {
        // Ideology and finance alone top out at 0.5 + 0.3 = 0.8.
        let rule = VotingRule::with_threshold(1.0);
        let v = voter(0.5, FinancialClass::SmallDollar, 1.0);
        let metrics = VoteMetrics::compute(&v, &bill(0.4, 0.6, 1.0), None);
        assert!((rule.score(&metrics) - 0.8).abs() < 1e-9);
        assert!(!rule.decide(&metrics));
    }

    #[test]
    fn default_threshold_rejects_even_the_best_case() {
        let rule = VotingRule::default();
        assert!((rule.threshold - 2.0).abs() < f64::EPSILON);
        let best = VoteMetrics {
            ideological: 1.0,
            finance: 1.0,
            party_pressure: 1.0,
        };
        assert!((rule.score(&best) - 1.0).abs() < 1e-9);
        assert!(!rule.decide(&best));
    }

    #[test]
    fn big_dollar_inverts_popularity_and_feels_party_pressure() {
        let v = voter(0.1, FinancialClass::BigDollar, 0.8);
        let b = bill(0.4, 0.6, 0.25);
        let with_party = VoteMetrics::compute(&v, &b, Some(&pos(0.5)));
        assert!(with_party.ideological.abs() < f64::EPSILON);
        assert!((with_party.finance - 0.75).abs() < 1e-9);
        assert!((with_party.party_pressure - 0.8).abs() < 1e-9);

        let party_outside = VoteMetrics::compute(&v, &b, Some(&pos(0.9)));
        assert!(party_outside.party_pressure.abs() < f64::EPSILON);
        let no_party = VoteMetrics::compute(&v, &b, None);
        assert!(no_party.party_pressure.abs() < f64::EPSILON);
    }

    #[test]
    fn small_dollar_ignores_party_position() {
        let v = voter(0.5, FinancialClass::SmallDollar, 0.8);
        let m = VoteMetrics::compute(&v, &bill(0.4, 0.6, 0.5), Some(&pos(0.5)));
        assert!(m.party_pressure.abs() < f64::EPSILON);
    }

    #[test]
    fn acceptance_bounds_are_inclusive() {
        let rule = VotingRule::with_threshold(0.5);
        let v = voter(0.6, FinancialClass::SmallDollar, 1.0);
        assert!(rule.vote(&v, &bill(0.4, 0.6, 0.0), None));
    }
}
