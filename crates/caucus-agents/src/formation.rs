//! Per-tick coalition formation for one chamber.
//!
//! [`run_formation_step`] applies the four phases below, in order, to a
//! chamber's roster and coalition arena:
//!
//! 1. **Join** -- each unaffiliated actor finds the closest same-party
//!    coalition and joins it when closer than
//!    `join_factor * coalition_importance / actor_importance` (and, if
//!    configured, of the same financial class). Aggregates are recomputed
//!    immediately, so later actors see the updated coalition.
//! 2. **Leave** -- each affiliated actor that did not join this step
//!    leaves when farther than
//!    `leave_factor * coalition_importance / actor_importance`.
//! 3. **Dissolve** -- coalitions left with at most one member are
//!    archived and their member released.
//! 4. **Pair** -- the remaining unaffiliated actors are paired by mutual
//!    nearest neighbour within their party; each pair founds a coalition
//!    with id `CO_{tick}_{n}`, `n` counting from 1.
//!
//! After a step no active coalition has fewer than two members (pairing
//! only adds two-member coalitions).
//!
//! [`apply_aging`] is the companion run at the start of every tick: it
//! ages every actor and recomputes coalition aggregates.

use std::collections::BTreeSet;

use caucus_types::{ActorId, CoalitionId, PolicyPoint};
use tracing::{debug, warn};

use crate::actor::ActorRoster;
use crate::coalition::CoalitionArena;
use crate::config::FormationConfig;
use crate::error::AgentError;
use crate::matcher::mutual_pairs;

/// What happened during one formation step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormationReport {
    /// The tick the step ran at.
    pub tick: u64,
    /// Actors that joined an existing coalition.
    pub joined: Vec<(ActorId, CoalitionId)>,
    /// Actors that left their coalition.
    pub left: Vec<(ActorId, CoalitionId)>,
    /// Coalitions dissolved during the step, in dissolution order.
    pub dissolved: Vec<CoalitionId>,
    /// Coalitions founded by pairing.
    pub formed: Vec<CoalitionId>,
    /// Mutual pairs that could not found a coalition (zero total importance).
    pub rejected: Vec<(ActorId, ActorId)>,
}

/// Run one formation step on a chamber.
///
/// # Errors
///
/// Returns an [`AgentError`] only when the roster and arena disagree
/// about membership. A coalition whose aggregates cannot be computed is
/// dissolved and reported, not returned as an error.
pub fn run_formation_step<P: PolicyPoint>(
    roster: &mut ActorRoster<P>,
    arena: &mut CoalitionArena<P>,
    tick: u64,
    config: &FormationConfig,
) -> Result<FormationReport, AgentError> {
    let mut report = FormationReport {
        tick,
        ..FormationReport::default()
    };

    let joined_now = join_phase(roster, arena, tick, config, &mut report)?;
    leave_phase(roster, arena, tick, config, &joined_now, &mut report)?;
    report.dissolved.extend(arena.dissolve_undersized(tick, roster));
    pair_phase(roster, arena, tick, &mut report)?;

    debug!(
        tick,
        joined = report.joined.len(),
        left = report.left.len(),
        dissolved = report.dissolved.len(),
        formed = report.formed.len(),
        active = arena.len(),
        "formation step complete"
    );
    Ok(report)
}

/// Age every actor to `tick` and recompute coalition aggregates.
///
/// Returns the coalitions dissolved because their aggregates could not
/// be computed.
pub fn apply_aging<P: PolicyPoint>(
    roster: &mut ActorRoster<P>,
    arena: &mut CoalitionArena<P>,
    tick: u64,
) -> Vec<CoalitionId> {
    roster.age_all(tick);
    arena.refresh(tick, roster)
}

/// Dissolve a coalition whose aggregation failed, recording it.
fn dissolve_failed<P: PolicyPoint>(
    roster: &mut ActorRoster<P>,
    arena: &mut CoalitionArena<P>,
    tick: u64,
    coalition: CoalitionId,
    report: &mut FormationReport,
) -> Result<(), AgentError> {
    warn!(%coalition, tick, "coalition has zero total importance; dissolving");
    arena.dissolve(coalition, tick, roster)?;
    report.dissolved.push(coalition);
    Ok(())
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

fn join_phase<P: PolicyPoint>(
    roster: &mut ActorRoster<P>,
    arena: &mut CoalitionArena<P>,
    tick: u64,
    config: &FormationConfig,
    report: &mut FormationReport,
) -> Result<BTreeSet<ActorId>, AgentError> {
    let mut joined_now = BTreeSet::new();

    for actor_id in roster.unaffiliated() {
        let actor = roster.require(actor_id)?;
        let Some((coalition_id, distance)) = arena.closest(actor) else {
            continue;
        };
        let coalition = arena.require(coalition_id)?;

        let threshold = config.join_threshold(coalition.importance(), actor.importance());
        let finance_ok = !config.require_financial_match
            || coalition.incentive().financial() == actor.incentive().financial();
        if !(distance < threshold && finance_ok) {
            continue;
        }

        match arena.admit(coalition_id, actor_id, roster) {
            Ok(()) => {
                joined_now.insert(actor_id);
                report.joined.push((actor_id, coalition_id));
            }
            Err(AgentError::EmptyCoalitionDivision { coalition }) => {
                dissolve_failed(roster, arena, tick, coalition, report)?;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(joined_now)
}

fn leave_phase<P: PolicyPoint>(
    roster: &mut ActorRoster<P>,
    arena: &mut CoalitionArena<P>,
    tick: u64,
    config: &FormationConfig,
    joined_now: &BTreeSet<ActorId>,
    report: &mut FormationReport,
) -> Result<(), AgentError> {
    let affiliated: Vec<ActorId> = roster
        .iter()
        .filter(|a| !a.is_unaffiliated() && !joined_now.contains(&a.id()))
        .map(|a| a.id())
        .collect();

    for actor_id in affiliated {
        let actor = roster.require(actor_id)?;
        // An earlier dissolution in this phase may already have freed the actor.
        let Some(coalition_id) = actor.coalition() else {
            continue;
        };
        let coalition = arena.require(coalition_id)?;
        let distance = actor.position().distance(coalition.position());
        let threshold = config.leave_threshold(coalition.importance(), actor.importance());
        if distance <= threshold {
            continue;
        }

        match arena.release(actor_id, roster) {
            Ok(_) => report.left.push((actor_id, coalition_id)),
            Err(AgentError::EmptyCoalitionDivision { coalition }) => {
                report.left.push((actor_id, coalition_id));
                dissolve_failed(roster, arena, tick, coalition, report)?;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

fn pair_phase<P: PolicyPoint>(
    roster: &mut ActorRoster<P>,
    arena: &mut CoalitionArena<P>,
    tick: u64,
    report: &mut FormationReport,
) -> Result<(), AgentError> {
    let candidates = roster
        .unaffiliated()
        .into_iter()
        .map(|id| roster.require(id).map(|a| (id, *a.position(), a.party())))
        .collect::<Result<Vec<_>, AgentError>>()?;

    let pairs = mutual_pairs(
        &candidates,
        |a, b| a.1.distance(&b.1),
        |a, b| a.2 == b.2,
    );

    let mut sequence = 0_u32;
    for (i, j) in pairs {
        let (Some(first), Some(second)) = (candidates.get(i), candidates.get(j)) else {
            continue;
        };
        let next = sequence.saturating_add(1);
        let id = CoalitionId::new(tick, next);
        match arena.form(id, &[first.0, second.0], roster) {
            Ok(id) => {
                sequence = next;
                report.formed.push(id);
            }
            Err(AgentError::EmptyCoalitionDivision { .. }) => {
                warn!(
                    first = %first.0,
                    second = %second.0,
                    tick,
                    "pair has zero total importance; not forming"
                );
                report.rejected.push((first.0, second.0));
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use caucus_types::{Chamber, FinancialClass, Incentive, LinearPolicy, Party};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::actor::{ActorParams, RosterFields};

    fn seat(
        roster: &mut ActorRoster<LinearPolicy>,
        party: Party,
        position: f64,
        importance: f64,
    ) -> ActorId {
        seat_with(roster, party, position, importance, FinancialClass::SmallDollar)
    }

    fn seat_with(
        roster: &mut ActorRoster<LinearPolicy>,
        party: Party,
        position: f64,
        importance: f64,
        financial: FinancialClass,
    ) -> ActorId {
        roster
            .seat(ActorParams {
                chamber: Chamber::House,
                roster: RosterFields {
                    label: format!("HR_0_{}", roster.len()),
                    state: String::from("OH"),
                    district: Some(String::from("1")),
                    name: String::from("Member"),
                },
                party,
                position: LinearPolicy::new(position).unwrap(),
                incentive: Incentive::new(financial, 0.5, 0.5).unwrap(),
                base_importance: importance,
                joined_at: 0,
            })
            .unwrap()
    }

    #[test]
    fn two_clusters_form_two_coalitions() {
        let mut roster = ActorRoster::new();
        for p in [0.1, 0.12, 0.9, 0.95] {
            seat(&mut roster, Party::Democratic, p, 1.0);
        }
        let mut arena = CoalitionArena::new();
        let report =
            run_formation_step(&mut roster, &mut arena, 0, &FormationConfig::default()).unwrap();

        assert_eq!(
            report.formed,
            vec![CoalitionId::new(0, 1), CoalitionId::new(0, 2)]
        );
        let positions: Vec<f64> = arena.iter().map(|c| c.position().value()).collect();
        assert!((positions.first().copied().unwrap() - 0.11).abs() < 1e-9);
        assert!((positions.get(1).copied().unwrap() - 0.925).abs() < 1e-9);
        assert!(roster.unaffiliated().is_empty());
        assert!(arena.verify(&roster).is_ok());
    }

    #[test]
    fn pairing_respects_party_lines() {
        let mut roster = ActorRoster::new();
        seat(&mut roster, Party::Democratic, 0.1, 1.0);
        seat(&mut roster, Party::Republican, 0.11, 1.0);
        let mut arena = CoalitionArena::new();
        let report =
            run_formation_step(&mut roster, &mut arena, 0, &FormationConfig::default()).unwrap();
        assert!(report.formed.is_empty());
        assert!(arena.is_empty());
    }

    #[test]
    fn nearby_actor_joins_existing_coalition() {
        let mut roster = ActorRoster::new();
        let a = seat(&mut roster, Party::Democratic, 0.5, 1.0);
        let b = seat(&mut roster, Party::Democratic, 0.52, 1.0);
        let mut arena = CoalitionArena::new();
        let cfg = FormationConfig::default();
        run_formation_step(&mut roster, &mut arena, 0, &cfg).unwrap();
        let id = roster.get(a).unwrap().coalition().unwrap();
        assert_eq!(roster.get(b).unwrap().coalition(), Some(id));

        // Coalition importance 2, actor importance 1: join radius 0.1.
        let c = seat(&mut roster, Party::Democratic, 0.55, 1.0);
        let report = run_formation_step(&mut roster, &mut arena, 1, &cfg).unwrap();
        assert_eq!(report.joined, vec![(c, id)]);
        assert_eq!(arena.get(id).unwrap().members().len(), 3);
        assert!(report.left.is_empty());
    }

    #[test]
    fn financial_mismatch_blocks_joining() {
        let mut roster = ActorRoster::new();
        seat(&mut roster, Party::Democratic, 0.5, 1.0);
        seat(&mut roster, Party::Democratic, 0.52, 1.0);
        let mut arena = CoalitionArena::new();
        let cfg = FormationConfig::default();
        run_formation_step(&mut roster, &mut arena, 0, &cfg).unwrap();

        seat_with(&mut roster, Party::Democratic, 0.55, 1.0, FinancialClass::BigDollar);
        let report = run_formation_step(&mut roster, &mut arena, 1, &cfg).unwrap();
        assert!(report.joined.is_empty());

        let relaxed = FormationConfig {
            require_financial_match: false,
            ..FormationConfig::default()
        };
        let report = run_formation_step(&mut roster, &mut arena, 2, &relaxed).unwrap();
        assert_eq!(report.joined.len(), 1);
    }

    #[test]
    fn distant_member_leaves_and_coalition_dissolves() {
        let mut roster = ActorRoster::new();
        let a = seat(&mut roster, Party::Republican, 0.25, 1.0);
        let b = seat(&mut roster, Party::Republican, 0.75, 1.0);
        let mut arena = CoalitionArena::new();
        let id = arena.form(CoalitionId::new(0, 1), &[a, b], &mut roster).unwrap();

        // Mean 0.5, each member 0.25 away. Leave radius 0.2 * 2 / 1 = 0.4.
        let loose = FormationConfig {
            leave_factor: 0.2,
            ..FormationConfig::default()
        };
        let report = run_formation_step(&mut roster, &mut arena, 1, &loose).unwrap();
        assert!(report.left.is_empty());

        // Leave radius 0.05 * 2 / 1 = 0.1: the first member walks out, the
        // second is then alone and the coalition is archived.
        let tight = FormationConfig {
            leave_factor: 0.05,
            ..FormationConfig::default()
        };
        let report = run_formation_step(&mut roster, &mut arena, 2, &tight).unwrap();
        assert_eq!(report.left, vec![(a, id)]);
        assert_eq!(report.dissolved, vec![id]);
        assert!(arena.get(id).is_none());
        assert_eq!(arena.broken().len(), 1);
        assert!(arena.verify(&roster).is_ok());
    }

    #[test]
    fn zero_importance_pairs_are_rejected() {
        let mut roster = ActorRoster::new();
        let a = seat(&mut roster, Party::Other, 0.3, 0.0);
        let b = seat(&mut roster, Party::Other, 0.35, 0.0);
        let mut arena = CoalitionArena::new();
        let report =
            run_formation_step(&mut roster, &mut arena, 0, &FormationConfig::default()).unwrap();
        assert_eq!(report.rejected, vec![(a, b)]);
        assert!(arena.is_empty());
    }

    #[test]
    fn aging_updates_coalition_importance() {
        let mut roster = ActorRoster::new();
        seat(&mut roster, Party::Democratic, 0.5, 1.0);
        seat(&mut roster, Party::Democratic, 0.52, 2.0);
        let mut arena = CoalitionArena::new();
        run_formation_step(&mut roster, &mut arena, 0, &FormationConfig::default()).unwrap();

        assert!(apply_aging(&mut roster, &mut arena, 8).is_empty());
        let c = arena.iter().next().unwrap();
        assert!((c.importance() - 9.0).abs() < 1e-9);
    }

    #[test]
    fn random_chambers_stay_consistent() {
        let mut rng = StdRng::seed_from_u64(11);
        let parties = [Party::Democratic, Party::Republican, Party::Other];
        let mut roster = ActorRoster::new();
        for _ in 0..120 {
            let party = *parties.get(rng.random_range(0..parties.len())).unwrap();
            let position = rng.random::<f64>();
            let importance = rng.random::<f64>();
            seat(&mut roster, party, position, importance);
        }
        let mut arena = CoalitionArena::new();
        let cfg = FormationConfig::default();
        for tick in 0..20 {
            apply_aging(&mut roster, &mut arena, tick);
            run_formation_step(&mut roster, &mut arena, tick, &cfg).unwrap();
            assert!(arena.verify(&roster).is_ok());
            assert!(arena.iter().all(|c| c.members().len() >= 2));
            for c in arena.iter() {
                let sum: f64 = c
                    .members()
                    .iter()
                    .map(|m| roster.get(*m).unwrap().importance())
                    .sum();
                assert!((c.importance() - sum).abs() < 1e-9);
            }
        }
    }
}
