//! Coalitions and the per-chamber coalition arena.
//!
//! A [`Coalition`] is a party-bound group of actors that votes as a block.
//! Its position, importance, and incentive profile are derived from the
//! current members and recomputed after every membership change:
//!
//! - importance is the sum of member importances;
//! - position is the importance-weighted mean of member positions;
//! - incentive is [`Incentive::aggregate`] over members.
//!
//! The [`CoalitionArena`] owns every active coalition of one chamber in
//! creation order, plus an archive of dissolved ("broken") coalitions.
//! It is the only place that changes an actor's coalition back-reference,
//! so the two sides of the relation cannot drift apart. [`CoalitionArena::verify`]
//! checks that they have not.

use std::collections::BTreeMap;

use caucus_types::{
    ActorId, Chamber, CoalitionId, Incentive, Party, PolicyError, PolicyPoint, weighted_mean,
};
use tracing::{debug, warn};

use crate::actor::{Actor, ActorRoster};
use crate::error::AgentError;

// ---------------------------------------------------------------------------
// Coalition
// ---------------------------------------------------------------------------

/// A block-voting group of same-party actors.
#[derive(Debug, Clone)]
pub struct Coalition<P> {
    id: CoalitionId,
    chamber: Chamber,
    party: Party,
    members: Vec<ActorId>,
    position: P,
    importance: f64,
    incentive: Incentive,
    dissolved_at: Option<u64>,
}

struct Aggregate<P> {
    position: P,
    importance: f64,
    incentive: Incentive,
}

fn aggregate<P: PolicyPoint>(
    id: CoalitionId,
    members: &[ActorId],
    roster: &ActorRoster<P>,
) -> Result<Aggregate<P>, AgentError> {
    let actors = members
        .iter()
        .map(|m| roster.require(*m))
        .collect::<Result<Vec<&Actor<P>>, AgentError>>()?;

    let importance: f64 = actors.iter().map(|a| a.importance()).sum();
    let position = weighted_mean(actors.iter().map(|a| (*a.position(), a.importance())))
        .map_err(|e| match e {
            PolicyError::ZeroTotalWeight => AgentError::EmptyCoalitionDivision { coalition: id },
            other => AgentError::from(other),
        })?;
    let incentive = Incentive::aggregate(actors.iter().map(|a| a.incentive()))
        .ok_or(AgentError::EmptyCoalitionDivision { coalition: id })?;

    Ok(Aggregate {
        position,
        importance,
        incentive,
    })
}

impl<P: PolicyPoint> Coalition<P> {
    /// Unique id (formation tick and sequence).
    pub const fn id(&self) -> CoalitionId {
        self.id
    }

    /// Chamber the coalition sits in.
    pub const fn chamber(&self) -> Chamber {
        self.chamber
    }

    /// Party shared by every member.
    pub const fn party(&self) -> Party {
        self.party
    }

    /// Tick the coalition formed.
    pub const fn formed_at(&self) -> u64 {
        self.id.formed_at
    }

    /// Tick the coalition was dissolved, for archived coalitions.
    pub const fn dissolved_at(&self) -> Option<u64> {
        self.dissolved_at
    }

    /// Member ids in joining order.
    pub fn members(&self) -> &[ActorId] {
        &self.members
    }

    /// Whether the given actor is a member.
    pub fn contains(&self, actor: ActorId) -> bool {
        self.members.contains(&actor)
    }

    /// Aggregate position.
    pub const fn position(&self) -> &P {
        &self.position
    }

    /// Aggregate importance.
    pub const fn importance(&self) -> f64 {
        self.importance
    }

    /// Aggregate incentive profile.
    pub const fn incentive(&self) -> &Incentive {
        &self.incentive
    }

    /// Recompute the aggregates from the current members.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::EmptyCoalitionDivision`] when the members'
    /// importances sum to zero; the aggregates are left unchanged and the
    /// coalition should be dissolved.
    pub fn recompute(&mut self, roster: &ActorRoster<P>) -> Result<(), AgentError> {
        let agg = aggregate(self.id, &self.members, roster)?;
        self.position = agg.position;
        self.importance = agg.importance;
        self.incentive = agg.incentive;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

/// Active and archived coalitions of one chamber.
#[derive(Debug, Clone)]
pub struct CoalitionArena<P> {
    active: BTreeMap<CoalitionId, Coalition<P>>,
    broken: Vec<Coalition<P>>,
}

impl<P: PolicyPoint> CoalitionArena<P> {
    /// Create an empty arena.
    pub const fn new() -> Self {
        Self {
            active: BTreeMap::new(),
            broken: Vec::new(),
        }
    }

    /// Look up an active coalition.
    pub fn get(&self, id: CoalitionId) -> Option<&Coalition<P>> {
        self.active.get(&id)
    }

    /// Look up an active coalition, failing with [`AgentError::CoalitionNotFound`].
    pub fn require(&self, id: CoalitionId) -> Result<&Coalition<P>, AgentError> {
        self.get(id).ok_or(AgentError::CoalitionNotFound(id))
    }

    /// Active coalitions in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Coalition<P>> {
        self.active.values()
    }

    /// Ids of active coalitions in creation order.
    pub fn ids(&self) -> Vec<CoalitionId> {
        self.active.keys().copied().collect()
    }

    /// Number of active coalitions.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether there are no active coalitions.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Dissolved coalitions in dissolution order.
    pub fn broken(&self) -> &[Coalition<P>] {
        &self.broken
    }

    /// Found a coalition from unaffiliated, same-party actors.
    ///
    /// Nothing is changed if any check or the initial aggregation fails.
    ///
    /// # Errors
    ///
    /// - [`AgentError::ActorNotFound`] for an unknown member.
    /// - [`AgentError::AlreadyAffiliated`] if a member already has a coalition.
    /// - [`AgentError::PartyMismatch`] if the members' parties differ.
    /// - [`AgentError::EmptyCoalitionDivision`] if their importances sum to zero.
    pub fn form(
        &mut self,
        id: CoalitionId,
        members: &[ActorId],
        roster: &mut ActorRoster<P>,
    ) -> Result<CoalitionId, AgentError> {
        let first = members
            .first()
            .ok_or(AgentError::EmptyCoalitionDivision { coalition: id })?;
        let founder = roster.require(*first)?;
        let party = founder.party();
        let chamber = founder.chamber();

        for member in members {
            let actor = roster.require(*member)?;
            if let Some(existing) = actor.coalition() {
                return Err(AgentError::AlreadyAffiliated {
                    actor: *member,
                    coalition: existing,
                });
            }
            if actor.party() != party {
                return Err(AgentError::PartyMismatch {
                    actor: *member,
                    coalition: id,
                });
            }
        }

        let agg = aggregate(id, members, roster)?;
        for member in members {
            if let Some(actor) = roster.get_mut(*member) {
                actor.set_coalition(Some(id));
            }
        }
        self.active.insert(
            id,
            Coalition {
                id,
                chamber,
                party,
                members: members.to_vec(),
                position: agg.position,
                importance: agg.importance,
                incentive: agg.incentive,
                dissolved_at: None,
            },
        );
        debug!(coalition = %id, members = members.len(), %party, "coalition formed");
        Ok(id)
    }

    /// Add an unaffiliated actor to a coalition and recompute its aggregates.
    ///
    /// # Errors
    ///
    /// Returns the lookup and affiliation errors of [`CoalitionArena::form`].
    /// [`AgentError::EmptyCoalitionDivision`] is returned after the actor
    /// has been added; the caller should then dissolve the coalition.
    pub fn admit(
        &mut self,
        id: CoalitionId,
        actor_id: ActorId,
        roster: &mut ActorRoster<P>,
    ) -> Result<(), AgentError> {
        let actor = roster.require(actor_id)?;
        if let Some(existing) = actor.coalition() {
            return Err(AgentError::AlreadyAffiliated {
                actor: actor_id,
                coalition: existing,
            });
        }
        let party = actor.party();
        let coalition = self
            .active
            .get_mut(&id)
            .ok_or(AgentError::CoalitionNotFound(id))?;
        if coalition.party != party {
            return Err(AgentError::PartyMismatch {
                actor: actor_id,
                coalition: id,
            });
        }

        coalition.members.push(actor_id);
        if let Some(actor) = roster.get_mut(actor_id) {
            actor.set_coalition(Some(id));
        }
        debug!(actor = %actor_id, coalition = %id, "actor joined coalition");
        coalition.recompute(roster)
    }

    /// Remove an actor from its coalition.
    ///
    /// Returns the coalition left, or `None` if the actor had none. The
    /// aggregates are recomputed unless the coalition is now empty.
    ///
    /// # Errors
    ///
    /// - [`AgentError::ActorNotFound`] for an unknown actor.
    /// - [`AgentError::InconsistentMembership`] if the actor's coalition
    ///   is not active.
    /// - [`AgentError::EmptyCoalitionDivision`] if the remaining members'
    ///   importances sum to zero.
    pub fn release(
        &mut self,
        actor_id: ActorId,
        roster: &mut ActorRoster<P>,
    ) -> Result<Option<CoalitionId>, AgentError> {
        let Some(id) = roster.require(actor_id)?.coalition() else {
            return Ok(None);
        };
        let coalition =
            self.active
                .get_mut(&id)
                .ok_or_else(|| AgentError::InconsistentMembership {
                    actor: actor_id,
                    reason: format!("refers to inactive coalition {id}"),
                })?;

        coalition.members.retain(|m| *m != actor_id);
        if let Some(actor) = roster.get_mut(actor_id) {
            actor.set_coalition(None);
        }
        debug!(actor = %actor_id, coalition = %id, "actor left coalition");
        if !coalition.members.is_empty() {
            coalition.recompute(roster)?;
        }
        Ok(Some(id))
    }

    /// Dissolve a coalition: clear every member's back-reference and move
    /// the coalition to the broken archive.
    ///
    /// Returns the former members.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::CoalitionNotFound`] if the coalition is not active.
    pub fn dissolve(
        &mut self,
        id: CoalitionId,
        tick: u64,
        roster: &mut ActorRoster<P>,
    ) -> Result<Vec<ActorId>, AgentError> {
        let mut coalition = self
            .active
            .remove(&id)
            .ok_or(AgentError::CoalitionNotFound(id))?;
        for member in &coalition.members {
            if let Some(actor) = roster.get_mut(*member) {
                actor.set_coalition(None);
            }
        }
        coalition.dissolved_at = Some(tick);
        let members = coalition.members.clone();
        debug!(coalition = %id, members = members.len(), tick, "coalition dissolved");
        self.broken.push(coalition);
        Ok(members)
    }

    /// Dissolve every coalition left with at most one member.
    ///
    /// Returns the dissolved ids in creation order.
    pub fn dissolve_undersized(
        &mut self,
        tick: u64,
        roster: &mut ActorRoster<P>,
    ) -> Vec<CoalitionId> {
        let undersized: Vec<CoalitionId> = self
            .active
            .values()
            .filter(|c| c.members.len() <= 1)
            .map(Coalition::id)
            .collect();
        undersized
            .into_iter()
            .filter(|id| self.dissolve(*id, tick, roster).is_ok())
            .collect()
    }

    /// Recompute every coalition's aggregates, e.g. after aging.
    ///
    /// Coalitions whose aggregation fails are dissolved; their ids are
    /// returned in creation order.
    pub fn refresh(&mut self, tick: u64, roster: &mut ActorRoster<P>) -> Vec<CoalitionId> {
        let mut failed = Vec::new();
        for coalition in self.active.values_mut() {
            if let Err(err) = coalition.recompute(roster) {
                warn!(
                    coalition = %coalition.id,
                    error = %err,
                    "dissolving coalition that cannot be aggregated"
                );
                failed.push(coalition.id);
            }
        }
        failed
            .into_iter()
            .filter(|id| self.dissolve(*id, tick, roster).is_ok())
            .collect()
    }

    /// The same-party coalition closest to an actor's position.
    ///
    /// Ties go to the earliest-created coalition.
    pub fn closest(&self, actor: &Actor<P>) -> Option<(CoalitionId, f64)> {
        let mut best: Option<(CoalitionId, f64)> = None;
        for coalition in self.active.values().filter(|c| c.party == actor.party()) {
            let distance = actor.position().distance(&coalition.position);
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((coalition.id, distance));
            }
        }
        best
    }

    /// Check that actor back-references and coalition member lists agree.
    ///
    /// Every member must point back at its coalition, appear in exactly
    /// one coalition, and share its party; every affiliated actor must be
    /// listed by the coalition it points at.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InconsistentMembership`] for the first
    /// violation found.
    pub fn verify(&self, roster: &ActorRoster<P>) -> Result<(), AgentError> {
        let mut seen: BTreeMap<ActorId, CoalitionId> = BTreeMap::new();
        for coalition in self.active.values() {
            for member in &coalition.members {
                let actor = roster.require(*member)?;
                if actor.coalition() != Some(coalition.id) {
                    return Err(AgentError::InconsistentMembership {
                        actor: *member,
                        reason: format!("listed by {} but does not refer to it", coalition.id),
                    });
                }
                if actor.party() != coalition.party {
                    return Err(AgentError::InconsistentMembership {
                        actor: *member,
                        reason: format!("party differs from {}", coalition.id),
                    });
                }
                if let Some(other) = seen.insert(*member, coalition.id) {
                    return Err(AgentError::InconsistentMembership {
                        actor: *member,
                        reason: format!("listed by both {other} and {}", coalition.id),
                    });
                }
            }
        }
        for actor in roster.iter() {
            if let Some(id) = actor.coalition() {
                if seen.get(&actor.id()) != Some(&id) {
                    return Err(AgentError::InconsistentMembership {
                        actor: actor.id(),
                        reason: format!("refers to {id} but is not listed by it"),
                    });
                }
            }
        }
        Ok(())
    }
}

impl<P: PolicyPoint> Default for CoalitionArena<P> {
    fn default() -> Self {
        Self::new()
    }
}
