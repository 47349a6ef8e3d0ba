//! Leaf actors and the per-chamber actor roster.
//!
//! An [`Actor`] is one representative or senator: a fixed policy
//! position, an incentive profile, an importance weight that grows as the
//! legislature ages, and an optional back-reference to the coalition it
//! currently belongs to. The [`ActorRoster`] owns every actor of one
//! chamber and hands out dense [`ActorId`]s in insertion order.
//!
//! Coalition membership is only ever changed through
//! [`CoalitionArena`](crate::coalition::CoalitionArena), which keeps the
//! back-reference and the coalition's member list in step.

use caucus_types::{ActorId, Chamber, CoalitionId, Incentive, Party, PolicyPoint};

use crate::error::AgentError;

/// Importance multiplier at a given tick: `sqrt(tick + 1)`.
///
/// Ticks beyond `u32::MAX` saturate.
pub fn aging_factor(tick: u64) -> f64 {
    let elapsed = u32::try_from(tick.saturating_add(1)).unwrap_or(u32::MAX);
    f64::from(elapsed).sqrt()
}

/// Identity fields carried over from the roster entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterFields {
    /// Display label, e.g. `HR_0_12`.
    pub label: String,
    /// State or region represented.
    pub state: String,
    /// Electoral district, for lower-chamber seats.
    pub district: Option<String>,
    /// Display name.
    pub name: String,
}

/// Everything needed to seat a new actor.
#[derive(Debug, Clone)]
pub struct ActorParams<P> {
    /// Chamber the actor sits in.
    pub chamber: Chamber,
    /// Identity fields.
    pub roster: RosterFields,
    /// Party affiliation.
    pub party: Party,
    /// Fixed policy position.
    pub position: P,
    /// Fixed incentive profile.
    pub incentive: Incentive,
    /// Importance before aging is applied.
    pub base_importance: f64,
    /// Tick the actor was seated.
    pub joined_at: u64,
}

/// A leaf voting entity.
#[derive(Debug, Clone)]
pub struct Actor<P> {
    id: ActorId,
    chamber: Chamber,
    roster: RosterFields,
    party: Party,
    position: P,
    incentive: Incentive,
    base_importance: f64,
    importance: f64,
    joined_at: u64,
    coalition: Option<CoalitionId>,
}

impl<P: PolicyPoint> Actor<P> {
    /// Build an actor from its parameters.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidImportance`] if the base importance is
    /// negative or not finite.
    pub fn new(id: ActorId, params: ActorParams<P>) -> Result<Self, AgentError> {
        let base = params.base_importance;
        if !base.is_finite() || base < 0.0 {
            return Err(AgentError::InvalidImportance {
                actor: id,
                value: base,
            });
        }
        Ok(Self {
            id,
            chamber: params.chamber,
            roster: params.roster,
            party: params.party,
            position: params.position,
            incentive: params.incentive,
            base_importance: base,
            importance: base,
            joined_at: params.joined_at,
            coalition: None,
        })
    }

    /// Unique id within the chamber roster.
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Chamber the actor sits in.
    pub const fn chamber(&self) -> Chamber {
        self.chamber
    }

    /// Display label.
    pub fn label(&self) -> &str {
        &self.roster.label
    }

    /// Identity fields.
    pub const fn roster(&self) -> &RosterFields {
        &self.roster
    }

    /// Party affiliation.
    pub const fn party(&self) -> Party {
        self.party
    }

    /// Policy position.
    pub const fn position(&self) -> &P {
        &self.position
    }

    /// Incentive profile.
    pub const fn incentive(&self) -> &Incentive {
        &self.incentive
    }

    /// Importance before aging.
    pub const fn base_importance(&self) -> f64 {
        self.base_importance
    }

    /// Current importance.
    pub const fn importance(&self) -> f64 {
        self.importance
    }

    /// Tick the actor was seated.
    pub const fn joined_at(&self) -> u64 {
        self.joined_at
    }

    /// Coalition the actor currently belongs to.
    pub const fn coalition(&self) -> Option<CoalitionId> {
        self.coalition
    }

    /// Whether the actor belongs to no coalition.
    pub const fn is_unaffiliated(&self) -> bool {
        self.coalition.is_none()
    }

    /// Recompute importance for the given tick from the base importance.
    pub fn age(&mut self, tick: u64) {
        self.importance = self.base_importance * aging_factor(tick);
    }

    pub(crate) const fn set_coalition(&mut self, coalition: Option<CoalitionId>) {
        self.coalition = coalition;
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// All actors of one chamber, indexed by [`ActorId`].
#[derive(Debug, Clone)]
pub struct ActorRoster<P> {
    actors: Vec<Actor<P>>,
}

impl<P: PolicyPoint> ActorRoster<P> {
    /// Create an empty roster.
    pub const fn new() -> Self {
        Self { actors: Vec::new() }
    }

    /// Seat a new actor and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::RosterFull`] when ids are exhausted, or the
    /// construction error from [`Actor::new`].
    pub fn seat(&mut self, params: ActorParams<P>) -> Result<ActorId, AgentError> {
        let id = ActorId::from_index(self.actors.len()).ok_or(AgentError::RosterFull)?;
        self.actors.push(Actor::new(id, params)?);
        Ok(id)
    }

    /// Look up an actor.
    pub fn get(&self, id: ActorId) -> Option<&Actor<P>> {
        self.actors.get(id.index())
    }

    /// Look up an actor mutably.
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor<P>> {
        self.actors.get_mut(id.index())
    }

    /// Look up an actor, failing with [`AgentError::ActorNotFound`].
    pub fn require(&self, id: ActorId) -> Result<&Actor<P>, AgentError> {
        self.get(id).ok_or(AgentError::ActorNotFound(id))
    }

    /// Iterate over actors in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &Actor<P>> {
        self.actors.iter()
    }

    /// Ids of actors with no coalition, in roster order.
    pub fn unaffiliated(&self) -> Vec<ActorId> {
        self.actors
            .iter()
            .filter(|a| a.is_unaffiliated())
            .map(Actor::id)
            .collect()
    }

    /// Number of seated actors.
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Age every actor to the given tick.
    pub fn age_all(&mut self, tick: u64) {
        for actor in &mut self.actors {
            actor.age(tick);
        }
    }
}

impl<P: PolicyPoint> Default for ActorRoster<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use caucus_types::{FinancialClass, LinearPolicy};

    use super::*;

    fn params(position: f64, base_importance: f64) -> ActorParams<LinearPolicy> {
        ActorParams {
            chamber: Chamber::House,
            roster: RosterFields {
                label: String::from("HR_0_0"),
                state: String::from("OH"),
                district: Some(String::from("3")),
                name: String::from("Test Member"),
            },
            party: Party::Democratic,
            position: LinearPolicy::new(position).unwrap(),
            incentive: Incentive::new(FinancialClass::SmallDollar, 0.5, 0.5).unwrap(),
            base_importance,
            joined_at: 0,
        }
    }

    #[test]
    fn seat_assigns_dense_ids() {
        let mut roster = ActorRoster::new();
        let a = roster.seat(params(0.1, 1.0)).unwrap();
        let b = roster.seat(params(0.2, 1.0)).unwrap();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.unaffiliated(), vec![a, b]);
    }

    #[test]
    fn rejects_negative_importance() {
        let mut roster = ActorRoster::new();
        let result = roster.seat(params(0.1, -1.0));
        assert!(matches!(result, Err(AgentError::InvalidImportance { .. })));
        assert!(roster.is_empty());
    }

    #[test]
    fn rejects_nan_importance() {
        let result = Actor::new(ActorId::new(0), params(0.1, f64::NAN));
        assert!(result.is_err());
    }

    #[test]
    fn aging_follows_square_root_of_elapsed_ticks() {
        let mut actor = Actor::new(ActorId::new(0), params(0.5, 2.0)).unwrap();
        actor.age(0);
        assert!((actor.importance() - 2.0).abs() < 1e-12);
        actor.age(3);
        assert!((actor.importance() - 4.0).abs() < 1e-12);
        // Aging is always relative to the base, never compounded.
        actor.age(3);
        assert!((actor.importance() - 4.0).abs() < 1e-12);
        assert!((actor.base_importance() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn aging_factor_saturates() {
        assert!(aging_factor(u64::MAX).is_finite());
    }
}
