//! Party aggregates.
//!
//! Each party tracks its importance-weighted mean position per chamber
//! (and across both chambers) as a time series, one entry per refresh.
//! Refreshes happen on every new-legislature tick, before any voting.
//! A party with no members (or only zero-importance members) in a chamber
//! has no position there, recorded as `None`.

use caucus_agents::ActorRoster;
use caucus_types::{Chamber, Party, PolicyError, PolicyPoint, weighted_mean};
use tracing::debug;

use crate::error::CongressError;

/// Position history of one party.
#[derive(Debug, Clone)]
pub struct PartyAggregate<P> {
    party: Party,
    house: Vec<Option<P>>,
    senate: Vec<Option<P>>,
    combined: Vec<Option<P>>,
}

impl<P: PolicyPoint> PartyAggregate<P> {
    const fn new(party: Party) -> Self {
        Self {
            party,
            house: Vec::new(),
            senate: Vec::new(),
            combined: Vec::new(),
        }
    }

    /// The party.
    pub const fn party(&self) -> Party {
        self.party
    }

    /// Position history in one chamber, oldest first.
    pub fn history(&self, chamber: Chamber) -> &[Option<P>] {
        match chamber {
            Chamber::House => &self.house,
            Chamber::Senate => &self.senate,
        }
    }

    /// Position history across both chambers, oldest first.
    pub fn combined_history(&self) -> &[Option<P>] {
        &self.combined
    }

    /// Latest position in a chamber, or across both when `chamber` is `None`.
    pub fn current(&self, chamber: Option<Chamber>) -> Option<&P> {
        let series = match chamber {
            Some(Chamber::House) => &self.house,
            Some(Chamber::Senate) => &self.senate,
            None => &self.combined,
        };
        series.last().and_then(Option::as_ref)
    }
}

/// Importance-weighted mean position of a party's members, or `None` if
/// they have no total weight.
fn party_mean<'a, P, I>(members: I) -> Result<Option<P>, CongressError>
where
    P: PolicyPoint + 'a,
    I: IntoIterator<Item = (&'a P, f64)>,
{
    match weighted_mean(members.into_iter().map(|(p, w)| (*p, w))) {
        Ok(position) => Ok(Some(position)),
        Err(PolicyError::ZeroTotalWeight) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Aggregates for every party.
#[derive(Debug, Clone)]
pub struct PartyRegistry<P> {
    aggregates: Vec<PartyAggregate<P>>,
}

impl<P: PolicyPoint> PartyRegistry<P> {
    /// One empty aggregate per party.
    pub fn new() -> Self {
        Self {
            aggregates: Party::ALL.iter().map(|p| PartyAggregate::new(*p)).collect(),
        }
    }

    /// The aggregate of one party.
    pub fn get(&self, party: Party) -> Option<&PartyAggregate<P>> {
        self.aggregates.iter().find(|a| a.party == party)
    }

    /// Latest position of a party in a chamber (`None` = across both).
    pub fn position(&self, party: Party, chamber: Option<Chamber>) -> Option<&P> {
        self.get(party).and_then(|a| a.current(chamber))
    }

    /// Append a new position to every party's series from the current
    /// members of both chambers.
    ///
    /// # Errors
    ///
    /// Returns a policy error if a member importance is invalid.
    pub fn refresh(
        &mut self,
        house: &ActorRoster<P>,
        senate: &ActorRoster<P>,
    ) -> Result<(), CongressError> {
        for aggregate in &mut self.aggregates {
            let party = aggregate.party;
            let members = |roster: &ActorRoster<P>| {
                roster
                    .iter()
                    .filter(|a| a.party() == party)
                    .map(|a| (*a.position(), a.importance()))
                    .collect::<Vec<_>>()
            };
            let in_house = members(house);
            let in_senate = members(senate);

            let house_pos = party_mean(in_house.iter().map(|(p, w)| (p, *w)))?;
            let senate_pos = party_mean(in_senate.iter().map(|(p, w)| (p, *w)))?;
            let combined_pos =
                party_mean(in_house.iter().chain(&in_senate).map(|(p, w)| (p, *w)))?;

            debug!(
                %party,
                house_members = in_house.len(),
                senate_members = in_senate.len(),
                "party aggregate refreshed"
            );
            aggregate.house.push(house_pos);
            aggregate.senate.push(senate_pos);
            aggregate.combined.push(combined_pos);
        }
        Ok(())
    }
}

impl<P: PolicyPoint> Default for PartyRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}
