//! A chamber: its actors, its coalitions, and its tallies.
//!
//! A [`VotingBody`] owns one chamber's [`ActorRoster`] and
//! [`CoalitionArena`], so the two chambers never share mutable state. To
//! tally a bill, every coalition casts one block vote attributed to all
//! of its members, then every unaffiliated actor votes individually. The
//! bill passes when the yeas reach the chamber's majority threshold.

use std::collections::VecDeque;

use caucus_agents::{
    ActorRoster, AgentError, CoalitionArena, FormationConfig, FormationReport, apply_aging,
    run_formation_step,
};
use caucus_types::{Chamber, CoalitionId, PolicyPoint, Vote};

use crate::bill::Bill;
use crate::party::PartyRegistry;
use crate::voting::VotingRule;

/// One chamber of the legislature.
#[derive(Debug, Clone)]
pub struct VotingBody<P> {
    chamber: Chamber,
    roster: ActorRoster<P>,
    coalitions: CoalitionArena<P>,
    threshold: usize,
    votes_by_tick: VecDeque<(u64, Vec<Vote>)>,
    history_limit: Option<usize>,
}

impl<P: PolicyPoint> VotingBody<P> {
    /// Create a chamber from its seated roster and yea threshold.
    pub const fn new(chamber: Chamber, roster: ActorRoster<P>, threshold: usize) -> Self {
        Self {
            chamber,
            roster,
            coalitions: CoalitionArena::new(),
            threshold,
            votes_by_tick: VecDeque::new(),
            history_limit: None,
        }
    }

    /// Keep vote lists for at most `ticks` ticks (`None` keeps everything).
    #[must_use]
    pub fn with_history_limit(mut self, ticks: Option<usize>) -> Self {
        self.history_limit = ticks;
        self
    }

    /// Which chamber this is.
    pub const fn chamber(&self) -> Chamber {
        self.chamber
    }

    /// The seated actors.
    pub const fn roster(&self) -> &ActorRoster<P> {
        &self.roster
    }

    /// The coalitions.
    pub const fn coalitions(&self) -> &CoalitionArena<P> {
        &self.coalitions
    }

    /// Yeas needed to pass a bill.
    pub const fn threshold(&self) -> usize {
        self.threshold
    }

    /// Recorded vote lists, oldest first.
    pub fn votes_by_tick(&self) -> impl Iterator<Item = &(u64, Vec<Vote>)> {
        self.votes_by_tick.iter()
    }

    /// Vote list of the most recent voting tick.
    pub fn latest_votes(&self) -> Option<&[Vote]> {
        self.votes_by_tick.back().map(|(_, votes)| votes.as_slice())
    }

    /// Tally one bill.
    pub fn tally(
        &self,
        bill: &Bill<P>,
        rule: &VotingRule,
        parties: &PartyRegistry<P>,
        tick: u64,
    ) -> Vote {
        let mut yeas = Vec::new();
        let mut nays = Vec::new();

        for coalition in self.coalitions.iter() {
            let party_position = parties.position(coalition.party(), Some(self.chamber));
            let target = if rule.vote(coalition, bill, party_position) {
                &mut yeas
            } else {
                &mut nays
            };
            target.extend_from_slice(coalition.members());
        }

        for actor in self.roster.iter().filter(|a| a.is_unaffiliated()) {
            let party_position = parties.position(actor.party(), Some(self.chamber));
            if rule.vote(actor, bill, party_position) {
                yeas.push(actor.id());
            } else {
                nays.push(actor.id());
            }
        }

        Vote {
            chamber: self.chamber,
            bill: bill.id(),
            yeas,
            nays,
            tick,
            threshold: self.threshold,
        }
    }

    /// Store the vote list of a tick, dropping the oldest beyond the limit.
    pub fn record_votes(&mut self, tick: u64, votes: Vec<Vote>) {
        self.votes_by_tick.push_back((tick, votes));
        if let Some(limit) = self.history_limit {
            while self.votes_by_tick.len() > limit {
                self.votes_by_tick.pop_front();
            }
        }
    }

    /// Age every actor and refresh coalition aggregates.
    pub fn age(&mut self, tick: u64) -> Vec<CoalitionId> {
        apply_aging(&mut self.roster, &mut self.coalitions, tick)
    }

    /// Run one coalition-formation step.
    ///
    /// # Errors
    ///
    /// Propagates membership inconsistencies from the formation engine.
    pub fn form_coalitions(
        &mut self,
        tick: u64,
        config: &FormationConfig,
    ) -> Result<FormationReport, AgentError> {
        run_formation_step(&mut self.roster, &mut self.coalitions, tick, config)
    }

    /// Check actor/coalition membership consistency.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn verify(&self) -> Result<(), AgentError> {
        self.coalitions.verify(&self.roster)
    }
}
