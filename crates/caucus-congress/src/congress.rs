//! The two-chamber legislative pipeline.
//!
//! On a new-legislature tick the [`Congress`] introduces a batch of bills
//! from a sponsor pool spanning both chambers, votes every bill in the
//! House, sends the survivors to the Senate, and finally submits the bills
//! that cleared both chambers to an [`Executive`].

use std::collections::VecDeque;

use caucus_agents::{FormationConfig, FormationReport};
use caucus_types::{ActorId, BillId, Chamber, CoalitionId, Party, PolicyPoint, PolicyRange, Vote};
use tracing::{debug, info};

use crate::bill::{Bill, Sponsor, Stage};
use crate::chamber::VotingBody;
use crate::error::CongressError;
use crate::executive::Executive;
use crate::party::PartyRegistry;
use crate::sampling::Sampler;
use crate::voting::VotingRule;

/// Counts from one round of chamber votes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassingReport {
    /// The tick the votes took place.
    pub tick: u64,
    /// Bills voted on in the House.
    pub introduced: usize,
    /// Bills that passed the House.
    pub passed_house: usize,
    /// Bills that passed the Senate as well.
    pub passed_senate: usize,
}

/// Both chambers plus the bills they vote on.
#[derive(Debug, Clone)]
pub struct Congress<P> {
    house: VotingBody<P>,
    senate: VotingBody<P>,
    bills_by_tick: VecDeque<(u64, Vec<Bill<P>>)>,
    successful: Vec<BillId>,
    next_bill: u32,
    history_limit: Option<usize>,
}

impl<P: PolicyPoint> Congress<P> {
    /// Assemble a congress from its two chambers.
    pub const fn new(house: VotingBody<P>, senate: VotingBody<P>) -> Self {
        Self {
            house,
            senate,
            bills_by_tick: VecDeque::new(),
            successful: Vec::new(),
            next_bill: 0,
            history_limit: None,
        }
    }

    /// Keep bills and vote lists for at most `ticks` voting ticks.
    #[must_use]
    pub fn with_history_limit(mut self, ticks: Option<usize>) -> Self {
        self.house = self.house.with_history_limit(ticks);
        self.senate = self.senate.with_history_limit(ticks);
        self.history_limit = ticks;
        self
    }

    /// The lower chamber.
    pub const fn house(&self) -> &VotingBody<P> {
        &self.house
    }

    /// The upper chamber.
    pub const fn senate(&self) -> &VotingBody<P> {
        &self.senate
    }

    /// One chamber.
    pub const fn chamber(&self, chamber: Chamber) -> &VotingBody<P> {
        match chamber {
            Chamber::House => &self.house,
            Chamber::Senate => &self.senate,
        }
    }

    /// Bills per introduction tick, oldest first.
    pub fn bills_by_tick(&self) -> impl Iterator<Item = &(u64, Vec<Bill<P>>)> {
        self.bills_by_tick.iter()
    }

    /// Bills introduced at the most recent legislative tick.
    pub fn latest_bills(&self) -> Option<&[Bill<P>]> {
        self.bills_by_tick.back().map(|(_, bills)| bills.as_slice())
    }

    /// Look up a retained bill.
    pub fn bill(&self, id: BillId) -> Option<&Bill<P>> {
        self.bills_by_tick
            .iter()
            .flat_map(|(_, bills)| bills)
            .find(|b| b.id() == id)
    }

    /// Bills that passed both chambers in the latest round of votes.
    pub fn successful(&self) -> &[BillId] {
        &self.successful
    }

    /// Number of possible sponsors: actors and coalitions of both chambers.
    pub fn sponsor_pool_size(&self) -> usize {
        [&self.house, &self.senate]
            .iter()
            .map(|body| body.roster().len().saturating_add(body.coalitions().len()))
            .fold(0, usize::saturating_add)
    }

    /// Resolve a sponsor-pool index: House actors, House coalitions,
    /// Senate actors, then Senate coalitions.
    fn sponsor_at(&self, mut index: usize) -> Option<(Sponsor, Party, P)> {
        for body in [&self.house, &self.senate] {
            let chamber = body.chamber();
            let actors = body.roster().len();
            if index < actors {
                let actor = body.roster().get(ActorId::from_index(index)?)?;
                let sponsor = Sponsor::Actor {
                    chamber,
                    id: actor.id(),
                };
                return Some((sponsor, actor.party(), *actor.position()));
            }
            index = index.checked_sub(actors)?;

            let coalitions = body.coalitions().len();
            if index < coalitions {
                let coalition = body.coalitions().iter().nth(index)?;
                let sponsor = Sponsor::Coalition {
                    chamber,
                    id: coalition.id(),
                };
                return Some((sponsor, coalition.party(), *coalition.position()));
            }
            index = index.checked_sub(coalitions)?;
        }
        None
    }

    /// Introduce `count` bills at `tick`.
    ///
    /// Each bill draws a sponsor uniformly from the pool, an acceptance
    /// region reaching up to `wiggle` below and above the sponsor's
    /// position on every axis, and a popularity from `[0, 1)`.
    ///
    /// # Errors
    ///
    /// - [`CongressError::EmptySponsorPool`] if neither chamber has an actor.
    /// - [`CongressError::BillIdsExhausted`] if the id space runs out.
    /// - [`CongressError::Policy`] for a negative or non-finite `wiggle`.
    pub fn generate_bills(
        &mut self,
        count: usize,
        tick: u64,
        wiggle: f64,
        sampler: &mut dyn Sampler,
    ) -> Result<Vec<BillId>, CongressError> {
        let pool = self.sponsor_pool_size();
        if pool == 0 {
            return Err(CongressError::EmptySponsorPool);
        }

        let mut bills = Vec::with_capacity(count);
        for _ in 0..count {
            let (sponsor, party, position) = self
                .sponsor_at(sampler.index(pool))
                .ok_or(CongressError::EmptySponsorPool)?;

            let mut below = Vec::with_capacity(P::AXES);
            let mut above = Vec::with_capacity(P::AXES);
            for _ in 0..P::AXES {
                below.push(wiggle * sampler.unit());
                above.push(wiggle * sampler.unit());
            }
            let acceptance = PolicyRange::around(&position, &below, &above)?;
            let popularity = sampler.unit();

            let id = BillId::new(self.next_bill);
            self.next_bill = self
                .next_bill
                .checked_add(1)
                .ok_or(CongressError::BillIdsExhausted)?;
            bills.push(Bill::new(id, sponsor, party, popularity, acceptance, tick)?);
        }

        let ids = bills.iter().map(Bill::id).collect();
        debug!(tick, bills = bills.len(), "bills introduced");
        self.bills_by_tick.push_back((tick, bills));
        if let Some(limit) = self.history_limit {
            while self.bills_by_tick.len() > limit {
                self.bills_by_tick.pop_front();
            }
        }
        Ok(ids)
    }

    /// Vote the bills introduced at `tick`: House first, then the Senate
    /// on the bills that passed the House.
    ///
    /// # Errors
    ///
    /// Returns [`CongressError::OutcomeAlreadyRecorded`] if the bills of
    /// this tick were already voted on.
    pub fn attempt_passing(
        &mut self,
        rule: &VotingRule,
        parties: &PartyRegistry<P>,
        tick: u64,
    ) -> Result<PassingReport, CongressError> {
        self.successful.clear();
        let Some((_, bills)) = self.bills_by_tick.iter_mut().rev().find(|(t, _)| *t == tick) else {
            return Ok(PassingReport {
                tick,
                ..PassingReport::default()
            });
        };

        let mut house_votes = Vec::with_capacity(bills.len());
        for bill in bills.iter_mut() {
            let vote = self.house.tally(bill, rule, parties, tick);
            bill.record(Stage::House, vote.passed())?;
            house_votes.push(vote);
        }

        let mut senate_votes = Vec::new();
        for bill in bills.iter_mut().filter(|b| b.passed_house()) {
            let vote = self.senate.tally(bill, rule, parties, tick);
            bill.record(Stage::Senate, vote.passed())?;
            senate_votes.push(vote);
        }

        self.successful = bills
            .iter()
            .filter(|b| b.passed_senate())
            .map(Bill::id)
            .collect();

        let report = PassingReport {
            tick,
            introduced: house_votes.len(),
            passed_house: senate_votes.len(),
            passed_senate: self.successful.len(),
        };
        self.house.record_votes(tick, house_votes);
        self.senate.record_votes(tick, senate_votes);

        info!(
            tick,
            introduced = report.introduced,
            passed_house = report.passed_house,
            passed_senate = report.passed_senate,
            "bills voted"
        );
        Ok(report)
    }

    /// Submit every bill that passed both chambers and still awaits a
    /// decision to the executive. Returns the bills signed into law.
    ///
    /// # Errors
    ///
    /// Propagates outcome-recording errors.
    pub fn submit_to_executive(
        &mut self,
        executive: &mut dyn Executive<P>,
        parties: &PartyRegistry<P>,
        sampler: &mut dyn Sampler,
    ) -> Result<Vec<BillId>, CongressError> {
        let mut enacted = Vec::new();
        let mut submitted = 0_usize;
        let pending = self
            .bills_by_tick
            .iter_mut()
            .flat_map(|(_, bills)| bills.iter_mut())
            .filter(|b| b.passed_senate() && b.outcome(Stage::Executive).is_none());

        for bill in pending {
            submitted = submitted.saturating_add(1);
            let approved = executive.approve(bill, parties, sampler);
            bill.record(Stage::Executive, approved)?;
            if approved {
                enacted.push(bill.id());
            }
        }

        info!(
            party = %executive.party(),
            submitted,
            enacted = enacted.len(),
            "executive decisions"
        );
        Ok(enacted)
    }

    /// Age both chambers. Returns coalitions dissolved on recomputation.
    pub fn age(&mut self, tick: u64) -> Vec<CoalitionId> {
        let mut dissolved = self.house.age(tick);
        dissolved.extend(self.senate.age(tick));
        dissolved
    }

    /// Run one formation step in each chamber, House first.
    ///
    /// # Errors
    ///
    /// Propagates membership inconsistencies.
    pub fn form_coalitions(
        &mut self,
        tick: u64,
        config: &FormationConfig,
    ) -> Result<[FormationReport; 2], CongressError> {
        let house = self.house.form_coalitions(tick, config)?;
        let senate = self.senate.form_coalitions(tick, config)?;
        Ok([house, senate])
    }

    /// Append a new position to every party aggregate from both chambers.
    ///
    /// # Errors
    ///
    /// Propagates policy errors from aggregation.
    pub fn refresh_parties(&self, parties: &mut PartyRegistry<P>) -> Result<(), CongressError> {
        parties.refresh(self.house.roster(), self.senate.roster())
    }

    /// Latest vote lists of both chambers, House first.
    pub fn latest_votes(&self) -> impl Iterator<Item = &Vote> {
        self.house
            .latest_votes()
            .into_iter()
            .chain(self.senate.latest_votes())
            .flatten()
    }

    /// Check membership consistency of both chambers.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn verify(&self) -> Result<(), CongressError> {
        self.house.verify()?;
        self.senate.verify()?;
        Ok(())
    }
}
