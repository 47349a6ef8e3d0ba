//! Tick cycle: one month of the legislature.
//!
//! Each tick runs through these phases:
//!
//! 1. **Aging** -- every actor of both chambers ages to the current tick
//!    and every coalition recomputes its derived fields. Coalitions whose
//!    aggregates can no longer be computed are dissolved.
//!
//! 2. **Events** -- the [`Scheduler`] lists the tick's event tags and each
//!    is handled in order:
//!    - `NEW_LEGISLATURE`: refresh party aggregates, introduce a batch of
//!      bills, vote them through House and Senate, and submit the
//!      survivors to the executive.
//!    - `OPINION_FORMATION`: one coalition formation step per chamber.
//!    - anything else is forwarded to collaborators outside the core and
//!      only logged here.
//!
//! 3. **Advance** -- the clock moves to the next month.
//!
//! The cycle is deterministic given the same initial state and seed: all
//! draws come from the state's single generator.

use caucus_agents::FormationConfig;
use caucus_congress::{
    Congress, CongressError, Executive, MetricExecutive, PartisanExecutive, PartyRegistry,
    PassingReport, VotingBody, VotingRule,
};
use caucus_types::{BillId, Chamber, EventTag, PolicyError, PolicyPoint};
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::clock::{ClockError, SimulationClock, TimeStep};
use crate::config::{ExecutiveKind, SimulationConfig};
use crate::roster::{RosterError, RosterSource, seat_chamber};
use crate::sampling::{initial_incentive, initial_position, seeded_rng};
use crate::schedule::Scheduler;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// Bill generation, voting, or coalition formation failed.
    #[error("congress error at tick {tick}: {source}")]
    Congress {
        /// The tick being executed.
        tick: u64,
        /// The underlying congress error.
        source: CongressError,
    },
}

/// Errors that can occur while assembling the initial state.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The calendar is unusable.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A chamber could not be seated.
    #[error("roster error: {source}")]
    Roster {
        /// The underlying roster error.
        #[from]
        source: RosterError,
    },

    /// The executive's position or incentive could not be drawn.
    #[error("executive error: {source}")]
    Executive {
        /// The underlying policy error.
        #[from]
        source: PolicyError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// The calendar month of the tick.
    pub time: TimeStep,
    /// Event tags handled, in order.
    pub events: Vec<EventTag>,
    /// Chamber vote counts, if a new legislature sat this tick.
    pub passing: Option<PassingReport>,
    /// Bills signed into law this tick.
    pub enacted: Vec<BillId>,
    /// Coalitions founded this tick, both chambers.
    pub coalitions_formed: usize,
    /// Coalitions dissolved this tick, by aging or formation.
    pub coalitions_dissolved: usize,
    /// Actors that joined a coalition this tick.
    pub joined: usize,
    /// Actors that left a coalition this tick.
    pub left: usize,
    /// Active coalitions in the House at the end of the tick.
    pub house_coalitions: usize,
    /// Active coalitions in the Senate at the end of the tick.
    pub senate_coalitions: usize,
    /// Tags the core does not act on.
    pub forwarded: Vec<EventTag>,
}

/// The mutable simulation state passed through the tick cycle.
pub struct SimulationState<P> {
    /// Monthly clock.
    pub clock: SimulationClock,
    /// Both chambers and their bills.
    pub congress: Congress<P>,
    /// Party position history.
    pub parties: PartyRegistry<P>,
    /// Formation tunables.
    pub formation: FormationConfig,
    /// Legislators' voting rule.
    pub voting: VotingRule,
    /// The final decision-maker.
    pub executive: Box<dyn Executive<P>>,
    /// The run's single random source.
    pub rng: StdRng,
    /// Bills introduced per new legislature.
    pub bills_per_tick: usize,
    /// Reach of a bill's acceptance region around its sponsor.
    pub region_wiggle: f64,
}

impl<P: PolicyPoint + 'static> SimulationState<P> {
    /// Seat both chambers for the start year and assemble a state at tick 0.
    ///
    /// Draw order from the seeded generator: House actors, Senate actors,
    /// then the executive's position and incentive (metric executive only).
    pub fn from_config(
        config: &SimulationConfig,
        roster: &dyn RosterSource,
    ) -> Result<Self, SetupError> {
        let run = &config.simulation;
        let mut rng = seeded_rng(run.seed);
        let clock = SimulationClock::new(run.start_year, run.end_year)?;

        let chambers = &config.chambers;
        let house = seat_chamber(
            Chamber::House,
            &roster.entries(Chamber::House, run.start_year)?,
            &config.sampling,
            0,
            &mut rng,
        )?;
        let senate = seat_chamber(
            Chamber::Senate,
            &roster.entries(Chamber::Senate, run.start_year)?,
            &config.sampling,
            0,
            &mut rng,
        )?;
        info!(
            start_year = run.start_year,
            house = house.len(),
            senate = senate.len(),
            "Chambers seated"
        );

        let congress = Congress::new(
            VotingBody::new(Chamber::House, house, chambers.house_threshold),
            VotingBody::new(Chamber::Senate, senate, chambers.senate_threshold),
        )
        .with_history_limit(run.history_ticks);

        let exec = &config.executive;
        let executive: Box<dyn Executive<P>> = match exec.kind {
            ExecutiveKind::Metric => Box::new(MetricExecutive::new(
                exec.party,
                initial_position::<P>(exec.party, &mut rng)?,
                initial_incentive(&config.sampling, &mut rng)?,
                config.executive_rule(),
            )),
            ExecutiveKind::Partisan => Box::new(PartisanExecutive::new(
                exec.party,
                exec.same_party_approval,
                exec.other_party_approval,
            )),
        };
        info!(party = %exec.party, kind = ?exec.kind, "Executive ready");

        Ok(Self {
            clock,
            congress,
            parties: PartyRegistry::new(),
            formation: config.formation.to_formation_config(),
            voting: config.voting_rule(),
            executive,
            rng,
            bills_per_tick: run.bills_per_tick,
            region_wiggle: config.sampling.region_wiggle,
        })
    }
}

/// Execute one tick at the clock's current month, then advance the clock.
///
/// # Errors
///
/// Returns [`TickError::Congress`] if a legislative step fails and
/// [`TickError::Clock`] if the clock cannot advance. Either is fatal to
/// the run; the state is not rolled back.
pub fn run_tick<P: PolicyPoint>(
    state: &mut SimulationState<P>,
    scheduler: &dyn Scheduler,
) -> Result<TickSummary, TickError> {
    let tick = state.clock.tick();
    let time = state.clock.time();
    let events = scheduler.events(tick, time);
    debug!(tick, %time, events = events.len(), "Tick started");

    let mut summary = TickSummary {
        tick,
        time,
        events: events.clone(),
        passing: None,
        enacted: Vec::new(),
        coalitions_formed: 0,
        coalitions_dissolved: 0,
        joined: 0,
        left: 0,
        house_coalitions: 0,
        senate_coalitions: 0,
        forwarded: Vec::new(),
    };

    // --- Phase 1: Aging ---
    summary.coalitions_dissolved = state.congress.age(tick).len();

    // --- Phase 2: Events ---
    for event in events {
        match event {
            EventTag::NewLegislature => {
                let (passing, enacted) = new_legislature(state, tick)
                    .map_err(|source| TickError::Congress { tick, source })?;
                summary.passing = Some(passing);
                summary.enacted = enacted;
            }
            EventTag::OpinionFormation => {
                let reports = state
                    .congress
                    .form_coalitions(tick, &state.formation)
                    .map_err(|source| TickError::Congress { tick, source })?;
                for report in &reports {
                    summary.coalitions_formed =
                        summary.coalitions_formed.saturating_add(report.formed.len());
                    summary.coalitions_dissolved =
                        summary.coalitions_dissolved.saturating_add(report.dissolved.len());
                    summary.joined = summary.joined.saturating_add(report.joined.len());
                    summary.left = summary.left.saturating_add(report.left.len());
                }
            }
            other => {
                debug!(tick, event = %other, "Event forwarded");
                summary.forwarded.push(other);
            }
        }
    }

    summary.house_coalitions = state.congress.house().coalitions().len();
    summary.senate_coalitions = state.congress.senate().coalitions().len();

    // --- Phase 3: Advance ---
    state.clock.advance()?;

    info!(
        tick,
        %time,
        introduced = summary.passing.map_or(0, |p| p.introduced),
        passed_house = summary.passing.map_or(0, |p| p.passed_house),
        passed_senate = summary.passing.map_or(0, |p| p.passed_senate),
        enacted = summary.enacted.len(),
        formed = summary.coalitions_formed,
        dissolved = summary.coalitions_dissolved,
        house_coalitions = summary.house_coalitions,
        senate_coalitions = summary.senate_coalitions,
        "Tick complete"
    );
    Ok(summary)
}

/// Party refresh, bill introduction, both chamber votes, executive review.
fn new_legislature<P: PolicyPoint>(
    state: &mut SimulationState<P>,
    tick: u64,
) -> Result<(PassingReport, Vec<BillId>), CongressError> {
    state.congress.refresh_parties(&mut state.parties)?;
    state
        .congress
        .generate_bills(state.bills_per_tick, tick, state.region_wiggle, &mut state.rng)?;
    let passing = state.congress.attempt_passing(&state.voting, &state.parties, tick)?;
    let enacted = state
        .congress
        .submit_to_executive(state.executive.as_mut(), &state.parties, &mut state.rng)?;
    Ok((passing, enacted))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use caucus_types::LinearPolicy;

    use super::*;
    use crate::roster::SyntheticRoster;
    use crate::schedule::{CalendarScheduler, ScriptedScheduler};

    fn small_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.simulation.bills_per_tick = 20;
        config.chambers.house_seats = 21;
        config.chambers.house_threshold = 11;
        config.chambers.senate_seats = 9;
        config.chambers.senate_threshold = 5;
        config
    }

    fn state(config: &SimulationConfig) -> SimulationState<LinearPolicy> {
        let roster =
            SyntheticRoster::new(config.chambers.house_seats, config.chambers.senate_seats);
        SimulationState::from_config(config, &roster).unwrap()
    }

    #[test]
    fn state_seats_both_chambers() {
        let s = state(&small_config());
        assert_eq!(s.congress.house().roster().len(), 21);
        assert_eq!(s.congress.senate().roster().len(), 9);
        assert_eq!(s.clock.tick(), 0);
    }

    #[test]
    fn tick_handles_core_events_and_advances() {
        let mut s = state(&small_config());
        let summary = run_tick(&mut s, &CalendarScheduler).unwrap();
        assert_eq!(summary.tick, 0);
        assert_eq!(summary.time, TimeStep::january(2010));
        assert_eq!(summary.passing.unwrap().introduced, 20);
        // 2010 is a House and Senate election year.
        assert_eq!(summary.forwarded, vec![EventTag::HouseElection, EventTag::SenateElection]);
        assert_eq!(s.clock.tick(), 1);
        s.congress.verify().unwrap();
    }

    #[test]
    fn formation_only_tick_introduces_no_bills() {
        let mut s = state(&small_config());
        let scheduler = ScriptedScheduler::repeating(&[EventTag::OpinionFormation], 1);
        let summary = run_tick(&mut s, &scheduler).unwrap();
        assert!(summary.passing.is_none());
        assert!(s.congress.latest_bills().is_none());
        assert!(summary.coalitions_formed > 0);
        assert_eq!(
            summary.house_coalitions.saturating_add(summary.senate_coalitions),
            summary.coalitions_formed
        );
    }

    #[test]
    fn default_threshold_enacts_nothing() {
        // The default threshold of 2.0 exceeds the largest reachable score.
        let mut s = state(&small_config());
        let summary = run_tick(&mut s, &CalendarScheduler).unwrap();
        let passing = summary.passing.unwrap();
        assert_eq!(passing.passed_house, 0);
        assert!(summary.enacted.is_empty());
    }

    #[test]
    fn same_seed_same_summaries() {
        let mut config = small_config();
        config.voting.threshold = 0.4;
        let run = || {
            let mut s = state(&config);
            (0..6)
                .map(|_| run_tick(&mut s, &CalendarScheduler).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn empty_chambers_fail_on_new_legislature() {
        let mut config = small_config();
        config.chambers.house_seats = 0;
        config.chambers.senate_seats = 0;
        let mut s = state(&config);
        let err = run_tick(&mut s, &CalendarScheduler).unwrap_err();
        assert!(matches!(
            err,
            TickError::Congress {
                tick: 0,
                source: CongressError::EmptySponsorPool
            }
        ));
    }
}
