//! Integration tests driving the full tick loop.
//!
//! Runs use small synthetic or inline JSON rosters so that a whole
//! calendar year completes quickly, and check membership and aggregate
//! invariants after every tick through a [`TickCallback`].

#![allow(clippy::unwrap_used)]

use caucus_agents::NestedModel;
use caucus_core::config::{ExecutiveKind, SimulationConfig};
use caucus_core::roster::{JsonRoster, RosterError, SyntheticRoster};
use caucus_core::runner::{
    NestedCallback, NoOpCallback, SimulationEndReason, TickCallback, run_nested, run_simulation,
};
use caucus_core::schedule::CalendarScheduler;
use caucus_core::snapshot::{congress_snapshot, nested_snapshot};
use caucus_core::tick::{SetupError, SimulationState, TickSummary};
use caucus_types::{
    BillId, Chamber, LinearPolicy, NetworkSnapshot, Policy, PolicyPoint, weighted_mean,
};

fn one_year(seed: u64) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.simulation.seed = seed;
    config.simulation.start_year = 2012;
    config.simulation.end_year = 2012;
    config.simulation.bills_per_tick = 40;
    config.chambers.house_seats = 31;
    config.chambers.house_threshold = 16;
    config.chambers.senate_seats = 11;
    config.chambers.senate_threshold = 6;
    config.voting.threshold = 0.45;
    config
}

fn seat<P: PolicyPoint + 'static>(config: &SimulationConfig) -> SimulationState<P> {
    let roster = SyntheticRoster::new(config.chambers.house_seats, config.chambers.senate_seats);
    SimulationState::from_config(config, &roster).unwrap()
}

/// Checks the membership and aggregate invariants after every tick and
/// keeps the enacted bills and the last snapshot.
#[derive(Default)]
struct Invariants {
    enacted: Vec<BillId>,
    ticks: usize,
    last: Option<NetworkSnapshot>,
}

impl<P: PolicyPoint> TickCallback<P> for Invariants {
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState<P>) {
        state.congress.verify().unwrap();
        for chamber in Chamber::ALL {
            let body = state.congress.chamber(chamber);
            for coalition in body.coalitions().iter() {
                assert!(coalition.members().len() >= 2, "singleton {}", coalition.id());
                let members = coalition.members().iter().map(|id| {
                    let actor = body.roster().get(*id).unwrap();
                    (*actor.position(), actor.importance())
                });
                let mean: P = weighted_mean(members).unwrap();
                assert!(
                    mean.distance(coalition.position()) < 1e-9,
                    "coalition {} drifted from its members",
                    coalition.id()
                );
            }
        }
        self.enacted.extend(summary.enacted.iter().copied());
        self.ticks = self.ticks.saturating_add(1);
        self.last = Some(congress_snapshot(&state.congress, summary.tick));
    }
}

#[test]
fn one_year_two_axis_run_keeps_invariants() {
    let config = one_year(7);
    let mut state: SimulationState<Policy> = seat(&config);
    let mut invariants = Invariants::default();
    let result = run_simulation(&mut state, &CalendarScheduler, &mut invariants, None).unwrap();

    assert_eq!(result.end_reason, SimulationEndReason::ScheduleExhausted);
    assert_eq!(result.total_ticks, 12);
    assert_eq!(invariants.ticks, 12);

    let snapshot = invariants.last.unwrap();
    assert_eq!(snapshot.tick, 11);
    assert_eq!(snapshot.nodes.len(), 42);
    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("HR_0_1"));
    assert!(json.contains("SR_0_11"));
}

#[test]
fn bills_only_reach_the_executive_after_both_chambers() {
    let config = one_year(11);
    let mut state: SimulationState<LinearPolicy> = seat(&config);
    run_simulation(&mut state, &CalendarScheduler, &mut NoOpCallback, Some(3)).unwrap();

    for (_, bills) in state.congress.bills_by_tick() {
        for bill in bills {
            let executive = bill.outcome(caucus_congress::Stage::Executive);
            assert_eq!(executive.is_some(), bill.passed_senate(), "bill {}", bill.id());
            if bill.outcome(caucus_congress::Stage::Senate).is_some() {
                assert!(bill.passed_house());
            }
        }
    }
}

#[test]
fn same_seed_enacts_the_same_bills() {
    let run = |seed| {
        let config = one_year(seed);
        let mut state: SimulationState<Policy> = seat(&config);
        let mut invariants = Invariants::default();
        run_simulation(&mut state, &CalendarScheduler, &mut invariants, None).unwrap();
        let votes: Vec<_> = state.congress.latest_votes().cloned().collect();
        (invariants.enacted, votes)
    };
    assert_eq!(run(3), run(3));
}

#[test]
fn partisan_executive_run_completes() {
    let mut config = one_year(5);
    config.executive.kind = ExecutiveKind::Partisan;
    let mut state: SimulationState<Policy> = seat(&config);
    let result = run_simulation(&mut state, &CalendarScheduler, &mut NoOpCallback, None).unwrap();
    assert_eq!(result.total_ticks, 12);
}

#[test]
fn json_roster_seeds_the_start_year() {
    let house = r#"{"2012": [
        {"state": "AL", "district": "1", "name": "A", "party": "DEMOCRAT"},
        {"state": "AL", "district": "2", "name": "B", "party": "DEMOCRAT"},
        {"state": "AK", "district": "1", "name": "C", "party": "REPUBLICAN"}
    ]}"#;
    let senate = r#"{"2012": [
        {"state": "AL", "name": "D", "party": "REPUBLICAN"},
        {"state": "AK", "name": "E", "party": "REPUBLICAN"}
    ]}"#;
    let roster = JsonRoster::parse(house, senate).unwrap();
    let config = one_year(1);
    let state: SimulationState<Policy> = SimulationState::from_config(&config, &roster).unwrap();
    assert_eq!(state.congress.house().roster().len(), 3);
    assert_eq!(state.congress.senate().roster().len(), 2);

    let mut later = one_year(1);
    later.simulation.start_year = 2014;
    later.simulation.end_year = 2014;
    let missing = SimulationState::<Policy>::from_config(&later, &roster);
    assert!(matches!(
        missing,
        Err(SetupError::Roster {
            source: RosterError::YearNotFound { year: 2014, .. }
        })
    ));
}

/// Keeps the snapshot of every nested step.
#[derive(Default)]
struct NestedSnapshots(Vec<NetworkSnapshot>);

impl NestedCallback<LinearPolicy> for NestedSnapshots {
    fn on_step(
        &mut self,
        report: &caucus_agents::NestedStepReport,
        model: &NestedModel<LinearPolicy>,
    ) {
        self.0.push(nested_snapshot(model, report.tick));
    }
}

#[test]
fn nested_model_grows_one_forest() {
    let mut model = NestedModel::evenly_spaced(21).unwrap();
    let mut snapshots = NestedSnapshots::default();
    let outcome = run_nested(&mut model, 1000, &mut snapshots).unwrap();
    assert!(outcome.finished);

    let last = snapshots.0.last().unwrap();
    // Every bloc contributes two edges and every bloc is a node.
    let blocs = model.nodes().iter().filter(|n| !n.is_voter()).count();
    assert_eq!(last.edges.len(), blocs.saturating_mul(2));
    assert_eq!(last.nodes.len(), blocs.saturating_add(21));
    // Edge counts never shrink between steps.
    assert!(
        snapshots
            .0
            .windows(2)
            .all(|w| w.first().unwrap().edges.len() <= w.last().unwrap().edges.len())
    );
}
