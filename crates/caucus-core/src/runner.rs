//! Simulation loop runner.
//!
//! [`run_simulation`] drives the flat model's tick loop until the calendar
//! runs out or a tick cap is hit, invoking a [`TickCallback`] after every
//! tick. [`run_nested`] does the same for the nested bloc model, one
//! callback per pairing step.

use caucus_agents::{AgentError, NestedModel, NestedOutcome, NestedStepReport};
use caucus_types::PolicyPoint;
use tracing::info;

use crate::schedule::Scheduler;
use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },

    /// A nested-model step failed.
    #[error("nested model error at step {step}: {source}")]
    Nested {
        /// The step being executed.
        step: u64,
        /// The underlying agent error.
        source: AgentError,
    },
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEndReason {
    /// Every month of the calendar has been ticked.
    ScheduleExhausted,
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
///
/// The engine uses this to write renderer snapshots; tests use it to
/// observe intermediate state.
pub trait TickCallback<P> {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState<P>);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl<P> TickCallback<P> for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState<P>) {}
}

/// Run the tick loop until the calendar is exhausted or `max_ticks` ticks
/// have run.
///
/// # Errors
///
/// Returns [`RunnerError::Tick`] on the first failing tick.
pub fn run_simulation<P: PolicyPoint>(
    state: &mut SimulationState<P>,
    scheduler: &dyn Scheduler,
    callback: &mut dyn TickCallback<P>,
    max_ticks: Option<u64>,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        start_year = state.clock.start_year(),
        end_year = state.clock.end_year(),
        calendar_ticks = state.clock.total_ticks(),
        max_ticks,
        "Simulation starting"
    );

    loop {
        if state.clock.is_finished() {
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::ScheduleExhausted,
                final_summary: last_summary,
                total_ticks,
            });
        }

        if max_ticks.is_some_and(|max| total_ticks >= max) {
            info!(total_ticks, max_ticks, "Tick limit reached");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::MaxTicksReached,
                final_summary: last_summary,
                total_ticks,
            });
        }

        let summary = tick::run_tick(state, scheduler)?;
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary, state);
        last_summary = Some(summary);
    }
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        final_month = ?result.final_summary.as_ref().map(|s| s.time),
        "Simulation ended"
    );
}

// ---------------------------------------------------------------------------
// Nested model
// ---------------------------------------------------------------------------

/// Callback invoked after each nested-model step.
pub trait NestedCallback<P> {
    /// Called after a step completes successfully.
    fn on_step(&mut self, report: &NestedStepReport, model: &NestedModel<P>);
}

impl<P> NestedCallback<P> for NoOpCallback {
    fn on_step(&mut self, _report: &NestedStepReport, _model: &NestedModel<P>) {}
}

/// Step the nested model until fewer than two nodes are active or
/// `max_steps` steps have run.
///
/// # Errors
///
/// Returns [`RunnerError::Nested`] on the first failing step.
pub fn run_nested<P: PolicyPoint>(
    model: &mut NestedModel<P>,
    max_steps: u64,
    callback: &mut dyn NestedCallback<P>,
) -> Result<NestedOutcome, RunnerError> {
    info!(voters = model.voter_count(), max_steps, "Nested model starting");
    let mut steps = 0;
    while steps < max_steps && !model.is_finished() {
        let report = model
            .step(steps)
            .map_err(|source| RunnerError::Nested { step: steps, source })?;
        callback.on_step(&report, model);
        steps = steps.saturating_add(1);
    }
    let outcome = NestedOutcome {
        steps,
        finished: model.is_finished(),
        retired: model.retired().to_vec(),
    };
    info!(
        steps = outcome.steps,
        finished = outcome.finished,
        retired = outcome.retired.len(),
        "Nested model ended"
    );
    Ok(outcome)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use caucus_types::{EventTag, LinearPolicy};

    use super::*;
    use crate::config::SimulationConfig;
    use crate::roster::SyntheticRoster;
    use crate::schedule::{CalendarScheduler, ScriptedScheduler};

    fn state(start: u32, end: u32) -> SimulationState<LinearPolicy> {
        let mut config = SimulationConfig::default();
        config.simulation.start_year = start;
        config.simulation.end_year = end;
        config.simulation.bills_per_tick = 5;
        let roster = SyntheticRoster::new(11, 5);
        SimulationState::from_config(&config, &roster).unwrap()
    }

    /// Records the tick of every callback.
    #[derive(Default)]
    struct Ticks(Vec<u64>);

    impl<P> TickCallback<P> for Ticks {
        fn on_tick(&mut self, summary: &TickSummary, _state: &SimulationState<P>) {
            self.0.push(summary.tick);
        }
    }

    #[test]
    fn calendar_year_runs_twelve_ticks() {
        let mut s = state(2011, 2011);
        let mut ticks = Ticks::default();
        let result = run_simulation(&mut s, &CalendarScheduler, &mut ticks, None).unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::ScheduleExhausted);
        assert_eq!(result.total_ticks, 12);
        assert_eq!(ticks.0, (0..12).collect::<Vec<u64>>());
        assert_eq!(result.final_summary.unwrap().time.month, 12);
    }

    #[test]
    fn tick_cap_stops_early() {
        let mut s = state(2010, 2020);
        let result =
            run_simulation(&mut s, &CalendarScheduler, &mut NoOpCallback, Some(3)).unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 3);
        assert_eq!(s.clock.tick(), 3);
    }

    #[test]
    fn zero_cap_runs_nothing() {
        let mut s = state(2010, 2010);
        let result =
            run_simulation(&mut s, &CalendarScheduler, &mut NoOpCallback, Some(0)).unwrap();
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
    }

    #[test]
    fn scripted_schedule_that_runs_dry_still_ticks_the_calendar() {
        let mut s = state(2010, 2010);
        let scheduler = ScriptedScheduler::repeating(&[EventTag::OpinionFormation], 2);
        let result = run_simulation(&mut s, &scheduler, &mut NoOpCallback, None).unwrap();
        assert_eq!(result.total_ticks, 12);
        let last = result.final_summary.unwrap();
        assert!(last.events.is_empty());
    }

    /// Counts nested steps.
    #[derive(Default)]
    struct Steps(u64);

    impl<P> NestedCallback<P> for Steps {
        fn on_step(&mut self, _report: &NestedStepReport, _model: &NestedModel<P>) {
            self.0 = self.0.saturating_add(1);
        }
    }

    #[test]
    fn nested_run_ends_with_a_majority_bloc() {
        let mut model = NestedModel::evenly_spaced(51).unwrap();
        let mut steps = Steps::default();
        let outcome = run_nested(&mut model, 1000, &mut steps).unwrap();
        assert!(outcome.finished);
        assert_eq!(outcome.steps, steps.0);
        assert!(!outcome.retired.is_empty());
    }

    #[test]
    fn nested_run_respects_the_step_cap() {
        let mut model = NestedModel::evenly_spaced(51).unwrap();
        let outcome = run_nested(&mut model, 1, &mut NoOpCallback).unwrap();
        assert_eq!(outcome.steps, 1);
        assert!(!outcome.finished);
    }
}
