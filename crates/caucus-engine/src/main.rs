//! Engine binary for the caucus legislature simulation.
//!
//! Wires the configuration, the roster source, the tick loop and the
//! snapshot writer together and runs one simulation to completion.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `caucus-config.yaml` (or `$CAUCUS_CONFIG`)
//! 2. Initialize structured logging (tracing), `RUST_LOG` overriding the
//!    configured level
//! 3. Prepare the snapshot directory, if configured
//! 4. Run the configured coalition model:
//!    - flat: load or synthesize rosters, seat both chambers, run the
//!      calendar
//!    - nested: build evenly spaced voters and pair them to a majority
//! 5. Log the result

mod error;
mod snapshot_writer;

use caucus_agents::{CoalitionModel, NestedModel};
use caucus_core::config::{LoggingConfig, SimulationConfig};
use caucus_core::roster::roster_source;
use caucus_core::runner::{self, SimulationResult};
use caucus_core::schedule::CalendarScheduler;
use caucus_core::tick::SimulationState;
use caucus_types::Policy;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::snapshot_writer::SnapshotWriter;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        seed = config.simulation.seed,
        start_year = config.simulation.start_year,
        end_year = config.simulation.end_year,
        model = ?config.formation.model,
        "caucus-engine starting"
    );

    // 3. Snapshot output.
    let mut writer = SnapshotWriter::new(config.logging.snapshot_dir.clone())?;

    // 4. Run.
    match config.formation.model {
        CoalitionModel::Flat => {
            let result = run_flat(&config, &mut writer)?;
            runner::log_simulation_end(&result);
        }
        CoalitionModel::Nested => run_nested(&config, &mut writer)?,
    }

    // 5. Log results.
    info!(
        snapshots_written = writer.written(),
        snapshots_failed = writer.failed(),
        "caucus-engine shutdown complete"
    );
    Ok(())
}

/// Load the simulation configuration.
///
/// Reads the file named by `CAUCUS_CONFIG`, else `caucus-config.yaml` in
/// the working directory; falls back to defaults when the file is absent.
/// Runs before logging is initialized, so nothing is logged here.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = SimulationConfig::default_path();
    if config_path.exists() {
        Ok(SimulationConfig::from_file(&config_path)?)
    } else {
        Ok(SimulationConfig::default())
    }
}

/// Install the global subscriber: `RUST_LOG` if set, else the configured
/// level, as plain text or JSON lines.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Seat both chambers and run the legislative calendar.
fn run_flat(
    config: &SimulationConfig,
    writer: &mut SnapshotWriter,
) -> Result<SimulationResult, EngineError> {
    let roster = roster_source(&config.chambers)?;
    let mut state: SimulationState<Policy> = SimulationState::from_config(config, roster.as_ref())?;
    info!(
        house = state.congress.house().roster().len(),
        senate = state.congress.senate().roster().len(),
        bills_per_tick = state.bills_per_tick,
        "Simulation state assembled, entering tick loop"
    );

    let result = runner::run_simulation(
        &mut state,
        &CalendarScheduler,
        writer,
        config.simulation.max_ticks,
    )?;

    let enacted: usize = state
        .congress
        .bills_by_tick()
        .map(|(_, bills)| bills.iter().filter(|b| b.passed()).count())
        .sum();
    info!(enacted_in_history = enacted, "Legislative record");
    Ok(result)
}

/// Pair evenly spaced voters until a bloc holds a majority.
fn run_nested(config: &SimulationConfig, writer: &mut SnapshotWriter) -> Result<(), EngineError> {
    let mut model = NestedModel::evenly_spaced(config.nested.voters)?;
    let outcome = runner::run_nested(&mut model, config.nested.max_ticks, writer)?;
    for id in &outcome.retired {
        if let Some(bloc) = model.node(*id) {
            info!(bloc = bloc.label(), voters = bloc.voters(), "Majority bloc");
        }
    }
    Ok(())
}
