//! Calendar clock, tick cycle, and orchestration for the caucus simulation.
//!
//! This crate owns the monthly tick cycle that drives the legislature:
//! aging, then the scheduled events (new legislature, opinion formation),
//! then the clock advance.
//!
//! # Modules
//!
//! - [`clock`] -- Monthly clock over a closed range of years.
//! - [`config`] -- Configuration loading from `caucus-config.yaml` into
//!   strongly-typed structs.
//! - [`roster`] -- [`RosterSource`] seam, JSON and synthetic rosters, and
//!   chamber seating.
//! - [`runner`] -- Tick loop with per-tick callback, and the nested model
//!   runner.
//! - [`sampling`] -- Seeded generator and initial actor draws.
//! - [`schedule`] -- [`Scheduler`] trait and the legislative calendar.
//! - [`snapshot`] -- Renderer snapshots of chambers and bloc forests.
//! - [`tick`] -- The tick cycle and the [`SimulationState`] it mutates.
//!
//! [`RosterSource`]: roster::RosterSource
//! [`Scheduler`]: schedule::Scheduler
//! [`SimulationState`]: tick::SimulationState

pub mod clock;
pub mod config;
pub mod roster;
pub mod runner;
pub mod sampling;
pub mod schedule;
pub mod snapshot;
pub mod tick;
