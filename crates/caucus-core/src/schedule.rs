//! Scheduler: the ordered event tags of each tick.
//!
//! The tick cycle asks a [`Scheduler`] which events happen in the current
//! month and reacts to them in order. [`CalendarScheduler`] encodes the
//! legislative calendar; [`ScriptedScheduler`] replays a fixed list and
//! is mostly useful in tests.

use caucus_types::EventTag;

use crate::clock::TimeStep;

/// Source of per-tick event tags.
pub trait Scheduler {
    /// Events of one tick, in the order they are handled.
    fn events(&self, tick: u64, time: TimeStep) -> Vec<EventTag>;
}

/// The legislative calendar.
///
/// | Event | When |
/// |-------|------|
/// | `NEW_LEGISLATURE` | every month, first |
/// | `NEW_POLLS` | months divisible by 3 |
/// | `OPINION_FORMATION` | every month |
/// | `HOUSE_ELECTION` | every month of even years |
/// | `SENATE_ELECTION` | every month of years divisible by 6 |
/// | `PRESIDENTIAL_ELECTION` | every month of years divisible by 4 |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarScheduler;

impl Scheduler for CalendarScheduler {
    fn events(&self, _tick: u64, time: TimeStep) -> Vec<EventTag> {
        let mut events = vec![EventTag::NewLegislature];
        if time.month.checked_rem(3) == Some(0) {
            events.push(EventTag::NewPolls);
        }
        events.push(EventTag::OpinionFormation);
        if time.year.checked_rem(2) == Some(0) {
            events.push(EventTag::HouseElection);
        }
        if time.year.checked_rem(6) == Some(0) {
            events.push(EventTag::SenateElection);
        }
        if time.year.checked_rem(4) == Some(0) {
            events.push(EventTag::PresidentialElection);
        }
        events
    }
}

/// Replays a fixed list of per-tick events; ticks past the end get none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedScheduler {
    script: Vec<Vec<EventTag>>,
}

impl ScriptedScheduler {
    /// Scheduler emitting `script[tick]` at each tick.
    pub const fn new(script: Vec<Vec<EventTag>>) -> Self {
        Self { script }
    }

    /// The same events every tick.
    pub fn repeating(events: &[EventTag], ticks: usize) -> Self {
        Self::new(vec![events.to_vec(); ticks])
    }
}

impl Scheduler for ScriptedScheduler {
    fn events(&self, tick: u64, _time: TimeStep) -> Vec<EventTag> {
        usize::try_from(tick)
            .ok()
            .and_then(|t| self.script.get(t))
            .cloned()
            .unwrap_or_default()
    }
}
