//! Calendar clock for the caucus simulation.
//!
//! One tick is one month. The clock counts ticks from 0 (January of the
//! start year) and derives the calendar month from the tick counter, so
//! the two can never disagree. The run covers every month up to and
//! including December of the end year.

use core::fmt;

use serde::Serialize;

/// Months per calendar year.
const MONTHS_PER_YEAR: u64 = 12;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Invalid calendar configuration (e.g. end year before start year).
    #[error("invalid calendar configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TimeStep {
    /// Calendar year.
    pub year: u32,
    /// Month of the year, 1 to 12.
    pub month: u8,
}

impl TimeStep {
    /// January of `year`.
    pub const fn january(year: u32) -> Self {
        Self { year, month: 1 }
    }

    /// December of `year`.
    pub const fn december(year: u32) -> Self {
        Self { year, month: 12 }
    }

    /// The following month, or `None` past the last representable year.
    pub fn next(self) -> Option<Self> {
        if self.month < 12 {
            Some(Self {
                year: self.year,
                month: self.month.checked_add(1)?,
            })
        } else {
            Some(Self {
                year: self.year.checked_add(1)?,
                month: 1,
            })
        }
    }
}

impl fmt::Display for TimeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Monthly clock spanning a closed range of years.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationClock {
    /// Current tick (0 = January of the start year).
    tick: u64,
    /// First year of the run.
    start_year: u32,
    /// Last year of the run.
    end_year: u32,
}

impl SimulationClock {
    /// Create a clock at tick 0.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `end_year < start_year`.
    pub fn new(start_year: u32, end_year: u32) -> Result<Self, ClockError> {
        if end_year < start_year {
            return Err(ClockError::InvalidConfig {
                reason: format!("end_year {end_year} precedes start_year {start_year}"),
            });
        }
        Ok(Self {
            tick: 0,
            start_year,
            end_year,
        })
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// First year of the run.
    pub const fn start_year(&self) -> u32 {
        self.start_year
    }

    /// Last year of the run.
    pub const fn end_year(&self) -> u32 {
        self.end_year
    }

    /// Number of ticks in the run: twelve per year, both ends inclusive.
    pub fn total_ticks(&self) -> u64 {
        let years = u64::from(self.end_year.saturating_sub(self.start_year)).saturating_add(1);
        years.saturating_mul(MONTHS_PER_YEAR)
    }

    /// Whether every month of the run has been ticked.
    pub fn is_finished(&self) -> bool {
        self.tick >= self.total_ticks()
    }

    /// Calendar month of the current tick.
    ///
    /// Past the end of the run this keeps counting months; callers check
    /// [`SimulationClock::is_finished`] first.
    pub fn time(&self) -> TimeStep {
        let years = self.tick.checked_div(MONTHS_PER_YEAR).unwrap_or(0);
        let month = self.tick.checked_rem(MONTHS_PER_YEAR).unwrap_or(0);
        let year = u32::try_from(years)
            .ok()
            .and_then(|y| self.start_year.checked_add(y))
            .unwrap_or(u32::MAX);
        // month is in 0..12, so the conversion cannot fail.
        let month = u8::try_from(month).unwrap_or(0).saturating_add(1);
        TimeStep { year, month }
    }
}
