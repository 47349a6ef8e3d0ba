//! Bills and their outcome flags.
//!
//! A [`Bill`] is immutable after introduction except for three outcome
//! flags, one per [`Stage`]. Each flag is written exactly once and only
//! after the bill passed the previous stage: House, then Senate, then the
//! executive. [`Bill::passed`] is true only once the executive approves.

use core::fmt;

use caucus_types::{
    ActorId, BillId, Chamber, CoalitionId, Party, PolicyError, PolicyPoint, PolicyRange,
};
use serde::Serialize;

use crate::error::CongressError;

/// A step of the legislative pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Lower-chamber vote.
    House,
    /// Upper-chamber vote.
    Senate,
    /// Executive decision.
    Executive,
}

impl Stage {
    /// The stage a bill must pass before this one.
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::House => None,
            Self::Senate => Some(Self::House),
            Self::Executive => Some(Self::Senate),
        }
    }
}

impl From<Chamber> for Stage {
    fn from(chamber: Chamber) -> Self {
        match chamber {
            Chamber::House => Self::House,
            Chamber::Senate => Self::Senate,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::House => write!(f, "house"),
            Self::Senate => write!(f, "senate"),
            Self::Executive => write!(f, "executive"),
        }
    }
}

/// Who introduced a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Sponsor {
    /// A single actor.
    Actor {
        /// Chamber of the actor.
        chamber: Chamber,
        /// The actor.
        id: ActorId,
    },
    /// A coalition.
    Coalition {
        /// Chamber of the coalition.
        chamber: Chamber,
        /// The coalition.
        id: CoalitionId,
    },
}

impl Sponsor {
    /// Chamber the sponsor sits in.
    pub const fn chamber(&self) -> Chamber {
        match self {
            Self::Actor { chamber, .. } | Self::Coalition { chamber, .. } => *chamber,
        }
    }
}

/// A proposal voted on by both chambers and the executive.
#[derive(Debug, Clone, Serialize)]
pub struct Bill<P> {
    id: BillId,
    sponsor: Sponsor,
    sponsor_party: Party,
    popularity: f64,
    acceptance: PolicyRange<P>,
    introduced_at: u64,
    house: Option<bool>,
    senate: Option<bool>,
    executive: Option<bool>,
}

impl<P: PolicyPoint> Bill<P> {
    /// Introduce a bill.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::OutOfRange`] if `popularity` is outside `[0, 1]`.
    pub fn new(
        id: BillId,
        sponsor: Sponsor,
        sponsor_party: Party,
        popularity: f64,
        acceptance: PolicyRange<P>,
        introduced_at: u64,
    ) -> Result<Self, PolicyError> {
        if !popularity.is_finite() || !(0.0..=1.0).contains(&popularity) {
            return Err(PolicyError::OutOfRange {
                field: "popularity",
                value: popularity,
            });
        }
        Ok(Self {
            id,
            sponsor,
            sponsor_party,
            popularity,
            acceptance,
            introduced_at,
            house: None,
            senate: None,
            executive: None,
        })
    }

    /// Bill id.
    pub const fn id(&self) -> BillId {
        self.id
    }

    /// Who introduced the bill.
    pub const fn sponsor(&self) -> Sponsor {
        self.sponsor
    }

    /// Party of the sponsor at introduction.
    pub const fn sponsor_party(&self) -> Party {
        self.sponsor_party
    }

    /// Popularity in the general population.
    pub const fn popularity(&self) -> f64 {
        self.popularity
    }

    /// Region of policy space the bill is agreeable to.
    pub const fn acceptance(&self) -> &PolicyRange<P> {
        &self.acceptance
    }

    /// Tick of introduction.
    pub const fn introduced_at(&self) -> u64 {
        self.introduced_at
    }

    /// Recorded outcome of a stage, if voted on.
    pub const fn outcome(&self, stage: Stage) -> Option<bool> {
        match stage {
            Stage::House => self.house,
            Stage::Senate => self.senate,
            Stage::Executive => self.executive,
        }
    }

    /// Whether the bill passed the lower chamber.
    pub fn passed_house(&self) -> bool {
        self.house.unwrap_or(false)
    }

    /// Whether the bill passed the upper chamber.
    pub fn passed_senate(&self) -> bool {
        self.senate.unwrap_or(false)
    }

    /// Whether the bill became law.
    pub fn passed(&self) -> bool {
        self.executive.unwrap_or(false)
    }

    /// Record the outcome of a stage.
    ///
    /// # Errors
    ///
    /// - [`CongressError::OutcomeAlreadyRecorded`] if the stage already has
    ///   an outcome.
    /// - [`CongressError::ChamberOrder`] if the bill has not passed the
    ///   previous stage.
    pub fn record(&mut self, stage: Stage, passed: bool) -> Result<(), CongressError> {
        if self.outcome(stage).is_some() {
            return Err(CongressError::OutcomeAlreadyRecorded {
                bill: self.id,
                stage,
            });
        }
        if let Some(required) = stage.previous() {
            if self.outcome(required) != Some(true) {
                return Err(CongressError::ChamberOrder {
                    bill: self.id,
                    stage,
                    required,
                });
            }
        }
        match stage {
            Stage::House => self.house = Some(passed),
            Stage::Senate => self.senate = Some(passed),
            Stage::Executive => self.executive = Some(passed),
        }
        Ok(())
    }
}
