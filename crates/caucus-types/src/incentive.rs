//! Incentive profiles.
//!
//! An [`Incentive`] describes what drives an entity's vote: where its money
//! comes from, how much it cares about ideology, and how sensitive it is
//! to party pressure. Leaf actors receive one at creation and never change
//! it; coalitions derive theirs from their members.

use serde::Serialize;

use crate::enums::FinancialClass;
use crate::error::PolicyError;
use crate::policy::check_unit;

/// The incentive structure of a voting entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Incentive {
    financial: FinancialClass,
    ideological: f64,
    party_pressure: f64,
}

impl Incentive {
    /// Create an incentive profile.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::OutOfRange`] if either weight lies outside
    /// `[0, 1]`.
    pub fn new(
        financial: FinancialClass,
        ideological: f64,
        party_pressure: f64,
    ) -> Result<Self, PolicyError> {
        Ok(Self {
            financial,
            ideological: check_unit("ideological", ideological)?,
            party_pressure: check_unit("party_pressure", party_pressure)?,
        })
    }

    /// Financial-incentive class.
    pub const fn financial(&self) -> FinancialClass {
        self.financial
    }

    /// Weight placed on ideological agreement.
    pub const fn ideological(&self) -> f64 {
        self.ideological
    }

    /// Sensitivity to party pressure.
    pub const fn party_pressure(&self) -> f64 {
        self.party_pressure
    }

    /// Combine member profiles into a coalition profile.
    ///
    /// The class is [`FinancialClass::BigDollar`] if any member takes big
    /// money, otherwise [`FinancialClass::SmallDollar`]. Both weights are
    /// arithmetic means. Returns `None` for an empty input.
    pub fn aggregate<'a, I>(members: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Self>,
    {
        let mut count = 0_u32;
        let mut big_dollar = false;
        let mut ideological = 0.0_f64;
        let mut party_pressure = 0.0_f64;

        for member in members {
            count = count.saturating_add(1);
            big_dollar |= member.financial == FinancialClass::BigDollar;
            ideological += member.ideological;
            party_pressure += member.party_pressure;
        }

        if count == 0 {
            return None;
        }

        let n = f64::from(count);
        Some(Self {
            financial: if big_dollar {
                FinancialClass::BigDollar
            } else {
                FinancialClass::SmallDollar
            },
            ideological: (ideological / n).clamp(0.0, 1.0),
            party_pressure: (party_pressure / n).clamp(0.0, 1.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(financial: FinancialClass, ideological: f64, pressure: f64) -> Incentive {
        Incentive::new(financial, ideological, pressure).unwrap_or(Incentive {
            financial,
            ideological: 0.0,
            party_pressure: 0.0,
        })
    }

    #[test]
    fn rejects_out_of_range_weights() {
        assert!(Incentive::new(FinancialClass::SmallDollar, 1.5, 0.2).is_err());
        assert!(Incentive::new(FinancialClass::SmallDollar, 0.5, -0.2).is_err());
    }

    #[test]
    fn aggregate_prefers_big_dollar() {
        let members = [
            profile(FinancialClass::SmallDollar, 0.2, 0.4),
            profile(FinancialClass::BigDollar, 0.6, 0.8),
        ];
        let combined = Incentive::aggregate(&members);
        assert_eq!(
            combined.map(|c| c.financial()),
            Some(FinancialClass::BigDollar)
        );
        assert!(combined.is_some_and(|c| (c.ideological() - 0.4).abs() < 1e-9));
        assert!(combined.is_some_and(|c| (c.party_pressure() - 0.6).abs() < 1e-9));
    }

    #[test]
    fn aggregate_all_small_dollar() {
        let members = [
            profile(FinancialClass::SmallDollar, 0.2, 0.4),
            profile(FinancialClass::SmallDollar, 0.4, 0.4),
        ];
        assert_eq!(
            Incentive::aggregate(&members).map(|c| c.financial()),
            Some(FinancialClass::SmallDollar)
        );
    }

    #[test]
    fn aggregate_of_nothing_is_none() {
        let none: &[Incentive] = &[];
        assert!(Incentive::aggregate(none).is_none());
    }
}
