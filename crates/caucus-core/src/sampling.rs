//! Initial-state draws for actors.
//!
//! All randomness of a run flows from one seeded generator created by
//! [`seeded_rng`]; every helper here takes it by `&mut` so that a fixed
//! seed reproduces the same roster, the same bills, and the same votes.

use caucus_types::{FinancialClass, Incentive, Party, PolicyError, PolicyPoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SamplingConfig;

/// The single random source of a run.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Uniform draw from `[lo, lo + width)`.
fn spread(rng: &mut impl Rng, lo: f64, width: f64) -> f64 {
    width.mul_add(rng.random::<f64>(), lo)
}

/// Initial `(libertarian, progressive)` coordinates for a party member.
///
/// | Party | libertarian | progressive |
/// |-------|-------------|-------------|
/// | Democratic | U[0.2, 0.8) | U[0.7, 0.9) |
/// | Republican | U[0.4, 0.7) | U[0.2, 0.4) |
/// | Other | U[0, 1) | U[0, 1) |
pub fn party_axes(party: Party, rng: &mut impl Rng) -> [f64; 2] {
    match party {
        Party::Democratic => [spread(rng, 0.2, 0.6), spread(rng, 0.7, 0.2)],
        Party::Republican => [spread(rng, 0.4, 0.3), spread(rng, 0.2, 0.2)],
        Party::Other => [rng.random::<f64>(), rng.random::<f64>()],
    }
}

/// Initial position of a party member in any policy space.
///
/// A one-axis space uses the libertarian rule; axes beyond the second are
/// uniform.
///
/// # Errors
///
/// Propagates validation errors from the point constructor.
pub fn initial_position<P: PolicyPoint>(
    party: Party,
    rng: &mut impl Rng,
) -> Result<P, PolicyError> {
    let mut axes: Vec<f64> = party_axes(party, rng).to_vec();
    while axes.len() < P::AXES {
        axes.push(rng.random::<f64>());
    }
    axes.truncate(P::AXES);
    P::from_axes(&axes)
}

/// Initial incentive: big-dollar with probability `big_dollar_share`,
/// ideological weight and party-pressure sensitivity uniform on `[0, 1)`.
///
/// # Errors
///
/// Propagates validation errors from [`Incentive::new`].
pub fn initial_incentive(
    config: &SamplingConfig,
    rng: &mut impl Rng,
) -> Result<Incentive, PolicyError> {
    let financial = if rng.random::<f64>() < config.big_dollar_share {
        FinancialClass::BigDollar
    } else {
        FinancialClass::SmallDollar
    };
    Incentive::new(financial, rng.random::<f64>(), rng.random::<f64>())
}

/// Initial importance from the power distribution with exponent `a`
/// (density `a * x^(a-1)` on `[0, 1]`), drawn as `U^(1/a)`.
pub fn initial_importance(exponent: f64, rng: &mut impl Rng) -> f64 {
    rng.random::<f64>().powf(exponent.recip())
}
