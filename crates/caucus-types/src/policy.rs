//! Policy space: positions, distances, and acceptance ranges.
//!
//! A policy position is a point in the unit hypercube. Two concrete
//! spaces are provided:
//!
//! - [`LinearPolicy`] -- a single axis, compared by absolute difference.
//! - [`Policy`] -- a libertarian/progressive plane, compared by Euclidean
//!   distance, with the complementary authoritarian/conservative axes
//!   derived as `1 - x`.
//!
//! Both implement [`PolicyPoint`], so the coalition and voting machinery
//! is written once and works in either space.
//!
//! # Invariants
//!
//! - Every coordinate lies in `[0, 1]`; construction rejects anything else
//!   (including NaN).
//! - Aggregation ([`weighted_mean`]) clamps rounding drift back into the
//!   unit interval and refuses a zero total weight instead of producing NaN.

use core::fmt;

use serde::Serialize;

use crate::error::PolicyError;

/// Lower bound of every policy axis.
pub const AXIS_MIN: f64 = 0.0;

/// Upper bound of every policy axis.
pub const AXIS_MAX: f64 = 1.0;

/// Validate that a value lies in the closed unit interval.
pub(crate) fn check_unit(field: &'static str, value: f64) -> Result<f64, PolicyError> {
    if value.is_finite() && (AXIS_MIN..=AXIS_MAX).contains(&value) {
        Ok(value)
    } else {
        Err(PolicyError::OutOfRange { field, value })
    }
}

// ---------------------------------------------------------------------------
// PolicyPoint
// ---------------------------------------------------------------------------

/// A position in a policy space.
pub trait PolicyPoint: Copy + fmt::Debug + PartialEq {
    /// Number of axes of the space.
    const AXES: usize;

    /// Coordinate on the given zero-based axis, or `None` past the last axis.
    fn axis(&self, index: usize) -> Option<f64>;

    /// Build a point from its coordinates, validating each one.
    fn from_axes(axes: &[f64]) -> Result<Self, PolicyError>;

    /// Distance between two positions (Euclidean over all axes).
    fn distance(&self, other: &Self) -> f64 {
        (0..Self::AXES)
            .map(|i| {
                let a = self.axis(i).unwrap_or(AXIS_MIN);
                let b = other.axis(i).unwrap_or(AXIS_MIN);
                (a - b).powi(2)
            })
            .sum::<f64>()
            .sqrt()
    }

    /// Projection onto a plane for rendering. Missing axes map to 0.
    fn plane(&self) -> (f64, f64) {
        (
            self.axis(0).unwrap_or(AXIS_MIN),
            self.axis(1).unwrap_or(AXIS_MIN),
        )
    }
}

/// Weighted mean of a set of positions.
///
/// Each weight must be finite and non-negative.
///
/// # Errors
///
/// Returns [`PolicyError::ZeroTotalWeight`] if the weights sum to zero
/// (including an empty input), and [`PolicyError::InvalidWeight`] for a
/// negative or non-finite weight.
pub fn weighted_mean<P, I>(points: I) -> Result<P, PolicyError>
where
    P: PolicyPoint,
    I: IntoIterator<Item = (P, f64)>,
{
    let mut sums = vec![0.0_f64; P::AXES];
    let mut total = 0.0_f64;

    for (point, weight) in points {
        if !weight.is_finite() || weight < 0.0 {
            return Err(PolicyError::InvalidWeight { value: weight });
        }
        total += weight;
        for (i, sum) in sums.iter_mut().enumerate() {
            *sum += weight * point.axis(i).unwrap_or(AXIS_MIN);
        }
    }

    if !total.is_finite() || total <= 0.0 {
        return Err(PolicyError::ZeroTotalWeight);
    }

    let axes: Vec<f64> = sums
        .iter()
        .map(|sum| (sum / total).clamp(AXIS_MIN, AXIS_MAX))
        .collect();
    P::from_axes(&axes)
}

// ---------------------------------------------------------------------------
// LinearPolicy
// ---------------------------------------------------------------------------

/// A position on a single policy axis.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct LinearPolicy(f64);

impl LinearPolicy {
    /// Create a position, rejecting values outside `[0, 1]`.
    pub fn new(value: f64) -> Result<Self, PolicyError> {
        check_unit("position", value).map(Self)
    }

    /// The coordinate.
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl PolicyPoint for LinearPolicy {
    const AXES: usize = 1;

    fn axis(&self, index: usize) -> Option<f64> {
        (index == 0).then_some(self.0)
    }

    fn from_axes(axes: &[f64]) -> Result<Self, PolicyError> {
        match axes {
            [value] => Self::new(*value),
            _ => Err(PolicyError::AxisCount {
                expected: Self::AXES,
                actual: axes.len(),
            }),
        }
    }

    fn distance(&self, other: &Self) -> f64 {
        (self.0 - other.0).abs()
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// A position on the libertarian/progressive plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Policy {
    libertarian: f64,
    progressive: f64,
}

impl Policy {
    /// Create a position, rejecting coordinates outside `[0, 1]`.
    pub fn new(libertarian: f64, progressive: f64) -> Result<Self, PolicyError> {
        Ok(Self {
            libertarian: check_unit("libertarian", libertarian)?,
            progressive: check_unit("progressive", progressive)?,
        })
    }

    /// How libertarian the position is.
    pub const fn libertarian(&self) -> f64 {
        self.libertarian
    }

    /// How progressive the position is.
    pub const fn progressive(&self) -> f64 {
        self.progressive
    }

    /// Complement of [`Policy::libertarian`].
    pub fn authoritarian(&self) -> f64 {
        AXIS_MAX - self.libertarian
    }

    /// Complement of [`Policy::progressive`].
    pub fn conservative(&self) -> f64 {
        AXIS_MAX - self.progressive
    }
}

impl PolicyPoint for Policy {
    const AXES: usize = 2;

    fn axis(&self, index: usize) -> Option<f64> {
        match index {
            0 => Some(self.libertarian),
            1 => Some(self.progressive),
            _ => None,
        }
    }

    fn from_axes(axes: &[f64]) -> Result<Self, PolicyError> {
        match axes {
            [libertarian, progressive] => Self::new(*libertarian, *progressive),
            _ => Err(PolicyError::AxisCount {
                expected: Self::AXES,
                actual: axes.len(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// PolicyRange
// ---------------------------------------------------------------------------

/// An axis-aligned acceptance region: a closed interval on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolicyRange<P> {
    min: P,
    max: P,
}

impl<P: PolicyPoint> PolicyRange<P> {
    /// Create a range from its corner points.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvertedRange`] if `min` exceeds `max` on
    /// any axis.
    pub fn new(min: P, max: P) -> Result<Self, PolicyError> {
        for axis in 0..P::AXES {
            let lo = min.axis(axis).unwrap_or(AXIS_MIN);
            let hi = max.axis(axis).unwrap_or(AXIS_MIN);
            if lo > hi {
                return Err(PolicyError::InvertedRange {
                    axis,
                    min: lo,
                    max: hi,
                });
            }
        }
        Ok(Self { min, max })
    }

    /// Create a range from per-axis `(min, max)` bounds.
    pub fn from_bounds(bounds: &[(f64, f64)]) -> Result<Self, PolicyError> {
        let lows: Vec<f64> = bounds.iter().map(|(lo, _)| *lo).collect();
        let highs: Vec<f64> = bounds.iter().map(|(_, hi)| *hi).collect();
        Self::new(P::from_axes(&lows)?, P::from_axes(&highs)?)
    }

    /// The range spanning `below[i]` under and `above[i]` over the centre
    /// on every axis, clipped to the unit interval.
    ///
    /// Offsets must be non-negative and there must be one per axis.
    pub fn around(center: &P, below: &[f64], above: &[f64]) -> Result<Self, PolicyError> {
        if below.len() != P::AXES || above.len() != P::AXES {
            return Err(PolicyError::AxisCount {
                expected: P::AXES,
                actual: below.len().min(above.len()),
            });
        }

        let mut bounds = Vec::with_capacity(P::AXES);
        for (axis, (down, up)) in below.iter().zip(above).enumerate() {
            for offset in [*down, *up] {
                if !offset.is_finite() || offset < 0.0 {
                    return Err(PolicyError::InvalidWeight { value: offset });
                }
            }
            let c = center.axis(axis).unwrap_or(AXIS_MIN);
            bounds.push(((c - down).max(AXIS_MIN), (c + up).min(AXIS_MAX)));
        }
        Self::from_bounds(&bounds)
    }

    /// Whether a position lies inside the range (bounds inclusive).
    pub fn contains(&self, point: &P) -> bool {
        (0..P::AXES).all(|axis| {
            let lo = self.min.axis(axis).unwrap_or(AXIS_MIN);
            let hi = self.max.axis(axis).unwrap_or(AXIS_MIN);
            point
                .axis(axis)
                .is_some_and(|x| (lo..=hi).contains(&x))
        })
    }

    /// Lower corner.
    pub const fn min(&self) -> &P {
        &self.min
    }

    /// Upper corner.
    pub const fn max(&self) -> &P {
        &self.max
    }

    /// `(min, max)` bounds on one axis, or `None` past the last axis.
    pub fn bounds(&self, axis: usize) -> Option<(f64, f64)> {
        Some((self.min.axis(axis)?, self.max.axis(axis)?))
    }
}

impl PolicyRange<Policy> {
    /// Bounds on the derived authoritarian axis.
    pub fn authoritarian_bounds(&self) -> (f64, f64) {
        (self.max.authoritarian(), self.min.authoritarian())
    }

    /// Bounds on the derived conservative axis.
    pub fn conservative_bounds(&self) -> (f64, f64) {
        (self.max.conservative(), self.min.conservative())
    }
}
