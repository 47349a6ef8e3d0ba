//! Validation errors for leaf value types.
//!
//! Values are validated at construction time so that every policy
//! coordinate, incentive weight, and enum label flowing through the
//! simulation is known-good. Nothing downstream re-checks them.

/// Errors raised when constructing or aggregating policy-space values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    /// A coordinate or weight fell outside the closed unit interval
    /// (or was not a finite number).
    #[error("{field} = {value} is outside [0, 1]")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A range bound had its minimum above its maximum.
    #[error("inverted range on axis {axis}: min {min} > max {max}")]
    InvertedRange {
        /// Zero-based axis index.
        axis: usize,
        /// Lower bound supplied.
        min: f64,
        /// Upper bound supplied.
        max: f64,
    },

    /// The number of supplied axes does not match the policy space.
    #[error("expected {expected} axes, got {actual}")]
    AxisCount {
        /// Axes required by the policy space.
        expected: usize,
        /// Axes supplied by the caller.
        actual: usize,
    },

    /// A weight or offset was negative or not finite.
    #[error("invalid weight {value}: must be finite and non-negative")]
    InvalidWeight {
        /// The rejected weight.
        value: f64,
    },

    /// A weighted average was requested over a total weight of zero.
    #[error("weighted average over zero total weight")]
    ZeroTotalWeight,
}

/// Errors raised when parsing a closed enumeration from a label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseEnumError {
    /// The label does not name a known party.
    #[error("unknown party label: {0:?}")]
    UnknownPartyLabel(String),

    /// The label does not name a known voting body.
    #[error("unknown voting body: {0:?}")]
    UnknownVotingBody(String),

    /// The label does not name a known financial-incentive class.
    #[error("unknown financial class: {0:?}")]
    UnknownFinancialClass(String),

    /// The label does not name a known scheduler event.
    #[error("unknown event tag: {0:?}")]
    UnknownEventTag(String),
}
