//! Error types for the caucus-congress crate.

use caucus_agents::AgentError;
use caucus_types::{BillId, PolicyError};

use crate::bill::Stage;

/// Errors that can occur while generating bills or passing them through
/// the chambers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CongressError {
    /// An outcome flag was written twice.
    #[error("bill {bill}: {stage} outcome already recorded")]
    OutcomeAlreadyRecorded {
        /// The bill.
        bill: BillId,
        /// The stage whose flag was already set.
        stage: Stage,
    },

    /// An outcome was recorded before the bill passed the previous stage.
    #[error("bill {bill}: cannot reach {stage} without passing {required}")]
    ChamberOrder {
        /// The bill.
        bill: BillId,
        /// The stage being recorded.
        stage: Stage,
        /// The stage the bill must pass first.
        required: Stage,
    },

    /// No actor or coalition is available to sponsor a bill.
    #[error("no sponsors available")]
    EmptySponsorPool,

    /// Bill ids are exhausted.
    #[error("bill ids exhausted")]
    BillIdsExhausted,

    /// An actor or coalition operation failed.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// A policy-space operation failed.
    #[error("policy error: {source}")]
    Policy {
        /// The underlying policy error.
        #[from]
        source: PolicyError,
    },
}
