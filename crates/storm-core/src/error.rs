//! Error types for storm-core.

use crate::models::{Phase, TokenColor};
use thiserror::Error;

/// Result type for storm operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors a storm command or query can fail with.
///
/// Every command validates before it writes, so any of these leaves the
/// storm exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed input (empty title, oversized description, bad tokens, blank comment).
    #[error("invalid input: {0}")]
    Validation(String),

    /// The operation is not allowed in the storm's current phase.
    #[error("cannot {operation} during the {phase} phase")]
    PhaseViolation {
        operation: &'static str,
        phase: Phase,
    },

    /// The requester lacks the role or authorship the operation needs.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The allocation exceeds what is left of the requester's budget.
    #[error("not enough {color} tokens: requested {requested}, remaining {remaining}")]
    BudgetExceeded {
        color: TokenColor,
        requested: u32,
        remaining: u32,
    },

    /// Unknown storm, idea or participant.
    #[error("not found: {0}")]
    NotFound(String),

    /// The storm is already in its terminal phase.
    #[error("cannot advance past the {0} phase")]
    InvalidTransition(Phase),

    /// The session handle does not resolve to any participant.
    #[error("unknown or missing session")]
    Unauthenticated,

    /// The session handle belongs to a different storm.
    #[error("session is not a member of this storm")]
    NotAMember,

    /// Stored state is inconsistent (e.g. a vote for a missing idea).
    #[error("data integrity error: {0}")]
    Integrity(String),
}

impl Error {
    /// Stable machine-readable name for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation_error",
            Error::PhaseViolation { .. } => "phase_violation",
            Error::Forbidden(_) => "forbidden",
            Error::BudgetExceeded { .. } => "budget_exceeded",
            Error::NotFound(_) => "not_found",
            Error::InvalidTransition(_) => "invalid_transition",
            Error::Unauthenticated => "unauthenticated",
            Error::NotAMember => "not_a_member",
            Error::Integrity(_) => "integrity",
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_phase() {
        let err = Error::PhaseViolation {
            operation: "submit a vote",
            phase: Phase::Results,
        };
        assert_eq!(err.to_string(), "cannot submit a vote during the results phase");
        assert_eq!(err.kind(), "phase_violation");
    }

    #[test]
    fn budget_message_carries_amounts() {
        let err = Error::BudgetExceeded {
            color: TokenColor::Blue,
            requested: 6,
            remaining: 5,
        };
        assert_eq!(
            err.to_string(),
            "not enough blue tokens: requested 6, remaining 5"
        );
    }
}
