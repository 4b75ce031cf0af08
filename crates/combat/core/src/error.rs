//! Common error infrastructure for combat-core.
//!
//! Most combat failures are not errors at all: an invalid target yields an
//! ERROR-typed [`crate::CombatResult`] and a missing lookup falls back to a
//! default value. [`CombatError`] covers the remaining API misuse, such as
//! starting an encounter twice or addressing an unknown combatant.

use crate::combat::CombatState;
use crate::types::{CombatantId, Participant};

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry later or with another input.
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    Validation,

    /// Internal error - unexpected state inconsistency.
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Errors raised by encounter-level operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    #[error("operation requires state {expected:?} but encounter is {actual:?}")]
    InvalidState {
        expected: CombatState,
        actual: CombatState,
    },

    #[error("combatant {0} is not part of this encounter")]
    CombatantNotFound(CombatantId),

    #[error("participant {0} is not part of this encounter")]
    UnknownParticipant(Participant),
}

impl CombatError {
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidState { .. } => ErrorSeverity::Recoverable,
            Self::CombatantNotFound(_) | Self::UnknownParticipant(_) => ErrorSeverity::Validation,
        }
    }
}
