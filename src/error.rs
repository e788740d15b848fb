//! Error types for automaton construction and I/O.

use crate::StateId;
use thiserror::Error;

/// Errors produced by automaton operations.
///
/// Variants fall into four groups:
///
/// - **Precondition violations** ([`is_precondition`](FsaError::is_precondition)):
///   the inputs are unsuitable for the requested operation. No input is
///   modified and no partial result is returned.
/// - **Resource exhaustion**: the result would need more states than the
///   configured maximum.
/// - **Cancellation**: the caller raised the abort flag. Any partial
///   construction has been discarded.
/// - **Internal failures** ([`is_fatal`](FsaError::is_fatal)): an automaton
///   violated a structural contract. Callers should abandon the whole run.
#[derive(Debug, Error)]
pub enum FsaError {
    /// Two operands do not share the same alphabet.
    #[error("alphabet mismatch: {left} symbols vs {right} symbols")]
    AlphabetMismatch {
        /// Alphabet size of the first operand
        left: usize,
        /// Alphabet size of the second operand
        right: usize,
    },

    /// The operation requires an automaton over a product alphabet.
    #[error("{operation} requires a product automaton")]
    NotProductAutomaton {
        /// Name of the operation that was attempted
        operation: &'static str,
    },

    /// The operation requires an automaton over a plain (non-product) alphabet.
    #[error("{operation} requires an automaton over the base alphabet")]
    NotBaseAutomaton {
        /// Name of the operation that was attempted
        operation: &'static str,
    },

    /// A state id is outside the automaton.
    #[error("state {state} is not valid (automaton has {count} states)")]
    InvalidState {
        /// The offending state id
        state: StateId,
        /// Number of states, including the failure state
        count: usize,
    },

    /// A label id is outside the label table.
    #[error("label {label} is not valid (automaton has {count} labels)")]
    InvalidLabel {
        /// The offending label id
        label: u32,
        /// Number of labels, including the null label
        count: usize,
    },

    /// A word length argument is negative.
    #[error("invalid word length {0}")]
    InvalidLength(i64),

    /// A state number map does not describe a valid renumbering.
    #[error("invalid state permutation: {0}")]
    InvalidPermutation(String),

    /// States selected for merging disagree on a transition or label.
    #[error("cannot merge into state {state}: conflicting {what}")]
    MergeConflict {
        /// The merged state in the new automaton
        state: StateId,
        /// What disagreed ("transition" or "label")
        what: &'static str,
    },

    /// The result would exceed the maximum number of states.
    #[error("state limit of {limit} exceeded")]
    StateLimitExceeded {
        /// Configured maximum
        limit: usize,
    },

    /// The caller raised the abort flag.
    #[error("operation cancelled")]
    Cancelled,

    /// An automaton violated a structural contract.
    #[error("internal error in {operation} at state {state}: {message}")]
    Internal {
        /// Name of the operation that detected the failure
        operation: &'static str,
        /// State being processed
        state: StateId,
        /// Description of the failure
        message: String,
    },

    /// Malformed text input.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// I/O error
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

impl FsaError {
    /// True for errors that indicate a broken automaton rather than bad input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FsaError::Internal { .. })
    }

    /// True for errors where the operation was refused before doing any work.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            FsaError::AlphabetMismatch { .. }
                | FsaError::NotProductAutomaton { .. }
                | FsaError::NotBaseAutomaton { .. }
                | FsaError::InvalidState { .. }
                | FsaError::InvalidLabel { .. }
                | FsaError::InvalidLength(_)
                | FsaError::InvalidPermutation(_)
                | FsaError::MergeConflict { .. }
        )
    }

    pub(crate) fn internal(operation: &'static str, state: StateId, message: impl Into<String>) -> Self {
        let message = message.into();
        log::error!("{}: state {}: {}", operation, state, message);
        FsaError::Internal {
            operation,
            state,
            message,
        }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        FsaError::Parse {
            line,
            message: message.into(),
        }
    }
}

/// A specialized `Result` type for automaton operations.
pub type Result<T> = std::result::Result<T, FsaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let e = FsaError::AlphabetMismatch { left: 2, right: 3 };
        assert!(e.is_precondition());
        assert!(!e.is_fatal());

        let e = FsaError::internal("minimize", 7, "bad row");
        assert!(e.is_fatal());
        assert!(!e.is_precondition());
        assert_eq!(e.to_string(), "internal error in minimize at state 7: bad row");

        assert!(!FsaError::Cancelled.is_precondition());
        assert!(!FsaError::Cancelled.is_fatal());
    }
}
