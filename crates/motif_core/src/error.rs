//! Error types for the reactive graph

use thiserror::Error;

use crate::reactive::SignalId;

/// Errors raised while reading or writing signals
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    /// The handle refers to a signal that was disposed
    #[error("signal {0:?} has been disposed")]
    Disposed(SignalId),

    /// The signal holds a value of a different type than requested
    #[error("signal {id:?} does not hold a value of type `{expected}`")]
    TypeMismatch { id: SignalId, expected: &'static str },

    /// A formula read itself, directly or through other signals
    #[error("cyclic dependency detected while evaluating signal {0:?}")]
    Cycle(SignalId),

    /// A formula reported a failure
    #[error("formula evaluation failed: {0}")]
    Evaluation(String),
}

impl SignalError {
    /// Build an evaluation error from any message
    pub fn evaluation(message: impl Into<String>) -> Self {
        SignalError::Evaluation(message.into())
    }
}

/// Result type for signal operations
pub type SignalResult<T> = std::result::Result<T, SignalError>;
