//! Error types for the Strata middleware engine.

use thiserror::Error;

/// A boxed error raised by user code inside a middleware.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can terminate a middleware chain.
///
/// Only [`NotCallable`](ChainError::NotCallable) is raised at composition
/// time. Every other variant is produced while a chain is running and is
/// delivered to the caller as the `Err` side of the composed future, unless a
/// `caught` stage intercepts it first.
#[derive(Debug, Error)]
pub enum ChainError {
    /// A continuation was invoked after control had already moved past it.
    ///
    /// Raised both when a stage calls its own `next` twice and when it calls
    /// the `next` of an earlier stage after dispatch advanced.
    #[error("next() called multiple times")]
    NextCalledMultipleTimes,

    /// A slot in the sequence handed to `try_compose` held no middleware.
    #[error("middleware at position {index} is not callable")]
    NotCallable {
        /// Position of the empty slot.
        index: usize,
    },

    /// A forked middleware could not be scheduled because no tokio runtime
    /// is driving the current task.
    #[error("no async runtime available to schedule forked middleware")]
    NoRuntime,

    /// An error raised by a middleware.
    #[error("middleware error: {0}")]
    Handler(#[source] BoxError),

    /// Ad-hoc error text.
    #[error("{0}")]
    Message(String),
}

impl ChainError {
    /// Wraps an arbitrary error raised by user code.
    pub fn handler(error: impl Into<BoxError>) -> Self {
        Self::Handler(error.into())
    }

    /// Creates an error carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Returns `true` for the double continuation error.
    pub fn is_multiple_next(&self) -> bool {
        matches!(self, Self::NextCalledMultipleTimes)
    }

    /// Attempts to view a [`Handler`](ChainError::Handler) error as `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::Handler(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Result type produced by every middleware and continuation.
pub type ChainResult<R = ()> = Result<R, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("token expired")]
    struct TokenExpired;

    #[test]
    fn test_double_next_message() {
        let err = ChainError::NextCalledMultipleTimes;
        assert_eq!(err.to_string(), "next() called multiple times");
        assert!(err.is_multiple_next());
    }

    #[test]
    fn test_downcast_handler_error() {
        let err = ChainError::handler(TokenExpired);
        assert!(err.downcast_ref::<TokenExpired>().is_some());
        assert_eq!(err.to_string(), "middleware error: token expired");
        assert!(!err.is_multiple_next());
    }

    #[test]
    fn test_downcast_other_variant() {
        assert!(ChainError::msg("boom").downcast_ref::<TokenExpired>().is_none());
    }
}
