//! Session error types.
//!
//! These reject a user intent that does not apply to the current state. The
//! session itself is never harmed by one; hosts usually just log them.

use thiserror::Error;

use super::event::UserAction;
use crate::types::SessionState;

/// Errors returned by [`TimerController`](super::TimerController) intents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The action is not valid in the current state.
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: UserAction,
        state: SessionState,
    },

    /// The session has already emitted its close signal.
    #[error("rest session is closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SessionError::InvalidTransition {
            action: UserAction::Pause,
            state: SessionState::Complete,
        };
        assert_eq!(err.to_string(), "cannot pause while complete");
        assert_eq!(SessionError::Closed.to_string(), "rest session is closed");
    }
}
