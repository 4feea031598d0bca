//! Session error types.
//!
//! Only user intents that cannot be expressed at all produce errors;
//! everything else in the session degrades per the core error taxonomy
//! (malformed data excluded, stale results discarded, side-effect failures
//! logged and swallowed). No error here is fatal to the process.

use thiserror::Error;

/// Errors from driving the Session state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// An operation needed an active room and none is selected.
    #[error("no active room: cannot {operation}")]
    NoActiveRoom {
        /// Operation that was attempted.
        operation: &'static str,
    },

    /// An operation needed a live connection.
    #[error("not connected: cannot {operation}")]
    NotConnected {
        /// Operation that was attempted.
        operation: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_operation_context() {
        let err = SessionError::NoActiveRoom { operation: "send message" };
        assert_eq!(err.to_string(), "no active room: cannot send message");

        let err = SessionError::NotConnected { operation: "send message" };
        assert_eq!(err.to_string(), "not connected: cannot send message");
    }
}
