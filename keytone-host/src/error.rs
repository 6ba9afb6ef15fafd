//! Session errors

use std::fmt;

use keytone_core::{ErrorKind, SessionState};
use keytone_protocol::CodecError;

/// Exit status of a session that ended cleanly
pub const EXIT_OK: i32 = 0;

/// Exit status of a session that ended in error
pub const EXIT_ERROR: i32 = 99;

/// Errors surfaced by [`SessionController`](crate::SessionController)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// Link fault; the session is over
    Fault(ErrorKind),
    /// Key or reply byte outside the code tables; the session goes on
    Codec(CodecError),
    /// Operation not allowed in the current state
    WrongState(SessionState),
    /// The line was closed under the session
    LineClosed,
}

impl SessionError {
    /// Whether the session can continue after this error
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionError::Fault(_) | SessionError::LineClosed)
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        EXIT_ERROR
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Fault(kind) => write!(f, "link fault: {kind}"),
            SessionError::Codec(e) => write!(f, "{e}"),
            SessionError::WrongState(state) => write!(f, "not allowed while {state:?}"),
            SessionError::LineClosed => f.write_str("line closed"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ErrorKind> for SessionError {
    fn from(kind: ErrorKind) -> Self {
        SessionError::Fault(kind)
    }
}

impl From<CodecError> for SessionError {
    fn from(e: CodecError) -> Self {
        SessionError::Codec(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_errors() {
        assert!(SessionError::Fault(ErrorKind::BufferOverflow).is_terminal());
        assert!(SessionError::LineClosed.is_terminal());
        assert!(!SessionError::Codec(CodecError::UnknownCode(0x44)).is_terminal());
        assert!(!SessionError::WrongState(SessionState::Idle).is_terminal());
    }

    #[test]
    fn test_exit_code() {
        assert_eq!(SessionError::Fault(ErrorKind::HandshakeTimeout).exit_code(), 99);
        assert_eq!(SessionError::from(CodecError::UnknownSymbol('x')).exit_code(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            SessionError::Fault(ErrorKind::HandshakeTimeout).to_string(),
            "link fault: handshake timeout"
        );
    }
}
