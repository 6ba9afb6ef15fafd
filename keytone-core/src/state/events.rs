//! Events that trigger session state transitions

use super::error::ErrorKind;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionEvent {
    // Session start
    /// Begin sending keys to the board
    StartEncoding,
    /// Begin reading decoded tones from the board
    StartDecoding,

    // Session end
    /// Caller asked the session to stop
    Stop,
    /// Error state became non-empty
    Fault(ErrorKind),
}

impl SessionEvent {
    /// Check if this event starts a session
    pub fn is_start(&self) -> bool {
        matches!(self, SessionEvent::StartEncoding | SessionEvent::StartDecoding)
    }

    /// Check if this event indicates an error
    pub fn is_fault(&self) -> bool {
        matches!(self, SessionEvent::Fault(_))
    }
}
