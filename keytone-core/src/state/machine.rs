//! Session state machine
//!
//! One controller runs one session: it leaves `Idle` exactly once and,
//! once `Terminated`, never leaves again.

use super::error::ErrorKind;
use super::events::SessionEvent;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Termination {
    /// Stopped on request
    Stopped,
    /// Ended by a link fault
    Fault(ErrorKind),
}

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// Created, no session started yet
    #[default]
    Idle,
    /// Sending keys to the board
    Encoding,
    /// Reading decoded tones from the board
    Decoding,
    /// Session over; final
    Terminated(Termination),
}

impl SessionState {
    /// Check if a session is running
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Encoding | SessionState::Decoding)
    }

    /// Check if this is the final state
    pub fn is_terminated(&self) -> bool {
        matches!(self, SessionState::Terminated(_))
    }

    /// Fault that ended the session, if any
    pub fn fault(&self) -> Option<ErrorKind> {
        match self {
            SessionState::Terminated(Termination::Fault(kind)) => Some(*kind),
            _ => None,
        }
    }

    /// Process an event and return the next state
    pub fn transition(self, event: SessionEvent) -> Self {
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            // Idle transitions
            (Idle, StartEncoding) => Encoding,
            (Idle, StartDecoding) => Decoding,

            // Active transitions
            (Encoding | Decoding, Stop) => Terminated(Termination::Stopped),
            (Encoding | Decoding, Fault(kind)) => Terminated(Termination::Fault(kind)),

            // Default: stay in current state (Terminated absorbs everything)
            _ => self,
        }
    }
}
