//! Link error state
//!
//! A single slot any component may raise a fault into. The controller
//! polls it between bytes and clears it when a new session starts.

use core::fmt;

use keytone_hal::ConfigError;
use portable_atomic::{AtomicU8, Ordering};

/// Types of link faults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Receive buffer filled before it was drained
    BufferOverflow,
    /// Remote end never became ready to receive
    HandshakeTimeout,
    /// Line parameters rejected
    InvalidConfig,
}

impl ErrorKind {
    fn to_raw(self) -> u8 {
        match self {
            ErrorKind::BufferOverflow => 1,
            ErrorKind::HandshakeTimeout => 2,
            ErrorKind::InvalidConfig => 3,
        }
    }

    fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(ErrorKind::BufferOverflow),
            2 => Some(ErrorKind::HandshakeTimeout),
            3 => Some(ErrorKind::InvalidConfig),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::BufferOverflow => f.write_str("buffer overflow"),
            ErrorKind::HandshakeTimeout => f.write_str("handshake timeout"),
            ErrorKind::InvalidConfig => f.write_str("invalid line configuration"),
        }
    }
}

impl From<ConfigError> for ErrorKind {
    fn from(_: ConfigError) -> Self {
        ErrorKind::InvalidConfig
    }
}

const NO_ERROR: u8 = 0;

/// Shared error slot
///
/// Lock-free, so the receive interrupt handler can raise into it without
/// waiting. The first fault raised is kept until [`ErrorState::clear`].
#[derive(Debug)]
pub struct ErrorState {
    raw: AtomicU8,
}

impl Default for ErrorState {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorState {
    pub const fn new() -> Self {
        Self {
            raw: AtomicU8::new(NO_ERROR),
        }
    }

    /// Record a fault
    ///
    /// Returns `true` if this call set the state, `false` if an earlier
    /// fault was already recorded.
    pub fn raise(&self, kind: ErrorKind) -> bool {
        let raised = self
            .raw
            .compare_exchange(NO_ERROR, kind.to_raw(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if raised {
            warn!("link fault: {:?}", kind);
        }
        raised
    }

    /// Current fault, if any
    pub fn current(&self) -> Option<ErrorKind> {
        ErrorKind::from_raw(self.raw.load(Ordering::Acquire))
    }

    pub fn is_set(&self) -> bool {
        self.current().is_some()
    }

    /// Reset to no error (session start only)
    pub fn clear(&self) {
        self.raw.store(NO_ERROR, Ordering::Release);
    }
}
