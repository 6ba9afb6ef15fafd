//! Board-agnostic core logic for the Keytone link
//!
//! This crate contains the pieces shared by the driver and the session
//! layer that do not touch hardware:
//!
//! - Receive ring buffer with overflow detection
//! - Error state shared between the receive handler and the controller
//! - Session state machine
//! - Link configuration types

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod buffer;
pub mod config;
pub mod state;

pub use buffer::{Overflow, RingBuffer};
pub use state::{ErrorKind, ErrorState, SessionEvent, SessionState, Termination};
