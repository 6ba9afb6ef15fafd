//! Host-side session layer for the Keytone link
//!
//! Ties the line driver, the receive buffer and the key code tables
//! together into encode and decode sessions, and loads the link settings
//! from a TOML file.
//!
//! ```text
//! keys ──► encode ──► Transmitter ──► wire
//! wire ──► Receiver ──► RingBuffer ──► drain ──► decode_reply ──► symbols
//! ```

#[macro_use]
mod fmt;

pub mod config;
pub mod controller;
pub mod error;

pub use config::{load_file, load_str, LinkConfig, LoadError};
pub use controller::{Dial, Drain, SessionController, ECHO_CAPACITY};
pub use error::{SessionError, EXIT_ERROR, EXIT_OK};
