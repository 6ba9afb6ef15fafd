//! Receive buffering
//!
//! Decouples byte arrival in the interrupt handler from consumption by
//! the session controller.

pub mod ring;

pub use ring::{Overflow, RingBuffer};
