//! Line driver implementations
//!
//! This crate drives a 16550-class UART through the `keytone-hal`
//! [`SerialHardware`](keytone_hal::SerialHardware) trait:
//!
//! - [`SerialLine`] - open, configure and close the line
//! - [`Transmitter`] - flow-controlled single-byte send with timeouts
//! - [`Receiver`] - receive interrupt handler body feeding a ring buffer
//! - [`sim`] - simulated UART for host-side tests (`sim` feature)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod uart16550;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use uart16550::{
    Incomplete, OpenError, Receiver, Registers, RxEvent, SerialLine, Transmitter, TxError,
    TxStage, TxTiming,
};
