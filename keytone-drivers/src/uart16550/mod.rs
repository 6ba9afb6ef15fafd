//! 16550 UART driver
//!
//! The line, its transmitter and its receive handler share one
//! [`Registers`] block. Every register access goes through a critical
//! section, so the receive handler may run at any point between two
//! accesses of the main flow.

mod line;
mod receiver;
mod registers;
mod timeout;
mod transmitter;

pub use line::{OpenError, SerialLine};
pub use receiver::{Receiver, RxEvent};
pub use registers::Registers;
pub use timeout::poll_until;
pub use transmitter::{Incomplete, Transmitter, TxError, TxStage, TxTiming};
