//! PC-specific HAL for the Keytone link
//!
//! Implements the shared `keytone-hal` traits with x86 port I/O against
//! the standard PC layout:
//!
//! - COM1 at 0x3F8 on IRQ4, COM2 at 0x2F8 on IRQ3
//! - Master 8259 PIC at 0x20/0x21
//!
//! Port I/O needs I/O privilege (ring 0, or `ioperm` on a hosted OS); the
//! backend does not try to obtain it.

#![no_std]

pub mod com;
pub mod pic;

#[cfg(target_arch = "x86_64")]
mod backend;

#[cfg(target_arch = "x86_64")]
pub use backend::PortIoBackend;

// Re-export shared traits from keytone-hal for convenience
pub use keytone_hal::{Register, SerialHardware};
