//! Keytone Hardware Abstraction Layer
//!
//! This crate defines the register-level interface to a 16550-class UART
//! and the validated line configuration. Chip- or platform-specific crates
//! implement [`SerialHardware`]; the driver logic in `keytone-drivers` only
//! talks to the trait, so it runs unchanged against real port I/O or a
//! simulated line.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  keytone-host (sessions, config)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  keytone-drivers (line, tx, rx)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  keytone-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ keytone-hal-  │       │ keytone-      │
//! │    pc         │       │ drivers::sim  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Modules
//!
//! - [`uart`] - [`LineConfig`] and its parameter enums
//! - [`register`] - 16550 register map, bit masks and [`SerialHardware`]

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod register;
pub mod uart;

// Re-export key types at crate root for convenience
pub use register::{bits, ModemStatus, Register, SerialHardware};
pub use uart::{ConfigError, DataBits, LineConfig, Parity, Port, StopBits};
