//! DTMF Key Code Protocol
//!
//! This crate defines the byte-level contract between the host and the DSP
//! tone board. The protocol is full-duplex and carries one byte per key:
//!
//! ```text
//!  host ──► board   key code    0x0-0xF, one byte per key press
//!  host ◄── board   reply byte  keypad row/column of the decoded tone
//! ```
//!
//! Both tables are fixed and are the wire contract with the board; they are
//! `const` data and never change at runtime.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod codec;
pub mod symbol;

pub use codec::{decode, decode_reply, encode, encode_dial, CodecError, MAX_DIAL_LEN};
pub use symbol::Symbol;
