//! Configuration types
//!
//! Board-agnostic description of the link as read from a settings file.

pub mod types;

pub use types::*;
