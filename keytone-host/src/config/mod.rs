//! Link configuration loading
//!
//! Settings are read from a TOML document shaped like
//! [`LinkSettings`](keytone_core::config::LinkSettings):
//!
//! ```toml
//! [line]
//! port = 1
//! baud = 1200
//! parity = "none"
//! data_bits = 8
//! stop_bits = 1
//!
//! [timing]
//! cts_timeout_ms = 50
//! thre_timeout_ms = 50
//! pacing_ms = 5
//! ```
//!
//! Every field is optional and falls back to its default.

mod loader;

pub use loader::{load_file, load_str, LinkConfig, LoadError};
