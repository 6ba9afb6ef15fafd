//! Session state
//!
//! The error state shared with the receive handler and the finite state
//! machine that sequences one encode or decode session.

pub mod error;
pub mod events;
pub mod machine;

pub use error::{ErrorKind, ErrorState};
pub use events::SessionEvent;
pub use machine::{SessionState, Termination};
