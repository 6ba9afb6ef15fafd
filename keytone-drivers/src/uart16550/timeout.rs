//! Bounded polling

use embassy_time::{Duration, Instant};

/// Poll `ready` until it returns `true` or `timeout` has elapsed
///
/// `ready` is checked at least once, even with a zero timeout. Returns
/// whether the condition was met.
pub fn poll_until(timeout: Duration, mut ready: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    loop {
        if ready() {
            return true;
        }
        if start.elapsed() >= timeout {
            return false;
        }
    }
}
