//! Time-related abstractions.
//!
//! Re-exports `tokio::time` so timers integrate with the runtime's timer wheel
//! (and with paused test clocks).

pub use tokio::time::{interval, sleep, sleep_until, timeout, Interval, Sleep, Timeout};

pub use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Error returned by [`timeout`] when the deadline elapses.
pub use tokio::time::error::Elapsed;

/// Converts a millisecond count into a [`Duration`].
///
/// `0` maps to `None`: callers use zero to mean "no limit".
pub fn millis_or_unlimited(millis: u64) -> Option<Duration> {
    if millis == 0 {
        None
    } else {
        Some(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_millis_is_unlimited() {
        assert_eq!(millis_or_unlimited(0), None);
        assert_eq!(
            millis_or_unlimited(250),
            Some(Duration::from_millis(250))
        );
    }
}
