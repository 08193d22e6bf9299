//! Exponential backoff for retrying accept after resource exhaustion.

use std::time::Duration;

/// First delay after an exhausted accept.
pub const INITIAL_DELAY: Duration = Duration::from_millis(5);
/// Upper bound for the delay.
pub const MAX_DELAY: Duration = Duration::from_secs(1);

/// Doubling delay, capped at [`MAX_DELAY`], reset after a successful accept.
#[derive(Debug, Clone, Default)]
pub struct AcceptBackoff {
    current: Option<Duration>,
}

impl AcceptBackoff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay to sleep before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        let delay = match self.current {
            None => INITIAL_DELAY,
            Some(previous) => previous.saturating_mul(2).min(MAX_DELAY),
        };
        self.current = Some(delay);
        delay
    }

    /// Forget previous failures.
    pub fn reset(&mut self) {
        self.current = None;
    }
}
