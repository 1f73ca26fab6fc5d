//! Wait policy between status queries.
//!
//! Delays start at [`PollPolicy::initial_delay`], grow linearly by
//! [`PollPolicy::increment`] after every query, and stop growing at
//! [`PollPolicy::max_delay`]. The sequence is monotonically non-decreasing.

use std::time::Duration;

/// Tunable parameters for the status-query wait policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay after the first non-terminal status.
    pub initial_delay: Duration,
    /// Added to the delay after each further non-terminal status.
    pub increment: Duration,
    /// Upper bound on the delay between queries.
    pub max_delay: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(3),
            increment: Duration::from_secs(2),
            max_delay: Duration::from_secs(15),
        }
    }
}

impl PollPolicy {
    /// Build a policy, raising `max_delay` to `initial_delay` if it was set
    /// lower so the sequence can never shrink.
    pub fn new(initial_delay: Duration, increment: Duration, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            increment,
            max_delay: max_delay.max(initial_delay),
        }
    }

    /// Calculate the next delay from the current one.
    ///
    /// The result is clamped to [`PollPolicy::max_delay`] but never drops
    /// below `current`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        current
            .saturating_add(self.increment)
            .min(self.max_delay)
            .max(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_delay_adds_increment() {
        let policy = PollPolicy::default();
        assert_eq!(
            policy.next_delay(Duration::from_secs(3)),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn next_delay_clamps_at_max() {
        let policy = PollPolicy::default();
        assert_eq!(
            policy.next_delay(Duration::from_secs(14)),
            Duration::from_secs(15)
        );
        assert_eq!(
            policy.next_delay(Duration::from_secs(15)),
            Duration::from_secs(15)
        );
    }

    #[test]
    fn max_below_initial_is_raised() {
        let policy = PollPolicy::new(
            Duration::from_secs(10),
            Duration::from_secs(1),
            Duration::from_secs(2),
        );
        assert_eq!(policy.max_delay, Duration::from_secs(10));
        assert_eq!(
            policy.next_delay(policy.initial_delay),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn full_sequence_is_non_decreasing() {
        let policy = PollPolicy::default();
        let mut delay = policy.initial_delay;
        let expected = [3, 5, 7, 9, 11, 13, 15, 15, 15];

        for &expected_secs in &expected {
            assert_eq!(delay.as_secs(), expected_secs);
            delay = policy.next_delay(delay);
        }
    }

    #[test]
    fn zero_increment_keeps_fixed_interval() {
        let policy = PollPolicy::new(
            Duration::from_millis(500),
            Duration::ZERO,
            Duration::from_secs(5),
        );
        assert_eq!(
            policy.next_delay(Duration::from_millis(500)),
            Duration::from_millis(500)
        );
    }
}
