use rand::Rng;
use std::time::Duration;

/// Exponential reconnect backoff with jitter
///
/// Delays grow as `base * 2^attempt` up to `max`, with a random offset of
/// up to `jitter` in either direction so that a fleet of clients does not
/// reconnect in lockstep against a recovering server. The attempt counter
/// resets on every successful connection.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    jitter: f64,
    attempt: u32,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration, jitter: f64) -> Self {
        Self {
            base,
            max,
            jitter: jitter.clamp(0.0, 1.0),
            attempt: 0,
        }
    }

    /// Un-jittered delay for a given attempt number
    pub fn raw_delay(&self, attempt: u32) -> Duration {
        self.base
            .saturating_mul(1u32 << attempt.min(31))
            .min(self.max)
    }

    /// Next delay; advances the attempt counter
    pub fn next_delay(&mut self) -> Duration {
        let raw = self.raw_delay(self.attempt);
        self.attempt = self.attempt.saturating_add(1);

        let spread = raw.as_secs_f64() * self.jitter;
        if spread <= 0.0 {
            return raw;
        }

        let offset = rand::thread_rng().gen_range(-spread..=spread);
        let delay = (raw.as_secs_f64() + offset).max(self.base.as_secs_f64());
        Duration::from_secs_f64(delay)
    }

    /// Reset after a successful connection
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn backoff_without_jitter() -> Backoff {
        Backoff::new(Duration::from_millis(100), Duration::from_secs(10), 0.0)
    }

    #[test]
    fn test_delays_double_until_cap() {
        let mut backoff = backoff_without_jitter();

        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
        assert_eq!(backoff.next_delay(), Duration::from_millis(200));
        assert_eq!(backoff.next_delay(), Duration::from_millis(400));
        assert_eq!(backoff.next_delay(), Duration::from_millis(800));
    }

    #[test]
    fn test_delay_is_capped() {
        let mut backoff = backoff_without_jitter();

        for _ in 0..32 {
            let delay = backoff.next_delay();
            assert!(delay <= Duration::from_secs(10));
        }
        assert_eq!(backoff.next_delay(), Duration::from_secs(10));
    }

    #[test]
    fn test_reset_returns_to_base() {
        let mut backoff = backoff_without_jitter();

        backoff.next_delay();
        backoff.next_delay();
        backoff.next_delay();
        assert_eq!(backoff.attempt(), 3);

        backoff.reset();
        assert_eq!(backoff.attempt(), 0);
        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_jittered_delay_stays_in_envelope() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(10), 0.25);

        for attempt in 0..16u32 {
            let raw = backoff.raw_delay(attempt).as_secs_f64();
            let delay = backoff.next_delay().as_secs_f64();
            let low = (raw * 0.75).max(0.1) - 1e-6;
            let high = raw * 1.25 + 1e-6;
            assert!(
                delay >= low && delay <= high,
                "attempt {}: delay {} outside [{}, {}]",
                attempt,
                delay,
                low,
                high
            );
        }
    }

    #[test]
    fn test_jittered_delay_never_below_base() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(10), 1.0);

        for _ in 0..64 {
            assert!(backoff.next_delay() >= Duration::from_millis(100));
        }
    }

    #[test]
    fn test_extreme_attempt_saturates() {
        let backoff = Backoff::new(Duration::from_millis(500), Duration::from_secs(30), 0.0);
        assert_eq!(backoff.raw_delay(200), Duration::from_secs(30));
    }

    proptest! {
        #[test]
        fn prop_raw_schedule_is_monotonic(
            base_ms in 1u64..1_000,
            max_ms in 1_000u64..120_000,
            attempts in 1u32..24,
        ) {
            let backoff = Backoff::new(
                Duration::from_millis(base_ms),
                Duration::from_millis(max_ms),
                0.0,
            );

            let mut previous = Duration::ZERO;
            for attempt in 0..attempts {
                let delay = backoff.raw_delay(attempt);
                prop_assert!(delay >= previous);
                prop_assert!(delay <= Duration::from_millis(max_ms));
                previous = delay;
            }
        }

        #[test]
        fn prop_jittered_delay_bounded(
            base_ms in 1u64..1_000,
            jitter in 0.0f64..1.0,
        ) {
            let mut backoff = Backoff::new(
                Duration::from_millis(base_ms),
                Duration::from_secs(60),
                jitter,
            );

            for attempt in 0..12u32 {
                let raw = backoff.raw_delay(attempt).as_secs_f64();
                let delay = backoff.next_delay().as_secs_f64();
                prop_assert!(delay <= raw * (1.0 + jitter) + 1e-6);
                prop_assert!(delay + 1e-6 >= (base_ms as f64 / 1_000.0).min(raw * (1.0 - jitter)));
            }
        }
    }
}
