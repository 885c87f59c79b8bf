//! Exponential backoff with jitter.

use std::time::Duration;

/// Retry configuration with exponential backoff.
///
/// Setting `max_retries` to `0` disables retry entirely: the caller performs
/// exactly one attempt and the remaining fields are ignored. When
/// `max_retries > 0`, any field left at its zero value is filled in by
/// [`RetryConfig::resolved`]:
///
/// - `initial_backoff`: 1s
/// - `max_backoff`: 60s
/// - `backoff_factor`: 2.0
/// - `jitter_fraction`: 0.1 (10% randomization to prevent thundering herd)
///
/// # Mathematical Formula
///
/// For retry attempt `a` (0-indexed, counting retries already performed):
/// ```text
/// raw     = min(initial_backoff * backoff_factor ^ a, max_backoff)
/// jitter  = raw * jitter_fraction * random(-1.0, +1.0)
/// delay   = raw + jitter
/// ```
///
/// A delay that comes out negative is clamped to `initial_backoff` rather
/// than zero, so a degenerate configuration can never busy-loop. The computed
/// delay is always `<= max_backoff * (1 + jitter_fraction)`.
///
/// # Examples
///
/// ```rust
/// use llmgate_core::retry::RetryConfig;
/// use std::time::Duration;
///
/// let retry = RetryConfig {
///     max_retries: 5,
///     initial_backoff: Duration::from_secs(2),
///     ..Default::default()
/// }
/// .resolved();
///
/// assert_eq!(retry.max_backoff, Duration::from_secs(60));
/// assert_eq!(retry.backoff_factor, 2.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the initial attempt.
    /// `0` disables retry.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound on the delay between retries.
    pub max_backoff: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_factor: f64,
    /// Jitter as a fraction of the delay, in `[0, 1)`.
    pub jitter_fraction: f64,
}

impl RetryConfig {
    /// Whether retry is enabled at all.
    pub fn enabled(&self) -> bool {
        self.max_retries > 0
    }

    /// Apply defaults to any field left at its zero value.
    ///
    /// Defaults are only applied when `max_retries > 0`; a disabled
    /// configuration is returned untouched so that `max_retries == 0`
    /// unambiguously means "one attempt, no retry state".
    pub fn resolved(mut self) -> Self {
        if self.max_retries == 0 {
            return self;
        }
        if self.initial_backoff.is_zero() {
            self.initial_backoff = Duration::from_secs(1);
        }
        if self.max_backoff.is_zero() {
            self.max_backoff = Duration::from_secs(60);
        }
        if self.backoff_factor == 0.0 {
            self.backoff_factor = 2.0;
        }
        if self.jitter_fraction == 0.0 {
            self.jitter_fraction = 0.1;
        }
        self
    }

    /// Calculate the jittered delay before retry `attempt`.
    ///
    /// `attempt` is 0-indexed over retries already performed: `attempt == 0`
    /// is the delay between the initial attempt failing and the first retry.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let raw = (self.initial_backoff.as_secs_f64() * self.backoff_factor.powi(attempt as i32))
            .min(self.max_backoff.as_secs_f64());

        let jittered = if self.jitter_fraction > 0.0 {
            let jitter = raw * self.jitter_fraction * (rand::random::<f64>() * 2.0 - 1.0);
            raw + jitter
        } else {
            raw
        };

        // Clamp to initial_backoff rather than zero at the numeric edge.
        if jittered < 0.0 {
            return self.initial_backoff;
        }
        Duration::from_secs_f64(jittered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_config_stays_zeroed() {
        let retry = RetryConfig::default().resolved();

        assert!(!retry.enabled());
        assert_eq!(retry.initial_backoff, Duration::ZERO);
        assert_eq!(retry.max_backoff, Duration::ZERO);
        assert_eq!(retry.backoff_factor, 0.0);
        assert_eq!(retry.jitter_fraction, 0.0);
    }

    #[test]
    fn test_defaults_applied_when_enabled() {
        let retry = RetryConfig {
            max_retries: 3,
            ..Default::default()
        }
        .resolved();

        assert!(retry.enabled());
        assert_eq!(retry.initial_backoff, Duration::from_secs(1));
        assert_eq!(retry.max_backoff, Duration::from_secs(60));
        assert_eq!(retry.backoff_factor, 2.0);
        assert_eq!(retry.jitter_fraction, 0.1);
    }

    #[test]
    fn test_partial_defaults() {
        let retry = RetryConfig {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            ..Default::default()
        }
        .resolved();

        assert_eq!(retry.initial_backoff, Duration::from_millis(500));
        assert_eq!(retry.max_backoff, Duration::from_secs(60));
        assert_eq!(retry.backoff_factor, 2.0);
        assert_eq!(retry.jitter_fraction, 0.1);
    }

    #[test]
    fn test_custom_values_preserved() {
        let retry = RetryConfig {
            max_retries: 5,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(120),
            backoff_factor: 3.0,
            jitter_fraction: 0.2,
        }
        .resolved();

        assert_eq!(retry.max_retries, 5);
        assert_eq!(retry.initial_backoff, Duration::from_secs(2));
        assert_eq!(retry.max_backoff, Duration::from_secs(120));
        assert_eq!(retry.backoff_factor, 3.0);
        assert_eq!(retry.jitter_fraction, 0.2);
    }

    #[test]
    fn test_exponential_delay_calculation() {
        let retry = RetryConfig {
            max_retries: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            backoff_factor: 2.0,
            jitter_fraction: 0.0, // No jitter for predictable tests
        };

        assert_eq!(retry.backoff_delay(0), Duration::from_millis(100));
        assert_eq!(retry.backoff_delay(1), Duration::from_millis(200));
        assert_eq!(retry.backoff_delay(2), Duration::from_millis(400));
        assert_eq!(retry.backoff_delay(3), Duration::from_millis(800));
    }

    #[test]
    fn test_default_schedule_within_ten_percent() {
        let retry = RetryConfig {
            max_retries: 3,
            ..Default::default()
        }
        .resolved();

        // ~1s, ~2s, ~4s with ±10% jitter
        for (attempt, expected_ms) in [(0u32, 1000u128), (1, 2000), (2, 4000)] {
            let delay = retry.backoff_delay(attempt).as_millis();
            let lo = expected_ms * 9 / 10;
            let hi = expected_ms * 11 / 10;
            assert!(
                (lo..=hi).contains(&delay),
                "attempt {} delay {}ms outside [{}, {}]",
                attempt,
                delay,
                lo,
                hi
            );
        }
    }

    #[test]
    fn test_max_backoff_cap() {
        let retry = RetryConfig {
            max_retries: 100,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(5),
            backoff_factor: 10.0, // Aggressive multiplier
            jitter_fraction: 0.0,
        };

        for attempt in 5..10 {
            let delay = retry.backoff_delay(attempt);
            assert!(
                delay <= Duration::from_secs(5),
                "delay at attempt {} ({:?}) exceeded max_backoff",
                attempt,
                delay
            );
        }
    }

    #[test]
    fn test_jitter_upper_bound_invariant() {
        let retry = RetryConfig {
            max_retries: 10,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(4),
            backoff_factor: 2.0,
            jitter_fraction: 0.5,
        };

        let bound = Duration::from_secs_f64(4.0 * 1.5);
        for attempt in 0..8 {
            for _ in 0..50 {
                let delay = retry.backoff_delay(attempt);
                assert!(
                    delay <= bound,
                    "delay {:?} exceeded max_backoff * (1 + jitter)",
                    delay
                );
            }
        }
    }

    #[test]
    fn test_jitter_variation() {
        let retry = RetryConfig {
            max_retries: 10,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            backoff_factor: 2.0,
            jitter_fraction: 0.5, // 50% jitter
        };

        let mut delays = Vec::new();
        for _ in 0..20 {
            delays.push(retry.backoff_delay(0));
        }

        // With 50% jitter, delays land in [500ms, 1500ms]
        for delay in &delays {
            let millis = delay.as_millis();
            assert!(
                (500..=1500).contains(&millis),
                "delay with 50% jitter should be in [500ms, 1500ms], got {}ms",
                millis
            );
        }

        let all_same = delays.windows(2).all(|w| w[0] == w[1]);
        assert!(!all_same, "with randomization, delays should vary");
    }

    #[test]
    fn test_degenerate_config_never_negative() {
        // All-zero backoff fields: raw is 0, jitter is 0, delay is 0.
        let retry = RetryConfig {
            max_retries: 1,
            ..Default::default()
        };

        let delay = retry.backoff_delay(0);
        assert!(delay >= Duration::ZERO);
    }
}
