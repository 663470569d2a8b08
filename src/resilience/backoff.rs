//! Exponential backoff with `Retry-After` support and jitter.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;

/// Server guidance from a `Retry-After` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAfter {
    /// Delay in seconds.
    Seconds(u64),
    /// Absolute time to retry at.
    At(DateTime<Utc>),
    /// Present but neither seconds nor a date.
    Invalid,
}

impl RetryAfter {
    /// Delay relative to `now`. `None` when the timestamp already passed
    /// or the header was unusable.
    pub fn delay_from(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self {
            RetryAfter::Seconds(secs) => Some(Duration::from_secs(*secs)),
            RetryAfter::At(at) => (*at - now).to_std().ok(),
            RetryAfter::Invalid => None,
        }
    }
}

/// Parse a `Retry-After` value: delta-seconds or an HTTP-date.
///
/// A value with leading digits that is not a date uses those digits, so
/// `1.5` means one second. Anything else, negative numbers included, is
/// [`RetryAfter::Invalid`].
pub fn parse_retry_after(value: &str) -> RetryAfter {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return RetryAfter::Seconds(secs);
    }
    if let Ok(at) =
        DateTime::parse_from_rfc2822(value).or_else(|_| DateTime::parse_from_rfc3339(value))
    {
        return RetryAfter::At(at.with_timezone(&Utc));
    }
    let digits = value.len() - value.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    value[..digits]
        .parse::<u64>()
        .map(RetryAfter::Seconds)
        .unwrap_or(RetryAfter::Invalid)
}

/// Running delay for one request.
///
/// Starts at `initial`. Without a hint every step doubles the previous delay;
/// with a hint the delay becomes the hinted one and later doublings start
/// from there.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration) -> Self {
        Self {
            initial,
            current: initial,
        }
    }

    /// Delay used by the most recent step (or the initial delay).
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Compute the next base delay (before jitter).
    ///
    /// A hint that yields no delay (past date, invalid value) clamps to the
    /// initial delay.
    pub fn next_delay(&mut self, hint: Option<RetryAfter>) -> Duration {
        self.next_delay_at(hint, Utc::now())
    }

    /// Same as [`Backoff::next_delay`] with an explicit clock.
    pub fn next_delay_at(&mut self, hint: Option<RetryAfter>, now: DateTime<Utc>) -> Duration {
        self.current = match hint {
            Some(hint) => hint.delay_from(now).unwrap_or(self.initial),
            None => self.current.saturating_mul(2),
        };
        self.current
    }
}

/// Add uniform random jitter in `[0, max_jitter)` to `base`.
pub fn with_jitter(base: Duration, max_jitter: Duration) -> Duration {
    let max_ms = max_jitter.as_millis() as u64;
    if max_ms == 0 {
        return base;
    }
    let jitter = rand::thread_rng().gen_range(0..max_ms);
    base.saturating_add(Duration::from_millis(jitter))
}
