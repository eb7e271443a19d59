//! Rate-limit accounting from response headers
//!
//! The API advertises its quota through `x-ratelimit-remaining` and
//! `x-ratelimit-reset` headers. `RateLimiter` turns those observed signals
//! into a required sleep duration; it never sleeps itself — the fetcher
//! decides when (and whether) to wait.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::time::Duration;

pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RESET_HEADER: &str = "x-ratelimit-reset";

/// Rate-limit state observed on a single response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitSignals {
    /// Requests left in the current window, if advertised
    pub remaining: Option<u64>,

    /// Unix timestamp at which the window resets, if advertised
    pub reset_epoch: Option<i64>,
}

impl RateLimitSignals {
    /// Extracts the rate-limit headers; missing or unparsable values are None
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            remaining: header_number(headers, REMAINING_HEADER),
            reset_epoch: header_number(headers, RESET_HEADER),
        }
    }

    /// True when the response reported zero remaining quota
    pub fn exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Computes required sleeps from observed rate-limit signals
///
/// Pure: `required_sleep` takes `now` explicitly and performs no I/O.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    buffer: Duration,
}

impl RateLimiter {
    /// Creates a limiter that pads every computed sleep with `buffer`
    pub fn new(buffer: Duration) -> Self {
        Self { buffer }
    }

    /// Returns the duration to sleep before retrying, or None if quota remains
    ///
    /// With zero remaining quota the sleep is the time until the advertised
    /// reset (floored at zero) plus the configured buffer. A zero-quota
    /// response without a reset timestamp still sleeps for the buffer.
    pub fn required_sleep(
        &self,
        signals: &RateLimitSignals,
        now: DateTime<Utc>,
    ) -> Option<Duration> {
        if !signals.exhausted() {
            return None;
        }

        let until_reset = signals
            .reset_epoch
            .map(|reset| (reset - now.timestamp()).max(0) as u64)
            .unwrap_or(0);

        Some(Duration::from_secs(until_reset) + self.buffer)
    }
}
