//! Human-relative range selectors such as `3d`, `7d`, `30d` or `12h`.

use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// Used for empty or unparseable selectors.
pub const DEFAULT_RANGE: Duration = Duration::from_secs(3 * 24 * 60 * 60);

pub fn parse_range(selector: &str) -> Duration {
    let selector = selector.trim();
    if selector.is_empty() {
        return DEFAULT_RANGE;
    }
    match humantime::parse_duration(selector) {
        Ok(d) if !d.is_zero() => d,
        _ => DEFAULT_RANGE,
    }
}

/// Oldest timestamp a query for `selector` returns, counted back from `now`.
/// A range reaching past what `DateTime` can hold falls back to the default.
pub fn range_start(now: DateTime<Utc>, selector: &str) -> DateTime<Utc> {
    let back = |d: Duration| {
        TimeDelta::from_std(d)
            .ok()
            .and_then(|d| now.checked_sub_signed(d))
    };
    back(parse_range(selector))
        .or_else(|| back(DEFAULT_RANGE))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
