//! Interval resolution and cached-duration parsing.

use chrono::{DateTime, DurationRound, NaiveTime, TimeZone, Utc};

use crate::backend::User;

/// Start of the user's current local day up to `now`.
pub fn today(user: &User, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let tz = user.tz();
    let midnight = now.with_timezone(&tz).date_naive().and_time(NaiveTime::MIN);
    let from = tz
        .from_local_datetime(&midnight)
        .single()
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or(now);
    (from, now)
}

/// Everything tracked up to `now`.
pub fn all_time(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (DateTime::<Utc>::MIN_UTC, now)
}

/// All-time interval with the end cut to the full hour, so consecutive scrapes
/// within one hour issue identical (cacheable) summary queries.
pub fn all_time_hourly(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let to = now.duration_trunc(chrono::Duration::hours(1)).unwrap_or(now);
    (DateTime::<Utc>::MIN_UTC, to)
}

/// Parse a Go `time.Duration` string (`"72h3m0.5s"`, `"1.5h"`, `"-2m"`, `"0"`)
/// into seconds.
pub fn parse_go_duration(s: &str) -> Option<f64> {
    let s = s.trim();
    let (negative, mut rest) = match s.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if rest == "0" {
        return Some(0.0);
    }
    if rest.is_empty() {
        return None;
    }

    let mut total = 0.0;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return None;
        }
        let value: f64 = rest[..num_len].parse().ok()?;
        rest = &rest[num_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_len] {
            "ns" => 1e-9,
            "us" | "µs" | "μs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return None,
        };
        total += value * scale;
        rest = &rest[unit_len..];
    }

    Some(if negative { -total } else { total })
}
