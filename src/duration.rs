use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::{Error, Result};

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("duration pattern is valid")
});

/// Parse an ISO-8601 duration (`PT1H2M3S`) into whole minutes.
///
/// Seconds only contribute whole minutes; the remainder is dropped. A bare
/// `PT` parses as zero rather than an error.
pub fn parse_minutes(duration: &str) -> Result<u64> {
    let caps = DURATION_RE
        .captures(duration)
        .ok_or_else(|| Error::InvalidDurationFormat(duration.to_string()))?;

    let hours = group(&caps, 1, duration)?;
    let minutes = group(&caps, 2, duration)?;
    let seconds = group(&caps, 3, duration)?;

    hours
        .checked_mul(60)
        .and_then(|h| h.checked_add(minutes))
        .and_then(|m| m.checked_add(seconds / 60))
        .ok_or_else(|| Error::InvalidDurationFormat(duration.to_string()))
}

fn group(caps: &Captures<'_>, index: usize, duration: &str) -> Result<u64> {
    match caps.get(index) {
        Some(m) => m
            .as_str()
            .parse()
            .map_err(|_| Error::InvalidDurationFormat(duration.to_string())),
        None => Ok(0),
    }
}
