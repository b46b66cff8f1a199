use std::{sync::LazyLock, time::Duration};

use regex::Regex;

use super::ParseError;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<hours>\d+)h)?(?:(?P<minutes>\d+)m)?(?:(?P<seconds>\d+)s)?$")
        .expect("duration pattern is valid")
});

/// Parse a compact duration such as `"1h30m"`, `"45s"` or `"2h15m10s"`.
///
/// Components are optional but must appear in `h`, `m`, `s` order with no
/// separators. At least one component is required, so `""` is rejected while
/// `"0s"` is a valid zero duration. There is no upper bound beyond what fits
/// in a `u64` second count.
pub fn parse_duration(text: &str) -> Result<Duration, ParseError> {
    let invalid = || ParseError::InvalidDuration(text.to_owned());

    let caps = DURATION_RE.captures(text.trim()).ok_or_else(invalid)?;

    let mut matched = false;
    let mut total: u64 = 0;
    for (name, unit) in [("hours", 3600u64), ("minutes", 60), ("seconds", 1)] {
        let Some(group) = caps.name(name) else {
            continue;
        };
        matched = true;
        let secs = group
            .as_str()
            .parse::<u64>()
            .ok()
            .and_then(|n| n.checked_mul(unit))
            .and_then(|s| total.checked_add(s))
            .ok_or_else(invalid)?;
        total = secs;
    }

    if !matched {
        return Err(invalid());
    }
    Ok(Duration::from_secs(total))
}
