use std::future::Future;

use chrono::{DateTime, NaiveTime, TimeDelta, Timelike, Utc};
use chrono_tz::Tz;
use tracing::debug;

use super::{duration::parse_duration, ParseError};
use crate::sunset::LookupError;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Source of today's sunset instant for the configured site.
pub trait SunsetLookup {
    fn sunset_utc(&self) -> impl Future<Output = Result<DateTime<Utc>, LookupError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    ExternalLookup(#[from] LookupError),
}

/// Daily on/off clock times for the light.
///
/// `off` may be earlier than `on`; the window then runs past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightWindow {
    pub on: NaiveTime,
    pub off: NaiveTime,
}

impl LightWindow {
    /// Inclusive on both ends. A window with `on > off` wraps midnight.
    pub fn contains(&self, now: NaiveTime) -> bool {
        if self.on <= self.off {
            self.on <= now && now <= self.off
        } else {
            now >= self.on || now <= self.off
        }
    }
}

/// Turns a start spec (`"HH:MM"` or `"sunset"`) plus a duration expression
/// into a concrete [`LightWindow`].
#[derive(Debug, Clone)]
pub struct LightWindowResolver<L> {
    lookup: L,
    timezone: Tz,
}

impl<L: SunsetLookup> LightWindowResolver<L> {
    pub fn new(lookup: L, timezone: Tz) -> Self {
        Self { lookup, timezone }
    }

    pub async fn resolve(
        &self,
        start_spec: &str,
        duration_text: &str,
    ) -> Result<LightWindow, WindowError> {
        // Validate the cheap input before going to the network.
        let duration = parse_duration(duration_text)?;

        let on = if start_spec.trim().eq_ignore_ascii_case("sunset") {
            self.local_sunset().await?
        } else {
            parse_clock(start_spec)?
        };

        let offset = TimeDelta::seconds((duration.as_secs() % SECS_PER_DAY) as i64);
        let (off, _) = on.overflowing_add_signed(offset);

        debug!(start_spec, duration_text, %on, %off, "Resolved light window");
        Ok(LightWindow { on, off })
    }

    /// Today's sunset as a local clock time, truncated to the minute.
    async fn local_sunset(&self) -> Result<NaiveTime, LookupError> {
        let sunset = self.lookup.sunset_utc().await?;
        let local = sunset.with_timezone(&self.timezone).time();
        Ok(local
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(local))
    }
}

/// Parse a literal `HH:MM` (or `HH:MM:SS`) clock time.
///
/// chrono reads `:60` as a leap second; that is not a valid start time.
pub fn parse_clock(text: &str) -> Result<NaiveTime, ParseError> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .ok()
        .filter(|t| t.nanosecond() < 1_000_000_000)
        .ok_or_else(|| ParseError::InvalidStartTime(text.to_owned()))
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use chrono::TimeZone;

    use super::*;

    /// Returns a fixed sunset and counts how often it was asked.
    #[derive(Clone)]
    struct FixedSunset {
        at: Option<DateTime<Utc>>,
        calls: Arc<AtomicUsize>,
    }

    impl FixedSunset {
        fn at(at: DateTime<Utc>) -> Self {
            Self { at: Some(at), calls: Arc::default() }
        }

        fn failing() -> Self {
            Self { at: None, calls: Arc::default() }
        }
    }

    impl SunsetLookup for FixedSunset {
        async fn sunset_utc(&self) -> Result<DateTime<Utc>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.at
                .ok_or_else(|| LookupError::Api("UNKNOWN_ERROR".to_owned()))
        }
    }

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn resolver(lookup: FixedSunset) -> LightWindowResolver<FixedSunset> {
        LightWindowResolver::new(lookup, chrono_tz::America::Jamaica)
    }

    // Jamaica is UTC-5 all year.
    fn jamaica_sunset_1830() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 23, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn literal_start_plus_duration() {
        let window = resolver(FixedSunset::failing())
            .resolve("06:00", "12h")
            .await
            .unwrap();
        assert_eq!(window, LightWindow { on: t(6, 0, 0), off: t(18, 0, 0) });
    }

    #[tokio::test]
    async fn literal_start_never_calls_lookup() {
        let lookup = FixedSunset::at(jamaica_sunset_1830());
        let calls = lookup.calls.clone();
        resolver(lookup).resolve("07:15", "30m").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sunset_is_converted_to_local_time() {
        let window = resolver(FixedSunset::at(jamaica_sunset_1830()))
            .resolve("sunset", "1h")
            .await
            .unwrap();
        assert_eq!(window, LightWindow { on: t(18, 30, 0), off: t(19, 30, 0) });
    }

    #[tokio::test]
    async fn sunset_keyword_is_case_insensitive_and_truncated_to_minute() {
        let sunset = Utc.with_ymd_and_hms(2024, 6, 1, 23, 34, 59).unwrap();
        let window = resolver(FixedSunset::at(sunset))
            .resolve("SunSet", "15m")
            .await
            .unwrap();
        assert_eq!(window, LightWindow { on: t(18, 34, 0), off: t(18, 49, 0) });
    }

    #[tokio::test]
    async fn failed_lookup_fails_resolution() {
        let err = resolver(FixedSunset::failing())
            .resolve("sunset", "1h")
            .await
            .unwrap_err();
        assert!(matches!(err, WindowError::ExternalLookup(_)));
    }

    #[tokio::test]
    async fn invalid_duration_is_checked_before_lookup() {
        let lookup = FixedSunset::at(jamaica_sunset_1830());
        let calls = lookup.calls.clone();
        let err = resolver(lookup).resolve("sunset", "soon").await.unwrap_err();
        assert!(matches!(err, WindowError::Parse(ParseError::InvalidDuration(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_start_time_is_a_parse_error() {
        for start in ["25:00", "noon", "", "6pm", "23:59:60", "12:30:60"] {
            let err = resolver(FixedSunset::failing())
                .resolve(start, "1h")
                .await
                .unwrap_err();
            assert!(
                matches!(err, WindowError::Parse(ParseError::InvalidStartTime(_))),
                "{start:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn seconds_in_start_time_are_accepted() {
        let window = resolver(FixedSunset::failing())
            .resolve("18:30:00", "1h")
            .await
            .unwrap();
        assert_eq!(window.on, t(18, 30, 0));
    }

    #[tokio::test]
    async fn off_time_wraps_past_midnight() {
        let window = resolver(FixedSunset::failing())
            .resolve("22:00", "4h")
            .await
            .unwrap();
        assert_eq!(window, LightWindow { on: t(22, 0, 0), off: t(2, 0, 0) });
    }

    #[tokio::test]
    async fn multi_day_durations_reduce_modulo_24h() {
        let window = resolver(FixedSunset::failing())
            .resolve("06:00", "49h30s")
            .await
            .unwrap();
        assert_eq!(window.off, t(7, 0, 30));
    }

    #[tokio::test]
    async fn identical_inputs_resolve_identically() {
        let resolver = resolver(FixedSunset::at(jamaica_sunset_1830()));
        let first = resolver.resolve("sunset", "2h15m").await.unwrap();
        let second = resolver.resolve("sunset", "2h15m").await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn plain_window_contains_its_bounds() {
        let window = LightWindow { on: t(6, 0, 0), off: t(18, 0, 0) };
        assert!(window.contains(t(6, 0, 0)));
        assert!(window.contains(t(12, 0, 0)));
        assert!(window.contains(t(18, 0, 0)));
        assert!(!window.contains(t(18, 0, 1)));
        assert!(!window.contains(t(5, 59, 59)));
    }

    #[test]
    fn wrapped_window_spans_midnight() {
        let window = LightWindow { on: t(22, 0, 0), off: t(2, 0, 0) };
        assert!(window.contains(t(23, 30, 0)));
        assert!(window.contains(t(0, 0, 0)));
        assert!(window.contains(t(1, 0, 0)));
        assert!(!window.contains(t(3, 0, 0)));
        assert!(!window.contains(t(21, 59, 59)));
    }
}
