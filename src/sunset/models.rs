use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::LookupError;

// ---------------------------------------------------------------------------
// Response envelope
//
// sunrise-sunset.org wraps every answer in the same object:
//
// Success:
//   { "results": { "sunrise": "2015-05-21T05:05:35+00:00", ... }, "status": "OK", "tz": "UTC" }
//
// Failure:
//   { "results": "", "status": "INVALID_REQUEST" }
//
// `results` is an empty string on failure, so it is kept as raw JSON until
// the status has been checked.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SunriseSunsetResponse {
    /// `"OK"` on success; `INVALID_REQUEST`, `INVALID_DATE`, `UNKNOWN_ERROR`
    /// or `INVALID_TZID` otherwise.
    pub status: String,

    /// `SunTimes` on success, `""` on failure.
    #[serde(default)]
    pub results: serde_json::Value,
}

impl SunriseSunsetResponse {
    /// Convert into `SunTimes`, mapping API-level failures to errors.
    pub fn into_result(self) -> Result<SunTimes, LookupError> {
        if self.status != "OK" {
            return Err(LookupError::Api(self.status));
        }
        Ok(serde_json::from_value(self.results)?)
    }
}

/// Payload of a successful lookup requested with `formatted=0`.
///
/// All instants are ISO-8601 in UTC.
#[derive(Debug, Clone, Deserialize)]
pub struct SunTimes {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    /// Seconds between sunrise and sunset.
    #[serde(default)]
    pub day_length: Option<i64>,
}
