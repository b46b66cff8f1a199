use chrono::{DateTime, FixedOffset, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    control::{ControlDecision, SettingsUpdate},
    db::models::{SensorReading, Settings},
};

fn clock(t: NaiveTime) -> String {
    t.format("%H:%M:%S").to_string()
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Request body for `PUT /settings`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SettingsRequest {
    /// Fan threshold; the fan runs above this temperature.
    pub user_temp: f64,
    /// Light-on time as `"HH:MM"`, or `"sunset"`.
    #[schema(example = "sunset")]
    pub user_light: String,
    /// How long the light stays on, e.g. `"6h30m"`.
    #[schema(example = "6h30m")]
    pub light_duration: String,
    /// Ignored; always recomputed from `user_light` and `light_duration`.
    #[serde(default)]
    pub light_time_off: Option<String>,
}

impl From<SettingsRequest> for SettingsUpdate {
    fn from(r: SettingsRequest) -> Self {
        Self {
            user_temp: r.user_temp,
            user_light: r.user_light,
            light_duration: r.light_duration,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SettingsDto {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_temp: f64,
    /// Resolved light-on time, `"HH:MM:SS"`.
    #[schema(example = "18:30:00")]
    pub user_light: String,
    pub light_duration: String,
    /// `user_light + light_duration` on the 24-hour clock, `"HH:MM:SS"`.
    #[schema(example = "01:00:00")]
    pub light_time_off: String,
}

impl From<Settings> for SettingsDto {
    fn from(s: Settings) -> Self {
        Self {
            id: s.id,
            user_temp: s.user_temp,
            user_light: clock(s.user_light),
            light_duration: s.light_duration,
            light_time_off: clock(s.light_time_off),
        }
    }
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// Request body for `POST /reading`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReadingRequest {
    pub temperature: f64,
    pub presence: bool,
    /// Accepted for compatibility and discarded; the server stamps its own time.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub datetime: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SensorReadingDto {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub temperature: f64,
    pub presence: bool,
    /// Server receive time in the site's local zone (RFC 3339).
    #[schema(value_type = String, format = DateTime)]
    pub datetime: DateTime<FixedOffset>,
}

impl SensorReadingDto {
    pub fn new(r: SensorReading, timezone: Tz) -> Self {
        Self {
            id: r.id,
            temperature: r.temperature,
            presence: r.presence,
            datetime: r.recorded_at.with_timezone(&timezone).fixed_offset(),
        }
    }
}

// ---------------------------------------------------------------------------
// Control
// ---------------------------------------------------------------------------

/// Response for `GET /control`.
///
/// `current_temp` and `presence` are omitted when there are no settings or
/// no readings yet.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ControlDto {
    pub fan: bool,
    pub light: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_temp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence: Option<bool>,
}

impl From<ControlDecision> for ControlDto {
    fn from(d: ControlDecision) -> Self {
        Self {
            fan: d.fan,
            light: d.light,
            current_temp: d.current_temp,
            presence: d.presence,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}
