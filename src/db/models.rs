use chrono::{DateTime, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// The single live settings record.
///
/// `light_time_off` is always `user_light + light_duration` on the 24-hour
/// clock; it is computed on write and never supplied by callers.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Settings {
    /// Assigned on first write, kept across replacements.
    pub id: Uuid,
    pub user_temp: f64,
    /// Resolved light-on time (a `"sunset"` request is stored as its clock time).
    pub user_light: NaiveTime,
    /// Duration expression as submitted, e.g. `"6h30m"`.
    pub light_duration: String,
    pub light_time_off: NaiveTime,
    pub updated_at: DateTime<Utc>,
}

/// Field values for a settings replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSettings {
    pub user_temp: f64,
    pub user_light: NaiveTime,
    pub light_duration: String,
    pub light_time_off: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SensorReading {
    pub id: Uuid,
    /// Same unit as `Settings::user_temp`.
    pub temperature: f64,
    pub presence: bool,
    /// Server receive time.
    pub recorded_at: DateTime<Utc>,
}
