use chrono::NaiveTime;

use super::window::LightWindow;
use crate::db::models::{SensorReading, Settings};

/// Actuator commands derived from the stored settings and the latest reading.
///
/// `current_temp` and `presence` echo the reading the decision was based on;
/// both are `None` when there was nothing to decide from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlDecision {
    pub fan: bool,
    pub light: bool,
    pub current_temp: Option<f64>,
    pub presence: Option<bool>,
}

/// Decide fan and light state at local clock time `now`.
///
/// Missing settings or a missing reading means everything stays off.
pub fn evaluate(
    settings: Option<&Settings>,
    reading: Option<&SensorReading>,
    now: NaiveTime,
) -> ControlDecision {
    let (Some(settings), Some(reading)) = (settings, reading) else {
        return ControlDecision::default();
    };

    let window = LightWindow {
        on: settings.user_light,
        off: settings.light_time_off,
    };

    ControlDecision {
        fan: reading.presence && reading.temperature > settings.user_temp,
        light: reading.presence && window.contains(now),
        current_temp: Some(reading.temperature),
        presence: Some(reading.presence),
    }
}
