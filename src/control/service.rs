use chrono::{NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::info;

use super::{
    evaluator::{evaluate, ControlDecision},
    window::{LightWindowResolver, SunsetLookup},
    ControlError,
};
use crate::db::{
    models::{NewSettings, Settings},
    ReadingRepository, SettingsRepository, StoreError,
};

/// A settings change as submitted by a client, before resolution.
#[derive(Debug, Clone)]
pub struct SettingsUpdate {
    pub user_temp: f64,
    /// `"HH:MM"` or `"sunset"`.
    pub user_light: String,
    pub light_duration: String,
}

pub struct ControlService<R, L> {
    repo: R,
    resolver: LightWindowResolver<L>,
    timezone: Tz,
}

impl<R, L> ControlService<R, L>
where
    R: SettingsRepository + ReadingRepository + Sync,
    L: SunsetLookup + Sync,
{
    pub fn new(repo: R, lookup: L, timezone: Tz) -> Self {
        Self {
            repo,
            resolver: LightWindowResolver::new(lookup, timezone),
            timezone,
        }
    }

    /// Resolve the light window and replace the stored settings.
    ///
    /// Nothing is written if the start time, duration or sunset lookup fails.
    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings, ControlError> {
        let window = self
            .resolver
            .resolve(&update.user_light, &update.light_duration)
            .await?;

        let stored = self
            .repo
            .replace(NewSettings {
                user_temp: update.user_temp,
                user_light: window.on,
                light_duration: update.light_duration,
                light_time_off: window.off,
            })
            .await?;

        info!(
            id = %stored.id,
            user_temp = stored.user_temp,
            light_on = %stored.user_light,
            light_off = %stored.light_time_off,
            "Settings updated"
        );
        Ok(stored)
    }

    /// All stored settings records; at most one.
    pub async fn list_settings(&self) -> Result<Vec<Settings>, StoreError> {
        self.repo.list().await
    }

    /// Fan/light decision for the current local time.
    pub async fn decide(&self) -> Result<ControlDecision, StoreError> {
        let now = Utc::now().with_timezone(&self.timezone).time();
        self.decide_at(now).await
    }

    pub async fn decide_at(&self, now: NaiveTime) -> Result<ControlDecision, StoreError> {
        let settings = self.repo.current().await?;
        let reading = self.repo.latest().await?;
        let decision = evaluate(settings.as_ref(), reading.as_ref(), now);

        info!(
            %now,
            fan = decision.fan,
            light = decision.light,
            temperature = ?decision.current_temp,
            presence = ?decision.presence,
            "Control decision"
        );
        Ok(decision)
    }
}
