use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    models::{NewSettings, SensorReading, Settings},
    ReadingRepository, SettingsRepository, StoreError,
};

/// In-process store used when no database is configured, and in tests.
///
/// Wrapped in `Arc` so it can be cheaply cloned and shared across tasks.
/// Nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<State>>,
}

#[derive(Debug, Default)]
struct State {
    settings: Option<Settings>,
    readings: Vec<SensorReading>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsRepository for MemoryStore {
    async fn current(&self) -> Result<Option<Settings>, StoreError> {
        Ok(self.inner.read().await.settings.clone())
    }

    async fn list(&self) -> Result<Vec<Settings>, StoreError> {
        Ok(self.inner.read().await.settings.iter().cloned().collect())
    }

    async fn replace(&self, update: NewSettings) -> Result<Settings, StoreError> {
        let mut state = self.inner.write().await;
        let id = state
            .settings
            .as_ref()
            .map_or_else(Uuid::new_v4, |existing| existing.id);

        let stored = Settings {
            id,
            user_temp: update.user_temp,
            user_light: update.user_light,
            light_duration: update.light_duration,
            light_time_off: update.light_time_off,
            updated_at: Utc::now(),
        };
        state.settings = Some(stored.clone());
        Ok(stored)
    }
}

impl ReadingRepository for MemoryStore {
    async fn insert(&self, reading: SensorReading) -> Result<SensorReading, StoreError> {
        self.inner.write().await.readings.push(reading.clone());
        Ok(reading)
    }

    async fn latest(&self) -> Result<Option<SensorReading>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .readings
            .iter()
            .max_by_key(|r| r.recorded_at)
            .cloned())
    }

    async fn newest_first(&self, limit: usize) -> Result<Vec<SensorReading>, StoreError> {
        let mut rows = self.inner.read().await.readings.clone();
        rows.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        rows.truncate(limit);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveTime};

    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn new_settings(user_temp: f64) -> NewSettings {
        NewSettings {
            user_temp,
            user_light: t(6, 0),
            light_duration: "12h".to_owned(),
            light_time_off: t(18, 0),
        }
    }

    fn reading_at(offset_secs: i64, temperature: f64) -> SensorReading {
        SensorReading {
            id: Uuid::new_v4(),
            temperature,
            presence: true,
            recorded_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[tokio::test]
    async fn empty_store_returns_nothing() {
        let store = MemoryStore::new();
        assert!(store.current().await.unwrap().is_none());
        assert!(store.latest().await.unwrap().is_none());
        assert!(store.newest_first(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_overwrites_and_keeps_id() {
        let store = MemoryStore::new();
        let first = store.replace(new_settings(25.0)).await.unwrap();
        let second = store.replace(new_settings(27.0)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.user_temp, 27.0);
        assert_eq!(store.current().await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn list_holds_at_most_the_current_record() {
        let store = MemoryStore::new();
        assert!(store.list().await.unwrap().is_empty());

        store.replace(new_settings(25.0)).await.unwrap();
        let current = store.replace(new_settings(26.0)).await.unwrap();

        assert_eq!(store.list().await.unwrap(), vec![current]);
    }

    #[tokio::test]
    async fn latest_is_by_timestamp_not_insertion_order() {
        let store = MemoryStore::new();
        store.insert(reading_at(10, 22.0)).await.unwrap();
        store.insert(reading_at(0, 20.0)).await.unwrap();

        assert_eq!(store.latest().await.unwrap().unwrap().temperature, 22.0);
    }

    #[tokio::test]
    async fn newest_first_orders_and_limits() {
        let store = MemoryStore::new();
        store.insert(reading_at(1, 21.0)).await.unwrap();
        store.insert(reading_at(2, 22.0)).await.unwrap();
        store.insert(reading_at(0, 20.0)).await.unwrap();

        let temps: Vec<f64> = store
            .newest_first(2)
            .await
            .unwrap()
            .iter()
            .map(|r| r.temperature)
            .collect();
        assert_eq!(temps, vec![22.0, 21.0]);
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let store = MemoryStore::new();
        let clone = store.clone();

        store.insert(reading_at(0, 19.5)).await.unwrap();

        assert_eq!(clone.latest().await.unwrap().unwrap().temperature, 19.5);
    }
}
