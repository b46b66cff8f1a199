use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::db::{models::SensorReading, ReadingRepository, StoreError};

/// Readings returned by [`ReadingService::history`], newest first.
pub const HISTORY_LIMIT: usize = 1000;

pub struct ReadingService<R> {
    repo: R,
}

impl<R> ReadingService<R>
where
    R: ReadingRepository + Sync,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persist a reading stamped with the server's receive time.
    pub async fn record(&self, temperature: f64, presence: bool) -> Result<SensorReading, StoreError> {
        let reading = self
            .repo
            .insert(SensorReading {
                id: Uuid::new_v4(),
                temperature,
                presence,
                recorded_at: Utc::now(),
            })
            .await?;

        info!(
            id = %reading.id,
            temperature = reading.temperature,
            presence = reading.presence,
            "Sensor reading recorded"
        );
        Ok(reading)
    }

    /// The most recent readings, newest first, capped at [`HISTORY_LIMIT`].
    pub async fn history(&self) -> Result<Vec<SensorReading>, StoreError> {
        self.repo.newest_first(HISTORY_LIMIT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[tokio::test]
    async fn record_stamps_server_time() {
        let svc = ReadingService::new(MemoryStore::new());

        let before = Utc::now();
        let reading = svc.record(24.5, true).await.unwrap();
        let after = Utc::now();

        assert!(reading.recorded_at >= before && reading.recorded_at <= after);
        assert_eq!(reading.temperature, 24.5);
        assert!(reading.presence);
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let svc = ReadingService::new(MemoryStore::new());
        svc.record(20.0, false).await.unwrap();
        svc.record(21.0, true).await.unwrap();
        svc.record(22.0, true).await.unwrap();

        let history = svc.history().await.unwrap();
        assert_eq!(history.len(), 3);
        assert!(history
            .windows(2)
            .all(|pair| pair[0].recorded_at >= pair[1].recorded_at));
    }

    #[tokio::test]
    async fn history_is_capped() {
        let store = MemoryStore::new();
        let svc = ReadingService::new(store);
        for i in 0..(HISTORY_LIMIT + 5) {
            svc.record(i as f64, true).await.unwrap();
        }

        assert_eq!(svc.history().await.unwrap().len(), HISTORY_LIMIT);
    }
}
