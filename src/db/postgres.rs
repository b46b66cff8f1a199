use sqlx::PgPool;
use uuid::Uuid;

use super::{
    models::{NewSettings, SensorReading, Settings},
    ReadingRepository, SettingsRepository, StoreError,
};

/// PostgreSQL-backed store. See `migrations/` for the schema.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SettingsRepository for PgStore {
    async fn current(&self) -> Result<Option<Settings>, StoreError> {
        let row = sqlx::query_as::<_, Settings>(
            r#"
            SELECT id, user_temp, user_light, light_duration, light_time_off, updated_at
            FROM settings
            WHERE singleton
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list(&self) -> Result<Vec<Settings>, StoreError> {
        let rows = sqlx::query_as::<_, Settings>(
            r#"
            SELECT id, user_temp, user_light, light_duration, light_time_off, updated_at
            FROM settings
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn replace(&self, update: NewSettings) -> Result<Settings, StoreError> {
        // `id` is left out of the conflict update so the first one sticks.
        let row = sqlx::query_as::<_, Settings>(
            r#"
            INSERT INTO settings
                (singleton, id, user_temp, user_light, light_duration, light_time_off, updated_at)
            VALUES (TRUE, $1, $2, $3, $4, $5, now())
            ON CONFLICT (singleton) DO UPDATE SET
                user_temp      = EXCLUDED.user_temp,
                user_light     = EXCLUDED.user_light,
                light_duration = EXCLUDED.light_duration,
                light_time_off = EXCLUDED.light_time_off,
                updated_at     = EXCLUDED.updated_at
            RETURNING id, user_temp, user_light, light_duration, light_time_off, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(update.user_temp)
        .bind(update.user_light)
        .bind(update.light_duration)
        .bind(update.light_time_off)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}

impl ReadingRepository for PgStore {
    async fn insert(&self, reading: SensorReading) -> Result<SensorReading, StoreError> {
        let row = sqlx::query_as::<_, SensorReading>(
            r#"
            INSERT INTO sensor_readings (id, temperature, presence, recorded_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, temperature, presence, recorded_at
            "#,
        )
        .bind(reading.id)
        .bind(reading.temperature)
        .bind(reading.presence)
        .bind(reading.recorded_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn latest(&self) -> Result<Option<SensorReading>, StoreError> {
        let row = sqlx::query_as::<_, SensorReading>(
            r#"
            SELECT id, temperature, presence, recorded_at
            FROM sensor_readings
            ORDER BY recorded_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn newest_first(&self, limit: usize) -> Result<Vec<SensorReading>, StoreError> {
        let rows = sqlx::query_as::<_, SensorReading>(
            r#"
            SELECT id, temperature, presence, recorded_at
            FROM sensor_readings
            ORDER BY recorded_at DESC
            LIMIT $1
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// Tests
//
// These need a PostgreSQL server: set DATABASE_URL and run
// `cargo test -- --ignored`.
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveTime, Utc};
    use sqlx::PgPool;

    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn new_settings(user_temp: f64, on: NaiveTime, off: NaiveTime) -> NewSettings {
        NewSettings {
            user_temp,
            user_light: on,
            light_duration: "1h".to_owned(),
            light_time_off: off,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn settings_start_empty(pool: PgPool) {
        let store = PgStore::new(pool);
        assert!(store.current().await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn replace_keeps_a_single_row_and_its_id(pool: PgPool) {
        let store = PgStore::new(pool.clone());

        let first = store.replace(new_settings(25.0, t(6, 0), t(7, 0))).await.unwrap();
        let second = store.replace(new_settings(28.5, t(18, 0), t(19, 0))).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.user_temp, 28.5);
        assert_eq!(second.light_time_off, t(19, 0));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM settings")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(store.list().await.unwrap(), vec![second.clone()]);
        assert_eq!(store.current().await.unwrap(), Some(second));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn readings_come_back_newest_first(pool: PgPool) {
        let store = PgStore::new(pool);
        let base = Utc::now();
        for (offset, temperature) in [(0, 20.0), (2, 22.0), (1, 21.0)] {
            store
                .insert(SensorReading {
                    id: Uuid::new_v4(),
                    temperature,
                    presence: true,
                    recorded_at: base + Duration::seconds(offset),
                })
                .await
                .unwrap();
        }

        let rows = store.newest_first(10).await.unwrap();
        let temps: Vec<f64> = rows.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![22.0, 21.0, 20.0]);

        let latest = store.latest().await.unwrap().unwrap();
        assert_eq!(latest.temperature, 22.0);

        assert_eq!(store.newest_first(2).await.unwrap().len(), 2);
    }
}
