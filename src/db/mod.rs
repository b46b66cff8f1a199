pub mod memory;
pub mod models;
pub mod postgres;

use std::future::Future;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use self::models::{NewSettings, SensorReading, Settings};

pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// ---------------------------------------------------------------------------
// Repository traits
// ---------------------------------------------------------------------------

/// Access to the one settings record.
///
/// There is never more than one record. `replace` creates it on first use
/// and overwrites it afterwards; concurrent replacements are last-writer-wins.
pub trait SettingsRepository {
    fn current(&self) -> impl Future<Output = Result<Option<Settings>, StoreError>> + Send;

    /// Every stored record, for listing endpoints. Holds 0 or 1 entries.
    fn list(&self) -> impl Future<Output = Result<Vec<Settings>, StoreError>> + Send;

    /// Store `update` as the settings record and return it. The record `id`
    /// is kept if one already exists.
    fn replace(
        &self,
        update: NewSettings,
    ) -> impl Future<Output = Result<Settings, StoreError>> + Send;
}

/// Append-only log of sensor readings.
pub trait ReadingRepository {
    fn insert(
        &self,
        reading: SensorReading,
    ) -> impl Future<Output = Result<SensorReading, StoreError>> + Send;

    /// The reading with the greatest `recorded_at`.
    fn latest(&self) -> impl Future<Output = Result<Option<SensorReading>, StoreError>> + Send;

    /// Up to `limit` readings ordered by `recorded_at` descending.
    fn newest_first(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<SensorReading>, StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// The backing store picked at startup.
#[derive(Debug, Clone)]
pub enum Store {
    Postgres(PgStore),
    Memory(MemoryStore),
}

impl SettingsRepository for Store {
    async fn current(&self) -> Result<Option<Settings>, StoreError> {
        match self {
            Store::Postgres(s) => s.current().await,
            Store::Memory(s) => s.current().await,
        }
    }

    async fn list(&self) -> Result<Vec<Settings>, StoreError> {
        match self {
            Store::Postgres(s) => s.list().await,
            Store::Memory(s) => s.list().await,
        }
    }

    async fn replace(&self, update: NewSettings) -> Result<Settings, StoreError> {
        match self {
            Store::Postgres(s) => s.replace(update).await,
            Store::Memory(s) => s.replace(update).await,
        }
    }
}

impl ReadingRepository for Store {
    async fn insert(&self, reading: SensorReading) -> Result<SensorReading, StoreError> {
        match self {
            Store::Postgres(s) => s.insert(reading).await,
            Store::Memory(s) => s.insert(reading).await,
        }
    }

    async fn latest(&self) -> Result<Option<SensorReading>, StoreError> {
        match self {
            Store::Postgres(s) => s.latest().await,
            Store::Memory(s) => s.latest().await,
        }
    }

    async fn newest_first(&self, limit: usize) -> Result<Vec<SensorReading>, StoreError> {
        match self {
            Store::Postgres(s) => s.newest_first(limit).await,
            Store::Memory(s) => s.newest_first(limit).await,
        }
    }
}
