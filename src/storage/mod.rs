use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod memory;
pub mod models;

pub use backend::SeaOrmStorage;
pub use memory::MemoryStorage;
pub use models::{LinkRecord, LinkState};

/// Result of the atomic check-and-increment performed on resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// The counter was incremented by one; carries the target URL.
    Consumed(String),
    NotFound,
    Expired,
    LimitReached,
}

/// Persistence contract for link records.
///
/// Every backend error surfaces as a persistence error; application
/// conditions (missing record, expiry, exhausted limit, duplicate id) are
/// reported as typed values or typed errors.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Store a new record. Fails with `DuplicateId` when the id or the short
    /// URL is already taken.
    async fn insert(&self, record: &LinkRecord) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<LinkRecord>>;

    async fn find_by_code(&self, code: &str) -> Result<Option<LinkRecord>>;

    /// Locate by short URL and, in one indivisible step, reject if
    /// `now > expire_at`, reject if `used_count >= limit_count`, otherwise
    /// increment `used_count` by exactly one.
    ///
    /// Fails with `Timeout` once `deadline` has passed. A `Timeout` result
    /// guarantees the increment was not applied.
    async fn try_consume(
        &self,
        code: &str,
        now: DateTime<Utc>,
        deadline: Instant,
    ) -> Result<ConsumeOutcome>;

    /// Fails with `NotFound` when no record has this id.
    async fn update_limit(&self, id: &str, new_limit: u32) -> Result<()>;

    /// Fails with `NotFound` when no record has this id.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Remove every record with `expire_at <= now`; returns how many.
    async fn reclaim_expired(&self, now: DateTime<Utc>) -> Result<u64>;

    fn backend_name(&self) -> &str;
}

pub struct StorageFactory;

impl StorageFactory {
    /// Build the store named by `database.database_url` in the global config.
    pub async fn create() -> Result<Arc<dyn LinkStore>> {
        let config = crate::config::get_config();
        Self::from_config(&config.database).await
    }

    pub async fn from_config(config: &DatabaseConfig) -> Result<Arc<dyn LinkStore>> {
        // 从 URL 自动推断存储类型
        let backend_type = backend::infer_backend_from_url(&config.database_url)?;

        if backend_type == "memory" {
            info!("Using in-process memory storage");
            return Ok(Arc::new(MemoryStorage::new()));
        }

        let storage = SeaOrmStorage::new(config, &backend_type).await?;
        Ok(Arc::new(storage))
    }
}
