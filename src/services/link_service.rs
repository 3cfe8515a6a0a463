//! Link lifecycle service
//!
//! Business rules for short links: policy-bounded creation, counted
//! resolution, owner-gated limit changes and deletion. Every call goes to
//! the injected store; nothing is cached between calls.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::LinkConfig;
use crate::errors::{Result, TtlinkError};
use crate::storage::models::{is_valid_short_url, short_url_for};
use crate::storage::{ConsumeOutcome, LinkRecord, LinkStore};
use crate::utils::url_validator::validate_url;

/// 默认单次存储操作截止时间
const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

// ============ Request / Policy ============

/// Request to create a new link
#[derive(Debug, Clone)]
pub struct CreateLinkRequest {
    /// Target URL
    pub target_url: String,
    /// Requested time-to-live in seconds
    pub ttl_secs: u64,
    /// Requested maximum number of visits
    pub traffic_limit: u32,
}

/// Configuration-supplied bounds applied at creation time.
///
/// The TTL is capped at `max_ttl_secs`; the visit limit is floored at
/// `min_traffic_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkPolicy {
    pub max_ttl_secs: u64,
    pub min_traffic_limit: u32,
}

impl LinkPolicy {
    pub fn new(max_ttl_secs: u64, min_traffic_limit: u32) -> Result<Self> {
        if max_ttl_secs == 0 {
            return Err(TtlinkError::invalid_input(
                "policy max TTL must be greater than zero",
            ));
        }
        if min_traffic_limit == 0 {
            return Err(TtlinkError::invalid_input(
                "policy minimum traffic limit must be greater than zero",
            ));
        }
        Ok(Self {
            max_ttl_secs,
            min_traffic_limit,
        })
    }

    pub fn from_config(config: &LinkConfig) -> Result<Self> {
        Self::new(config.default_ttl, config.default_traffic_limit)
    }

    pub fn effective_ttl(&self, requested_ttl_secs: u64) -> u64 {
        requested_ttl_secs.min(self.max_ttl_secs)
    }

    pub fn effective_limit(&self, requested_limit: u32) -> u32 {
        requested_limit.max(self.min_traffic_limit)
    }
}

// ============ LinkService Implementation ============

/// Service for link lifecycle operations
pub struct LinkService {
    store: Arc<dyn LinkStore>,
    short_url_prefix: String,
    operation_timeout: Duration,
}

impl LinkService {
    /// Create a new LinkService over the given store
    pub fn new(store: Arc<dyn LinkStore>, short_url_prefix: impl Into<String>) -> Self {
        Self {
            store,
            short_url_prefix: short_url_prefix.into(),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Default deadline for each store call
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    pub fn short_url_prefix(&self) -> &str {
        &self.short_url_prefix
    }

    pub fn store(&self) -> &Arc<dyn LinkStore> {
        &self.store
    }

    /// 带截止时间执行存储操作
    ///
    /// 超时会丢弃 future，只用于读取和幂等写入；访问计数走 `resolve_before`
    async fn bounded<T, F>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.operation_timeout, fut)
            .await
            .map_err(|_| {
                TtlinkError::timeout(format!(
                    "{} exceeded {} ms",
                    operation,
                    self.operation_timeout.as_millis()
                ))
            })?
    }

    // ============ Lifecycle Operations ============

    /// Create a new short link
    ///
    /// Input is validated before the store is touched.
    pub async fn create_link(
        &self,
        req: CreateLinkRequest,
        policy: &LinkPolicy,
    ) -> Result<LinkRecord> {
        validate_url(&req.target_url)
            .map_err(|e| TtlinkError::invalid_input(e.to_string()))?;
        if req.ttl_secs == 0 {
            return Err(TtlinkError::invalid_input("TTL must be greater than zero"));
        }
        if req.traffic_limit == 0 {
            return Err(TtlinkError::invalid_input(
                "traffic limit must be greater than zero",
            ));
        }

        let ttl_secs = policy.effective_ttl(req.ttl_secs);
        let limit = policy.effective_limit(req.traffic_limit);

        let now = Utc::now();
        let expire_at = i64::try_from(ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| TtlinkError::invalid_input(format!("TTL out of range: {}", ttl_secs)))?;

        let id = Uuid::new_v4().to_string();
        let record = LinkRecord {
            code: short_url_for(&self.short_url_prefix, &id),
            id,
            target_url: req.target_url.trim().to_string(),
            created_at: now,
            expire_at,
            used_count: 0,
            limit_count: limit,
        };

        self.bounded("insert", self.store.insert(&record)).await?;

        info!(
            "LinkService: created '{}' -> '{}' (ttl {}s, limit {})",
            record.code, record.target_url, ttl_secs, limit
        );
        Ok(record)
    }

    /// Resolve a short URL at instant `now`, consuming one visit
    ///
    /// Bounded by the service's operation timeout; see [`Self::resolve_before`].
    pub async fn resolve(&self, short_url: &str, now: DateTime<Utc>) -> Result<String> {
        self.resolve_before(short_url, now, Instant::now() + self.operation_timeout)
            .await
    }

    /// Resolve a short URL with a caller-supplied deadline
    ///
    /// The deadline is handed to the store instead of cancelling the call from
    /// outside, so a `Timeout` result means no visit was counted.
    pub async fn resolve_before(
        &self,
        short_url: &str,
        now: DateTime<Utc>,
        deadline: Instant,
    ) -> Result<String> {
        let short_url = short_url.trim();
        if !is_valid_short_url(&self.short_url_prefix, short_url) {
            return Err(TtlinkError::invalid_input(format!(
                "short URL must look like {}/abc123, got '{}'",
                self.short_url_prefix, short_url
            )));
        }

        let outcome = self.store.try_consume(short_url, now, deadline).await?;

        match outcome {
            ConsumeOutcome::Consumed(target) => {
                info!("LinkService: resolved '{}' -> '{}'", short_url, target);
                Ok(target)
            }
            ConsumeOutcome::NotFound => {
                debug!("LinkService: '{}' is not registered", short_url);
                Err(TtlinkError::not_found(format!(
                    "short URL is not registered: {}",
                    short_url
                )))
            }
            ConsumeOutcome::Expired => {
                debug!("LinkService: '{}' has expired", short_url);
                Err(TtlinkError::expired(format!(
                    "short URL has expired: {}",
                    short_url
                )))
            }
            ConsumeOutcome::LimitReached => {
                debug!("LinkService: '{}' reached its traffic limit", short_url);
                Err(TtlinkError::limit_reached(format!(
                    "traffic limit reached for {}",
                    short_url
                )))
            }
        }
    }

    /// Read a record by owner token without touching its counter
    pub async fn get_info(&self, id: &str) -> Result<LinkRecord> {
        let id = id.trim();
        self.bounded("find_by_id", self.store.find_by_id(id))
            .await?
            .ok_or_else(|| TtlinkError::not_found(format!("no link with uuid {}", id)))
    }

    /// Change the visit limit; values below the current usage are accepted
    pub async fn update_limit(&self, id: &str, new_limit: u32) -> Result<()> {
        if new_limit == 0 {
            return Err(TtlinkError::invalid_input(
                "traffic limit must be greater than zero",
            ));
        }
        let id = id.trim();
        self.bounded("update_limit", self.store.update_limit(id, new_limit))
            .await?;

        info!("LinkService: limit of '{}' set to {}", id, new_limit);
        Ok(())
    }

    /// Delete a link by owner token
    pub async fn delete_link(&self, id: &str) -> Result<()> {
        let id = id.trim();
        self.bounded("delete", self.store.delete(id)).await?;

        info!("LinkService: deleted '{}'", id);
        Ok(())
    }

    /// Remove every link expired at `now`; returns how many were removed
    pub async fn reclaim_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        self.bounded("reclaim_expired", self.store.reclaim_expired(now))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_policy_bounds() {
        let policy = LinkPolicy::new(3600, 5).unwrap();
        assert_eq!(policy.effective_ttl(10), 10);
        assert_eq!(policy.effective_ttl(7200), 3600);
        assert_eq!(policy.effective_limit(1), 5);
        assert_eq!(policy.effective_limit(50), 50);
    }

    #[test]
    fn test_policy_rejects_zero_bounds() {
        assert!(matches!(
            LinkPolicy::new(0, 5),
            Err(TtlinkError::InvalidInput(_))
        ));
        assert!(matches!(
            LinkPolicy::new(60, 0),
            Err(TtlinkError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_rejects_malformed_short_url() {
        let service = LinkService::new(Arc::new(MemoryStorage::new()), "clck.ru");
        let err = service.resolve("abcdef", Utc::now()).await.unwrap_err();
        assert!(matches!(err, TtlinkError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_huge_ttl_without_insert() {
        let store = Arc::new(MemoryStorage::new());
        let service = LinkService::new(store.clone(), "clck.ru");
        let policy = LinkPolicy::new(u64::MAX, 1).unwrap();

        let err = service
            .create_link(
                CreateLinkRequest {
                    target_url: "https://example.com".to_string(),
                    ttl_secs: u64::MAX,
                    traffic_limit: 1,
                },
                &policy,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TtlinkError::InvalidInput(_)));
        assert!(store.is_empty());
    }
}
