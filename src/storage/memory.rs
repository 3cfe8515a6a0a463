//! In-process storage backend
//!
//! Records live in a `DashMap` keyed by id with a secondary index from short
//! URL to id. The check-and-increment in `try_consume` runs while holding the
//! record's shard lock, which makes it the single synchronization point for
//! the traffic counter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;
use tracing::{debug, info};

use super::{ConsumeOutcome, LinkRecord, LinkStore};
use crate::errors::{Result, TtlinkError};

#[derive(Default)]
pub struct MemoryStorage {
    records: DashMap<String, LinkRecord>,
    codes: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl LinkStore for MemoryStorage {
    async fn insert(&self, record: &LinkRecord) -> Result<()> {
        // 锁顺序：records -> codes，其他路径不会反向嵌套持有
        match self.records.entry(record.id.clone()) {
            Entry::Occupied(_) => Err(TtlinkError::duplicate_id(format!(
                "uuid already exists: {}",
                record.id
            ))),
            Entry::Vacant(slot) => {
                match self.codes.entry(record.code.clone()) {
                    Entry::Occupied(_) => {
                        return Err(TtlinkError::duplicate_id(format!(
                            "short URL already exists: {}",
                            record.code
                        )));
                    }
                    Entry::Vacant(code_slot) => {
                        code_slot.insert(record.id.clone());
                    }
                }
                slot.insert(record.clone());
                debug!("Memory storage inserted {}", record.code);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<LinkRecord>> {
        Ok(self.records.get(id).map(|r| r.value().clone()))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<LinkRecord>> {
        let Some(id) = self.codes.get(code).map(|e| e.value().clone()) else {
            return Ok(None);
        };
        self.find_by_id(&id).await
    }

    async fn try_consume(
        &self,
        code: &str,
        now: DateTime<Utc>,
        deadline: Instant,
    ) -> Result<ConsumeOutcome> {
        let Some(id) = self.codes.get(code).map(|e| e.value().clone()) else {
            return Ok(ConsumeOutcome::NotFound);
        };

        // get_mut 持有分片写锁，检查与自增不可分割
        let Some(mut record) = self.records.get_mut(&id) else {
            return Ok(ConsumeOutcome::NotFound);
        };

        if record.is_expired_at(now) {
            return Ok(ConsumeOutcome::Expired);
        }
        if record.used_count >= record.limit_count {
            return Ok(ConsumeOutcome::LimitReached);
        }
        // 截止时间在持锁后、自增前检查
        if Instant::now() >= deadline {
            return Err(TtlinkError::timeout(format!(
                "try_consume({}) passed its deadline",
                code
            )));
        }
        record.used_count += 1;
        Ok(ConsumeOutcome::Consumed(record.target_url.clone()))
    }

    async fn update_limit(&self, id: &str, new_limit: u32) -> Result<()> {
        match self.records.get_mut(id) {
            Some(mut record) => {
                record.limit_count = new_limit;
                Ok(())
            }
            None => Err(TtlinkError::not_found(format!("uuid not found: {}", id))),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let Some((_, record)) = self.records.remove(id) else {
            return Err(TtlinkError::not_found(format!("uuid not found: {}", id)));
        };
        self.codes.remove_if(&record.code, |_, owner| owner == id);
        Ok(())
    }

    async fn reclaim_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut removed = Vec::new();
        self.records.retain(|_, record| {
            if record.expire_at <= now {
                removed.push((record.code.clone(), record.id.clone()));
                false
            } else {
                true
            }
        });

        for (code, id) in &removed {
            self.codes.remove_if(code, |_, owner| owner == id);
        }

        if !removed.is_empty() {
            info!("Memory storage reclaimed {} expired links", removed.len());
        }
        Ok(removed.len() as u64)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
