//! Mutation operations for SeaOrmStorage
//!
//! This module contains all write database operations. The traffic counter
//! is only ever changed by the conditional `UPDATE` in [`SeaOrmStorage::consume`].

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Query, UpdateStatement};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ExprTrait, QueryFilter, SqlErr,
    TransactionTrait,
};
use tokio::time::{Instant, sleep, timeout_at};
use tracing::{debug, info, warn};

use super::SeaOrmStorage;
use super::converters::record_to_active_model;
use super::retry;
use crate::errors::{Result, TtlinkError};
use crate::storage::{ConsumeOutcome, LinkRecord};

use migration::entities::link_record;

/// 条件更新落空后重新判定的次数上限
const MAX_CONSUME_ATTEMPTS: usize = 3;

enum Classified {
    Eligible(LinkRecord),
    Rejected(ConsumeOutcome),
}

/// 单次事务的失败原因
enum ConsumeFailure {
    /// 截止时间已到，事务未提交
    Deadline,
    /// 提交前失败，事务未提交
    Statement(DbErr),
    /// 提交阶段失败，结果未知，不能重试
    Commit(DbErr),
}

fn deadline_passed(code: &str) -> TtlinkError {
    TtlinkError::timeout(format!("try_consume({}) passed its deadline", code))
}

impl SeaOrmStorage {
    pub(super) async fn insert_record(&self, record: &LinkRecord) -> Result<()> {
        let db = &self.db;

        let result = retry::with_retry(
            &format!("insert({})", record.code),
            self.retry_config,
            || async {
                link_record::Entity::insert(record_to_active_model(record))
                    .exec_without_returning(db)
                    .await
            },
        )
        .await;

        match result {
            Ok(_) => {
                info!("Link inserted: {} -> {}", record.code, record.target_url);
                Ok(())
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(TtlinkError::duplicate_id(format!(
                    "uuid {} 或短链接 {} 已存在",
                    record.id, record.code
                )))
            }
            Err(e) => Err(retry::to_storage_error("插入短链接", e)),
        }
    }

    /// 原子消费一次访问额度
    ///
    /// 读取只用于区分失败原因；是否自增完全由带条件的 UPDATE 决定：
    /// `expireAt >= now AND trafficUsed < trafficLimit`。
    /// UPDATE 在事务中执行，只有截止时间之前才提交，返回 `Timeout` 时计数未变。
    pub(super) async fn consume(
        &self,
        code: &str,
        now: DateTime<Utc>,
        deadline: Instant,
    ) -> Result<ConsumeOutcome> {
        for attempt in 0..MAX_CONSUME_ATTEMPTS {
            let record = match self.classify(code, now, deadline).await? {
                Classified::Eligible(record) => record,
                Classified::Rejected(outcome) => return Ok(outcome),
            };

            if self.consume_once(&record, now, deadline).await? {
                return Ok(ConsumeOutcome::Consumed(record.target_url));
            }

            // 读与写之间状态被并发修改，重新读取判定原因
            debug!(
                "Conditional consume of {} matched no row (attempt {}), re-reading",
                code,
                attempt + 1
            );
        }

        // 多次竞争失败后按最新状态返回；仍可用说明上限刚被并发修改
        match self.classify(code, now, deadline).await? {
            Classified::Rejected(outcome) => Ok(outcome),
            Classified::Eligible(_) => Ok(ConsumeOutcome::LimitReached),
        }
    }

    async fn classify(
        &self,
        code: &str,
        now: DateTime<Utc>,
        deadline: Instant,
    ) -> Result<Classified> {
        let record = timeout_at(deadline, self.get_by_code(code))
            .await
            .map_err(|_| deadline_passed(code))??;

        Ok(match record {
            None => Classified::Rejected(ConsumeOutcome::NotFound),
            Some(r) if r.is_expired_at(now) => Classified::Rejected(ConsumeOutcome::Expired),
            Some(r) if r.used_count >= r.limit_count => {
                Classified::Rejected(ConsumeOutcome::LimitReached)
            }
            Some(r) => Classified::Eligible(r),
        })
    }

    /// 执行一次条件自增，返回是否命中
    ///
    /// 只在锁冲突、连接获取失败时重试，并且退避不会越过截止时间。
    async fn consume_once(
        &self,
        record: &LinkRecord,
        now: DateTime<Utc>,
        deadline: Instant,
    ) -> Result<bool> {
        let stmt = Query::update()
            .table(link_record::Entity)
            .value(
                link_record::Column::TrafficUsed,
                Expr::col(link_record::Column::TrafficUsed).add(Expr::val(1i64)),
            )
            .and_where(Expr::col(link_record::Column::Uuid).eq(record.id.as_str()))
            .and_where(Expr::col(link_record::Column::ExpireAt).gte(now))
            .and_where(
                Expr::col(link_record::Column::TrafficUsed)
                    .lt(Expr::col(link_record::Column::TrafficLimit)),
            )
            .to_owned();

        let mut retries = 0;
        loop {
            match self.consume_in_transaction(&stmt, deadline).await {
                Ok(applied) => return Ok(applied),
                Err(ConsumeFailure::Deadline) => return Err(deadline_passed(&record.code)),
                Err(ConsumeFailure::Commit(e)) => {
                    return Err(retry::to_storage_error("提交访问计数", e));
                }
                Err(ConsumeFailure::Statement(e)) if retry::is_retryable_consume_error(&e) => {
                    retries += 1;
                    let Some(delay) = retry::backoff_before(deadline, retries, self.retry_config)
                    else {
                        // 重试次数用完是存储错误；还有次数但来不及等待是超时
                        return Err(if retries > self.retry_config.max_retries {
                            retry::to_storage_error("更新访问计数", e)
                        } else {
                            deadline_passed(&record.code)
                        });
                    };
                    warn!(
                        "Consume of {} hit contention (retry {}): {}; retrying in {} ms",
                        record.code,
                        retries,
                        e,
                        delay.as_millis()
                    );
                    sleep(delay).await;
                }
                Err(ConsumeFailure::Statement(e)) => {
                    return Err(retry::to_storage_error("更新访问计数", e));
                }
            }
        }
    }

    async fn consume_in_transaction(
        &self,
        stmt: &UpdateStatement,
        deadline: Instant,
    ) -> std::result::Result<bool, ConsumeFailure> {
        // 超时丢弃 future 时事务未提交，drop 时回滚
        let (txn, rows) = timeout_at(deadline, async {
            let txn = self.db.begin().await?;
            let rows = txn.execute(stmt).await?.rows_affected();
            Ok::<_, DbErr>((txn, rows))
        })
        .await
        .map_err(|_| ConsumeFailure::Deadline)?
        .map_err(ConsumeFailure::Statement)?;

        if rows != 1 {
            txn.rollback().await.map_err(ConsumeFailure::Statement)?;
            return Ok(false);
        }

        if Instant::now() >= deadline {
            txn.rollback().await.map_err(ConsumeFailure::Statement)?;
            return Err(ConsumeFailure::Deadline);
        }

        // 提交是唯一生效点，不再受截止时间打断
        txn.commit().await.map_err(ConsumeFailure::Commit)?;
        Ok(true)
    }

    pub(super) async fn set_limit(&self, id: &str, new_limit: u32) -> Result<()> {
        let db = &self.db;
        let id_owned = id.to_string();

        let result = retry::with_retry(&format!("update_limit({})", id), self.retry_config, || async {
            link_record::Entity::update_many()
                .col_expr(
                    link_record::Column::TrafficLimit,
                    Expr::value(i64::from(new_limit)),
                )
                .filter(link_record::Column::Uuid.eq(id_owned.as_str()))
                .exec(db)
                .await
        })
        .await
        .map_err(|e| retry::to_storage_error("更新访问上限", e))?;

        // MySQL 在值未变化时报告 0 行，需要再确认记录是否存在
        if result.rows_affected == 0 && self.get_by_id(id).await?.is_none() {
            return Err(TtlinkError::not_found(format!("uuid 不存在: {}", id)));
        }

        info!("Traffic limit of {} set to {}", id, new_limit);
        Ok(())
    }

    pub(super) async fn remove(&self, id: &str) -> Result<()> {
        let db = &self.db;
        let id_owned = id.to_string();

        let result = retry::with_retry(&format!("delete({})", id), self.retry_config, || async {
            link_record::Entity::delete_by_id(id_owned.clone())
                .exec(db)
                .await
        })
        .await
        .map_err(|e| retry::to_storage_error("删除短链接", e))?;

        if result.rows_affected == 0 {
            return Err(TtlinkError::not_found(format!("uuid 不存在: {}", id)));
        }

        info!("Link deleted: {}", id);
        Ok(())
    }

    pub(super) async fn remove_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let db = &self.db;

        let result = retry::with_retry("reclaim_expired", self.retry_config, || async {
            link_record::Entity::delete_many()
                .filter(link_record::Column::ExpireAt.lte(now))
                .exec(db)
                .await
        })
        .await
        .map_err(|e| retry::to_storage_error("清理过期短链接", e))?;

        if result.rows_affected > 0 {
            info!(
                "{} storage reclaimed {} expired links",
                self.backend_name.to_uppercase(),
                result.rows_affected
            );
        }
        Ok(result.rows_affected)
    }
}
