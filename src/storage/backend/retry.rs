//! 数据库操作重试
//!
//! 通用读写重试连接错误、连接获取失败、死锁和 SQLite BUSY。
//! 访问计数自增不是幂等的，使用更严格的 [`is_retryable_consume_error`]，
//! 并且退避等待不能越过调用方的截止时间。

use sea_orm::DbErr;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::errors::TtlinkError;

/// 判断数据库错误是否可重试
pub fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => {
            is_retryable_runtime_error(runtime_err)
        }
        _ => false,
    }
}

/// 访问计数自增可重试的错误
///
/// 只接受语句确定没有执行的情况：连接池获取失败、锁冲突。
/// 连接中断时服务端可能已经执行了语句，不能重试。
pub fn is_retryable_consume_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) => true,
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => {
            is_retryable_runtime_error(runtime_err)
        }
        _ => false,
    }
}

/// 判断运行时错误是否可重试（死锁、锁超时等）
fn is_retryable_runtime_error(err: &sea_orm::error::RuntimeErr) -> bool {
    use sea_orm::error::RuntimeErr;

    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            use std::ops::Deref;
            if let Some(db_err) = sqlx_err.deref().as_database_error()
                && let Some(code) = db_err.code()
            {
                return matches!(
                    code.as_ref(),
                    // MySQL 死锁和锁超时
                    "1213" | "1205" |
                    // PostgreSQL 序列化失败和死锁
                    "40001" | "40P01" |
                    // SQLite BUSY 和 LOCKED
                    "5" | "6"
                );
            }
            is_retryable_error_message(&sqlx_err.to_string().to_lowercase())
        }
        RuntimeErr::Internal(msg) => is_retryable_error_message(&msg.to_lowercase()),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

/// 通过错误消息判断是否可重试（回退方案）
fn is_retryable_error_message(err_str: &str) -> bool {
    err_str.contains("deadlock")
        || err_str.contains("lock wait timeout")
        || err_str.contains("database is locked")
        || err_str.contains("serialization failure")
}

/// 将重试后仍失败的数据库错误转换为存储错误
pub fn to_storage_error(operation: &str, err: DbErr) -> TtlinkError {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => {
            TtlinkError::database_connection(format!("{} 失败: {}", operation, err))
        }
        other => TtlinkError::database_operation(format!("{} 失败: {}", operation, other)),
    }
}

/// 重试配置
#[derive(Clone, Copy, Debug)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// 指数退避重试执行器
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(
                        "Storage operation '{}' succeeded after {} retries",
                        operation_name, attempt
                    );
                }
                return Ok(result);
            }
            Err(e) if is_retryable_error(&e) && attempt < config.max_retries => {
                attempt += 1;
                let delay = calculate_backoff(attempt, config.base_delay_ms, config.max_delay_ms);
                warn!(
                    "Storage operation '{}' failed (attempt {}/{}): {}; retrying in {} ms",
                    operation_name,
                    attempt,
                    config.max_retries + 1,
                    e,
                    delay
                );
                sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// 第 `attempt` 次重试前的等待时间；等待后已超过 `deadline` 时返回 None
pub fn backoff_before(deadline: Instant, attempt: u32, config: RetryConfig) -> Option<Duration> {
    if attempt > config.max_retries {
        return None;
    }
    let delay = Duration::from_millis(calculate_backoff(
        attempt,
        config.base_delay_ms,
        config.max_delay_ms,
    ));
    (Instant::now() + delay < deadline).then_some(delay)
}

/// 计算指数退避延迟（带 0-25% 抖动）
fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    let exp_delay = base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = exp_delay.min(max_ms);
    let jitter = rand::random_range(0..=capped / 4);
    capped.saturating_add(jitter)
}
