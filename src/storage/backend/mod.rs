//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod connection;
mod converters;
mod mutations;
mod query;
pub mod retry;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use tokio::time::Instant;
use tracing::warn;

use super::{ConsumeOutcome, LinkRecord, LinkStore};
use crate::config::DatabaseConfig;
use crate::errors::{Result, TtlinkError};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{model_to_record, record_to_active_model};

/// 从数据库 URL 推断存储类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("memory://") {
        Ok("memory".to_string())
    } else if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(TtlinkError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://, memory://",
            database_url
        )))
    }
}

/// SQLite 连接串补全：裸文件名转为 sqlite:// URL
fn normalize_sqlite_url(database_url: &str) -> String {
    if database_url == ":memory:" {
        "sqlite::memory:".to_string()
    } else if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite://{}", database_url)
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    /// 重试配置
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    pub async fn new(config: &DatabaseConfig, backend_name: &str) -> Result<Self> {
        if config.database_url.is_empty() {
            return Err(TtlinkError::database_config(
                "database_url 未设置".to_string(),
            ));
        }

        let retry_config = retry::RetryConfig {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        };

        // 根据不同数据库类型配置连接选项
        let db = if backend_name == "sqlite" {
            connect_sqlite(&normalize_sqlite_url(&config.database_url)).await?
        } else {
            connect_generic(&config.database_url, backend_name, config.pool_size).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            retry_config,
        };

        // 运行迁移
        run_migrations(&storage.db).await?;

        warn!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl LinkStore for SeaOrmStorage {
    async fn insert(&self, record: &LinkRecord) -> Result<()> {
        self.insert_record(record).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<LinkRecord>> {
        self.get_by_id(id).await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<LinkRecord>> {
        self.get_by_code(code).await
    }

    async fn try_consume(
        &self,
        code: &str,
        now: DateTime<Utc>,
        deadline: Instant,
    ) -> Result<ConsumeOutcome> {
        self.consume(code, now, deadline).await
    }

    async fn update_limit(&self, id: &str, new_limit: u32) -> Result<()> {
        self.set_limit(id, new_limit).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.remove(id).await
    }

    async fn reclaim_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        self.remove_expired(now).await
    }

    fn backend_name(&self) -> &str {
        &self.backend_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(infer_backend_from_url("ttlink.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url(":memory:").unwrap(), "sqlite");
        assert_eq!(
            infer_backend_from_url("sqlite://data/links.sqlite?mode=rwc").unwrap(),
            "sqlite"
        );
        assert_eq!(
            infer_backend_from_url("mariadb://u:p@localhost/db").unwrap(),
            "mysql"
        );
        assert_eq!(
            infer_backend_from_url("postgresql://localhost/db").unwrap(),
            "postgres"
        );
        assert_eq!(infer_backend_from_url("memory://").unwrap(), "memory");
        assert!(matches!(
            infer_backend_from_url("mongodb://localhost:27017"),
            Err(TtlinkError::DatabaseConfig(_))
        ));
    }

    #[test]
    fn test_normalize_sqlite_url() {
        assert_eq!(normalize_sqlite_url("ttlink.db"), "sqlite://ttlink.db");
        assert_eq!(normalize_sqlite_url(":memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite://x.db?mode=rwc"),
            "sqlite://x.db?mode=rwc"
        );
    }
}
