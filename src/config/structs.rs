use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 静态配置（从 TOML 加载，启动时读取一次）
///
/// 包含：
/// - database: 数据库连接、超时与重试
/// - link: 创建短链接时的策略边界
/// - reclaimer: 过期清理任务
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub reclaimer: ReclaimerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > 配置文件 > 默认值
    /// ENV 前缀：TL，分隔符：__
    /// 示例：TL__LINK__DEFAULT_TTL=600
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        use config::{Config, Environment, File};

        let path = path.unwrap_or("config.toml");

        let settings = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖
            .add_source(
                Environment::with_prefix("TL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: StaticConfig = settings.try_deserialize()?;
        if std::path::Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }
        Ok(config)
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    /// 单次存储操作的截止时间（秒）
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

impl DatabaseConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.max(1))
    }
}

/// 短链接策略配置
///
/// `default_ttl` 是允许的最长存活时间，`default_traffic_limit` 是访问次数下限。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    #[serde(default = "default_link_ttl", alias = "defaultTTL", alias = "defaultttl")]
    pub default_ttl: u64,
    #[serde(
        default = "default_traffic_limit",
        alias = "defaultTrafficLimit",
        alias = "defaulttrafficlimit"
    )]
    pub default_traffic_limit: u32,
    #[serde(default = "default_short_url_prefix")]
    pub short_url_prefix: String,
}

/// 过期清理任务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReclaimerConfig {
    #[serde(default = "default_reclaimer_enabled")]
    pub enabled: bool,
    #[serde(default = "default_reclaimer_interval")]
    pub interval_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_database_url() -> String {
    "ttlink.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_link_ttl() -> u64 {
    3600
}

fn default_traffic_limit() -> u32 {
    5
}

fn default_short_url_prefix() -> String {
    "clck.ru".to_string()
}

fn default_reclaimer_enabled() -> bool {
    true
}

fn default_reclaimer_interval() -> u64 {
    60
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            default_ttl: default_link_ttl(),
            default_traffic_limit: default_traffic_limit(),
            short_url_prefix: default_short_url_prefix(),
        }
    }
}

impl Default for ReclaimerConfig {
    fn default() -> Self {
        Self {
            enabled: default_reclaimer_enabled(),
            interval_secs: default_reclaimer_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_policy() {
        let config = StaticConfig::default();
        assert_eq!(config.link.default_ttl, 3600);
        assert_eq!(config.link.default_traffic_limit, 5);
        assert_eq!(config.link.short_url_prefix, "clck.ru");
        assert!(config.reclaimer.enabled);
    }

    #[test]
    fn test_link_config_accepts_legacy_keys() {
        let config: StaticConfig = toml::from_str(
            r#"
            [link]
            defaultTTL = 120
            defaultTrafficLimit = 9
            "#,
        )
        .unwrap();
        assert_eq!(config.link.default_ttl, 120);
        assert_eq!(config.link.default_traffic_limit, 9);
    }

    #[test]
    fn test_sample_config_round_trips() {
        let sample = StaticConfig::generate_sample_config();
        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.database.database_url, "ttlink.db");
        assert_eq!(parsed.reclaimer.interval_secs, 60);
    }

    #[test]
    fn test_operation_timeout_never_zero() {
        let config = DatabaseConfig {
            timeout: 0,
            ..Default::default()
        };
        assert_eq!(config.operation_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = StaticConfig::load(Some("definitely-missing-ttlink-config.toml")).unwrap();
        assert_eq!(config.link.default_ttl, 3600);
    }
}
