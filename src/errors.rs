use std::fmt;

#[derive(Debug, Clone)]
pub enum TtlinkError {
    InvalidInput(String),
    NotFound(String),
    Expired(String),
    LimitReached(String),
    DuplicateId(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Timeout(String),
    FileOperation(String),
    Serialization(String),
}

impl TtlinkError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            TtlinkError::InvalidInput(_) => "E001",
            TtlinkError::NotFound(_) => "E002",
            TtlinkError::Expired(_) => "E003",
            TtlinkError::LimitReached(_) => "E004",
            TtlinkError::DuplicateId(_) => "E005",
            TtlinkError::DatabaseConfig(_) => "E006",
            TtlinkError::DatabaseConnection(_) => "E007",
            TtlinkError::DatabaseOperation(_) => "E008",
            TtlinkError::Timeout(_) => "E009",
            TtlinkError::FileOperation(_) => "E010",
            TtlinkError::Serialization(_) => "E011",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            TtlinkError::InvalidInput(_) => "Invalid Input",
            TtlinkError::NotFound(_) => "Link Not Found",
            TtlinkError::Expired(_) => "Link Expired",
            TtlinkError::LimitReached(_) => "Traffic Limit Reached",
            TtlinkError::DuplicateId(_) => "Duplicate Identifier",
            TtlinkError::DatabaseConfig(_) => "Database Configuration Error",
            TtlinkError::DatabaseConnection(_) => "Database Connection Error",
            TtlinkError::DatabaseOperation(_) => "Database Operation Error",
            TtlinkError::Timeout(_) => "Operation Timed Out",
            TtlinkError::FileOperation(_) => "File Operation Error",
            TtlinkError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            TtlinkError::InvalidInput(msg)
            | TtlinkError::NotFound(msg)
            | TtlinkError::Expired(msg)
            | TtlinkError::LimitReached(msg)
            | TtlinkError::DuplicateId(msg)
            | TtlinkError::DatabaseConfig(msg)
            | TtlinkError::DatabaseConnection(msg)
            | TtlinkError::DatabaseOperation(msg)
            | TtlinkError::Timeout(msg)
            | TtlinkError::FileOperation(msg)
            | TtlinkError::Serialization(msg) => msg,
        }
    }

    /// 存储后端不可用或操作失败
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            TtlinkError::DatabaseConfig(_)
                | TtlinkError::DatabaseConnection(_)
                | TtlinkError::DatabaseOperation(_)
                | TtlinkError::Timeout(_)
        )
    }

    /// 格式化为彩色输出（用于 CLI 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for TtlinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for TtlinkError {}

// 便捷的构造函数
impl TtlinkError {
    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        TtlinkError::InvalidInput(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        TtlinkError::NotFound(msg.into())
    }

    pub fn expired<T: Into<String>>(msg: T) -> Self {
        TtlinkError::Expired(msg.into())
    }

    pub fn limit_reached<T: Into<String>>(msg: T) -> Self {
        TtlinkError::LimitReached(msg.into())
    }

    pub fn duplicate_id<T: Into<String>>(msg: T) -> Self {
        TtlinkError::DuplicateId(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        TtlinkError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        TtlinkError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        TtlinkError::DatabaseOperation(msg.into())
    }

    pub fn timeout<T: Into<String>>(msg: T) -> Self {
        TtlinkError::Timeout(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        TtlinkError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        TtlinkError::Serialization(msg.into())
    }
}

impl From<sea_orm::DbErr> for TtlinkError {
    fn from(err: sea_orm::DbErr) -> Self {
        TtlinkError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for TtlinkError {
    fn from(err: std::io::Error) -> Self {
        TtlinkError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for TtlinkError {
    fn from(err: serde_json::Error) -> Self {
        TtlinkError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TtlinkError>;
