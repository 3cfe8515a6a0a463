//! 目标 URL 验证
//!
//! 只接受带主机名的 http:// 和 https:// 地址

use url::Url;

/// URL 验证错误
#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    UnsupportedScheme(String),
    MissingHost,
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::UnsupportedScheme(scheme) => write!(
                f,
                "Unsupported scheme '{}': only http:// and https:// are allowed",
                scheme
            ),
            Self::MissingHost => write!(f, "URL has no host"),
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

/// 验证目标 URL
pub fn validate_url(url: &str) -> Result<(), UrlValidationError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let parsed = Url::parse(url).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::UnsupportedScheme(other.to_string())),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(())
}
