use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 短码取 UUID 的前 6 个十六进制字符
pub const SHORT_CODE_LEN: usize = 6;

/// 一条短链接记录
///
/// `id` 同时是所有者凭证：持有它即可修改或删除该链接。
/// 序列化字段名与持久化字段名一致。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    #[serde(rename = "uuid")]
    pub id: String,
    #[serde(rename = "shortURL")]
    pub code: String,
    #[serde(rename = "longURL")]
    pub target_url: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "expireAt")]
    pub expire_at: DateTime<Utc>,
    #[serde(rename = "trafficUsed")]
    pub used_count: u32,
    #[serde(rename = "trafficLimit")]
    pub limit_count: u32,
}

/// 记录在某一时刻的可解析状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Active,
    LimitExhausted,
    Expired,
}

impl LinkRecord {
    /// 过期优先于次数耗尽
    pub fn state_at(&self, now: DateTime<Utc>) -> LinkState {
        if self.is_expired_at(now) {
            LinkState::Expired
        } else if self.used_count >= self.limit_count {
            LinkState::LimitExhausted
        } else {
            LinkState::Active
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expire_at
    }

    pub fn remaining(&self) -> u32 {
        self.limit_count.saturating_sub(self.used_count)
    }
}

/// Derive the public short URL `<prefix>/<first 6 hex chars of id>`.
pub fn short_url_for(prefix: &str, id: &str) -> String {
    let code: String = id
        .chars()
        .filter(|c| c.is_ascii_hexdigit())
        .take(SHORT_CODE_LEN)
        .collect::<String>()
        .to_ascii_lowercase();
    format!("{}/{}", prefix.trim_end_matches('/'), code)
}

/// 检查短链接文本是否符合 `<prefix>/<6 位十六进制>` 格式
pub fn is_valid_short_url(prefix: &str, short_url: &str) -> bool {
    let Some(code) = short_url
        .strip_prefix(prefix.trim_end_matches('/'))
        .and_then(|rest| rest.strip_prefix('/'))
    else {
        return false;
    };
    code.len() == SHORT_CODE_LEN && code.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(used: u32, limit: u32) -> LinkRecord {
        let now = Utc::now();
        LinkRecord {
            id: "3f2a9c1e-0000-4000-8000-000000000000".to_string(),
            code: "clck.ru/3f2a9c".to_string(),
            target_url: "https://example.com".to_string(),
            created_at: now,
            expire_at: now + Duration::seconds(60),
            used_count: used,
            limit_count: limit,
        }
    }

    #[test]
    fn test_short_url_uses_first_six_hex_chars() {
        assert_eq!(
            short_url_for("clck.ru", "3f2a9c1e-0000-4000-8000-000000000000"),
            "clck.ru/3f2a9c"
        );
        assert_eq!(
            short_url_for("clck.ru/", "ABCDEF12-0000-4000-8000-000000000000"),
            "clck.ru/abcdef"
        );
    }

    #[test]
    fn test_is_valid_short_url() {
        assert!(is_valid_short_url("clck.ru", "clck.ru/3f2a9c"));
        assert!(!is_valid_short_url("clck.ru", "3f2a9c"));
        assert!(!is_valid_short_url("clck.ru", "clck.ru/3f2a9"));
        assert!(!is_valid_short_url("clck.ru", "clck.ru/zzzzzz"));
        assert!(!is_valid_short_url("clck.ru", "other.io/3f2a9c"));
    }

    #[test]
    fn test_state_at() {
        let active = record(0, 2);
        assert_eq!(active.state_at(active.created_at), LinkState::Active);

        let exhausted = record(2, 2);
        assert_eq!(
            exhausted.state_at(exhausted.created_at),
            LinkState::LimitExhausted
        );

        // 过期优先
        let after = exhausted.expire_at + Duration::seconds(1);
        assert_eq!(exhausted.state_at(after), LinkState::Expired);
        // 恰好等于 expireAt 时仍有效
        assert_eq!(active.state_at(active.expire_at), LinkState::Active);
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(record(1, 5)).unwrap();
        for key in [
            "uuid",
            "shortURL",
            "longURL",
            "createdAt",
            "expireAt",
            "trafficUsed",
            "trafficLimit",
        ] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_remaining_saturates() {
        assert_eq!(record(3, 5).remaining(), 2);
        assert_eq!(record(3, 2).remaining(), 0);
    }
}
