use crate::storage::LinkRecord;
use migration::entities::link_record;

fn count_from_db(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// 将 Sea-ORM Model 转换为 LinkRecord
pub fn model_to_record(model: link_record::Model) -> LinkRecord {
    LinkRecord {
        id: model.uuid,
        code: model.short_url,
        target_url: model.long_url,
        created_at: model.created_at,
        expire_at: model.expire_at,
        used_count: count_from_db(model.traffic_used),
        limit_count: count_from_db(model.traffic_limit),
    }
}

/// 将 LinkRecord 转换为 ActiveModel（用于插入）
pub fn record_to_active_model(record: &LinkRecord) -> link_record::ActiveModel {
    use sea_orm::ActiveValue::Set;

    link_record::ActiveModel {
        uuid: Set(record.id.clone()),
        long_url: Set(record.target_url.clone()),
        short_url: Set(record.code.clone()),
        created_at: Set(record.created_at),
        expire_at: Set(record.expire_at),
        traffic_used: Set(i64::from(record.used_count)),
        traffic_limit: Set(i64::from(record.limit_count)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::ActiveValue;

    fn create_test_model() -> link_record::Model {
        let now = Utc::now();
        link_record::Model {
            uuid: "0a1b2c3d-0000-4000-8000-000000000000".to_string(),
            long_url: "https://example.com".to_string(),
            short_url: "clck.ru/0a1b2c".to_string(),
            created_at: now,
            expire_at: now + Duration::hours(1),
            traffic_used: 2,
            traffic_limit: 5,
        }
    }

    #[test]
    fn test_model_to_record_basic() {
        let model = create_test_model();
        let record = model_to_record(model.clone());

        assert_eq!(record.id, model.uuid);
        assert_eq!(record.code, model.short_url);
        assert_eq!(record.target_url, model.long_url);
        assert_eq!(record.used_count, 2);
        assert_eq!(record.limit_count, 5);
    }

    #[test]
    fn test_model_to_record_negative_counts() {
        let model = link_record::Model {
            traffic_used: -3,
            ..create_test_model()
        };
        // 负数应该被转换为 0
        assert_eq!(model_to_record(model).used_count, 0);
    }

    #[test]
    fn test_model_to_record_oversized_counts() {
        let model = link_record::Model {
            traffic_limit: i64::MAX,
            ..create_test_model()
        };
        assert_eq!(model_to_record(model).limit_count, u32::MAX);
    }

    #[test]
    fn test_record_to_active_model_sets_all_fields() {
        let record = model_to_record(create_test_model());
        let active = record_to_active_model(&record);

        assert!(matches!(active.uuid, ActiveValue::Set(_)));
        assert!(matches!(active.created_at, ActiveValue::Set(_)));
        if let ActiveValue::Set(used) = active.traffic_used {
            assert_eq!(used, 2);
        }
        if let ActiveValue::Set(code) = active.short_url {
            assert_eq!(code, "clck.ru/0a1b2c");
        }
    }
}
