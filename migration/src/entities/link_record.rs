use sea_orm::entity::prelude::*;

/// 字段名与历史数据保持一致（uuid / longURL / shortURL ...）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "urls")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "uuid")]
    pub uuid: String,
    #[sea_orm(column_name = "longURL", column_type = "Text")]
    pub long_url: String,
    #[sea_orm(column_name = "shortURL", unique)]
    pub short_url: String,
    #[sea_orm(column_name = "createdAt")]
    pub created_at: DateTimeUtc,
    #[sea_orm(column_name = "expireAt")]
    pub expire_at: DateTimeUtc,
    #[sea_orm(column_name = "trafficUsed")]
    pub traffic_used: i64,
    #[sea_orm(column_name = "trafficLimit")]
    pub traffic_limit: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
