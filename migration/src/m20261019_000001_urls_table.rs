use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 urls 表
        manager
            .create_table(
                Table::create()
                    .table(Urls::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Urls::Uuid)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Urls::LongUrl).text().not_null())
                    .col(ColumnDef::new(Urls::ShortUrl).string().not_null())
                    .col(
                        ColumnDef::new(Urls::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Urls::ExpireAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Urls::TrafficUsed)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Urls::TrafficLimit)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 短链接唯一，解析时按 shortURL 查找
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_urls_short_url")
                    .table(Urls::Table)
                    .col(Urls::ShortUrl)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 过期清理按 expireAt 范围删除
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_urls_expire_at")
                    .table(Urls::Table)
                    .col(Urls::ExpireAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_urls_expire_at").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_urls_short_url").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Urls::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Urls {
    Table,
    #[sea_orm(iden = "uuid")]
    Uuid,
    #[sea_orm(iden = "longURL")]
    LongUrl,
    #[sea_orm(iden = "shortURL")]
    ShortUrl,
    #[sea_orm(iden = "createdAt")]
    CreatedAt,
    #[sea_orm(iden = "expireAt")]
    ExpireAt,
    #[sea_orm(iden = "trafficUsed")]
    TrafficUsed,
    #[sea_orm(iden = "trafficLimit")]
    TrafficLimit,
}
