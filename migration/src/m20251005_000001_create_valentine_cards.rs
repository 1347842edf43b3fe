use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

/// 情人节卡片（可分享的个性化页面）
#[derive(DeriveIden)]
enum ValentineCards {
    Table,
    Id,
    Slug,
    Name,
    RecipientName,
    SenderName,
    Message,
    Theme,
    BackgroundColor,
    MusicUrl,
    Status,
    DisabledAt,
    CreatedAt,
    UpdatedAt,
}

/// 卡片回忆（图片 / 视频 / 文字），归属于卡片
#[derive(DeriveIden)]
enum ValentineCardMemories {
    Table,
    Id,
    CardId,
    MemoryType,
    MediaUrl,
    Caption,
    ThumbnailUrl,
    OrderIndex,
    CreatedAt,
}

/// 卡片 <-> 商品 关联表
#[derive(DeriveIden)]
enum ValentineCardProducts {
    Table,
    CardId,
    ProductId,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("card_status"))
                    .values(vec![Alias::new("active"), Alias::new("draft")])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("memory_type"))
                    .values(vec![
                        Alias::new("image"),
                        Alias::new("video"),
                        Alias::new("text"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ValentineCards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ValentineCards::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ValentineCards::Slug).string_len(32).not_null())
                    .col(ColumnDef::new(ValentineCards::Name).string_len(255).null())
                    .col(
                        ColumnDef::new(ValentineCards::RecipientName)
                            .string_len(255)
                            .null(),
                    )
                    .col(ColumnDef::new(ValentineCards::SenderName).string_len(255).null())
                    .col(ColumnDef::new(ValentineCards::Message).text().null())
                    .col(ColumnDef::new(ValentineCards::Theme).string_len(64).null())
                    .col(
                        ColumnDef::new(ValentineCards::BackgroundColor)
                            .string_len(32)
                            .null(),
                    )
                    .col(ColumnDef::new(ValentineCards::MusicUrl).string_len(1024).null())
                    .col(
                        ColumnDef::new(ValentineCards::Status)
                            .custom(Alias::new("card_status"))
                            .not_null()
                            .default("draft"),
                    )
                    // NULL 或未来时间 = 当前可见
                    .col(
                        ColumnDef::new(ValentineCards::DisabledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ValentineCards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(ValentineCards::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // slug 全局唯一：复制卡片时并发生成同一 slug 依靠该约束兜底
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_valentine_cards_slug_unique")
                    .table(ValentineCards::Table)
                    .col(ValentineCards::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ValentineCardMemories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ValentineCardMemories::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ValentineCardMemories::CardId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ValentineCardMemories::MemoryType)
                            .custom(Alias::new("memory_type"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ValentineCardMemories::MediaUrl)
                            .string_len(1024)
                            .null(),
                    )
                    .col(ColumnDef::new(ValentineCardMemories::Caption).text().null())
                    .col(
                        ColumnDef::new(ValentineCardMemories::ThumbnailUrl)
                            .string_len(1024)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ValentineCardMemories::OrderIndex)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ValentineCardMemories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_valentine_card_memories_card")
                            .from(ValentineCardMemories::Table, ValentineCardMemories::CardId)
                            .to(ValentineCards::Table, ValentineCards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_valentine_card_memories_card")
                    .table(ValentineCardMemories::Table)
                    .col(ValentineCardMemories::CardId)
                    .col(ValentineCardMemories::OrderIndex)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ValentineCardProducts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ValentineCardProducts::CardId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ValentineCardProducts::ProductId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ValentineCardProducts::CardId)
                            .col(ValentineCardProducts::ProductId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_valentine_card_products_card")
                            .from(ValentineCardProducts::Table, ValentineCardProducts::CardId)
                            .to(ValentineCards::Table, ValentineCards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_valentine_card_products_product")
                            .from(
                                ValentineCardProducts::Table,
                                ValentineCardProducts::ProductId,
                            )
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序：关联 -> 回忆 -> 卡片 -> 类型
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(ValentineCardProducts::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(ValentineCardMemories::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(ValentineCards::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_type(
                Type::drop()
                    .if_exists()
                    .name(Alias::new("memory_type"))
                    .to_owned(),
            )
            .await?;
        manager
            .drop_type(
                Type::drop()
                    .if_exists()
                    .name(Alias::new("card_status"))
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
