use entity::TAG_NAME_MAX_LEN;
use sea_orm_migration::prelude::*;

use crate::News;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tag::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tag::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Tag::Name)
                            .string_len(TAG_NAME_MAX_LEN)
                            .unique_key()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NewsTag::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NewsTag::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(NewsTag::NewsId).big_integer().not_null())
                    .col(ColumnDef::new(NewsTag::TagId).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-news_tag-news_id")
                            .from(NewsTag::Table, NewsTag::NewsId)
                            .to(News::Table, News::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-news_tag-tag_id")
                            .from(NewsTag::Table, NewsTag::TagId)
                            .to(Tag::Table, Tag::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-news_tag-pair")
                    .table(NewsTag::Table)
                    .col(NewsTag::NewsId)
                    .col(NewsTag::TagId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-news_tag-tag_id")
                    .table(NewsTag::Table)
                    .col(NewsTag::TagId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NewsTag::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tag::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Tag {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum NewsTag {
    Table,
    Id,
    NewsId,
    TagId,
}
