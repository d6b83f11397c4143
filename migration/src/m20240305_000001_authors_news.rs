use entity::{AUTHOR_NAME_MAX_LEN, NEWS_TITLE_MAX_LEN};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Author::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Author::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Author::Name)
                            .string_len(AUTHOR_NAME_MAX_LEN)
                            .unique_key()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(News::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(News::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(News::Title)
                            .string_len(NEWS_TITLE_MAX_LEN)
                            .unique_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(News::Content).text().not_null())
                    .col(ColumnDef::new(News::AuthorId).big_integer().not_null())
                    .col(
                        ColumnDef::new(News::Created)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(News::Modified)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-news-author_id")
                            .from(News::Table, News::AuthorId)
                            .to(Author::Table, Author::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Listings sort by one of these and then by id.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-news-created")
                    .table(News::Table)
                    .col(News::Created)
                    .col(News::Id)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-news-modified")
                    .table(News::Table)
                    .col(News::Modified)
                    .col(News::Id)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-news-author_id")
                    .table(News::Table)
                    .col(News::AuthorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(News::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Author::Table).to_owned())
            .await?;
        Ok(())
    }
}

/// Learn more at https://docs.rs/sea-query#iden
#[derive(DeriveIden)]
enum Author {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
pub enum News {
    Table,
    Id,
    Title,
    Content,
    AuthorId,
    Created,
    Modified,
}
