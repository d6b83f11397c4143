pub use sea_orm_migration::prelude::*;

mod m20240305_000001_authors_news;
mod m20240305_000002_tags;
mod m20240311_000003_comments;

pub struct Migrator;
pub(crate) use m20240305_000001_authors_news::News;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240305_000001_authors_news::Migration),
            Box::new(m20240305_000002_tags::Migration),
            Box::new(m20240311_000003_comments::Migration),
        ]
    }
}
