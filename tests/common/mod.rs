#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use entity::{author, comment, news, news_tag, tag};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

/// Fresh in-memory database with all migrations applied.
///
/// A single pooled connection keeps every query on the same in-memory database.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    newsdesk::migrate(&db).await.unwrap();
    db
}

/// Timestamp `minutes` after a fixed point in time.
pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub async fn insert_author(db: &DatabaseConnection, name: &str) -> author::Model {
    author::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_tag(db: &DatabaseConnection, name: &str) -> tag::Model {
    tag::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_news(
    db: &DatabaseConnection,
    author_id: i64,
    title: &str,
    created: DateTime<Utc>,
) -> news::Model {
    news::ActiveModel {
        title: Set(title.to_string()),
        content: Set(format!("Content of {title}")),
        author_id: Set(author_id),
        created: Set(created),
        modified: Set(created),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn link_tag(db: &DatabaseConnection, news_id: i64, tag_id: i64) {
    news_tag::ActiveModel {
        news_id: Set(news_id),
        tag_id: Set(tag_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
}

pub async fn insert_comment(
    db: &DatabaseConnection,
    news_id: i64,
    content: &str,
    created: DateTime<Utc>,
) -> comment::Model {
    comment::ActiveModel {
        news_id: Set(news_id),
        content: Set(content.to_string()),
        created: Set(created),
        modified: Set(created),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}
