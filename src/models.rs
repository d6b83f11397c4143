use chrono::{DateTime, Utc};

use crate::api::API_BASE;

/// Hypermedia link to a related operation
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct Link {
    #[serde(rename = "href")]
    #[schema(examples("/api/v1/news/12"))]
    pub href: String,

    #[serde(rename = "rel")]
    #[schema(examples("self", "update-news", "delete-news"))]
    pub rel: String,

    #[serde(rename = "method")]
    #[schema(examples("GET", "PUT", "DELETE"))]
    pub method: String,
}

impl Link {
    pub fn new(href: &str, rel: &str, method: &str) -> Link {
        Link {
            href: href.to_string(),
            rel: rel.to_string(),
            method: method.to_string(),
        }
    }

    /// Links to read, update and delete the record at `href`.
    pub fn crud(href: &str, kind: &str) -> Vec<Link> {
        vec![
            Link::new(href, "self", "GET"),
            Link::new(href, &format!("update-{kind}"), "PUT"),
            Link::new(href, &format!("delete-{kind}"), "DELETE"),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct Author {
    #[serde(rename = "id")]
    pub id: i64,

    #[serde(rename = "name")]
    #[schema(examples("Ada"))]
    pub name: String,

    #[serde(rename = "links")]
    pub links: Vec<Link>,
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    serde::Serialize,
    serde::Deserialize,
    utoipa::ToSchema,
    validator::Validate,
)]
pub struct AuthorRequest {
    /// Name of the author, unique across all authors
    #[serde(rename = "name")]
    #[validate(length(min = 3, max = 15))]
    #[schema(examples("Ada"), min_length = 3, max_length = 15)]
    pub name: String,
}

/// Author with the number of news articles they wrote
#[derive(
    Debug,
    Clone,
    PartialEq,
    serde::Serialize,
    serde::Deserialize,
    utoipa::ToSchema,
    sea_orm::FromQueryResult,
)]
pub struct AuthorNewsCount {
    #[serde(rename = "authorId")]
    pub author_id: i64,

    #[serde(rename = "authorName")]
    pub author_name: String,

    #[serde(rename = "newsCount")]
    pub news_count: i64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct Tag {
    #[serde(rename = "id")]
    pub id: i64,

    #[serde(rename = "name")]
    #[schema(examples("science"))]
    pub name: String,

    #[serde(rename = "links")]
    pub links: Vec<Link>,
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    serde::Serialize,
    serde::Deserialize,
    utoipa::ToSchema,
    validator::Validate,
)]
pub struct TagRequest {
    /// Name of the tag, unique across all tags
    #[serde(rename = "name")]
    #[validate(length(min = 3, max = 15))]
    #[schema(examples("science"), min_length = 3, max_length = 15)]
    pub name: String,
}

/// News article
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct News {
    #[serde(rename = "id")]
    pub id: i64,

    #[serde(rename = "title")]
    pub title: String,

    #[serde(rename = "content")]
    pub content: String,

    #[serde(rename = "authorId")]
    pub author_id: i64,

    #[serde(rename = "created")]
    pub created: DateTime<Utc>,

    #[serde(rename = "modified")]
    pub modified: DateTime<Utc>,

    #[serde(rename = "links")]
    pub links: Vec<Link>,
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    serde::Serialize,
    serde::Deserialize,
    utoipa::ToSchema,
    validator::Validate,
)]
pub struct NewsRequest {
    /// Headline, unique across all news
    #[serde(rename = "title")]
    #[validate(length(min = 5, max = 100))]
    #[schema(examples("Rust 2024 edition released"), min_length = 5, max_length = 100)]
    pub title: String,

    #[serde(rename = "content")]
    #[validate(length(min = 1))]
    #[schema(min_length = 1)]
    pub content: String,

    #[serde(rename = "authorId")]
    pub author_id: i64,
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    serde::Serialize,
    serde::Deserialize,
    utoipa::ToSchema,
    validator::Validate,
)]
pub struct NewsTagsRequest {
    /// Complete set of tags of the news article
    #[serde(rename = "tagIds")]
    #[validate(length(max = 50))]
    pub tag_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct Comment {
    #[serde(rename = "id")]
    pub id: i64,

    #[serde(rename = "newsId")]
    pub news_id: i64,

    #[serde(rename = "content")]
    pub content: String,

    #[serde(rename = "created")]
    pub created: DateTime<Utc>,

    #[serde(rename = "modified")]
    pub modified: DateTime<Utc>,

    #[serde(rename = "links")]
    pub links: Vec<Link>,
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    serde::Serialize,
    serde::Deserialize,
    utoipa::ToSchema,
    validator::Validate,
)]
pub struct CommentRequest {
    #[serde(rename = "newsId")]
    pub news_id: i64,

    #[serde(rename = "content")]
    #[validate(length(min = 3, max = 255))]
    #[schema(min_length = 3, max_length = 255)]
    pub content: String,
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    serde::Serialize,
    serde::Deserialize,
    utoipa::ToSchema,
    validator::Validate,
)]
pub struct CommentUpdateRequest {
    #[serde(rename = "content")]
    #[validate(length(min = 3, max = 255))]
    #[schema(min_length = 3, max_length = 255)]
    pub content: String,
}

impl From<entity::author::Model> for Author {
    fn from(model: entity::author::Model) -> Self {
        Self {
            links: Link::crud(&format!("{API_BASE}/authors/{}", model.id), "author"),
            id: model.id,
            name: model.name,
        }
    }
}

impl From<entity::tag::Model> for Tag {
    fn from(model: entity::tag::Model) -> Self {
        Self {
            links: Link::crud(&format!("{API_BASE}/tags/{}", model.id), "tag"),
            id: model.id,
            name: model.name,
        }
    }
}

impl From<entity::news::Model> for News {
    fn from(model: entity::news::Model) -> Self {
        let href = format!("{API_BASE}/news/{}", model.id);
        let mut links = Link::crud(&href, "news");
        links.push(Link::new(&format!("{href}/comments"), "comments", "GET"));
        links.push(Link::new(&format!("{href}/tags"), "tags", "GET"));
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            author_id: model.author_id,
            created: model.created,
            modified: model.modified,
            links,
        }
    }
}

impl From<entity::comment::Model> for Comment {
    fn from(model: entity::comment::Model) -> Self {
        Self {
            links: Link::crud(&format!("{API_BASE}/comments/{}", model.id), "comment"),
            id: model.id,
            news_id: model.news_id,
            content: model.content,
            created: model.created,
            modified: model.modified,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use validator::Validate;

    use super::*;

    #[test]
    fn crud_links() {
        let links = Link::crud("/api/v1/tags/3", "tag");

        assert_eq!(
            links,
            vec![
                Link::new("/api/v1/tags/3", "self", "GET"),
                Link::new("/api/v1/tags/3", "update-tag", "PUT"),
                Link::new("/api/v1/tags/3", "delete-tag", "DELETE"),
            ]
        );
    }

    #[test]
    fn news_dto_links_to_its_comments_and_tags() {
        // Arrange
        let now = Utc::now();
        let model = entity::news::Model {
            id: 12,
            title: "Hello world".to_string(),
            content: "Body".to_string(),
            author_id: 1,
            created: now,
            modified: now,
        };

        // Act
        let dto: News = model.into();

        // Assert
        assert_eq!(dto.links.len(), 5);
        assert_eq!(dto.links[0], Link::new("/api/v1/news/12", "self", "GET"));
        assert_eq!(
            dto.links[3],
            Link::new("/api/v1/news/12/comments", "comments", "GET")
        );
    }

    #[test]
    fn name_length_validation() {
        assert!(AuthorRequest {
            name: "Al".to_string()
        }
        .validate()
        .is_err());
        assert!(AuthorRequest {
            name: "Alan".to_string()
        }
        .validate()
        .is_ok());
        assert!(TagRequest {
            name: "a-very-long-tag-name".to_string()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn news_request_validation() {
        let valid = NewsRequest {
            title: "Hello world".to_string(),
            content: "Body".to_string(),
            author_id: 1,
        };
        assert!(valid.validate().is_ok());

        let short_title = NewsRequest {
            title: "Hi".to_string(),
            ..valid.clone()
        };
        assert!(short_title.validate().is_err());

        let empty_content = NewsRequest {
            content: String::new(),
            ..valid
        };
        assert!(empty_content.validate().is_err());
    }

    #[test]
    fn comment_request_deserializes_camel_case() {
        let r: CommentRequest =
            serde_json::from_str(r#"{"newsId": 4, "content": "Nice read"}"#).unwrap();

        assert_eq!(r.news_id, 4);
        assert!(r.validate().is_ok());
    }
}
