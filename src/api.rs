mod authors;
mod comments;
pub(crate) mod db;
mod news;
mod params;
mod tags;

use std::sync::Arc;
use tokio::signal;

use std::{
    net::{IpAddr, SocketAddr},
    str::FromStr,
};

use anyhow::Context;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sea_orm::{DatabaseConnection, DbErr};
use serde_json::json;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};
use utoipa::OpenApi;

use crate::{
    config::AppConfig,
    monitoring::{health_routes, HealthMonitor},
    query::QueryError,
};

use self::{
    authors::{
        api_create_author, api_delete_author, api_list_authors, api_list_authors_news_count,
        api_read_author, api_update_author,
    },
    comments::{
        api_create_comment, api_delete_comment, api_list_comments, api_read_comment,
        api_update_comment,
    },
    news::{
        api_create_news, api_delete_news, api_list_news, api_list_news_comments,
        api_list_news_tags, api_read_news, api_set_news_tags, api_update_news,
    },
    tags::{api_create_tag, api_delete_tag, api_list_tags, api_read_tag, api_update_tag},
};

pub const API_BASE: &str = "/api/v1";

pub(crate) const TAG_NEWS: &str = "news";
pub(crate) const TAG_AUTHORS: &str = "authors";
pub(crate) const TAG_TAGS: &str = "tags";
pub(crate) const TAG_COMMENTS: &str = "comments";

#[derive(Clone)]
pub(crate) struct ApiContext {
    db: DatabaseConnection,
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum ApiErrors {
    #[error("Internal server error")]
    InternalServerError,
    #[error("Bad request: {0}")]
    BadRequestJson(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for ApiErrors {
    fn into_response(self) -> Response {
        match self {
            ApiErrors::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "An unexpected error occurred." })),
            )
                .into_response(),
            ApiErrors::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiErrors::BadRequestJson(jsonstring) => (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "application/json")],
                jsonstring,
            )
                .into_response(),
            ApiErrors::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Resource not found", "detail": msg })),
            )
                .into_response(),
        }
    }
}

impl From<DbErr> for ApiErrors {
    fn from(value: DbErr) -> Self {
        match value.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
                debug!("Unique constraint violation: {}", detail);
                return ApiErrors::BadRequest("Duplicate record".to_string());
            }
            Some(sea_orm::SqlErr::ForeignKeyConstraintViolation(detail)) => {
                debug!("Foreign key constraint violation: {}", detail);
                return ApiErrors::BadRequest("Record is referenced by other records".to_string());
            }
            _ => {}
        }
        match value {
            DbErr::RecordNotFound(t) => ApiErrors::NotFound(t),
            _ => {
                error!("Database error: {:?}", value);
                ApiErrors::InternalServerError
            }
        }
    }
}

impl From<QueryError> for ApiErrors {
    fn from(value: QueryError) -> Self {
        match value {
            QueryError::InvalidArgument(msg) => ApiErrors::BadRequest(msg),
            QueryError::Store(err) => err.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiErrors {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiErrors::BadRequestJson(
            serde_json::to_string(&err).unwrap_or("Validation error".to_owned()),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "newsdesk",
        description = "News articles, authors, tags and comments"
    ),
    servers((url = "/api/v1")),
    paths(
        news::api_list_news,
        news::api_create_news,
        news::api_read_news,
        news::api_update_news,
        news::api_delete_news,
        news::api_list_news_comments,
        news::api_list_news_tags,
        news::api_set_news_tags,
        authors::api_list_authors,
        authors::api_list_authors_news_count,
        authors::api_create_author,
        authors::api_read_author,
        authors::api_update_author,
        authors::api_delete_author,
        tags::api_list_tags,
        tags::api_create_tag,
        tags::api_read_tag,
        tags::api_update_tag,
        tags::api_delete_tag,
        comments::api_list_comments,
        comments::api_create_comment,
        comments::api_read_comment,
        comments::api_update_comment,
        comments::api_delete_comment,
    ),
    tags(
        (name = "news", description = "News articles"),
        (name = "authors", description = "Authors of news articles"),
        (name = "tags", description = "Tags attached to news articles"),
        (name = "comments", description = "Comments on news articles"),
    )
)]
pub struct ApiDoc;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

pub async fn serve(db: DatabaseConnection, config: &AppConfig) -> anyhow::Result<()> {
    let monitor = Arc::new(HealthMonitor::new(db.clone()));
    let app = api_routes(db)
        .nest("/app", health_routes(monitor))
        .layer(TraceLayer::new_for_http());

    tracing::debug!("Initializing service...");
    let addr = SocketAddr::new(IpAddr::from_str("::")?, config.port);

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Cannot start server")?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("error running server")?;

    debug!("Shutdown complete");
    Ok(())
}

/// All API routes plus the OpenAPI document, without health checks and tracing.
pub fn api_routes(db: DatabaseConnection) -> Router {
    Router::new()
        .nest(
            API_BASE,
            Router::new()
                .route("/news", get(api_list_news).post(api_create_news))
                .route(
                    "/news/:id",
                    get(api_read_news)
                        .put(api_update_news)
                        .delete(api_delete_news),
                )
                .route("/news/:id/comments", get(api_list_news_comments))
                .route(
                    "/news/:id/tags",
                    get(api_list_news_tags).put(api_set_news_tags),
                )
                .route("/authors", get(api_list_authors).post(api_create_author))
                .route("/authors/news-count", get(api_list_authors_news_count))
                .route(
                    "/authors/:id",
                    get(api_read_author)
                        .put(api_update_author)
                        .delete(api_delete_author),
                )
                .route("/tags", get(api_list_tags).post(api_create_tag))
                .route(
                    "/tags/:id",
                    get(api_read_tag).put(api_update_tag).delete(api_delete_tag),
                )
                .route("/comments", get(api_list_comments).post(api_create_comment))
                .route(
                    "/comments/:id",
                    get(api_read_comment)
                        .put(api_update_comment)
                        .delete(api_delete_comment),
                )
                .with_state(ApiContext { db }),
        )
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
}
