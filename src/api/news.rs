use std::collections::BTreeSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_macros::debug_handler;
use chrono::Utc;
use entity::{author, news, news_tag, tag};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, SqlErr,
    TransactionError, TransactionTrait,
};
use tracing::{debug, info, warn};
use validator::Validate;

use crate::axumext::extractors::ValidatedQueryParams;
use crate::models::{Comment, News, NewsRequest, NewsTagsRequest, Tag};
use crate::query::{
    compose::{compose_comments, compose_news, compose_tags},
    CommentFilter, NewsFilter, PageRequest, PageResult, SelectSource, SortKey, TagFilter,
};

use super::{
    db::{delete_or_not_found, find_or_not_found, write_error},
    params::{NewsSearchParams, SortParams},
    ApiContext, ApiErrors,
};

/// Search news
///
/// Lists news articles matching all given filters, one page at a time.
#[debug_handler]
#[utoipa::path(
    get,
    path = "/news",
    operation_id = "listNews",
    params(PageRequest, NewsSearchParams),
    responses(
        (status = OK, description = "Page of news articles", body = PageResult<News>),
        (status = BAD_REQUEST, description = "Invalid filter or page"),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error"),
    ),
    tag = super::TAG_NEWS,
)]
pub(crate) async fn api_list_news(
    State(ctx): State<ApiContext>,
    ValidatedQueryParams(page): ValidatedQueryParams<PageRequest>,
    ValidatedQueryParams(params): ValidatedQueryParams<NewsSearchParams>,
) -> Result<Json<PageResult<News>>, ApiErrors> {
    let filter = NewsFilter::try_from(params)?;
    let source = SelectSource::new(compose_news(&filter), &ctx.db);
    let page = page.fetch(&source).await?;
    Ok(Json(page.map(News::from)))
}

#[debug_handler]
#[utoipa::path(
    post,
    path = "/news",
    operation_id = "createNews",
    request_body = NewsRequest,
    responses(
        (status = CREATED, description = "News article created", body = News),
        (status = BAD_REQUEST, description = "Invalid or duplicate title"),
        (status = NOT_FOUND, description = "Author not found"),
    ),
    tag = super::TAG_NEWS,
)]
pub(crate) async fn api_create_news(
    State(ctx): State<ApiContext>,
    Json(payload): Json<NewsRequest>,
) -> Result<(StatusCode, Json<News>), ApiErrors> {
    payload.validate().map_err(ApiErrors::from)?;
    find_or_not_found::<author::Entity>(&ctx.db, payload.author_id, "Author").await?;

    let now = Utc::now();
    let model = news::ActiveModel {
        title: Set(payload.title),
        content: Set(payload.content),
        author_id: Set(payload.author_id),
        created: Set(now),
        modified: Set(now),
        ..Default::default()
    }
    .insert(&ctx.db)
    .await
    .map_err(|err| write_error(err, "Duplicate news title", "Author not found"))?;

    info!("Created news {} {:?}", model.id, model.title);
    Ok((StatusCode::CREATED, Json(model.into())))
}

#[debug_handler]
#[utoipa::path(
    get,
    path = "/news/{id}",
    operation_id = "getNewsById",
    params(("id" = i64, Path, description = "News id")),
    responses(
        (status = OK, description = "News article", body = News),
        (status = NOT_FOUND, description = "News not found"),
    ),
    tag = super::TAG_NEWS,
)]
pub(crate) async fn api_read_news(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<News>, ApiErrors> {
    let model = find_or_not_found::<news::Entity>(&ctx.db, id, "News").await?;
    Ok(Json(model.into()))
}

#[debug_handler]
#[utoipa::path(
    put,
    path = "/news/{id}",
    operation_id = "updateNews",
    params(("id" = i64, Path, description = "News id")),
    request_body = NewsRequest,
    responses(
        (status = NO_CONTENT, description = "News article updated"),
        (status = BAD_REQUEST, description = "Invalid or duplicate title"),
        (status = NOT_FOUND, description = "News or author not found"),
    ),
    tag = super::TAG_NEWS,
)]
pub(crate) async fn api_update_news(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    Json(payload): Json<NewsRequest>,
) -> Result<StatusCode, ApiErrors> {
    payload.validate().map_err(ApiErrors::from)?;
    let existing = find_or_not_found::<news::Entity>(&ctx.db, id, "News").await?;
    if existing.author_id != payload.author_id {
        find_or_not_found::<author::Entity>(&ctx.db, payload.author_id, "Author").await?;
    }

    let mut model: news::ActiveModel = existing.into();
    model.title = Set(payload.title);
    model.content = Set(payload.content);
    model.author_id = Set(payload.author_id);
    model.modified = Set(Utc::now());
    model
        .update(&ctx.db)
        .await
        .map_err(|err| write_error(err, "Duplicate news title", "Author not found"))?;

    debug!("News {} updated", id);
    Ok(StatusCode::NO_CONTENT)
}

#[debug_handler]
#[utoipa::path(
    delete,
    path = "/news/{id}",
    operation_id = "deleteNews",
    params(("id" = i64, Path, description = "News id")),
    responses(
        (status = NO_CONTENT, description = "News article, its comments and tag links deleted"),
        (status = NOT_FOUND, description = "News not found"),
    ),
    tag = super::TAG_NEWS,
)]
pub(crate) async fn api_delete_news(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiErrors> {
    delete_or_not_found::<news::Entity>(&ctx.db, id, "News").await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Comments of a news article
#[debug_handler]
#[utoipa::path(
    get,
    path = "/news/{id}/comments",
    operation_id = "listNewsComments",
    params(("id" = i64, Path, description = "News id"), PageRequest, SortParams),
    responses(
        (status = OK, description = "Page of comments", body = PageResult<Comment>),
        (status = NOT_FOUND, description = "News not found"),
    ),
    tag = super::TAG_NEWS,
)]
pub(crate) async fn api_list_news_comments(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    ValidatedQueryParams(page): ValidatedQueryParams<PageRequest>,
    ValidatedQueryParams(params): ValidatedQueryParams<SortParams>,
) -> Result<Json<PageResult<Comment>>, ApiErrors> {
    find_or_not_found::<news::Entity>(&ctx.db, id, "News").await?;

    let filter = CommentFilter {
        news_id: Some(id),
        content_part: None,
        sort: SortKey::from_param(params.sort.as_deref()),
    };
    let source = SelectSource::new(compose_comments(&filter), &ctx.db);
    let page = page.fetch(&source).await?;
    Ok(Json(page.map(Comment::from)))
}

/// Tags of a news article
#[debug_handler]
#[utoipa::path(
    get,
    path = "/news/{id}/tags",
    operation_id = "listNewsTags",
    params(("id" = i64, Path, description = "News id"), PageRequest),
    responses(
        (status = OK, description = "Page of tags", body = PageResult<Tag>),
        (status = NOT_FOUND, description = "News not found"),
    ),
    tag = super::TAG_NEWS,
)]
pub(crate) async fn api_list_news_tags(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    ValidatedQueryParams(page): ValidatedQueryParams<PageRequest>,
) -> Result<Json<PageResult<Tag>>, ApiErrors> {
    find_or_not_found::<news::Entity>(&ctx.db, id, "News").await?;

    let filter = TagFilter::builder().news_id(id).build();
    let source = SelectSource::new(compose_tags(&filter), &ctx.db);
    let page = page.fetch(&source).await?;
    Ok(Json(page.map(Tag::from)))
}

/// Replace tags
///
/// Replaces the complete tag set of a news article.
#[debug_handler]
#[utoipa::path(
    put,
    path = "/news/{id}/tags",
    operation_id = "setNewsTags",
    params(("id" = i64, Path, description = "News id")),
    request_body = NewsTagsRequest,
    responses(
        (status = NO_CONTENT, description = "Tags replaced"),
        (status = NOT_FOUND, description = "News or tag not found"),
    ),
    tag = super::TAG_NEWS,
)]
pub(crate) async fn api_set_news_tags(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    Json(payload): Json<NewsTagsRequest>,
) -> Result<StatusCode, ApiErrors> {
    payload.validate().map_err(ApiErrors::from)?;
    find_or_not_found::<news::Entity>(&ctx.db, id, "News").await?;

    let tag_ids: BTreeSet<i64> = payload.tag_ids.into_iter().collect();

    ctx.db
        .transaction::<_, (), ApiErrors>(|txn| {
            Box::pin(async move {
                let known = tag::Entity::find()
                    .filter(tag::Column::Id.is_in(tag_ids.iter().copied()))
                    .count(txn)
                    .await?;
                if known != tag_ids.len() as u64 {
                    warn!("News {}: some of the tags {:?} do not exist", id, tag_ids);
                    return Err(ApiErrors::NotFound(format!(
                        "Some of the tags {tag_ids:?} not found"
                    )));
                }

                news_tag::Entity::delete_many()
                    .filter(news_tag::Column::NewsId.eq(id))
                    .exec(txn)
                    .await?;
                if !tag_ids.is_empty() {
                    news_tag::Entity::insert_many(tag_ids.iter().map(|tag_id| {
                        news_tag::ActiveModel {
                            news_id: Set(id),
                            tag_id: Set(*tag_id),
                            ..Default::default()
                        }
                    }))
                    .exec(txn)
                    .await
                    .map_err(|err| match err.sql_err() {
                        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                            ApiErrors::NotFound(format!("Some of the tags {tag_ids:?} not found"))
                        }
                        _ => err.into(),
                    })?;
                }
                debug!("News {} tagged with {:?}", id, tag_ids);
                Ok(())
            })
        })
        .await
        .map_err(|err| match err {
            TransactionError::Connection(c) => Into::<ApiErrors>::into(c),
            TransactionError::Transaction(t) => t,
        })?;

    Ok(StatusCode::NO_CONTENT)
}
