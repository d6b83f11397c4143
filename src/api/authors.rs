use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_macros::debug_handler;
use entity::{author, news};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use tracing::{debug, info, warn};
use validator::Validate;

use crate::axumext::extractors::ValidatedQueryParams;
use crate::models::{Author, AuthorNewsCount, AuthorRequest};
use crate::query::{
    compose::{compose_author_news_counts, compose_authors},
    AuthorFilter, PageRequest, PageResult, SelectSource,
};

use super::{
    db::{delete_or_not_found, find_or_not_found, write_error},
    params::NamePartParams,
    ApiContext, ApiErrors,
};

#[debug_handler]
#[utoipa::path(
    get,
    path = "/authors",
    operation_id = "listAuthors",
    params(PageRequest, NamePartParams),
    responses(
        (status = OK, description = "Page of authors", body = PageResult<Author>),
        (status = BAD_REQUEST, description = "Invalid filter or page"),
    ),
    tag = super::TAG_AUTHORS,
)]
pub(crate) async fn api_list_authors(
    State(ctx): State<ApiContext>,
    ValidatedQueryParams(page): ValidatedQueryParams<PageRequest>,
    ValidatedQueryParams(params): ValidatedQueryParams<NamePartParams>,
) -> Result<Json<PageResult<Author>>, ApiErrors> {
    let filter: AuthorFilter = params.into();
    let source = SelectSource::new(compose_authors(&filter), &ctx.db);
    let page = page.fetch(&source).await?;
    Ok(Json(page.map(Author::from)))
}

/// Authors by productivity
///
/// Lists all authors with the number of news articles they wrote, highest count
/// first. Authors with equal counts are ordered by id.
#[debug_handler]
#[utoipa::path(
    get,
    path = "/authors/news-count",
    operation_id = "listAuthorsNewsCount",
    params(PageRequest, NamePartParams),
    responses(
        (status = OK, description = "Page of authors with news count", body = PageResult<AuthorNewsCount>),
        (status = BAD_REQUEST, description = "Invalid filter or page"),
    ),
    tag = super::TAG_AUTHORS,
)]
pub(crate) async fn api_list_authors_news_count(
    State(ctx): State<ApiContext>,
    ValidatedQueryParams(page): ValidatedQueryParams<PageRequest>,
    ValidatedQueryParams(params): ValidatedQueryParams<NamePartParams>,
) -> Result<Json<PageResult<AuthorNewsCount>>, ApiErrors> {
    let filter: AuthorFilter = params.into();
    let source = SelectSource::new(compose_author_news_counts(&filter), &ctx.db)
        .into_model::<AuthorNewsCount>();
    Ok(Json(page.fetch(&source).await?))
}

#[debug_handler]
#[utoipa::path(
    post,
    path = "/authors",
    operation_id = "createAuthor",
    request_body = AuthorRequest,
    responses(
        (status = CREATED, description = "Author created", body = Author),
        (status = BAD_REQUEST, description = "Invalid or duplicate name"),
    ),
    tag = super::TAG_AUTHORS,
)]
pub(crate) async fn api_create_author(
    State(ctx): State<ApiContext>,
    Json(payload): Json<AuthorRequest>,
) -> Result<(StatusCode, Json<Author>), ApiErrors> {
    payload.validate().map_err(ApiErrors::from)?;

    let model = author::ActiveModel {
        name: Set(payload.name),
        ..Default::default()
    }
    .insert(&ctx.db)
    .await
    .map_err(|err| write_error(err, "Duplicate author name", "Invalid reference"))?;

    info!("Created author {} {:?}", model.id, model.name);
    Ok((StatusCode::CREATED, Json(model.into())))
}

#[debug_handler]
#[utoipa::path(
    get,
    path = "/authors/{id}",
    operation_id = "getAuthorById",
    params(("id" = i64, Path, description = "Author id")),
    responses(
        (status = OK, description = "Author", body = Author),
        (status = NOT_FOUND, description = "Author not found"),
    ),
    tag = super::TAG_AUTHORS,
)]
pub(crate) async fn api_read_author(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<Author>, ApiErrors> {
    let model = find_or_not_found::<author::Entity>(&ctx.db, id, "Author").await?;
    Ok(Json(model.into()))
}

#[debug_handler]
#[utoipa::path(
    put,
    path = "/authors/{id}",
    operation_id = "updateAuthor",
    params(("id" = i64, Path, description = "Author id")),
    request_body = AuthorRequest,
    responses(
        (status = NO_CONTENT, description = "Author renamed"),
        (status = BAD_REQUEST, description = "Invalid or duplicate name"),
        (status = NOT_FOUND, description = "Author not found"),
    ),
    tag = super::TAG_AUTHORS,
)]
pub(crate) async fn api_update_author(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    Json(payload): Json<AuthorRequest>,
) -> Result<StatusCode, ApiErrors> {
    payload.validate().map_err(ApiErrors::from)?;
    let existing = find_or_not_found::<author::Entity>(&ctx.db, id, "Author").await?;
    if existing.name == payload.name {
        debug!("Author {} unchanged", id);
        return Ok(StatusCode::NO_CONTENT);
    }

    let mut model: author::ActiveModel = existing.into();
    model.name = Set(payload.name);
    model
        .update(&ctx.db)
        .await
        .map_err(|err| write_error(err, "Duplicate author name", "Invalid reference"))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete an author
///
/// Authors who still have news articles cannot be deleted.
#[debug_handler]
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    operation_id = "deleteAuthor",
    params(("id" = i64, Path, description = "Author id")),
    responses(
        (status = NO_CONTENT, description = "Author deleted"),
        (status = BAD_REQUEST, description = "Author still has news articles"),
        (status = NOT_FOUND, description = "Author not found"),
    ),
    tag = super::TAG_AUTHORS,
)]
pub(crate) async fn api_delete_author(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiErrors> {
    let news_count = news::Entity::find()
        .filter(news::Column::AuthorId.eq(id))
        .count(&ctx.db)
        .await?;
    if news_count > 0 {
        warn!("Author {} still has {} news article(s)", id, news_count);
        return Err(ApiErrors::BadRequest(format!(
            "Author {id} still has {news_count} news article(s)"
        )));
    }

    delete_or_not_found::<author::Entity>(&ctx.db, id, "Author").await?;
    Ok(StatusCode::NO_CONTENT)
}
