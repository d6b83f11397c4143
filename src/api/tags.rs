use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_macros::debug_handler;
use entity::tag;
use sea_orm::{ActiveModelTrait, Set};
use tracing::info;
use validator::Validate;

use crate::axumext::extractors::ValidatedQueryParams;
use crate::models::{Tag, TagRequest};
use crate::query::{compose::compose_tags, PageRequest, PageResult, SelectSource, TagFilter};

use super::{
    db::{delete_or_not_found, find_or_not_found, write_error},
    params::NamePartParams,
    ApiContext, ApiErrors,
};

#[debug_handler]
#[utoipa::path(
    get,
    path = "/tags",
    operation_id = "listTags",
    params(PageRequest, NamePartParams),
    responses(
        (status = OK, description = "Page of tags", body = PageResult<Tag>),
        (status = BAD_REQUEST, description = "Invalid filter or page"),
    ),
    tag = super::TAG_TAGS,
)]
pub(crate) async fn api_list_tags(
    State(ctx): State<ApiContext>,
    ValidatedQueryParams(page): ValidatedQueryParams<PageRequest>,
    ValidatedQueryParams(params): ValidatedQueryParams<NamePartParams>,
) -> Result<Json<PageResult<Tag>>, ApiErrors> {
    let filter: TagFilter = params.into();
    let source = SelectSource::new(compose_tags(&filter), &ctx.db);
    let page = page.fetch(&source).await?;
    Ok(Json(page.map(Tag::from)))
}

#[debug_handler]
#[utoipa::path(
    post,
    path = "/tags",
    operation_id = "createTag",
    request_body = TagRequest,
    responses(
        (status = CREATED, description = "Tag created", body = Tag),
        (status = BAD_REQUEST, description = "Invalid or duplicate name"),
    ),
    tag = super::TAG_TAGS,
)]
pub(crate) async fn api_create_tag(
    State(ctx): State<ApiContext>,
    Json(payload): Json<TagRequest>,
) -> Result<(StatusCode, Json<Tag>), ApiErrors> {
    payload.validate().map_err(ApiErrors::from)?;

    let model = tag::ActiveModel {
        name: Set(payload.name),
        ..Default::default()
    }
    .insert(&ctx.db)
    .await
    .map_err(|err| write_error(err, "Duplicate tag name", "Invalid reference"))?;

    info!("Created tag {} {:?}", model.id, model.name);
    Ok((StatusCode::CREATED, Json(model.into())))
}

#[debug_handler]
#[utoipa::path(
    get,
    path = "/tags/{id}",
    operation_id = "getTagById",
    params(("id" = i64, Path, description = "Tag id")),
    responses(
        (status = OK, description = "Tag", body = Tag),
        (status = NOT_FOUND, description = "Tag not found"),
    ),
    tag = super::TAG_TAGS,
)]
pub(crate) async fn api_read_tag(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<Tag>, ApiErrors> {
    let model = find_or_not_found::<tag::Entity>(&ctx.db, id, "Tag").await?;
    Ok(Json(model.into()))
}

#[debug_handler]
#[utoipa::path(
    put,
    path = "/tags/{id}",
    operation_id = "updateTag",
    params(("id" = i64, Path, description = "Tag id")),
    request_body = TagRequest,
    responses(
        (status = NO_CONTENT, description = "Tag renamed"),
        (status = BAD_REQUEST, description = "Invalid or duplicate name"),
        (status = NOT_FOUND, description = "Tag not found"),
    ),
    tag = super::TAG_TAGS,
)]
pub(crate) async fn api_update_tag(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    Json(payload): Json<TagRequest>,
) -> Result<StatusCode, ApiErrors> {
    payload.validate().map_err(ApiErrors::from)?;
    let existing = find_or_not_found::<tag::Entity>(&ctx.db, id, "Tag").await?;
    if existing.name == payload.name {
        return Ok(StatusCode::NO_CONTENT);
    }

    let mut model: tag::ActiveModel = existing.into();
    model.name = Set(payload.name);
    model
        .update(&ctx.db)
        .await
        .map_err(|err| write_error(err, "Duplicate tag name", "Invalid reference"))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a tag
///
/// Removes the tag from all news articles.
#[debug_handler]
#[utoipa::path(
    delete,
    path = "/tags/{id}",
    operation_id = "deleteTag",
    params(("id" = i64, Path, description = "Tag id")),
    responses(
        (status = NO_CONTENT, description = "Tag deleted"),
        (status = NOT_FOUND, description = "Tag not found"),
    ),
    tag = super::TAG_TAGS,
)]
pub(crate) async fn api_delete_tag(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiErrors> {
    delete_or_not_found::<tag::Entity>(&ctx.db, id, "Tag").await?;
    Ok(StatusCode::NO_CONTENT)
}
