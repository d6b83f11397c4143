use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_macros::debug_handler;
use chrono::Utc;
use entity::{comment, news};
use sea_orm::{ActiveModelTrait, Set};
use tracing::{debug, info};
use validator::Validate;

use crate::axumext::extractors::ValidatedQueryParams;
use crate::models::{Comment, CommentRequest, CommentUpdateRequest};
use crate::query::{
    compose::compose_comments, CommentFilter, PageRequest, PageResult, SelectSource,
};

use super::{
    db::{delete_or_not_found, find_or_not_found, write_error},
    params::CommentSearchParams,
    ApiContext, ApiErrors,
};

#[debug_handler]
#[utoipa::path(
    get,
    path = "/comments",
    operation_id = "listComments",
    params(PageRequest, CommentSearchParams),
    responses(
        (status = OK, description = "Page of comments", body = PageResult<Comment>),
        (status = BAD_REQUEST, description = "Invalid filter or page"),
    ),
    tag = super::TAG_COMMENTS,
)]
pub(crate) async fn api_list_comments(
    State(ctx): State<ApiContext>,
    ValidatedQueryParams(page): ValidatedQueryParams<PageRequest>,
    ValidatedQueryParams(params): ValidatedQueryParams<CommentSearchParams>,
) -> Result<Json<PageResult<Comment>>, ApiErrors> {
    let filter: CommentFilter = params.into();
    let source = SelectSource::new(compose_comments(&filter), &ctx.db);
    let page = page.fetch(&source).await?;
    Ok(Json(page.map(Comment::from)))
}

#[debug_handler]
#[utoipa::path(
    post,
    path = "/comments",
    operation_id = "createComment",
    request_body = CommentRequest,
    responses(
        (status = CREATED, description = "Comment created", body = Comment),
        (status = BAD_REQUEST, description = "Invalid content"),
        (status = NOT_FOUND, description = "News not found"),
    ),
    tag = super::TAG_COMMENTS,
)]
pub(crate) async fn api_create_comment(
    State(ctx): State<ApiContext>,
    Json(payload): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiErrors> {
    payload.validate().map_err(ApiErrors::from)?;
    find_or_not_found::<news::Entity>(&ctx.db, payload.news_id, "News").await?;

    let now = Utc::now();
    let model = comment::ActiveModel {
        news_id: Set(payload.news_id),
        content: Set(payload.content),
        created: Set(now),
        modified: Set(now),
        ..Default::default()
    }
    .insert(&ctx.db)
    .await
    .map_err(|err| write_error(err, "Duplicate comment", "News not found"))?;

    info!("Created comment {} on news {}", model.id, model.news_id);
    Ok((StatusCode::CREATED, Json(model.into())))
}

#[debug_handler]
#[utoipa::path(
    get,
    path = "/comments/{id}",
    operation_id = "getCommentById",
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = OK, description = "Comment", body = Comment),
        (status = NOT_FOUND, description = "Comment not found"),
    ),
    tag = super::TAG_COMMENTS,
)]
pub(crate) async fn api_read_comment(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<Comment>, ApiErrors> {
    let model = find_or_not_found::<comment::Entity>(&ctx.db, id, "Comment").await?;
    Ok(Json(model.into()))
}

/// Edit a comment
///
/// Only the text can be changed. The comment stays attached to its news article.
#[debug_handler]
#[utoipa::path(
    put,
    path = "/comments/{id}",
    operation_id = "updateComment",
    params(("id" = i64, Path, description = "Comment id")),
    request_body = CommentUpdateRequest,
    responses(
        (status = NO_CONTENT, description = "Comment updated"),
        (status = BAD_REQUEST, description = "Invalid content"),
        (status = NOT_FOUND, description = "Comment not found"),
    ),
    tag = super::TAG_COMMENTS,
)]
pub(crate) async fn api_update_comment(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    Json(payload): Json<CommentUpdateRequest>,
) -> Result<StatusCode, ApiErrors> {
    payload.validate().map_err(ApiErrors::from)?;
    let existing = find_or_not_found::<comment::Entity>(&ctx.db, id, "Comment").await?;

    let mut model: comment::ActiveModel = existing.into();
    model.content = Set(payload.content);
    model.modified = Set(Utc::now());
    model.update(&ctx.db).await?;

    debug!("Comment {} updated", id);
    Ok(StatusCode::NO_CONTENT)
}

#[debug_handler]
#[utoipa::path(
    delete,
    path = "/comments/{id}",
    operation_id = "deleteComment",
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = NO_CONTENT, description = "Comment deleted"),
        (status = NOT_FOUND, description = "Comment not found"),
    ),
    tag = super::TAG_COMMENTS,
)]
pub(crate) async fn api_delete_comment(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiErrors> {
    delete_or_not_found::<comment::Entity>(&ctx.db, id, "Comment").await?;
    Ok(StatusCode::NO_CONTENT)
}
