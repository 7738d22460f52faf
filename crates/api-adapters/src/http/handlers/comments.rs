use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use domains::{Comment, CommentPatch, NewComment};
use uuid::Uuid;

use super::ApiResult;
use crate::http::dto::CommentQuery;
use crate::http::extract::{ApiJson, ApiPath, ApiQuery, CurrentActor};
use crate::http::AppState;

pub async fn list(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiQuery(query): ApiQuery<CommentQuery>,
) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(state.services.comments.list(&actor, query.feedback).await?))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(input): ApiJson<NewComment>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let comment = state.services.comments.create(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Comment>> {
    Ok(Json(state.services.comments.get(&actor, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<CommentPatch>,
) -> ApiResult<Json<Comment>> {
    Ok(Json(state.services.comments.update(&actor, id, patch).await?))
}

/// Replies go with their parent.
pub async fn delete(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    let removed = state.services.comments.delete(&actor, id).await?;
    tracing::debug!(comment_id = %id, removed, "comment subtree deleted");
    Ok(StatusCode::NO_CONTENT)
}
