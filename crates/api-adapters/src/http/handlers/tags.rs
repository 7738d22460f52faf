use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use domains::{NewTag, Tag, TagPatch};
use uuid::Uuid;

use super::ApiResult;
use crate::http::extract::{ApiJson, ApiPath, CurrentActor};
use crate::http::AppState;

pub async fn list(State(state): State<AppState>, CurrentActor(actor): CurrentActor) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(state.services.tags.list(&actor).await?))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(input): ApiJson<NewTag>,
) -> ApiResult<(StatusCode, Json<Tag>)> {
    let tag = state.services.tags.create(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Tag>> {
    Ok(Json(state.services.tags.get(&actor, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<TagPatch>,
) -> ApiResult<Json<Tag>> {
    Ok(Json(state.services.tags.update(&actor, id, patch).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.tags.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
