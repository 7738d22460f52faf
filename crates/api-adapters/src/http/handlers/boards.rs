use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use domains::{Board, BoardPatch, NewBoard};
use uuid::Uuid;

use super::ApiResult;
use crate::http::extract::{ApiJson, ApiPath, CurrentActor};
use crate::http::AppState;

pub async fn list(State(state): State<AppState>, CurrentActor(actor): CurrentActor) -> ApiResult<Json<Vec<Board>>> {
    Ok(Json(state.services.boards.list(&actor).await?))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(input): ApiJson<NewBoard>,
) -> ApiResult<(StatusCode, Json<Board>)> {
    let board = state.services.boards.create(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Board>> {
    Ok(Json(state.services.boards.get(&actor, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<BoardPatch>,
) -> ApiResult<Json<Board>> {
    Ok(Json(state.services.boards.update(&actor, id, patch).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.boards.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
