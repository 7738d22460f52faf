use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use domains::{CommentNode, FeedbackFilter, FeedbackPatch, NewFeedback};
use services::{FeedbackView, Kanban, UpvoteReceipt};
use uuid::Uuid;

use super::ApiResult;
use crate::http::dto::{BoardQuery, FeedbackPatchBody, FeedbackQuery, StatusChange};
use crate::http::extract::{ApiJson, ApiPath, ApiQuery, CurrentActor};
use crate::http::AppState;

pub async fn list(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiQuery(query): ApiQuery<FeedbackQuery>,
) -> ApiResult<Json<Vec<FeedbackView>>> {
    let filter = FeedbackFilter::try_from(query)?;
    Ok(Json(state.services.feedback.list(&actor, filter).await?))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(input): ApiJson<NewFeedback>,
) -> ApiResult<(StatusCode, Json<FeedbackView>)> {
    let view = state.services.feedback.create(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<FeedbackView>> {
    Ok(Json(state.services.feedback.get(&actor, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<FeedbackPatchBody>,
) -> ApiResult<Json<FeedbackView>> {
    let patch = FeedbackPatch::try_from(body)?;
    Ok(Json(state.services.feedback.update(&actor, id, patch).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.feedback.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_status(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<StatusChange>,
) -> ApiResult<Json<FeedbackView>> {
    let view = state
        .services
        .feedback
        .change_status(&actor, id, &body.status)
        .await?;
    Ok(Json(view))
}

pub async fn upvote(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<UpvoteReceipt>> {
    Ok(Json(state.services.feedback.toggle_upvote(&actor, id).await?))
}

pub async fn comment_thread(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<CommentNode>>> {
    Ok(Json(state.services.comments.thread(&actor, id).await?))
}

pub async fn by_board(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiQuery(query): ApiQuery<BoardQuery>,
) -> ApiResult<Json<Vec<FeedbackView>>> {
    Ok(Json(state.services.queries.by_board(&actor, query.board_id).await?))
}

pub async fn most_upvoted(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<FeedbackView>>> {
    Ok(Json(state.services.queries.most_upvoted(&actor).await?))
}

pub async fn kanban(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiQuery(query): ApiQuery<BoardQuery>,
) -> ApiResult<Json<Kanban>> {
    Ok(Json(state.services.queries.kanban(&actor, query.board_id).await?))
}
