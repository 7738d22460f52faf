use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use domains::{IssuedToken, NewUser};
use services::UserProfile;

use super::ApiResult;
use crate::http::dto::LoginRequest;
use crate::http::extract::{ApiJson, CurrentActor};
use crate::http::AppState;

pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewUser>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let profile = state.services.identity.register(input).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<Json<IssuedToken>> {
    let token = state
        .services
        .identity
        .login(&body.username, &body.password)
        .await?;
    Ok(Json(token))
}

pub async fn me(State(state): State<AppState>, CurrentActor(actor): CurrentActor) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.services.identity.me(&actor).await?))
}
