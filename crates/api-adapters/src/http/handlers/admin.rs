use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use domains::{NewRoleGroup, RoleGroup};
use services::UserProfile;
use uuid::Uuid;

use super::ApiResult;
use crate::http::dto::{MemberRequest, RoleAssignment};
use crate::http::extract::{ApiJson, ApiPath, CurrentActor};
use crate::http::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<UserProfile>>> {
    Ok(Json(state.services.admin.list_users(&actor).await?))
}

pub async fn set_role(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<RoleAssignment>,
) -> ApiResult<Json<UserProfile>> {
    let profile = state.services.admin.set_role(&actor, user_id, &body.role).await?;
    Ok(Json(profile))
}

pub async fn list_groups(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<RoleGroup>>> {
    Ok(Json(state.services.admin.list_groups(&actor).await?))
}

pub async fn create_group(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(input): ApiJson<NewRoleGroup>,
) -> ApiResult<(StatusCode, Json<RoleGroup>)> {
    let group = state.services.admin.create_group(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn add_member(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(group_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<MemberRequest>,
) -> ApiResult<Json<RoleGroup>> {
    let group = state
        .services
        .admin
        .add_member(&actor, group_id, body.user_id)
        .await?;
    Ok(Json(group))
}

pub async fn remove_member(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath((group_id, user_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<RoleGroup>> {
    let group = state
        .services
        .admin
        .remove_member(&actor, group_id, user_id)
        .await?;
    Ok(Json(group))
}
