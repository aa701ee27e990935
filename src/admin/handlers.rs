use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    admin::{
        dto::{
            CreditsRequest, DeleteResponse, RoleRequest, StatusRequest, UserResponse,
            UsersResponse,
        },
        services::{join_users, parse_avatar_group, parse_credit_balance},
    },
    auth::extractors::AdminSession,
    error::{ApiError, ApiResult},
    extract::Json,
    profiles::repo_types::{ProfileChange, Role, Status},
    provider::MAX_USERS_PAGE,
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", axum::routing::delete(delete_user))
        .route("/admin/users/:id/credits", patch(update_credits))
        .route("/admin/users/:id/role", patch(update_role))
        .route("/admin/users/:id/status", patch(update_status))
        .route("/admin/users/:id/avatar-group", patch(update_avatar_group))
}

fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::validation("Invalid user id"))
}

async fn apply(state: &AppState, id: Uuid, change: ProfileChange) -> ApiResult<Json<UserResponse>> {
    let user = state
        .profiles
        .update(id, change)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %id, "admin profile update failed");
            ApiError::provider(e)
        })?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(UserResponse { user }))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
) -> ApiResult<Json<UsersResponse>> {
    let auth_users = state
        .auth_admin
        .list_users(MAX_USERS_PAGE)
        .await
        .map_err(|e| {
            error!(error = %e, "auth user listing failed");
            ApiError::provider(e)
        })?;
    let profiles = state.profiles.list().await.map_err(|e| {
        error!(error = %e, "profile listing failed");
        ApiError::provider(e)
    })?;

    let users = join_users(auth_users, profiles);
    info!(%admin, count = users.len(), "users listed");
    Ok(Json(UsersResponse { users }))
}

#[instrument(skip(state, body))]
pub async fn update_credits(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    Path(id): Path<String>,
    Json(body): Json<CreditsRequest>,
) -> ApiResult<Json<UserResponse>> {
    let id = parse_id(&id)?;
    let credits = parse_credit_balance(&body.credit_balance).map_err(|msg| {
        warn!(user_id = %id, value = %body.credit_balance, "rejected credit value");
        ApiError::Validation(msg)
    })?;

    let resp = apply(&state, id, ProfileChange::Credits(credits)).await?;
    info!(%admin, user_id = %id, credits, "credits updated");
    Ok(resp)
}

#[instrument(skip(state, body))]
pub async fn update_role(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    Path(id): Path<String>,
    Json(body): Json<RoleRequest>,
) -> ApiResult<Json<UserResponse>> {
    let id = parse_id(&id)?;
    let role: Role = body
        .role
        .as_str()
        .and_then(|r| r.parse().ok())
        .ok_or_else(|| ApiError::validation("role must be one of: user, admin"))?;

    let resp = apply(&state, id, ProfileChange::Role(role)).await?;
    info!(%admin, user_id = %id, %role, "role updated");
    Ok(resp)
}

#[instrument(skip(state, body))]
pub async fn update_status(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    Path(id): Path<String>,
    Json(body): Json<StatusRequest>,
) -> ApiResult<Json<UserResponse>> {
    let id = parse_id(&id)?;
    let status: Status = body
        .status
        .as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ApiError::validation("status must be one of: active, inactive"))?;

    let resp = apply(&state, id, ProfileChange::Status(status)).await?;
    info!(%admin, user_id = %id, %status, "status updated");
    Ok(resp)
}

#[instrument(skip(state, body))]
pub async fn update_avatar_group(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<Json<UserResponse>> {
    let id = parse_id(&id)?;
    let group = parse_avatar_group(body.get("avatar_group")).map_err(ApiError::Validation)?;

    let resp = apply(&state, id, ProfileChange::AvatarGroup(group.clone())).await?;
    info!(%admin, user_id = %id, avatar_group = ?group, "avatar group updated");
    Ok(resp)
}

/// Removes the profile row, then the auth identity. Succeeds if either existed.
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let id = parse_id(&id)?;

    let had_profile = state.profiles.delete(id).await.map_err(|e| {
        error!(error = %e, user_id = %id, "profile delete failed");
        ApiError::provider(e)
    })?;
    let had_auth_user = state.auth_admin.delete_user(id).await.map_err(|e| {
        error!(error = %e, user_id = %id, had_profile, "auth user delete failed");
        ApiError::provider(e)
    })?;

    if !had_profile && !had_auth_user {
        warn!(%admin, user_id = %id, "delete of unknown user");
        return Err(ApiError::NotFound("User not found".into()));
    }

    info!(%admin, user_id = %id, had_profile, had_auth_user, "user deleted");
    Ok(Json(DeleteResponse { success: true }))
}
