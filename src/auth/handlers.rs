use axum::{
    extract::{FromRef, State},
    routing::post,
    Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{AdminLoginRequest, AdminLoginResponse, AdminUser, SignupRequest, SignupResponse},
        services::{check_admin_credentials, is_valid_email, JwtKeys},
    },
    error::{ApiError, ApiResult},
    extract::Json,
    profiles::{
        repo_types::NewProfile,
        services::{trial_end_from, SIGNUP_CREDITS},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/admin-login", post(admin_login))
}

fn required(value: Option<String>, name: &str) -> ApiResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::validation(format!("Missing required field: {name}"))),
    }
}

/// Creates the profile row for a user the provider has just registered.
#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<Json<SignupResponse>> {
    let user_id = required(payload.user_id, "userId")?;
    let email = required(payload.email, "email")?.to_lowercase();
    let full_name = required(payload.full_name, "fullName")?;

    let id = Uuid::parse_str(&user_id).map_err(|_| {
        warn!(%user_id, "signup with malformed user id");
        ApiError::validation("userId must be a UUID")
    })?;
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }

    let new = NewProfile {
        id,
        email,
        full_name,
        credit_balance: SIGNUP_CREDITS,
        trial_ends_at: trial_end_from(OffsetDateTime::now_utc()),
    };
    let user = state.profiles.insert(new).await.map_err(|e| {
        error!(error = %e, user_id = %id, "profile insert failed");
        ApiError::provider(e)
    })?;

    info!(user_id = %user.id, email = %user.email, "profile created");
    Ok(Json(SignupResponse { user, error: None }))
}

#[instrument(skip(state, payload))]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> ApiResult<Json<AdminLoginResponse>> {
    let ok = check_admin_credentials(&state.config.admin, &payload.username, &payload.password)
        .map_err(|e| {
            error!(error = %e, "admin credential check failed");
            ApiError::Internal(e)
        })?;
    if !ok {
        warn!(username = %payload.username, "admin login rejected");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let token = JwtKeys::from_ref(&state)
        .sign_admin(&payload.username)
        .map_err(|e| {
            error!(error = %e, "admin token sign failed");
            ApiError::Internal(e)
        })?;

    info!(username = %payload.username, "admin logged in");
    Ok(Json(AdminLoginResponse {
        success: true,
        user: AdminUser {
            username: payload.username,
            role: "admin",
        },
        token,
    }))
}
