use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiResult},
    extract::Json,
    profiles::{
        dto::{
            ChangePasswordRequest, ConsumeCreditsRequest, MeResponse, OnboardingRequest,
            ProfileResponse, SuccessResponse, UpdateMeRequest,
        },
        repo_types::{Profile, ProfileChange, Status},
        services::TrialStatus,
    },
    state::AppState,
    storage::image_extension,
};

const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;
const MIN_PASSWORD_LEN: usize = 6;

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).patch(update_me))
        .route("/me/onboarding", post(complete_onboarding))
        .route("/me/credits/consume", post(consume_credits))
        .route("/me/password", post(change_password))
        .route(
            "/me/avatar",
            post(upload_avatar).layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES + 64 * 1024)),
        )
}

fn not_found() -> ApiError {
    ApiError::NotFound("Profile not found".into())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn write(state: &AppState, user_id: Uuid, change: ProfileChange) -> ApiResult<Profile> {
    state
        .profiles
        .update(user_id, change)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "profile update failed");
            ApiError::provider(e)
        })?
        .ok_or_else(not_found)
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<MeResponse>> {
    let user = state
        .profiles
        .get(user_id)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "profile fetch failed");
            ApiError::provider(e)
        })?
        .ok_or_else(not_found)?;
    let trial = TrialStatus::at(user.trial_ends_at, OffsetDateTime::now_utc());
    Ok(Json(MeResponse { user, trial }))
}

#[instrument(skip(state, body))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<UpdateMeRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let full_name = non_blank(body.full_name);
    let avatar_url = non_blank(body.avatar_url);
    if full_name.is_none() && avatar_url.is_none() {
        return Err(ApiError::validation("Nothing to update"));
    }

    let user = write(
        &state,
        user_id,
        ProfileChange::Details {
            full_name,
            avatar_url,
        },
    )
    .await?;
    info!(%user_id, "profile updated");
    Ok(Json(ProfileResponse { user }))
}

#[instrument(skip(state, body))]
pub async fn complete_onboarding(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<OnboardingRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let (Some(goal), Some(role), Some(persona)) = (
        non_blank(body.goal),
        non_blank(body.role),
        non_blank(body.persona),
    ) else {
        return Err(ApiError::validation("goal, role and persona are required"));
    };

    let user = write(
        &state,
        user_id,
        ProfileChange::Onboarding {
            goal,
            role,
            persona,
        },
    )
    .await?;
    info!(%user_id, "onboarding completed");
    Ok(Json(ProfileResponse { user }))
}

#[instrument(skip(state))]
pub async fn consume_credits(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<ConsumeCreditsRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    if body.amount < 1 {
        return Err(ApiError::validation("amount must be a positive integer"));
    }

    let current = state
        .profiles
        .get(user_id)
        .await
        .map_err(ApiError::provider)?
        .ok_or_else(not_found)?;
    if current.status == Status::Inactive {
        warn!(%user_id, "credit use on inactive account");
        return Err(ApiError::Forbidden("Account is inactive".into()));
    }

    let user = state
        .profiles
        .consume_credits(user_id, body.amount)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "credit deduction failed");
            ApiError::provider(e)
        })?
        .ok_or_else(not_found)?;
    info!(%user_id, amount = body.amount, balance = user.credit_balance, "credits consumed");
    Ok(Json(ProfileResponse { user }))
}

#[instrument(skip(state, body))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<ChangePasswordRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    if body.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    state
        .auth_admin
        .update_password(user_id, &body.password)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "password update failed");
            ApiError::provider(e)
        })?;
    info!(%user_id, "password changed");
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /me/avatar (multipart, field `file`)
#[instrument(skip(state, mp))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mp: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ProfileResponse>> {
    let mut mp = mp?;
    let mut upload = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::validation(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(e.to_string()))?;
        upload = Some((content_type, data));
        break;
    }

    let (content_type, data) = upload.ok_or_else(|| ApiError::validation("file is required"))?;
    let ext = image_extension(&content_type)
        .ok_or_else(|| ApiError::validation("file must be a png, jpeg, webp or gif image"))?;
    if data.is_empty() || data.len() > MAX_AVATAR_BYTES {
        return Err(ApiError::validation("file must be between 1 byte and 5 MiB"));
    }

    let key = format!("{}/{}.{}", user_id, Uuid::new_v4(), ext);
    state
        .storage
        .put_object(&key, data, &content_type)
        .await
        .map_err(|e| {
            error!(error = %e, %key, "avatar upload failed");
            ApiError::provider(e)
        })?;

    let url = state.storage.public_url(&key);
    match write(&state, user_id, ProfileChange::AvatarUrl(url)).await {
        Ok(user) => {
            info!(%user_id, %key, "avatar uploaded");
            Ok(Json(ProfileResponse { user }))
        }
        Err(e) => {
            if let Err(cleanup) = state.storage.delete_object(&key).await {
                warn!(error = %cleanup, %key, "orphaned avatar not removed");
            }
            Err(e)
        }
    }
}
