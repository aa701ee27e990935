use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::services::{JwtKeys, UserTokenKeys};
use crate::error::ApiError;

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".into()))
}

/// Signed-in user, identified by a provider-issued access token.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    UserTokenKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = UserTokenKeys::from_ref(state).verify(token).map_err(|e| {
            warn!(error = %e, "invalid user token");
            ApiError::Unauthorized("Invalid or expired token".into())
        })?;
        Ok(AuthUser(claims.sub))
    }
}

/// Holder of a valid admin session token; carries the admin username.
pub struct AdminSession(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = JwtKeys::from_ref(state).verify_admin(token).map_err(|e| {
            warn!(error = %e, "invalid admin token");
            ApiError::Unauthorized("Admin session required".into())
        })?;
        Ok(AdminSession(claims.sub))
    }
}
