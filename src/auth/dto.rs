use jsonwebtoken::{DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::profiles::repo_types::Profile;

/// Claims of the admin session token issued by admin-login.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminClaims {
    pub sub: String,  // admin username
    pub exp: usize,   // expiration time
    pub iat: usize,   // issued at
    pub iss: String,  // issuer
    pub aud: String,  // audience
    pub role: String, // always "admin"
}

/// Claims the provider puts in user access tokens; unknown ones are ignored.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserClaims {
    pub sub: Uuid,
    pub exp: usize,
}

/// Signing and verification keys for admin session tokens.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

/// Verification key for provider-issued user tokens.
#[derive(Clone)]
pub struct UserTokenKeys {
    pub decoding: DecodingKey,
}

/// Request body for signup. Fields are optional so absence is reported as 400.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user: Profile,
    pub error: Option<String>,
}

/// Request body for admin login.
#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub success: bool,
    pub user: AdminUser,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct AdminUser {
    pub username: String,
    pub role: &'static str,
}
