use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::profiles::repo_types::{Profile, Role, Status};

/// Auth user joined with its profile row, as shown in the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminUserView {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<Role>,
    pub status: Option<Status>,
    pub credit_balance: Option<i32>,
    pub total_views: Option<i32>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub trial_ends_at: Option<OffsetDateTime>,
    pub avatar_group: Option<String>,
    pub onboarding_completed: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_sign_in_at: Option<OffsetDateTime>,
    pub provider_type: String,
    pub has_profile: bool,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<AdminUserView>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: Profile,
}

/// `credit_balance` accepts a JSON integer or an integer string.
#[derive(Debug, Deserialize)]
pub struct CreditsRequest {
    #[serde(default)]
    pub credit_balance: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    #[serde(default)]
    pub role: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}
