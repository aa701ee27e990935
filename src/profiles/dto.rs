use serde::{Deserialize, Serialize};

use crate::profiles::{repo_types::Profile, services::TrialStatus};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: Profile,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: Profile,
    pub trial: TrialStatus,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMeRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Answers collected by the three onboarding steps.
#[derive(Debug, Deserialize)]
pub struct OnboardingRequest {
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub persona: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConsumeCreditsRequest {
    pub amount: i32,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}
