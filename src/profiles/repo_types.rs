use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => anyhow::bail!("invalid role: {other}"),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Inactive,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
        }
    }
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Status::Active),
            "inactive" => Ok(Status::Inactive),
            other => anyhow::bail!("invalid status: {other}"),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User profile as stored by the provider and returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub status: Status,
    pub credit_balance: i32,
    pub total_views: i32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub trial_ends_at: Option<OffsetDateTime>,
    pub avatar_group: Option<String>,
    pub onboarding_goal: Option<String>,
    pub onboarding_role: Option<String>,
    pub onboarding_persona: Option<String>,
    pub onboarding_completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Raw `profiles` row; enum columns come back as text.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: String,
    pub status: String,
    pub credit_balance: i32,
    pub total_views: i32,
    pub trial_ends_at: Option<OffsetDateTime>,
    pub avatar_group: Option<String>,
    pub onboarding_goal: Option<String>,
    pub onboarding_role: Option<String>,
    pub onboarding_persona: Option<String>,
    pub onboarding_completed: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = anyhow::Error;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            avatar_url: row.avatar_url,
            role: row.role.parse()?,
            status: row.status.parse()?,
            credit_balance: row.credit_balance,
            total_views: row.total_views,
            trial_ends_at: row.trial_ends_at,
            avatar_group: row.avatar_group,
            onboarding_goal: row.onboarding_goal,
            onboarding_role: row.onboarding_role,
            onboarding_persona: row.onboarding_persona,
            onboarding_completed: row.onboarding_completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Values written by signup.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub credit_balance: i32,
    pub trial_ends_at: OffsetDateTime,
}

/// A single field-level write against a profile.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileChange {
    Credits(i32),
    Role(Role),
    Status(Status),
    AvatarGroup(Option<String>),
    AvatarUrl(String),
    /// `None` leaves the column untouched.
    Details {
        full_name: Option<String>,
        avatar_url: Option<String>,
    },
    Onboarding {
        goal: String,
        role: String,
        persona: String,
    },
}
