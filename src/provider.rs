use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ProviderConfig;

/// Largest page the provider's admin API hands out in one call.
pub const MAX_USERS_PAGE: u32 = 1000;

/// Linked login method of an auth user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub provider: String,
}

/// Auth user as reported by the provider's admin API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUserRecord {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_sign_in_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub app_metadata: serde_json::Value,
    #[serde(default)]
    pub identities: Option<Vec<Identity>>,
}

#[derive(Debug, Deserialize)]
struct UserPage {
    #[serde(default)]
    users: Vec<AuthUserRecord>,
}

/// Admin operations on the provider's auth users.
#[async_trait]
pub trait AuthAdmin: Send + Sync {
    async fn list_users(&self, per_page: u32) -> anyhow::Result<Vec<AuthUserRecord>>;
    /// `Ok(false)` when the provider has no such user.
    async fn delete_user(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn update_password(&self, id: Uuid, password: &str) -> anyhow::Result<()>;
}

/// Client for a GoTrue-compatible `/auth/v1/admin` API using the service-role key.
#[derive(Clone)]
pub struct GoTrueAdmin {
    http: Client,
    base_url: String,
    service_key: String,
}

impl GoTrueAdmin {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: format!("{}/auth/v1/admin", config.url),
            service_key: config.service_role_key.clone(),
        }
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

/// Turns a non-2xx provider reply into an error carrying the provider's own message.
async fn check(resp: Response, op: &str) -> anyhow::Result<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    warn!(%status, op, "provider request failed");
    anyhow::bail!(provider_message(&body).unwrap_or_else(|| format!("{op} returned {status}")))
}

fn provider_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|k| value.get(*k).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[async_trait]
impl AuthAdmin for GoTrueAdmin {
    async fn list_users(&self, per_page: u32) -> anyhow::Result<Vec<AuthUserRecord>> {
        let resp = self
            .authorized(self.http.get(format!("{}/users", self.base_url)))
            .query(&[("page", 1), ("per_page", per_page)])
            .send()
            .await?;
        let page: UserPage = check(resp, "list users").await?.json().await?;
        debug!(count = page.users.len(), "auth users listed");
        Ok(page.users)
    }

    async fn delete_user(&self, id: Uuid) -> anyhow::Result<bool> {
        let resp = self
            .authorized(self.http.delete(format!("{}/users/{}", self.base_url, id)))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!(user_id = %id, "auth user already gone");
            return Ok(false);
        }
        check(resp, "delete user").await?;
        Ok(true)
    }

    async fn update_password(&self, id: Uuid, password: &str) -> anyhow::Result<()> {
        let resp = self
            .authorized(self.http.put(format!("{}/users/{}", self.base_url, id)))
            .json(&json!({ "password": password }))
            .send()
            .await?;
        check(resp, "update user").await?;
        Ok(())
    }
}
