use anyhow::Context;
use serde::Deserialize;

use crate::auth::services::hash_password;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Connection details for the hosted auth/database provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub url: String,
    pub service_role_key: String,
    /// Secret the provider signs user access tokens with.
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub public_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub provider: ProviderConfig,
    pub admin: AdminConfig,
    pub admin_jwt: JwtConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL")?;

        let provider = ProviderConfig {
            url: std::env::var("SUPABASE_URL")
                .context("SUPABASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            service_role_key: std::env::var("SUPABASE_SERVICE_ROLE_KEY")
                .context("SUPABASE_SERVICE_ROLE_KEY")?,
            jwt_secret: std::env::var("SUPABASE_JWT_SECRET").context("SUPABASE_JWT_SECRET")?,
        };

        let password_hash = match std::env::var("ADMIN_PASSWORD_HASH") {
            Ok(hash) => hash,
            Err(_) => {
                let plain = std::env::var("ADMIN_PASSWORD")
                    .context("ADMIN_PASSWORD_HASH or ADMIN_PASSWORD must be set")?;
                hash_password(&plain)?
            }
        };
        let admin = AdminConfig {
            username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            password_hash,
        };

        let admin_jwt = JwtConfig {
            secret: std::env::var("ADMIN_JWT_SECRET").context("ADMIN_JWT_SECRET")?,
            issuer: std::env::var("ADMIN_JWT_ISSUER").unwrap_or_else(|_| "vidgen".into()),
            audience: std::env::var("ADMIN_JWT_AUDIENCE")
                .unwrap_or_else(|_| "vidgen-admin".into()),
            ttl_minutes: std::env::var("ADMIN_JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 8),
        };

        let storage = StorageConfig {
            endpoint: std::env::var("STORAGE_ENDPOINT")
                .unwrap_or_else(|_| format!("{}/storage/v1/s3", provider.url)),
            bucket: std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| "avatars".into()),
            access_key: std::env::var("STORAGE_ACCESS_KEY").unwrap_or_default(),
            secret_key: std::env::var("STORAGE_SECRET_KEY").unwrap_or_default(),
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".into()),
            public_url: std::env::var("STORAGE_PUBLIC_URL")
                .unwrap_or_else(|_| format!("{}/storage/v1/object/public", provider.url))
                .trim_end_matches('/')
                .to_string(),
        };

        Ok(Self {
            database_url,
            provider,
            admin,
            admin_jwt,
            storage,
        })
    }
}
