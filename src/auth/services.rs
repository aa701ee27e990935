pub(crate) use crate::auth::dto::{AdminClaims, JwtKeys, UserClaims, UserTokenKeys};
use crate::config::{AdminConfig, JwtConfig};
use crate::state::AppState;
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use std::time::Duration;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, error};

/// Audience the provider stamps on signed-in user tokens.
pub const USER_TOKEN_AUDIENCE: &str = "authenticated";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Checks submitted credentials against the configured admin account.
pub fn check_admin_credentials(
    admin: &AdminConfig,
    username: &str,
    password: &str,
) -> anyhow::Result<bool> {
    // Verified before the username check so every attempt costs one argon2 run.
    let password_ok = verify_password(password, &admin.password_hash)?;
    Ok(username == admin.username && password_ok)
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
        } = state.config.admin_jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            ttl: Duration::from_secs((ttl_minutes.max(1) as u64) * 60),
        }
    }
}

impl FromRef<AppState> for UserTokenKeys {
    fn from_ref(state: &AppState) -> Self {
        Self {
            decoding: DecodingKey::from_secret(state.config.provider.jwt_secret.as_bytes()),
        }
    }
}

impl JwtKeys {
    pub fn sign_admin(&self, username: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = AdminClaims {
            sub: username.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            role: "admin".to_string(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(admin = %username, "admin token signed");
        Ok(token)
    }

    pub fn verify_admin(&self, token: &str) -> anyhow::Result<AdminClaims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<AdminClaims>(token, &self.decoding, &validation)?;
        if data.claims.role != "admin" {
            anyhow::bail!("not an admin token");
        }
        Ok(data.claims)
    }
}

impl UserTokenKeys {
    pub fn verify(&self, token: &str) -> anyhow::Result<UserClaims> {
        let mut validation = Validation::default();
        validation.set_audience(&[USER_TOKEN_AUDIENCE]);
        let data = decode::<UserClaims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "user token verified");
        Ok(data.claims)
    }
}
