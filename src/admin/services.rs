use std::collections::HashMap;

use serde_json::Value;
use uuid::Uuid;

use crate::admin::dto::AdminUserView;
use crate::profiles::repo_types::Profile;
use crate::provider::AuthUserRecord;

/// Login method label: app metadata first, then the first identity, else email.
pub fn provider_type(user: &AuthUserRecord) -> String {
    user.app_metadata
        .get("provider")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .or_else(|| {
            user.identities
                .as_ref()
                .and_then(|ids| ids.first())
                .map(|i| i.provider.clone())
        })
        .unwrap_or_else(|| "email".to_string())
}

/// Joins auth users with profile rows by id, keeping the provider's order.
pub fn join_users(auth_users: Vec<AuthUserRecord>, profiles: Vec<Profile>) -> Vec<AdminUserView> {
    let mut by_id: HashMap<Uuid, Profile> = profiles.into_iter().map(|p| (p.id, p)).collect();

    auth_users
        .into_iter()
        .map(|user| {
            let provider_type = provider_type(&user);
            let profile = by_id.remove(&user.id);
            let has_profile = profile.is_some();
            let p = profile.as_ref();
            AdminUserView {
                id: user.id,
                email: user.email.or_else(|| p.map(|p| p.email.clone())),
                full_name: p.and_then(|p| p.full_name.clone()),
                avatar_url: p.and_then(|p| p.avatar_url.clone()),
                role: p.map(|p| p.role),
                status: p.map(|p| p.status),
                credit_balance: p.map(|p| p.credit_balance),
                total_views: p.map(|p| p.total_views),
                trial_ends_at: p.and_then(|p| p.trial_ends_at),
                avatar_group: p.and_then(|p| p.avatar_group.clone()),
                onboarding_completed: p.map(|p| p.onboarding_completed).unwrap_or(false),
                created_at: user.created_at.or_else(|| p.map(|p| p.created_at)),
                last_sign_in_at: user.last_sign_in_at,
                provider_type,
                has_profile,
            }
        })
        .collect()
}

pub fn parse_credit_balance(value: &Value) -> Result<i32, String> {
    const MSG: &str = "credit_balance must be a non-negative integer";
    let n = match value {
        Value::Number(n) => n.as_i64().ok_or(MSG)?,
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| MSG)?,
        _ => return Err(MSG.into()),
    };
    if n < 0 {
        return Err(MSG.into());
    }
    i32::try_from(n).map_err(|_| "credit_balance is too large".to_string())
}

/// `Ok(None)` clears the group.
pub fn parse_avatar_group(value: Option<&Value>) -> Result<Option<String>, String> {
    match value {
        None => Err("avatar_group is required".into()),
        Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(Some(s.trim().to_string())),
        Some(_) => Err("avatar_group must be a non-empty string or null".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::repo_types::{Role, Status};
    use crate::provider::Identity;
    use serde_json::json;
    use time::OffsetDateTime;

    fn auth_user(id: Uuid, metadata: Value, identities: Option<Vec<&str>>) -> AuthUserRecord {
        AuthUserRecord {
            id,
            email: Some(format!("{id}@example.com")),
            created_at: None,
            last_sign_in_at: None,
            app_metadata: metadata,
            identities: identities.map(|ids| {
                ids.into_iter()
                    .map(|p| Identity {
                        provider: p.to_string(),
                    })
                    .collect()
            }),
        }
    }

    fn profile(id: Uuid) -> Profile {
        let now = OffsetDateTime::now_utc();
        Profile {
            id,
            email: "stored@example.com".into(),
            full_name: Some("Ana".into()),
            avatar_url: None,
            role: Role::Admin,
            status: Status::Active,
            credit_balance: 12,
            total_views: 4,
            trial_ends_at: None,
            avatar_group: Some("studio".into()),
            onboarding_goal: None,
            onboarding_role: None,
            onboarding_persona: None,
            onboarding_completed: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn provider_type_prefers_app_metadata() {
        let u = auth_user(Uuid::new_v4(), json!({"provider": "google"}), Some(vec!["github"]));
        assert_eq!(provider_type(&u), "google");
    }

    #[test]
    fn provider_type_falls_back_to_identity_then_email() {
        let u = auth_user(Uuid::new_v4(), json!({}), Some(vec!["github"]));
        assert_eq!(provider_type(&u), "github");
        let u = auth_user(Uuid::new_v4(), Value::Null, None);
        assert_eq!(provider_type(&u), "email");
    }

    #[test]
    fn join_keeps_users_without_profiles() {
        let with = Uuid::new_v4();
        let without = Uuid::new_v4();
        let orphan_profile = Uuid::new_v4();
        let users = join_users(
            vec![
                auth_user(with, json!({"provider": "email"}), None),
                auth_user(without, json!({}), None),
            ],
            vec![profile(with), profile(orphan_profile)],
        );

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, with);
        assert!(users[0].has_profile);
        assert_eq!(users[0].credit_balance, Some(12));
        assert_eq!(users[0].role, Some(Role::Admin));
        assert_eq!(users[0].email.as_deref(), Some(format!("{with}@example.com").as_str()));

        assert_eq!(users[1].id, without);
        assert!(!users[1].has_profile);
        assert_eq!(users[1].credit_balance, None);
        assert!(!users[1].onboarding_completed);
    }

    #[test]
    fn credit_values() {
        assert_eq!(parse_credit_balance(&json!(0)), Ok(0));
        assert_eq!(parse_credit_balance(&json!(250)), Ok(250));
        assert_eq!(parse_credit_balance(&json!(" 42 ")), Ok(42));
        assert!(parse_credit_balance(&json!(-1)).is_err());
        assert!(parse_credit_balance(&json!("-5")).is_err());
        assert!(parse_credit_balance(&json!(1.5)).is_err());
        assert!(parse_credit_balance(&json!("ten")).is_err());
        assert!(parse_credit_balance(&Value::Null).is_err());
        assert!(parse_credit_balance(&json!(5_000_000_000i64)).is_err());
    }

    #[test]
    fn avatar_group_values() {
        assert_eq!(parse_avatar_group(Some(&json!(" studio "))), Ok(Some("studio".into())));
        assert_eq!(parse_avatar_group(Some(&Value::Null)), Ok(None));
        assert!(parse_avatar_group(Some(&json!(""))).is_err());
        assert!(parse_avatar_group(Some(&json!(3))).is_err());
        assert!(parse_avatar_group(None).is_err());
    }
}
