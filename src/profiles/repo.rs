use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::profiles::repo_types::{NewProfile, Profile, ProfileChange, ProfileRow};

/// Access to the provider-owned `profiles` table.
#[async_trait]
pub trait ProfileRepo: Send + Sync {
    async fn insert(&self, new: NewProfile) -> anyhow::Result<Profile>;
    async fn list(&self) -> anyhow::Result<Vec<Profile>>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Profile>>;
    /// Returns `None` when no row has this id.
    async fn update(&self, id: Uuid, change: ProfileChange) -> anyhow::Result<Option<Profile>>;
    /// Decrements the balance by `amount`, clamping at zero.
    async fn consume_credits(&self, id: Uuid, amount: i32) -> anyhow::Result<Option<Profile>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

const PROFILE_COLUMNS: &str = r#"
    id, email, full_name, avatar_url, role::text AS role, status::text AS status,
    credit_balance, total_views, trial_ends_at, avatar_group,
    onboarding_goal, onboarding_role, onboarding_persona, onboarding_completed,
    created_at, updated_at
"#;

#[derive(Clone)]
pub struct PgProfileRepo {
    db: PgPool,
}

impl PgProfileRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn fetch_profile(
        &self,
        query: sqlx::query::QueryAs<'_, sqlx::Postgres, ProfileRow, sqlx::postgres::PgArguments>,
    ) -> anyhow::Result<Option<Profile>> {
        query
            .fetch_optional(&self.db)
            .await?
            .map(Profile::try_from)
            .transpose()
    }
}

#[async_trait]
impl ProfileRepo for PgProfileRepo {
    async fn insert(&self, new: NewProfile) -> anyhow::Result<Profile> {
        let sql = format!(
            r#"
            INSERT INTO profiles (id, email, full_name, credit_balance, trial_ends_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PROFILE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(new.id)
            .bind(&new.email)
            .bind(&new.full_name)
            .bind(new.credit_balance)
            .bind(new.trial_ends_at)
            .fetch_one(&self.db)
            .await?;
        row.try_into()
    }

    async fn list(&self) -> anyhow::Result<Vec<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles");
        let rows = sqlx::query_as::<_, ProfileRow>(&sql)
            .fetch_all(&self.db)
            .await?;
        rows.into_iter().map(Profile::try_from).collect()
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
        self.fetch_profile(sqlx::query_as::<_, ProfileRow>(&sql).bind(id))
            .await
    }

    async fn update(&self, id: Uuid, change: ProfileChange) -> anyhow::Result<Option<Profile>> {
        let set_clause = match &change {
            ProfileChange::Credits(_) => "credit_balance = $2",
            ProfileChange::Role(_) => "role = $2",
            ProfileChange::Status(_) => "status = $2",
            ProfileChange::AvatarGroup(_) => "avatar_group = $2",
            ProfileChange::AvatarUrl(_) => "avatar_url = $2",
            ProfileChange::Details { .. } => {
                "full_name = COALESCE($2, full_name), avatar_url = COALESCE($3, avatar_url)"
            }
            ProfileChange::Onboarding { .. } => {
                "onboarding_goal = $2, onboarding_role = $3, onboarding_persona = $4, \
                 onboarding_completed = TRUE"
            }
        };
        let sql = format!(
            r#"
            UPDATE profiles
            SET {set_clause}, updated_at = now()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        );

        let query = sqlx::query_as::<_, ProfileRow>(&sql).bind(id);
        let query = match change {
            ProfileChange::Credits(v) => query.bind(v),
            ProfileChange::Role(role) => query.bind(role.as_str()),
            ProfileChange::Status(status) => query.bind(status.as_str()),
            ProfileChange::AvatarGroup(group) => query.bind(group),
            ProfileChange::AvatarUrl(url) => query.bind(url),
            ProfileChange::Details {
                full_name,
                avatar_url,
            } => query.bind(full_name).bind(avatar_url),
            ProfileChange::Onboarding {
                goal,
                role,
                persona,
            } => query.bind(goal).bind(role).bind(persona),
        };
        self.fetch_profile(query).await
    }

    async fn consume_credits(&self, id: Uuid, amount: i32) -> anyhow::Result<Option<Profile>> {
        let sql = format!(
            r#"
            UPDATE profiles
            SET credit_balance = GREATEST(credit_balance - $2, 0), updated_at = now()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        );
        self.fetch_profile(sqlx::query_as::<_, ProfileRow>(&sql).bind(id).bind(amount))
            .await
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
