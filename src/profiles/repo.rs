use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::{Profile, ProfileRow, Role};
use crate::db::PgStore;

const PROFILE_COLUMNS: &str = "id, display_name, avatar_url, dietary_preferences, \
     cuisine_preferences, allergies, role, created_at, updated_at";

#[async_trait]
pub trait ProfileRepo: Send + Sync {
    async fn create(&self, user_id: Uuid, display_name: Option<String>) -> anyhow::Result<Profile>;
    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>>;
    /// Writes every mutable column of `profile`; `None` when the row is gone.
    async fn update(&self, profile: &Profile) -> anyhow::Result<Option<Profile>>;
    async fn role(&self, user_id: Uuid) -> anyhow::Result<Option<Role>>;
}

#[async_trait]
impl ProfileRepo for PgStore {
    async fn create(&self, user_id: Uuid, display_name: Option<String>) -> anyhow::Result<Profile> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            INSERT INTO profiles (id, display_name)
            VALUES ($1, $2)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(display_name)
        .fetch_one(&self.db)
        .await?;
        row.try_into()
    }

    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        row.map(Profile::try_from).transpose()
    }

    async fn update(&self, profile: &Profile) -> anyhow::Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            UPDATE profiles
               SET display_name = $2,
                   avatar_url = $3,
                   dietary_preferences = $4,
                   cuisine_preferences = $5,
                   allergies = $6,
                   updated_at = now()
             WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(profile.id)
        .bind(&profile.display_name)
        .bind(&profile.avatar_url)
        .bind(&profile.dietary_preferences)
        .bind(&profile.cuisine_preferences)
        .bind(&profile.allergies)
        .fetch_optional(&self.db)
        .await?;
        row.map(Profile::try_from).transpose()
    }

    async fn role(&self, user_id: Uuid) -> anyhow::Result<Option<Role>> {
        let role: Option<String> = sqlx::query_scalar("SELECT get_user_role($1)")
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;
        role.map(|r| r.parse()).transpose()
    }
}
