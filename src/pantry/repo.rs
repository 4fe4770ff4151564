use async_trait::async_trait;
use time::Date;
use uuid::Uuid;

use super::repo_types::PantryItem;
use crate::db::PgStore;

const PANTRY_COLUMNS: &str =
    "id, user_id, name, quantity, unit, category, expiry_date, created_at, updated_at";

/// Every method is scoped to the owning user.
#[async_trait]
pub trait PantryRepo: Send + Sync {
    async fn list(&self, user_id: Uuid) -> anyhow::Result<Vec<PantryItem>>;
    async fn get(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<PantryItem>>;
    async fn insert(&self, item: &PantryItem) -> anyhow::Result<PantryItem>;
    async fn update(&self, item: &PantryItem) -> anyhow::Result<Option<PantryItem>>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
    async fn expiring(&self, user_id: Uuid, until: Date) -> anyhow::Result<Vec<PantryItem>>;
}

#[async_trait]
impl PantryRepo for PgStore {
    async fn list(&self, user_id: Uuid) -> anyhow::Result<Vec<PantryItem>> {
        let rows = sqlx::query_as::<_, PantryItem>(&format!(
            r#"
            SELECT {PANTRY_COLUMNS}
            FROM pantry_items
            WHERE user_id = $1
            ORDER BY expiry_date ASC NULLS LAST, lower(name) ASC, id
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<PantryItem>> {
        let row = sqlx::query_as::<_, PantryItem>(&format!(
            "SELECT {PANTRY_COLUMNS} FROM pantry_items WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn insert(&self, item: &PantryItem) -> anyhow::Result<PantryItem> {
        let row = sqlx::query_as::<_, PantryItem>(&format!(
            r#"
            INSERT INTO pantry_items (id, user_id, name, quantity, unit, category, expiry_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PANTRY_COLUMNS}
            "#
        ))
        .bind(item.id)
        .bind(item.user_id)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(&item.category)
        .bind(item.expiry_date)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn update(&self, item: &PantryItem) -> anyhow::Result<Option<PantryItem>> {
        let row = sqlx::query_as::<_, PantryItem>(&format!(
            r#"
            UPDATE pantry_items
               SET name = $3, quantity = $4, unit = $5, category = $6, expiry_date = $7,
                   updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {PANTRY_COLUMNS}
            "#
        ))
        .bind(item.id)
        .bind(item.user_id)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(&item.category)
        .bind(item.expiry_date)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM pantry_items WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn expiring(&self, user_id: Uuid, until: Date) -> anyhow::Result<Vec<PantryItem>> {
        let rows = sqlx::query_as::<_, PantryItem>(&format!(
            r#"
            SELECT {PANTRY_COLUMNS}
            FROM pantry_items
            WHERE user_id = $1 AND expiry_date IS NOT NULL AND expiry_date <= $2
            ORDER BY expiry_date ASC, lower(name) ASC, id
            "#
        ))
        .bind(user_id)
        .bind(until)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
