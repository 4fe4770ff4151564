use async_trait::async_trait;
use time::Date;
use uuid::Uuid;

use super::repo_types::{MealPlanMeal, MealPlanMealRow, MealPlanRecord, MealType};
use crate::db::PgStore;

#[async_trait]
pub trait MealPlanRepo: Send + Sync {
    async fn find_plan(&self, user_id: Uuid, date: Date) -> anyhow::Result<Option<MealPlanRecord>>;
    async fn list_plans(&self, user_id: Uuid, from: Date, to: Date) -> anyhow::Result<Vec<MealPlanRecord>>;
    /// Returns the user's plan for `date`, creating it when absent.
    async fn ensure_plan(&self, user_id: Uuid, date: Date) -> anyhow::Result<MealPlanRecord>;
    async fn list_meals(&self, plan_ids: &[Uuid]) -> anyhow::Result<Vec<MealPlanMeal>>;
    async fn insert_meal(
        &self,
        plan_id: Uuid,
        recipe_id: Uuid,
        meal_type: MealType,
        time: Option<&str>,
    ) -> anyhow::Result<MealPlanMeal>;
    async fn delete_meal(&self, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
impl MealPlanRepo for PgStore {
    async fn find_plan(&self, user_id: Uuid, date: Date) -> anyhow::Result<Option<MealPlanRecord>> {
        let row = sqlx::query_as::<_, MealPlanRecord>(
            "SELECT id, user_id, plan_date FROM meal_plans WHERE user_id = $1 AND plan_date = $2",
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_plans(&self, user_id: Uuid, from: Date, to: Date) -> anyhow::Result<Vec<MealPlanRecord>> {
        let rows = sqlx::query_as::<_, MealPlanRecord>(
            r#"
            SELECT id, user_id, plan_date
            FROM meal_plans
            WHERE user_id = $1 AND plan_date BETWEEN $2 AND $3
            ORDER BY plan_date
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn ensure_plan(&self, user_id: Uuid, date: Date) -> anyhow::Result<MealPlanRecord> {
        let row = sqlx::query_as::<_, MealPlanRecord>(
            r#"
            INSERT INTO meal_plans (user_id, plan_date)
            VALUES ($1, $2)
            ON CONFLICT (user_id, plan_date) DO UPDATE SET plan_date = EXCLUDED.plan_date
            RETURNING id, user_id, plan_date
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_meals(&self, plan_ids: &[Uuid]) -> anyhow::Result<Vec<MealPlanMeal>> {
        if plan_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, MealPlanMealRow>(
            r#"
            SELECT m.id, m.meal_plan_id, m.recipe_id,
                   r.title AS recipe_title, r.image_url AS recipe_image_url,
                   m.meal_type, m.meal_time, m.created_at
              FROM meal_plan_meals m
              JOIN recipes r ON r.id = m.recipe_id
             WHERE m.meal_plan_id = ANY($1)
             ORDER BY m.created_at
            "#,
        )
        .bind(plan_ids)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(MealPlanMeal::try_from).collect()
    }

    async fn insert_meal(
        &self,
        plan_id: Uuid,
        recipe_id: Uuid,
        meal_type: MealType,
        time: Option<&str>,
    ) -> anyhow::Result<MealPlanMeal> {
        let row = sqlx::query_as::<_, MealPlanMealRow>(
            r#"
            WITH inserted AS (
                INSERT INTO meal_plan_meals (meal_plan_id, recipe_id, meal_type, meal_time)
                VALUES ($1, $2, $3, $4)
                RETURNING id, meal_plan_id, recipe_id, meal_type, meal_time, created_at
            )
            SELECT i.id, i.meal_plan_id, i.recipe_id,
                   r.title AS recipe_title, r.image_url AS recipe_image_url,
                   i.meal_type, i.meal_time, i.created_at
              FROM inserted i
              JOIN recipes r ON r.id = i.recipe_id
            "#,
        )
        .bind(plan_id)
        .bind(recipe_id)
        .bind(meal_type.as_str())
        .bind(time)
        .fetch_one(&self.db)
        .await?;
        row.try_into()
    }

    async fn delete_meal(&self, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            DELETE FROM meal_plan_meals m
             USING meal_plans p
             WHERE m.id = $1 AND m.meal_plan_id = p.id AND p.user_id = $2
            "#,
        )
        .bind(meal_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() > 0)
    }
}
