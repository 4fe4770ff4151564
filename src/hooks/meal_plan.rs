use std::sync::Arc;

use time::Date;
use uuid::Uuid;

use super::{authorize, notify::Notifier, resource::Resource};
use crate::{
    auth::Session,
    error::AppResult,
    meal_plans::{services, MealPlan, MealPlanMeal, MealType},
    state::AppState,
};

/// One day of the user's meal plan.
pub struct MealPlanHook {
    state: AppState,
    user_id: Uuid,
    notifier: Arc<dyn Notifier>,
    date: Date,
    plan: Resource<MealPlan>,
}

impl MealPlanHook {
    pub fn new(
        state: AppState,
        session: &Session,
        notifier: Arc<dyn Notifier>,
        date: Date,
    ) -> AppResult<Self> {
        let user_id = authorize(&state, session)?;
        Ok(Self {
            state,
            user_id,
            notifier,
            date,
            plan: Resource::default(),
        })
    }

    pub fn date(&self) -> Date {
        self.date
    }

    pub fn plan(&self) -> &Resource<MealPlan> {
        &self.plan
    }

    pub async fn refetch(&mut self) -> bool {
        self.plan
            .load(
                services::get_meal_plan(&self.state, self.user_id, self.date),
                self.notifier.as_ref(),
            )
            .await
    }

    /// Switches the selected day and loads it.
    pub async fn select_date(&mut self, date: Date) -> bool {
        self.date = date;
        self.refetch().await
    }

    pub async fn add_meal(
        &mut self,
        recipe_id: Uuid,
        meal_type: MealType,
        time: Option<&str>,
    ) -> Option<MealPlanMeal> {
        self.plan
            .mutate(
                services::add_meal_to_plan(
                    &self.state,
                    self.user_id,
                    self.date,
                    recipe_id,
                    meal_type,
                    time,
                ),
                services::get_meal_plan(&self.state, self.user_id, self.date),
                self.notifier.as_ref(),
            )
            .await
    }

    pub async fn remove_meal(&mut self, meal_id: Uuid) -> bool {
        self.plan
            .mutate(
                services::remove_meal_from_plan(&self.state, self.user_id, meal_id),
                services::get_meal_plan(&self.state, self.user_id, self.date),
                self.notifier.as_ref(),
            )
            .await
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::{
        auth::services::register,
        hooks::ToastLog,
        recipes::services::{create_recipe, tests::new_recipe},
    };

    #[tokio::test]
    async fn empty_day_then_planned_meal() {
        let state = AppState::fake();
        let session = register(&state, "mp@x.io", "password1").await.unwrap();
        let recipe = create_recipe(&state, session.user_id(), new_recipe("Oats"))
            .await
            .unwrap();
        let log = Arc::new(ToastLog::default());
        let mut hook = MealPlanHook::new(state, &session, log.clone(), date!(2024 - 05 - 01)).unwrap();

        assert!(hook.refetch().await);
        assert!(hook.plan().data().unwrap().meals.is_empty());

        let meal = hook
            .add_meal(recipe.id, MealType::Breakfast, Some("7:30"))
            .await
            .unwrap();
        assert_eq!(meal.scheduled_time.as_deref(), Some("07:30"));
        assert_eq!(hook.plan().data().unwrap().meals.len(), 1);

        assert!(hook.select_date(date!(2024 - 05 - 02)).await);
        assert!(hook.plan().data().unwrap().meals.is_empty());

        assert!(hook.add_meal(Uuid::new_v4(), MealType::Lunch, None).await.is_none());
        assert_eq!(log.errors().len(), 1);
    }
}
