use std::collections::HashMap;

use time::{Date, Duration};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{normalize_time, MAX_RANGE_DAYS},
    repo_types::{meal_order, MealPlan, MealPlanMeal, MealType},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    storage::resolve_image_url,
};

async fn resolve_meals(state: &AppState, meals: Vec<MealPlanMeal>) -> AppResult<Vec<MealPlanMeal>> {
    let mut out = Vec::with_capacity(meals.len());
    for mut m in meals {
        m.recipe_image_url = resolve_image_url(state.storage.as_ref(), m.recipe_image_url.take()).await?;
        out.push(m);
    }
    Ok(out)
}

/// A date with nothing planned yields an empty meal list.
#[instrument(skip(state))]
pub async fn get_meal_plan(state: &AppState, user_id: Uuid, date: Date) -> AppResult<MealPlan> {
    let Some(plan) = state.db.meal_plans().find_plan(user_id, date).await? else {
        return Ok(MealPlan {
            id: None,
            date,
            meals: Vec::new(),
        });
    };
    let mut meals = state.db.meal_plans().list_meals(&[plan.id]).await?;
    meals.sort_by(meal_order);
    Ok(MealPlan {
        id: Some(plan.id),
        date,
        meals: resolve_meals(state, meals).await?,
    })
}

/// One entry per day in `from..=to`, empty days included.
#[instrument(skip(state))]
pub async fn get_meal_plans(
    state: &AppState,
    user_id: Uuid,
    from: Date,
    to: Date,
) -> AppResult<Vec<MealPlan>> {
    if to < from {
        return Err(AppError::validation("`to` must not be before `from`"));
    }
    if (to - from).whole_days() >= MAX_RANGE_DAYS {
        return Err(AppError::validation(format!(
            "range must be shorter than {MAX_RANGE_DAYS} days"
        )));
    }

    let plans = state.db.meal_plans().list_plans(user_id, from, to).await?;
    let ids: Vec<Uuid> = plans.iter().map(|p| p.id).collect();
    let meals = resolve_meals(state, state.db.meal_plans().list_meals(&ids).await?).await?;

    let mut by_plan: HashMap<Uuid, Vec<MealPlanMeal>> = HashMap::new();
    for m in meals {
        by_plan.entry(m.meal_plan_id).or_default().push(m);
    }
    let plan_by_date: HashMap<Date, Uuid> = plans.iter().map(|p| (p.plan_date, p.id)).collect();

    let mut out = Vec::new();
    let mut day = from;
    while day <= to {
        let id = plan_by_date.get(&day).copied();
        let mut day_meals = id.and_then(|id| by_plan.remove(&id)).unwrap_or_default();
        day_meals.sort_by(meal_order);
        out.push(MealPlan {
            id,
            date: day,
            meals: day_meals,
        });
        day += Duration::days(1);
    }
    Ok(out)
}

#[instrument(skip(state))]
pub async fn add_meal_to_plan(
    state: &AppState,
    user_id: Uuid,
    date: Date,
    recipe_id: Uuid,
    meal_type: MealType,
    time: Option<&str>,
) -> AppResult<MealPlanMeal> {
    let time = time
        .filter(|t| !t.trim().is_empty())
        .map(normalize_time)
        .transpose()?;

    if !state.db.recipes().exists(recipe_id).await? {
        return Err(AppError::not_found("Recipe"));
    }

    let plan = state.db.meal_plans().ensure_plan(user_id, date).await?;
    let mut meal = state
        .db
        .meal_plans()
        .insert_meal(plan.id, recipe_id, meal_type, time.as_deref())
        .await?;
    meal.recipe_image_url = resolve_image_url(state.storage.as_ref(), meal.recipe_image_url.take()).await?;
    info!(meal_id = %meal.id, plan_id = %plan.id, %date, "meal planned");
    Ok(meal)
}

#[instrument(skip(state))]
pub async fn remove_meal_from_plan(state: &AppState, user_id: Uuid, meal_id: Uuid) -> AppResult<()> {
    if !state.db.meal_plans().delete_meal(user_id, meal_id).await? {
        return Err(AppError::not_found("Planned meal"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::services::register, recipes::services::{create_recipe, tests::new_recipe}};
    use time::macros::date;

    #[tokio::test]
    async fn empty_date_returns_empty_plan() {
        let state = AppState::fake();
        let plan = get_meal_plan(&state, Uuid::new_v4(), date!(2024 - 03 - 01)).await.unwrap();
        assert!(plan.id.is_none());
        assert!(plan.meals.is_empty());
    }

    #[tokio::test]
    async fn adding_meals_creates_one_plan_per_date() {
        let state = AppState::fake();
        let user = register(&state, "mp@x.io", "password1").await.unwrap().user_id();
        let recipe = create_recipe(&state, user, new_recipe("Oats")).await.unwrap();
        let day = date!(2024 - 05 - 10);

        let dinner = add_meal_to_plan(&state, user, day, recipe.id, MealType::Dinner, Some("19:00"))
            .await
            .unwrap();
        let breakfast = add_meal_to_plan(&state, user, day, recipe.id, MealType::Breakfast, Some("7:15"))
            .await
            .unwrap();
        assert_eq!(dinner.meal_plan_id, breakfast.meal_plan_id);
        assert_eq!(breakfast.scheduled_time.as_deref(), Some("07:15"));
        assert_eq!(breakfast.recipe_title, "Oats");

        let plan = get_meal_plan(&state, user, day).await.unwrap();
        let kinds: Vec<_> = plan.meals.iter().map(|m| m.meal_type).collect();
        assert_eq!(kinds, vec![MealType::Breakfast, MealType::Dinner]);

        remove_meal_from_plan(&state, user, dinner.id).await.unwrap();
        assert_eq!(get_meal_plan(&state, user, day).await.unwrap().meals.len(), 1);
    }

    #[tokio::test]
    async fn unknown_recipe_and_bad_time_are_rejected() {
        let state = AppState::fake();
        let user = Uuid::new_v4();
        let day = date!(2024 - 05 - 10);

        let err = add_meal_to_plan(&state, user, day, Uuid::new_v4(), MealType::Lunch, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = add_meal_to_plan(&state, user, day, Uuid::new_v4(), MealType::Lunch, Some("25:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // nothing was created by the failed attempts
        assert!(get_meal_plan(&state, user, day).await.unwrap().id.is_none());
    }

    #[tokio::test]
    async fn range_includes_empty_days_and_other_users_are_isolated() {
        let state = AppState::fake();
        let user = register(&state, "wk@x.io", "password1").await.unwrap().user_id();
        let other = register(&state, "ot@x.io", "password1").await.unwrap().user_id();
        let recipe = create_recipe(&state, user, new_recipe("Curry")).await.unwrap();

        add_meal_to_plan(&state, user, date!(2024 - 06 - 02), recipe.id, MealType::Lunch, None)
            .await
            .unwrap();
        add_meal_to_plan(&state, other, date!(2024 - 06 - 02), recipe.id, MealType::Lunch, None)
            .await
            .unwrap();

        let week = get_meal_plans(&state, user, date!(2024 - 06 - 01), date!(2024 - 06 - 07))
            .await
            .unwrap();
        assert_eq!(week.len(), 7);
        assert_eq!(week[1].meals.len(), 1);
        assert!(week[0].meals.is_empty());

        assert!(get_meal_plans(&state, user, date!(2024 - 06 - 07), date!(2024 - 06 - 01))
            .await
            .is_err());
    }
}
