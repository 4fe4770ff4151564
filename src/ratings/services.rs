use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::RateRequest,
    repo_types::{Rating, RatingSummary},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

#[instrument(skip(state, req), fields(rating = req.rating))]
pub async fn rate_recipe(
    state: &AppState,
    user_id: Uuid,
    recipe_id: Uuid,
    req: RateRequest,
) -> AppResult<Rating> {
    let (value, review) = req.validated()?;
    if !state.db.recipes().exists(recipe_id).await? {
        return Err(AppError::not_found("Recipe"));
    }
    let saved = state
        .db
        .ratings()
        .upsert(user_id, recipe_id, value, review.as_deref())
        .await?;
    info!(%user_id, %recipe_id, value, "recipe rated");
    Ok(saved)
}

pub async fn get_user_rating(
    state: &AppState,
    user_id: Uuid,
    recipe_id: Uuid,
) -> AppResult<Option<Rating>> {
    Ok(state.db.ratings().get(user_id, recipe_id).await?)
}

#[instrument(skip(state))]
pub async fn get_recipe_ratings(state: &AppState, recipe_id: Uuid) -> AppResult<RatingSummary> {
    if !state.db.recipes().exists(recipe_id).await? {
        return Err(AppError::not_found("Recipe"));
    }
    let ratings = state.db.ratings().list_for_recipe(recipe_id).await?;
    Ok(RatingSummary::from_ratings(recipe_id, ratings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::services::register, recipes::services::{create_recipe, tests::new_recipe}};

    fn rate(value: i32, review: Option<&str>) -> RateRequest {
        RateRequest {
            rating: value,
            review: review.map(Into::into),
        }
    }

    #[tokio::test]
    async fn rerating_keeps_one_row_with_latest_value() {
        let state = AppState::fake();
        let user = register(&state, "r@x.io", "password1").await.unwrap().user_id();
        let recipe = create_recipe(&state, user, new_recipe("Curry")).await.unwrap();

        let first = rate_recipe(&state, user, recipe.id, rate(2, Some("bland"))).await.unwrap();
        let second = rate_recipe(&state, user, recipe.id, rate(5, Some("better with chili")))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);

        let summary = get_recipe_ratings(&state, recipe.id).await.unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.ratings[0].rating, 5);
        assert_eq!(summary.ratings[0].review.as_deref(), Some("better with chili"));

        let mine = get_user_rating(&state, user, recipe.id).await.unwrap().unwrap();
        assert_eq!(mine.rating, 5);
    }

    #[tokio::test]
    async fn summary_averages_across_users() {
        let state = AppState::fake();
        let a = register(&state, "ra@x.io", "password1").await.unwrap().user_id();
        let b = register(&state, "rb@x.io", "password1").await.unwrap().user_id();
        let recipe = create_recipe(&state, a, new_recipe("Pho")).await.unwrap();

        let empty = get_recipe_ratings(&state, recipe.id).await.unwrap();
        assert_eq!(empty.average, None);

        rate_recipe(&state, a, recipe.id, rate(4, None)).await.unwrap();
        rate_recipe(&state, b, recipe.id, rate(5, None)).await.unwrap();
        let summary = get_recipe_ratings(&state, recipe.id).await.unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.average, Some(4.5));
    }

    #[tokio::test]
    async fn invalid_value_is_rejected_before_lookup() {
        let state = AppState::fake();
        let err = rate_recipe(&state, Uuid::new_v4(), Uuid::new_v4(), rate(9, None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = rate_recipe(&state, Uuid::new_v4(), Uuid::new_v4(), rate(3, None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
