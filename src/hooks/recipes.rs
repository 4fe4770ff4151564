use std::sync::Arc;

use uuid::Uuid;

use super::{authorize, notify::Notifier, resource::Resource, Toast};
use crate::{
    auth::Session,
    error::AppResult,
    favorites::services as favorites,
    ratings::{services as ratings, RateRequest, Rating, RatingSummary},
    recipes::{services, NewRecipe, Recipe, RecipeFilters},
    state::AppState,
};

/// Recipe browser: a filtered list plus create/delete.
pub struct RecipesHook {
    state: AppState,
    user_id: Uuid,
    notifier: Arc<dyn Notifier>,
    filters: RecipeFilters,
    recipes: Resource<Vec<Recipe>>,
}

impl RecipesHook {
    pub fn new(state: AppState, session: &Session, notifier: Arc<dyn Notifier>) -> AppResult<Self> {
        let user_id = authorize(&state, session)?;
        Ok(Self {
            state,
            user_id,
            notifier,
            filters: RecipeFilters::default(),
            recipes: Resource::default(),
        })
    }

    pub fn recipes(&self) -> &Resource<Vec<Recipe>> {
        &self.recipes
    }

    pub fn filters(&self) -> &RecipeFilters {
        &self.filters
    }

    pub async fn refetch(&mut self) -> bool {
        self.recipes
            .load(
                services::fetch_recipes(&self.state, &self.filters),
                self.notifier.as_ref(),
            )
            .await
    }

    /// Replaces the filters and reloads.
    pub async fn set_filters(&mut self, filters: RecipeFilters) -> bool {
        self.filters = filters;
        self.refetch().await
    }

    pub async fn create(&mut self, new: NewRecipe) -> Option<Recipe> {
        let created = self
            .recipes
            .mutate(
                services::create_recipe(&self.state, self.user_id, new),
                services::fetch_recipes(&self.state, &self.filters),
                self.notifier.as_ref(),
            )
            .await?;
        self.notifier
            .notify(Toast::success("Recipe created", created.title.clone()));
        Some(created)
    }

    pub async fn delete(&mut self, id: Uuid) -> bool {
        self.recipes
            .mutate(
                services::delete_recipe(&self.state, self.user_id, id),
                services::fetch_recipes(&self.state, &self.filters),
                self.notifier.as_ref(),
            )
            .await
            .is_some()
    }
}

/// Everything the recipe screen shows for the signed-in user.
#[derive(Debug, Clone)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub ratings: RatingSummary,
    pub my_rating: Option<Rating>,
    pub favorite: bool,
}

async fn fetch_detail(state: &AppState, user_id: Uuid, recipe_id: Uuid) -> AppResult<RecipeDetail> {
    Ok(RecipeDetail {
        recipe: services::get_recipe(state, recipe_id).await?,
        ratings: ratings::get_recipe_ratings(state, recipe_id).await?,
        my_rating: ratings::get_user_rating(state, user_id, recipe_id).await?,
        favorite: favorites::is_favorite(state, user_id, recipe_id).await?,
    })
}

pub struct RecipeDetailHook {
    state: AppState,
    user_id: Uuid,
    recipe_id: Uuid,
    notifier: Arc<dyn Notifier>,
    detail: Resource<RecipeDetail>,
}

impl RecipeDetailHook {
    pub fn new(
        state: AppState,
        session: &Session,
        notifier: Arc<dyn Notifier>,
        recipe_id: Uuid,
    ) -> AppResult<Self> {
        let user_id = authorize(&state, session)?;
        Ok(Self {
            state,
            user_id,
            recipe_id,
            notifier,
            detail: Resource::default(),
        })
    }

    pub fn detail(&self) -> &Resource<RecipeDetail> {
        &self.detail
    }

    pub async fn refetch(&mut self) -> bool {
        self.detail
            .load(
                fetch_detail(&self.state, self.user_id, self.recipe_id),
                self.notifier.as_ref(),
            )
            .await
    }

    pub async fn rate(&mut self, rating: i32, review: Option<String>) -> Option<Rating> {
        self.detail
            .mutate(
                ratings::rate_recipe(
                    &self.state,
                    self.user_id,
                    self.recipe_id,
                    RateRequest { rating, review },
                ),
                fetch_detail(&self.state, self.user_id, self.recipe_id),
                self.notifier.as_ref(),
            )
            .await
    }

    pub async fn toggle_favorite(&mut self) -> Option<bool> {
        self.detail
            .mutate(
                favorites::toggle_favorite(&self.state, self.user_id, self.recipe_id),
                fetch_detail(&self.state, self.user_id, self.recipe_id),
                self.notifier.as_ref(),
            )
            .await
    }
}
