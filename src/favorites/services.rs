use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    recipes::{services::resolve_all, Recipe},
    state::AppState,
};

async fn ensure_recipe(state: &AppState, recipe_id: Uuid) -> AppResult<()> {
    if state.db.recipes().exists(recipe_id).await? {
        Ok(())
    } else {
        Err(AppError::not_found("Recipe"))
    }
}

#[instrument(skip(state))]
pub async fn add_favorite(state: &AppState, user_id: Uuid, recipe_id: Uuid) -> AppResult<()> {
    ensure_recipe(state, recipe_id).await?;
    state.db.favorites().add(user_id, recipe_id).await?;
    info!(%user_id, %recipe_id, "recipe favorited");
    Ok(())
}

/// Removing a favorite that does not exist is not an error.
#[instrument(skip(state))]
pub async fn remove_favorite(state: &AppState, user_id: Uuid, recipe_id: Uuid) -> AppResult<()> {
    state.db.favorites().remove(user_id, recipe_id).await?;
    Ok(())
}

pub async fn is_favorite(state: &AppState, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool> {
    Ok(state.db.favorites().exists(user_id, recipe_id).await?)
}

#[instrument(skip(state))]
pub async fn toggle_favorite(state: &AppState, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool> {
    ensure_recipe(state, recipe_id).await?;
    Ok(state.db.favorites().toggle(user_id, recipe_id).await?)
}

#[instrument(skip(state))]
pub async fn list_favorites(state: &AppState, user_id: Uuid) -> AppResult<Vec<Recipe>> {
    let recipes = state.db.favorites().list_recipes(user_id).await?;
    resolve_all(state, recipes).await
}
