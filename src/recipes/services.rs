use bytes::Bytes;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{validate_recipe, NewRecipe, RecipeFilters, RecipePatch},
    repo_types::Recipe,
};
use crate::{
    error::{AppError, AppResult},
    profiles::{services::check_image, Role},
    state::AppState,
    storage::{image_key, resolve_image_url},
};

pub(crate) async fn with_resolved_image(state: &AppState, mut recipe: Recipe) -> AppResult<Recipe> {
    recipe.image_url = resolve_image_url(state.storage.as_ref(), recipe.image_url.take()).await?;
    Ok(recipe)
}

pub(crate) async fn resolve_all(state: &AppState, recipes: Vec<Recipe>) -> AppResult<Vec<Recipe>> {
    let mut out = Vec::with_capacity(recipes.len());
    for r in recipes {
        out.push(with_resolved_image(state, r).await?);
    }
    Ok(out)
}

async fn load(state: &AppState, id: Uuid) -> AppResult<Recipe> {
    state
        .db
        .recipes()
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Recipe"))
}

/// Authors edit their own recipes; admins edit any.
async fn ensure_can_edit(state: &AppState, user_id: Uuid, recipe: &Recipe) -> AppResult<()> {
    if recipe.author_id == user_id {
        return Ok(());
    }
    if state.db.profiles().role(user_id).await? == Some(Role::Admin) {
        return Ok(());
    }
    Err(AppError::Forbidden("Only the author can modify this recipe".into()))
}

#[instrument(skip(state))]
pub async fn fetch_recipes(state: &AppState, filters: &RecipeFilters) -> AppResult<Vec<Recipe>> {
    let recipes = state.db.recipes().list(filters).await?;
    resolve_all(state, recipes).await
}

#[instrument(skip(state))]
pub async fn get_recipe(state: &AppState, id: Uuid) -> AppResult<Recipe> {
    let recipe = load(state, id).await?;
    with_resolved_image(state, recipe).await
}

#[instrument(skip(state, new), fields(title = %new.title))]
pub async fn create_recipe(state: &AppState, author_id: Uuid, new: NewRecipe) -> AppResult<Recipe> {
    let recipe = new.into_recipe(author_id);
    validate_recipe(&recipe)?;
    let saved = state.db.recipes().insert(&recipe).await?;
    info!(recipe_id = %saved.id, %author_id, "recipe created");
    with_resolved_image(state, saved).await
}

#[instrument(skip(state, patch))]
pub async fn update_recipe(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
    patch: RecipePatch,
) -> AppResult<Recipe> {
    let mut recipe = load(state, id).await?;
    ensure_can_edit(state, user_id, &recipe).await?;
    patch.apply(&mut recipe);
    validate_recipe(&recipe)?;
    let saved = state
        .db
        .recipes()
        .update(&recipe)
        .await?
        .ok_or_else(|| AppError::not_found("Recipe"))?;
    with_resolved_image(state, saved).await
}

#[instrument(skip(state))]
pub async fn delete_recipe(state: &AppState, user_id: Uuid, id: Uuid) -> AppResult<()> {
    let recipe = load(state, id).await?;
    ensure_can_edit(state, user_id, &recipe).await?;
    if !state.db.recipes().delete(id).await? {
        return Err(AppError::not_found("Recipe"));
    }
    if let Some(key) = recipe.image_url.filter(|k| !k.contains("://")) {
        if let Err(e) = state.storage.delete_object(&key).await {
            warn!(error = %e, %key, "failed to delete recipe image");
        }
    }
    info!(recipe_id = %id, %user_id, "recipe deleted");
    Ok(())
}

#[instrument(skip(state, body), fields(size = body.len()))]
pub async fn upload_recipe_image(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
    body: Bytes,
    content_type: &str,
) -> AppResult<Recipe> {
    check_image(&body, content_type)?;
    let mut recipe = load(state, id).await?;
    ensure_can_edit(state, user_id, &recipe).await?;

    let key = image_key("recipes", id, content_type)
        .ok_or_else(|| AppError::validation("unsupported image type"))?;
    state.storage.put_object(&key, body, content_type).await?;

    let previous = recipe.image_url.replace(key);
    let saved = state
        .db
        .recipes()
        .update(&recipe)
        .await?
        .ok_or_else(|| AppError::not_found("Recipe"))?;
    if let Some(old) = previous.filter(|k| !k.contains("://")) {
        if let Err(e) = state.storage.delete_object(&old).await {
            warn!(error = %e, key = %old, "failed to delete previous recipe image");
        }
    }
    with_resolved_image(state, saved).await
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        auth::services::register,
        recipes::repo_types::{Difficulty, Ingredient, Macros},
    };

    pub(crate) fn new_recipe(title: &str) -> NewRecipe {
        NewRecipe {
            title: title.into(),
            description: Some("Comfort food".into()),
            image_url: None,
            prep_time_minutes: Some(10),
            cook_time_minutes: Some(20),
            servings: Some(4),
            difficulty: Difficulty::Easy,
            macros: Macros::default(),
            ingredients: vec![Ingredient {
                name: "Tomato".into(),
                quantity: Some(3.0),
                unit: None,
            }],
            instructions: vec!["Chop".into(), "Simmer".into()],
            categories: vec!["Dinner".into()],
            tags: vec!["vegetarian".into()],
        }
    }

    #[tokio::test]
    async fn create_fetch_and_filter() {
        let state = AppState::fake();
        let author = register(&state, "chef@x.io", "password1").await.unwrap().user_id();

        let soup = create_recipe(&state, author, new_recipe("Tomato Soup")).await.unwrap();
        create_recipe(&state, author, new_recipe("Pancakes")).await.unwrap();

        let got = get_recipe(&state, soup.id).await.unwrap();
        assert_eq!(got.instructions, vec!["Chop", "Simmer"]);

        let found = fetch_recipes(
            &state,
            &RecipeFilters {
                search: Some("soup".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, soup.id);
    }

    #[tokio::test]
    async fn only_author_may_edit_or_delete() {
        let state = AppState::fake();
        let author = register(&state, "a@x.io", "password1").await.unwrap().user_id();
        let other = register(&state, "o@x.io", "password1").await.unwrap().user_id();
        let recipe = create_recipe(&state, author, new_recipe("Stew")).await.unwrap();

        let err = update_recipe(&state, other, recipe.id, RecipePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(matches!(
            delete_recipe(&state, other, recipe.id).await.unwrap_err(),
            AppError::Forbidden(_)
        ));

        let updated = update_recipe(
            &state,
            author,
            recipe.id,
            RecipePatch {
                servings: Some(6),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.servings, Some(6));

        delete_recipe(&state, author, recipe.id).await.unwrap();
        assert!(matches!(
            get_recipe(&state, recipe.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn image_upload_sets_resolved_url() {
        let state = AppState::fake();
        let author = register(&state, "img@x.io", "password1").await.unwrap().user_id();
        let recipe = create_recipe(&state, author, new_recipe("Salad")).await.unwrap();

        let updated = upload_recipe_image(
            &state,
            author,
            recipe.id,
            Bytes::from_static(b"jpegdata"),
            "image/jpeg",
        )
        .await
        .unwrap();
        assert!(updated.image_url.unwrap().contains(&format!("recipes/{}/", recipe.id)));
    }
}
