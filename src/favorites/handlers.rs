use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use super::services;
use crate::{auth::AuthUser, error::AppResult, recipes::Recipe, state::AppState};

#[derive(Debug, Serialize)]
pub struct FavoriteStatus {
    pub recipe_id: Uuid,
    pub favorite: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/favorites", get(list_favorites))
        .route(
            "/recipes/:id/favorite",
            get(status).post(add).delete(remove),
        )
        .route("/recipes/:id/favorite/toggle", post(toggle))
}

#[instrument(skip(state))]
async fn list_favorites(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<Recipe>>> {
    Ok(Json(services::list_favorites(&state, user_id).await?))
}

#[instrument(skip(state))]
async fn status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(recipe_id): Path<Uuid>,
) -> AppResult<Json<FavoriteStatus>> {
    let favorite = services::is_favorite(&state, user_id, recipe_id).await?;
    Ok(Json(FavoriteStatus { recipe_id, favorite }))
}

#[instrument(skip(state))]
async fn add(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(recipe_id): Path<Uuid>,
) -> AppResult<Json<FavoriteStatus>> {
    services::add_favorite(&state, user_id, recipe_id).await?;
    Ok(Json(FavoriteStatus { recipe_id, favorite: true }))
}

#[instrument(skip(state))]
async fn remove(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(recipe_id): Path<Uuid>,
) -> AppResult<Json<FavoriteStatus>> {
    services::remove_favorite(&state, user_id, recipe_id).await?;
    Ok(Json(FavoriteStatus { recipe_id, favorite: false }))
}

#[instrument(skip(state))]
async fn toggle(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(recipe_id): Path<Uuid>,
) -> AppResult<Json<FavoriteStatus>> {
    let favorite = services::toggle_favorite(&state, user_id, recipe_id).await?;
    Ok(Json(FavoriteStatus { recipe_id, favorite }))
}
