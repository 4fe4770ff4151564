use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::RateRequest,
    repo_types::{Rating, RatingSummary},
    services,
};
use crate::{auth::AuthUser, error::AppResult, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipes/:id/rating", get(my_rating).put(rate))
        .route("/recipes/:id/ratings", get(recipe_ratings))
}

#[instrument(skip(state))]
async fn my_rating(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(recipe_id): Path<Uuid>,
) -> AppResult<Json<Option<Rating>>> {
    Ok(Json(services::get_user_rating(&state, user_id, recipe_id).await?))
}

#[instrument(skip(state, req))]
async fn rate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(recipe_id): Path<Uuid>,
    Json(req): Json<RateRequest>,
) -> AppResult<Json<Rating>> {
    Ok(Json(services::rate_recipe(&state, user_id, recipe_id, req).await?))
}

#[instrument(skip(state))]
async fn recipe_ratings(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
) -> AppResult<Json<RatingSummary>> {
    Ok(Json(services::get_recipe_ratings(&state, recipe_id).await?))
}
