use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{NewRecipe, RecipeFilters, RecipePatch},
    repo_types::Recipe,
    services,
};
use crate::{
    auth::AuthUser,
    error::AppResult,
    profiles::{handlers::content_type, services::MAX_IMAGE_BYTES},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/:id",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route(
            "/recipes/:id/image",
            put(upload_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
}

#[instrument(skip(state))]
async fn list_recipes(
    State(state): State<AppState>,
    Query(filters): Query<RecipeFilters>,
) -> AppResult<Json<Vec<Recipe>>> {
    Ok(Json(services::fetch_recipes(&state, &filters).await?))
}

#[instrument(skip(state))]
async fn get_recipe(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<Recipe>> {
    Ok(Json(services::get_recipe(&state, id).await?))
}

#[instrument(skip(state, body))]
async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<NewRecipe>,
) -> AppResult<(StatusCode, HeaderMap, Json<Recipe>)> {
    let recipe = services::create_recipe(&state, user_id, body).await?;
    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/recipes/{}", recipe.id).parse() {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(recipe)))
}

#[instrument(skip(state, patch))]
async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<RecipePatch>,
) -> AppResult<Json<Recipe>> {
    Ok(Json(services::update_recipe(&state, user_id, id, patch).await?))
}

#[instrument(skip(state))]
async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    services::delete_recipe(&state, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, headers, body))]
async fn upload_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<Recipe>> {
    let ct = content_type(&headers);
    Ok(Json(
        services::upload_recipe_image(&state, user_id, id, body, &ct).await?,
    ))
}
