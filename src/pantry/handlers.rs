use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{ExpiringQuery, NewPantryItem, PantryItemPatch},
    repo_types::PantryItem,
    services,
};
use crate::{auth::AuthUser, error::AppResult, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pantry", get(list_items).post(add_item))
        .route("/pantry/expiring", get(expiring))
        .route("/pantry/:id", patch(update_item).delete(delete_item))
}

#[instrument(skip(state))]
async fn list_items(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<PantryItem>>> {
    Ok(Json(services::fetch_pantry(&state, user_id).await?))
}

#[instrument(skip(state, body))]
async fn add_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<NewPantryItem>,
) -> AppResult<(StatusCode, Json<PantryItem>)> {
    let item = services::add_pantry_item(&state, user_id, body).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state, body))]
async fn update_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<PantryItemPatch>,
) -> AppResult<Json<PantryItem>> {
    Ok(Json(services::update_pantry_item(&state, user_id, id, body).await?))
}

#[instrument(skip(state))]
async fn delete_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    services::delete_pantry_item(&state, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
async fn expiring(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ExpiringQuery>,
) -> AppResult<Json<Vec<PantryItem>>> {
    Ok(Json(services::expiring_items(&state, user_id, q.days).await?))
}
