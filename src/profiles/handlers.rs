use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use super::{dto::ProfilePatch, repo_types::Profile, services};
use crate::{auth::AuthUser, error::AppResult, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(get_profile).patch(update_profile).delete(delete_account),
        )
        .route(
            "/profile/avatar",
            put(upload_avatar).layer(DefaultBodyLimit::max(services::MAX_IMAGE_BYTES)),
        )
}

pub(crate) fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string()
}

#[instrument(skip(state))]
async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Profile>> {
    Ok(Json(services::get_profile(&state, user_id).await?))
}

#[instrument(skip(state, patch))]
async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(patch): Json<ProfilePatch>,
) -> AppResult<Json<Profile>> {
    Ok(Json(services::update_profile(&state, user_id, patch).await?))
}

#[instrument(skip(state, headers, body))]
async fn upload_avatar(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<Profile>> {
    let ct = content_type(&headers);
    Ok(Json(services::upload_avatar(&state, user_id, body, &ct).await?))
}

#[instrument(skip(state))]
async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<StatusCode> {
    services::delete_account(&state, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
