use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, RefreshRequest, RegisterRequest, Session},
        jwt::AuthUser,
        services,
    },
    error::AppResult,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<Session>> {
    let session = services::register(&state, &payload.email, &payload.password).await?;
    Ok(Json(session))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<Session>> {
    let session = services::sign_in(&state, &payload.email, &payload.password).await?;
    Ok(Json(session))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<Session>> {
    Ok(Json(services::refresh(&state, &payload.refresh_token).await?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PublicUser>> {
    Ok(Json(services::current_user(&state, user_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services;

    #[tokio::test]
    async fn me_returns_the_token_owner() {
        let state = AppState::fake();
        let session = services::register(&state, "me@x.io", "password1").await.unwrap();
        let Json(me) = get_me(State(state), AuthUser(session.user_id())).await.unwrap();
        assert_eq!(me, session.user);
        assert!(!serde_json::to_string(&me).unwrap().contains("password"));
    }
}
