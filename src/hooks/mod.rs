//! Per-screen state containers for native clients.
//!
//! A hook owns a [`Resource`] per screen read, calls domain services in
//! process, and re-reads after every mutation. Construction requires a live
//! [`Session`]; an invalid or expired token yields `AppError::Unauthorized` and
//! the caller should prompt for a new sign-in.

pub mod chat;
pub mod favorites;
pub mod meal_plan;
pub mod notify;
pub mod pantry;
pub mod recipes;
pub mod resource;

use tracing::warn;
use uuid::Uuid;

use crate::{auth::Session, error::AppError, state::AppState};

pub use chat::ChatHook;
pub use favorites::FavoritesHook;
pub use meal_plan::MealPlanHook;
pub use notify::{Notifier, Toast, ToastKind, ToastLog, TracingNotifier};
pub use pantry::PantryHook;
pub use recipes::{RecipeDetail, RecipeDetailHook, RecipesHook};
pub use resource::Resource;

/// Resolves the session to its user id, rejecting stale or forged tokens.
pub(crate) fn authorize(state: &AppState, session: &Session) -> Result<Uuid, AppError> {
    let claims = state.jwt.verify_access(&session.access_token).map_err(|e| {
        warn!(error = %e, "hook session rejected");
        AppError::Unauthorized("Session expired, please sign in again".into())
    })?;
    if claims.sub != session.user_id() {
        return Err(AppError::Unauthorized("Session does not match user".into()));
    }
    Ok(claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{services::register, PublicUser};

    #[tokio::test]
    async fn forged_sessions_are_rejected() {
        let state = AppState::fake();
        let session = register(&state, "h@x.io", "password1").await.unwrap();
        assert_eq!(authorize(&state, &session).unwrap(), session.user_id());

        let mut bad = session.clone();
        bad.access_token = "garbage".into();
        assert!(matches!(authorize(&state, &bad), Err(AppError::Unauthorized(_))));

        let mut other = session.clone();
        other.user = PublicUser {
            id: Uuid::new_v4(),
            email: "o@x.io".into(),
        };
        assert!(matches!(authorize(&state, &other), Err(AppError::Unauthorized(_))));
    }
}
