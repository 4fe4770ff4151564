use std::sync::Arc;

use uuid::Uuid;

use super::{authorize, notify::Notifier, resource::Resource};
use crate::{
    auth::Session,
    error::AppResult,
    favorites::services,
    recipes::Recipe,
    state::AppState,
};

pub struct FavoritesHook {
    state: AppState,
    user_id: Uuid,
    notifier: Arc<dyn Notifier>,
    favorites: Resource<Vec<Recipe>>,
}

impl FavoritesHook {
    pub fn new(state: AppState, session: &Session, notifier: Arc<dyn Notifier>) -> AppResult<Self> {
        let user_id = authorize(&state, session)?;
        Ok(Self {
            state,
            user_id,
            notifier,
            favorites: Resource::default(),
        })
    }

    pub fn favorites(&self) -> &Resource<Vec<Recipe>> {
        &self.favorites
    }

    /// Answers from the last loaded list.
    pub fn is_favorite(&self, recipe_id: Uuid) -> bool {
        self.favorites
            .data()
            .is_some_and(|list| list.iter().any(|r| r.id == recipe_id))
    }

    pub async fn refetch(&mut self) -> bool {
        self.favorites
            .load(
                services::list_favorites(&self.state, self.user_id),
                self.notifier.as_ref(),
            )
            .await
    }

    /// Returns the new favorite state.
    pub async fn toggle(&mut self, recipe_id: Uuid) -> Option<bool> {
        self.favorites
            .mutate(
                services::toggle_favorite(&self.state, self.user_id, recipe_id),
                services::list_favorites(&self.state, self.user_id),
                self.notifier.as_ref(),
            )
            .await
    }

    pub async fn remove(&mut self, recipe_id: Uuid) -> bool {
        self.favorites
            .mutate(
                services::remove_favorite(&self.state, self.user_id, recipe_id),
                services::list_favorites(&self.state, self.user_id),
                self.notifier.as_ref(),
            )
            .await
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::services::register,
        hooks::ToastLog,
        recipes::services::{create_recipe, tests::new_recipe},
    };

    #[tokio::test]
    async fn toggle_round_trip() {
        let state = AppState::fake();
        let session = register(&state, "fh@x.io", "password1").await.unwrap();
        let recipe = create_recipe(&state, session.user_id(), new_recipe("Gnocchi"))
            .await
            .unwrap();
        let mut hook = FavoritesHook::new(state, &session, Arc::new(ToastLog::default())).unwrap();

        assert!(hook.refetch().await);
        assert!(!hook.is_favorite(recipe.id));
        assert_eq!(hook.toggle(recipe.id).await, Some(true));
        assert!(hook.is_favorite(recipe.id));
        assert!(hook.remove(recipe.id).await);
        assert!(!hook.is_favorite(recipe.id));
    }
}
