use std::sync::Arc;

use uuid::Uuid;

use super::{authorize, notify::Notifier, resource::Resource, Toast};
use crate::{
    auth::Session,
    error::AppResult,
    pantry::{
        dto::{NewPantryItem, PantryItemPatch},
        services, PantryItem,
    },
    state::AppState,
};

pub struct PantryHook {
    state: AppState,
    user_id: Uuid,
    notifier: Arc<dyn Notifier>,
    items: Resource<Vec<PantryItem>>,
}

impl PantryHook {
    pub fn new(state: AppState, session: &Session, notifier: Arc<dyn Notifier>) -> AppResult<Self> {
        let user_id = authorize(&state, session)?;
        Ok(Self {
            state,
            user_id,
            notifier,
            items: Resource::default(),
        })
    }

    pub fn items(&self) -> &Resource<Vec<PantryItem>> {
        &self.items
    }

    pub async fn refetch(&mut self) -> bool {
        self.items
            .load(
                services::fetch_pantry(&self.state, self.user_id),
                self.notifier.as_ref(),
            )
            .await
    }

    pub async fn add(&mut self, item: NewPantryItem) -> Option<PantryItem> {
        let added = self
            .items
            .mutate(
                services::add_pantry_item(&self.state, self.user_id, item),
                services::fetch_pantry(&self.state, self.user_id),
                self.notifier.as_ref(),
            )
            .await?;
        self.notifier
            .notify(Toast::success("Item added", format!("{} added to your pantry", added.name)));
        Some(added)
    }

    pub async fn update(&mut self, id: Uuid, patch: PantryItemPatch) -> Option<PantryItem> {
        self.items
            .mutate(
                services::update_pantry_item(&self.state, self.user_id, id, patch),
                services::fetch_pantry(&self.state, self.user_id),
                self.notifier.as_ref(),
            )
            .await
    }

    pub async fn remove(&mut self, id: Uuid) -> bool {
        self.items
            .mutate(
                services::delete_pantry_item(&self.state, self.user_id, id),
                services::fetch_pantry(&self.state, self.user_id),
                self.notifier.as_ref(),
            )
            .await
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::services::register, hooks::ToastLog};

    fn flour() -> NewPantryItem {
        NewPantryItem {
            name: "Flour".into(),
            quantity: 1.0,
            unit: Some("kg".into()),
            category: Some("Baking".into()),
            expiry_date: None,
        }
    }

    #[tokio::test]
    async fn mutations_refetch_the_list() {
        let state = AppState::fake();
        let session = register(&state, "ph@x.io", "password1").await.unwrap();
        let log = Arc::new(ToastLog::default());
        let mut hook = PantryHook::new(state, &session, log.clone()).unwrap();

        assert!(hook.refetch().await);
        assert_eq!(hook.items().data().map(Vec::len), Some(0));

        let added = hook.add(flour()).await.unwrap();
        assert_eq!(hook.items().data().unwrap()[0].id, added.id);

        assert!(hook.remove(added.id).await);
        assert!(hook.items().data().unwrap().is_empty());
        assert!(log.errors().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_raises_error_toast() {
        let state = AppState::fake();
        let session = register(&state, "pe@x.io", "password1").await.unwrap();
        let log = Arc::new(ToastLog::default());
        let mut hook = PantryHook::new(state, &session, log.clone()).unwrap();

        assert!(!hook.remove(Uuid::new_v4()).await);
        assert_eq!(hook.items().error(), Some("Pantry item not found"));
        assert_eq!(log.errors().len(), 1);
    }
}
