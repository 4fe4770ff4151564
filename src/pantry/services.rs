use time::{Duration, OffsetDateTime};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{validate_item, NewPantryItem, PantryItemPatch},
    repo_types::PantryItem,
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

const MAX_EXPIRY_WINDOW_DAYS: i64 = 365;

#[instrument(skip(state))]
pub async fn fetch_pantry(state: &AppState, user_id: Uuid) -> AppResult<Vec<PantryItem>> {
    Ok(state.db.pantry().list(user_id).await?)
}

#[instrument(skip(state, item), fields(name = %item.name))]
pub async fn add_pantry_item(
    state: &AppState,
    user_id: Uuid,
    item: NewPantryItem,
) -> AppResult<PantryItem> {
    let item = item.into_item(user_id);
    validate_item(&item)?;
    let saved = state.db.pantry().insert(&item).await?;
    info!(item_id = %saved.id, %user_id, "pantry item added");
    Ok(saved)
}

#[instrument(skip(state, patch))]
pub async fn update_pantry_item(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
    patch: PantryItemPatch,
) -> AppResult<PantryItem> {
    let mut item = state
        .db
        .pantry()
        .get(user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Pantry item"))?;
    patch.apply(&mut item);
    validate_item(&item)?;
    state
        .db
        .pantry()
        .update(&item)
        .await?
        .ok_or_else(|| AppError::not_found("Pantry item"))
}

#[instrument(skip(state))]
pub async fn delete_pantry_item(state: &AppState, user_id: Uuid, id: Uuid) -> AppResult<()> {
    if !state.db.pantry().delete(user_id, id).await? {
        return Err(AppError::not_found("Pantry item"));
    }
    info!(item_id = %id, %user_id, "pantry item deleted");
    Ok(())
}

/// Items whose expiry date falls within `within_days` from today (UTC), expired ones included.
#[instrument(skip(state))]
pub async fn expiring_items(
    state: &AppState,
    user_id: Uuid,
    within_days: i64,
) -> AppResult<Vec<PantryItem>> {
    if !(0..=MAX_EXPIRY_WINDOW_DAYS).contains(&within_days) {
        return Err(AppError::validation(format!(
            "days must be between 0 and {MAX_EXPIRY_WINDOW_DAYS}"
        )));
    }
    let until = OffsetDateTime::now_utc().date() + Duration::days(within_days);
    Ok(state.db.pantry().expiring(user_id, until).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::register;
    use time::{Duration, OffsetDateTime};

    async fn cook(state: &AppState, email: &str) -> Uuid {
        register(state, email, "password1").await.unwrap().user_id()
    }

    fn rice() -> NewPantryItem {
        NewPantryItem {
            name: "Rice".into(),
            quantity: 2.5,
            unit: Some("kg".into()),
            category: Some("Grains".into()),
            expiry_date: None,
        }
    }

    #[tokio::test]
    async fn added_item_appears_in_next_fetch() {
        let state = AppState::fake();
        let user = cook(&state, "fetch@x.io").await;
        let added = add_pantry_item(&state, user, rice()).await.unwrap();

        let items = fetch_pantry(&state, user).await.unwrap();
        let found = items.iter().find(|i| i.id == added.id).expect("item listed");
        assert_eq!(found.quantity, 2.5);
        assert_eq!(found.unit.as_deref(), Some("kg"));
    }

    #[tokio::test]
    async fn delete_only_affects_owner() {
        let state = AppState::fake();
        let alice = cook(&state, "alice@x.io").await;
        let bob = cook(&state, "bob@x.io").await;
        let a_item = add_pantry_item(&state, alice, rice()).await.unwrap();
        add_pantry_item(&state, bob, rice()).await.unwrap();

        // bob cannot delete alice's row
        assert!(matches!(
            delete_pantry_item(&state, bob, a_item.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));

        delete_pantry_item(&state, alice, a_item.id).await.unwrap();
        assert!(fetch_pantry(&state, alice).await.unwrap().is_empty());
        assert_eq!(fetch_pantry(&state, bob).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_and_validation() {
        let state = AppState::fake();
        let user = cook(&state, "update@x.io").await;
        let item = add_pantry_item(&state, user, rice()).await.unwrap();

        let updated = update_pantry_item(
            &state,
            user,
            item.id,
            PantryItemPatch {
                quantity: Some(1.0),
                unit: Some("".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.quantity, 1.0);
        assert!(updated.unit.is_none());

        let err = update_pantry_item(
            &state,
            user,
            item.id,
            PantryItemPatch {
                quantity: Some(-1.0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut blank = rice();
        blank.name = "  ".into();
        assert!(add_pantry_item(&state, user, blank).await.is_err());
    }

    #[tokio::test]
    async fn expiring_window() {
        let state = AppState::fake();
        let user = cook(&state, "expiry@x.io").await;
        let today = OffsetDateTime::now_utc().date();

        let mut milk = rice();
        milk.name = "Milk".into();
        milk.expiry_date = Some(today + Duration::days(1));
        let mut flour = rice();
        flour.name = "Flour".into();
        flour.expiry_date = Some(today + Duration::days(30));
        add_pantry_item(&state, user, milk).await.unwrap();
        add_pantry_item(&state, user, flour).await.unwrap();
        add_pantry_item(&state, user, rice()).await.unwrap();

        let soon = expiring_items(&state, user, 3).await.unwrap();
        assert_eq!(soon.len(), 1);
        assert_eq!(soon[0].name, "Milk");

        assert!(expiring_items(&state, user, -1).await.is_err());

        // soonest expiry first, undated last
        let all = fetch_pantry(&state, user).await.unwrap();
        let names: Vec<_> = all.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Milk", "Flour", "Rice"]);
    }
}
