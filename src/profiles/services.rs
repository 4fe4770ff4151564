use bytes::Bytes;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::ProfilePatch,
    repo_types::{Profile, Role},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    storage::{image_key, resolve_image_url},
};

/// Largest accepted avatar/recipe image upload.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

async fn with_resolved_avatar(state: &AppState, mut profile: Profile) -> AppResult<Profile> {
    profile.avatar_url = resolve_image_url(state.storage.as_ref(), profile.avatar_url.take()).await?;
    Ok(profile)
}

async fn load(state: &AppState, user_id: Uuid) -> AppResult<Profile> {
    state
        .db
        .profiles()
        .get(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Profile"))
}

#[instrument(skip(state))]
pub async fn get_profile(state: &AppState, user_id: Uuid) -> AppResult<Profile> {
    let profile = load(state, user_id).await?;
    with_resolved_avatar(state, profile).await
}

#[instrument(skip(state, patch))]
pub async fn update_profile(state: &AppState, user_id: Uuid, patch: ProfilePatch) -> AppResult<Profile> {
    let mut profile = load(state, user_id).await?;
    patch.apply(&mut profile);
    let saved = state
        .db
        .profiles()
        .update(&profile)
        .await?
        .ok_or_else(|| AppError::not_found("Profile"))?;
    with_resolved_avatar(state, saved).await
}

pub(crate) fn check_image(body: &Bytes, content_type: &str) -> AppResult<()> {
    if body.is_empty() {
        return Err(AppError::validation("image body is empty"));
    }
    if body.len() > MAX_IMAGE_BYTES {
        return Err(AppError::validation("image is too large"));
    }
    if crate::storage::ext_from_mime(content_type).is_none() {
        return Err(AppError::validation(format!("unsupported image type {content_type}")));
    }
    Ok(())
}

#[instrument(skip(state, body), fields(size = body.len()))]
pub async fn upload_avatar(
    state: &AppState,
    user_id: Uuid,
    body: Bytes,
    content_type: &str,
) -> AppResult<Profile> {
    check_image(&body, content_type)?;
    let mut profile = load(state, user_id).await?;

    let key = image_key("avatars", user_id, content_type)
        .ok_or_else(|| AppError::validation("unsupported image type"))?;
    state.storage.put_object(&key, body, content_type).await?;

    let previous = profile.avatar_url.replace(key);
    let saved = state
        .db
        .profiles()
        .update(&profile)
        .await?
        .ok_or_else(|| AppError::not_found("Profile"))?;

    if let Some(old) = previous.filter(|k| !k.contains("://")) {
        if let Err(e) = state.storage.delete_object(&old).await {
            warn!(error = %e, key = %old, "failed to delete previous avatar");
        }
    }

    info!(%user_id, "avatar updated");
    with_resolved_avatar(state, saved).await
}

/// Deletes the user; pantry, meal plans, favorites, ratings and recipes go with it.
#[instrument(skip(state))]
pub async fn delete_account(state: &AppState, user_id: Uuid) -> AppResult<()> {
    let avatar = state
        .db
        .profiles()
        .get(user_id)
        .await?
        .and_then(|p| p.avatar_url);

    if !state.db.users().delete(user_id).await? {
        return Err(AppError::not_found("User"));
    }

    if let Some(key) = avatar.filter(|k| !k.contains("://")) {
        if let Err(e) = state.storage.delete_object(&key).await {
            warn!(error = %e, %key, "failed to delete avatar of removed account");
        }
    }
    info!(%user_id, "account deleted");
    Ok(())
}

pub async fn get_user_role(state: &AppState, user_id: Uuid) -> AppResult<Role> {
    Ok(state.db.profiles().role(user_id).await?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::services::register, pantry, pantry::dto::NewPantryItem};

    #[tokio::test]
    async fn update_and_fetch_profile() {
        let state = AppState::fake();
        let session = register(&state, "p@x.io", "password1").await.unwrap();

        let updated = update_profile(
            &state,
            session.user_id(),
            ProfilePatch {
                display_name: Some("Chef P".into()),
                allergies: Some(vec!["shellfish".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.display_name.as_deref(), Some("Chef P"));

        let fetched = get_profile(&state, session.user_id()).await.unwrap();
        assert_eq!(fetched.allergies, vec!["shellfish"]);
        assert_eq!(get_user_role(&state, session.user_id()).await.unwrap(), Role::User);
    }

    #[tokio::test]
    async fn avatar_upload_stores_object_and_resolves_url() {
        let state = AppState::fake();
        let session = register(&state, "av@x.io", "password1").await.unwrap();

        let err = upload_avatar(&state, session.user_id(), Bytes::from_static(b"x"), "text/plain")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let profile = upload_avatar(
            &state,
            session.user_id(),
            Bytes::from_static(b"\x89PNG"),
            "image/png",
        )
        .await
        .unwrap();
        let url = profile.avatar_url.unwrap();
        assert!(url.contains(&format!("avatars/{}/", session.user_id())));
    }

    #[tokio::test]
    async fn delete_account_cascades_owned_rows() {
        let state = AppState::fake();
        let session = register(&state, "gone@x.io", "password1").await.unwrap();
        let user_id = session.user_id();
        pantry::services::add_pantry_item(
            &state,
            user_id,
            NewPantryItem {
                name: "Rice".into(),
                quantity: 1.0,
                unit: Some("kg".into()),
                category: None,
                expiry_date: None,
            },
        )
        .await
        .unwrap();

        delete_account(&state, user_id).await.unwrap();

        assert!(state.db.profiles().get(user_id).await.unwrap().is_none());
        assert!(state.db.pantry().list(user_id).await.unwrap().is_empty());
        assert!(matches!(
            delete_account(&state, user_id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
