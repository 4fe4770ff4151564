use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{PublicUser, Session},
        password::{hash_password, is_valid_email, normalize_email, verify_password, MIN_PASSWORD_LEN},
        repo_types::User,
    },
    error::{AppError, AppResult},
    state::AppState,
};

fn issue_session(state: &AppState, user: &User) -> AppResult<Session> {
    Ok(Session {
        access_token: state.jwt.sign_access(user.id)?,
        refresh_token: state.jwt.sign_refresh(user.id)?,
        user: PublicUser {
            id: user.id,
            email: user.email.clone(),
        },
    })
}

/// Creates the user and their profile row, then signs them in.
#[instrument(skip(state, password))]
pub async fn register(state: &AppState, email: &str, password: &str) -> AppResult<Session> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::validation("Invalid email"));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation("Password too short"));
    }

    if state.db.users().find_by_email(&email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(password)?;
    let user = state.db.users().create(&email, &hash).await?;

    let display_name = email.split('@').next().map(str::to_string);
    state.db.profiles().create(user.id, display_name).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    issue_session(state, &user)
}

#[instrument(skip(state, password))]
pub async fn sign_in(state: &AppState, email: &str, password: &str) -> AppResult<Session> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(AppError::validation("Invalid email"));
    }

    let Some(user) = state.db.users().find_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    info!(user_id = %user.id, "user logged in");
    issue_session(state, &user)
}

#[instrument(skip_all)]
pub async fn refresh(state: &AppState, refresh_token: &str) -> AppResult<Session> {
    let claims = state
        .jwt
        .verify_refresh(refresh_token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;
    let user = state
        .db
        .users()
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    issue_session(state, &user)
}

/// Rebuilds a session from stored tokens. Fails with `Unauthorized` when the
/// access token is invalid or expired, which callers treat as "log in again".
pub async fn restore_session(
    state: &AppState,
    access_token: &str,
    refresh_token: &str,
) -> AppResult<Session> {
    let claims = state
        .jwt
        .verify_access(access_token)
        .map_err(|_| AppError::Unauthorized("Session expired, please log in again".into()))?;
    let user = current_user(state, claims.sub).await?;
    Ok(Session {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.to_string(),
        user,
    })
}

pub async fn current_user(state: &AppState, user_id: Uuid) -> AppResult<PublicUser> {
    let user = state
        .db
        .users()
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    Ok(PublicUser {
        id: user.id,
        email: user.email,
    })
}
