//! Bridge between the cookie-backed `tower_sessions` store and the
//! [`Session`] value the gateway and policy work on.

use crate::models::notice::Notice;
use crate::models::session::{Role, Session};
use serde_json::Value;
use tower_sessions::Session as CookieSession;

pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "user";
pub const ROLES_KEY: &str = "roles";
pub const NOTICE_KEY: &str = "notice";

type StoreResult<T> = Result<T, tower_sessions::session::Error>;

pub async fn load(store: &CookieSession) -> StoreResult<Session> {
    let auth_token: Option<String> = store.get(AUTH_TOKEN_KEY).await?;
    let user: Option<Value> = store.get(USER_KEY).await?;
    let roles: Option<Vec<Role>> = store.get(ROLES_KEY).await?;

    Ok(Session {
        auth_token,
        user,
        roles: roles.unwrap_or_default(),
    })
}

/// Write the session back. A signed-out session removes the keys instead of
/// storing empty values.
pub async fn save(store: &CookieSession, session: &Session) -> StoreResult<()> {
    match (&session.auth_token, &session.user) {
        (Some(token), Some(user)) => {
            store.insert(AUTH_TOKEN_KEY, token).await?;
            store.insert(USER_KEY, user).await?;
            store.insert(ROLES_KEY, &session.roles).await?;
            Ok(())
        }
        _ => clear(store).await,
    }
}

pub async fn clear(store: &CookieSession) -> StoreResult<()> {
    store.remove_value(AUTH_TOKEN_KEY).await?;
    store.remove_value(USER_KEY).await?;
    store.remove_value(ROLES_KEY).await?;
    Ok(())
}

/// Queue a notice for the next rendered page. A later notice replaces an
/// earlier one that has not been shown yet.
pub async fn flash(store: &CookieSession, notice: &Notice) -> StoreResult<()> {
    store.insert(NOTICE_KEY, notice).await
}

pub async fn take_notice(store: &CookieSession) -> StoreResult<Option<Notice>> {
    store.remove(NOTICE_KEY).await
}

pub async fn has_notice(store: &CookieSession) -> StoreResult<bool> {
    Ok(store.get_value(NOTICE_KEY).await?.is_some())
}
