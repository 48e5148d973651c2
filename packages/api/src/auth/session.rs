//! Session lookups and the role checks built on them.

use audit::{AuditStore, Error, Profile, Result, Role};
use tower_sessions::Session;

/// Key for storing user ID in session.
pub const SESSION_USER_ID_KEY: &str = "user_id";

pub async fn session_user_id(session: &Session) -> Result<Option<String>> {
    session
        .get(SESSION_USER_ID_KEY)
        .await
        .map_err(|e| Error::Backend(e.to_string()))
}

pub async fn sign_in(session: &Session, profile: &Profile) -> Result<()> {
    session
        .cycle_id()
        .await
        .map_err(|e| Error::Backend(e.to_string()))?;
    session
        .insert(SESSION_USER_ID_KEY, profile.id.clone())
        .await
        .map_err(|e| Error::Backend(e.to_string()))
}

/// The signed-in profile, if the session still points at one.
pub async fn current_profile<S: AuditStore>(session: &Session, store: &S) -> Result<Option<Profile>> {
    match session_user_id(session).await? {
        Some(id) => store.get_profile(&id).await,
        None => Ok(None),
    }
}

pub async fn require_user<S: AuditStore>(session: &Session, store: &S) -> Result<Profile> {
    current_profile(session, store)
        .await?
        .ok_or(Error::Unauthenticated)
}

pub async fn require_role<S: AuditStore>(session: &Session, store: &S, role: Role) -> Result<Profile> {
    let profile = require_user(session, store).await?;
    if profile.role != role {
        return Err(Error::Forbidden);
    }
    Ok(profile)
}
