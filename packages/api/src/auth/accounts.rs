//! Local accounts: creation, login checks and the bootstrap administrator.

use serde::{Deserialize, Serialize};

use audit::messages::{INVALID_CREDENTIALS, MIN_PASSWORD_LEN, WEAK_PASSWORD};
use audit::{AuditStore, Error, NewProfile, Profile, Result, Role};

use super::password::{hash_password, verify_password};
use crate::settings::Bootstrap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
}

pub async fn create_user<S: AuditStore>(store: &S, user: NewUser) -> Result<Profile> {
    let email = user.email.trim().to_lowercase();
    let full_name = user.full_name.trim().to_string();

    let mut errors = Vec::new();
    if email.is_empty() || !email.contains('@') {
        errors.push("Unable to validate email address".to_string());
    }
    if user.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(WEAK_PASSWORD.to_string());
    }
    if full_name.is_empty() {
        errors.push("Full name is required".to_string());
    }
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    let password_hash = hash_password(&user.password).map_err(Error::Backend)?;
    let profile = store
        .insert_profile(NewProfile {
            email,
            full_name,
            role: user.role,
            password_hash,
        })
        .await?;
    tracing::info!("Created {} account {}", profile.role.as_str(), profile.email);
    Ok(profile)
}

/// Check a login attempt against the stored credentials.
pub fn authenticate(credentials: Option<(Profile, String)>, password: &str) -> Result<Profile> {
    let Some((profile, hash)) = credentials else {
        return Err(Error::invalid(INVALID_CREDENTIALS));
    };
    match verify_password(password, &hash) {
        Ok(true) => Ok(profile),
        Ok(false) => Err(Error::invalid(INVALID_CREDENTIALS)),
        Err(e) => {
            tracing::warn!("Stored password hash for {} is unusable: {}", profile.email, e);
            Err(Error::invalid(INVALID_CREDENTIALS))
        }
    }
}

/// Create the configured administrator unless the email is already taken.
/// Returns whether an account was created.
pub async fn bootstrap_admin<S: AuditStore>(store: &S, bootstrap: &Bootstrap) -> Result<bool> {
    if bootstrap.email.trim().is_empty() {
        return Ok(false);
    }
    if store.find_profile_by_email(bootstrap.email.trim()).await?.is_some() {
        return Ok(false);
    }
    create_user(
        store,
        NewUser {
            email: bootstrap.email.clone(),
            password: bootstrap.password.clone(),
            full_name: bootstrap.full_name.clone(),
            role: Role::Admin,
        },
    )
    .await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit::MemoryStore;

    fn porter() -> NewUser {
        NewUser {
            email: " Porter@Hotel.test ".to_string(),
            password: "correct horse".to_string(),
            full_name: "Night Porter".to_string(),
            role: Role::Staff,
        }
    }

    #[tokio::test]
    async fn test_create_user_normalises_and_rejects_duplicates() {
        let store = MemoryStore::new();
        let profile = create_user(&store, porter()).await.unwrap();
        assert_eq!(profile.email, "porter@hotel.test");

        let err = create_user(&store, porter()).await.unwrap_err();
        assert_eq!(
            audit::messages::user_message(&err.to_string()),
            "A user with this email already exists"
        );
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let store = MemoryStore::new();
        let err = create_user(
            &store,
            NewUser {
                email: "nobody".to_string(),
                password: "short".to_string(),
                full_name: " ".to_string(),
                role: Role::Staff,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.messages().len(), 3);
        assert!(err.messages().contains(&WEAK_PASSWORD.to_string()));
    }

    #[test]
    fn test_authenticate() {
        let hash = hash_password("correct horse").unwrap();
        let profile = Profile {
            id: "user-1".to_string(),
            email: "porter@hotel.test".to_string(),
            full_name: "Night Porter".to_string(),
            role: Role::Staff,
            created_at: chrono::Utc::now(),
        };

        let ok = authenticate(Some((profile.clone(), hash.clone())), "correct horse").unwrap();
        assert_eq!(ok.id, "user-1");

        let wrong = authenticate(Some((profile, hash)), "battery staple").unwrap_err();
        assert_eq!(wrong, Error::invalid(INVALID_CREDENTIALS));
        assert_eq!(
            authenticate(None, "anything").unwrap_err(),
            Error::invalid(INVALID_CREDENTIALS)
        );
    }

    #[tokio::test]
    async fn test_bootstrap_admin_runs_once() {
        let store = MemoryStore::new();
        let bootstrap = Bootstrap {
            email: "manager@hotel.test".to_string(),
            password: "change-me-now".to_string(),
            full_name: "Duty Manager".to_string(),
        };
        assert!(bootstrap_admin(&store, &bootstrap).await.unwrap());
        assert!(!bootstrap_admin(&store, &bootstrap).await.unwrap());
        let admin = store.find_profile_by_email("manager@hotel.test").await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
    }
}
