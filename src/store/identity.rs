//! The identity store: authenticates, registers, and tracks exactly one
//! session principal per process, persisting it across restarts.
//!
//! Operations are exposed with an async contract so a networked backend can
//! later be substituted without changing callers; in this implementation
//! every call completes synchronously against in-memory state plus one local
//! file write.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use parking_lot::RwLock;
use tracing::{info, warn};

use super::models::{AuthState, ProfileUpdate, SocialProvider, User, UserRole};
use super::seeders;
use super::{StoreError, StoreResult};

const SESSION_FILE: &str = "session.json";

/// Hash a password using Argon2
fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

fn default_avatar(name: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background=6366f1&color=fff",
        name.replace(' ', "+")
    )
}

struct IdentityState {
    auth: AuthState,
    users: Vec<User>,
    /// User id -> Argon2 password hash.
    credentials: HashMap<String, String>,
}

pub struct IdentityStore {
    session_path: PathBuf,
    inner: RwLock<IdentityState>,
}

impl IdentityStore {
    /// Load the store: seed the built-in accounts, then try to restore a
    /// previously persisted session principal from `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let users = seeders::seed_users();

        // All fixture accounts share a password, so one hash covers them.
        let fixture_hash = hash_password(seeders::FIXTURE_PASSWORD)
            .map_err(|e| anyhow::anyhow!("failed to hash fixture password: {e}"))?;
        let credentials = users
            .iter()
            .map(|u| (u.id.clone(), fixture_hash.clone()))
            .collect();

        let session_path = data_dir.join(SESSION_FILE);
        let auth = restore_session(&session_path);

        Ok(Self {
            session_path,
            inner: RwLock::new(IdentityState {
                auth,
                users,
                credentials,
            }),
        })
    }

    /// Resolve credentials against the user directory and establish the
    /// session. A failed attempt leaves any prior session unchanged.
    pub async fn sign_in(&self, email: &str, password: &str) -> StoreResult<User> {
        let mut state = self.inner.write();

        let user = state
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
            .ok_or(StoreError::InvalidCredentials)?;

        let verified = state
            .credentials
            .get(&user.id)
            .map(|hash| verify_password(password, hash))
            .unwrap_or(false);
        if !verified {
            return Err(StoreError::InvalidCredentials);
        }

        self.persist(&user)?;
        state.auth = AuthState::authenticated(user.clone());
        info!(email = %user.email, role = %user.role, "User signed in");
        Ok(user)
    }

    /// Register a new account and establish its session. Manager accounts
    /// are not self-service; email uniqueness is checked case-insensitively
    /// against the whole directory.
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> StoreResult<User> {
        match role {
            UserRole::Student | UserRole::Teacher => {}
            UserRole::Manager => {
                return Err(StoreError::NotAuthorized(
                    "Manager accounts cannot be created through sign-up".to_string(),
                ))
            }
        }

        let mut state = self.inner.write();

        if state
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(email))
        {
            return Err(StoreError::EmailTaken);
        }

        let hash = hash_password(password)
            .map_err(|e| StoreError::Internal(format!("Failed to hash password: {e}")))?;

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            profile_image: Some(default_avatar(name)),
        };

        self.persist(&user)?;
        state.credentials.insert(user.id.clone(), hash);
        state.users.push(user.clone());
        state.auth = AuthState::authenticated(user.clone());
        info!(email = %user.email, role = %user.role, "User registered");
        Ok(user)
    }

    /// Clear the persisted principal and reset to unauthenticated. Always
    /// succeeds.
    pub async fn sign_out(&self) {
        self.clear_persisted();
        self.inner.write().auth = AuthState::unauthenticated();
        info!("User signed out");
    }

    /// Mock boundary: confirms the email exists but mutates no credentials.
    /// A real backend would enqueue a reset token here.
    pub async fn reset_password(&self, email: &str) -> StoreResult<()> {
        let state = self.inner.read();
        if state
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(email))
        {
            Ok(())
        } else {
            Err(StoreError::NotFound("Account"))
        }
    }

    /// Merge the given fields into the current session principal and its
    /// directory entry, then persist.
    pub async fn update_profile(&self, update: ProfileUpdate) -> StoreResult<User> {
        let mut state = self.inner.write();

        let mut user = state
            .auth
            .user
            .clone()
            .ok_or(StoreError::NotAuthenticated)?;

        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(profile_image) = update.profile_image {
            user.profile_image = Some(profile_image);
        }

        self.persist(&user)?;
        if let Some(entry) = state.users.iter_mut().find(|u| u.id == user.id) {
            *entry = user.clone();
        }
        state.auth.user = Some(user.clone());
        Ok(user)
    }

    /// Federated login is not wired up to any provider; the operation exists
    /// so its contract is stable once one is.
    pub async fn social_sign_in(&self, provider: SocialProvider) -> StoreResult<User> {
        warn!(%provider, "Social sign-in requested but no provider is configured");
        Err(StoreError::Unsupported(format!(
            "{provider} sign-in is not available"
        )))
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner.read().auth.user.clone()
    }

    pub fn auth_state(&self) -> AuthState {
        self.inner.read().auth.clone()
    }

    pub fn get_user(&self, id: &str) -> Option<User> {
        self.inner.read().users.iter().find(|u| u.id == id).cloned()
    }

    /// Resolve a list of user ids to their directory entries, preserving
    /// order and skipping unknown ids.
    pub fn users_by_ids(&self, ids: &[String]) -> Vec<User> {
        let state = self.inner.read();
        ids.iter()
            .filter_map(|id| state.users.iter().find(|u| &u.id == id).cloned())
            .collect()
    }

    fn persist(&self, user: &User) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(user).map_err(std::io::Error::from)?;
        std::fs::write(&self.session_path, json)?;
        Ok(())
    }

    fn clear_persisted(&self) {
        if let Err(e) = std::fs::remove_file(&self.session_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %e, "Failed to remove persisted session");
            }
        }
    }
}

/// Read the persisted principal, if any. A record that fails to parse is
/// discarded and the store starts unauthenticated.
fn restore_session(path: &Path) -> AuthState {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return AuthState::unauthenticated()
        }
        Err(e) => {
            warn!(error = %e, "Failed to read persisted session");
            return AuthState::unauthenticated();
        }
    };

    match serde_json::from_str::<User>(&raw) {
        Ok(user) => {
            info!(email = %user.email, "Restored session from disk");
            AuthState::authenticated(user)
        }
        Err(e) => {
            warn!(error = %e, "Discarding corrupt persisted session");
            let _ = std::fs::remove_file(path);
            AuthState::unauthenticated()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store() -> (IdentityStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = IdentityStore::open(dir.path()).unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn fixture_accounts_can_sign_in() {
        let (store, _dir) = open_store();
        for (email, role) in [
            ("student@example.com", UserRole::Student),
            ("teacher@example.com", UserRole::Teacher),
            ("manager@example.com", UserRole::Manager),
        ] {
            let user = store.sign_in(email, "password123").await.unwrap();
            assert_eq!(user.role, role);
            assert!(store.auth_state().is_authenticated);
        }
    }

    #[tokio::test]
    async fn sign_in_is_case_insensitive_on_email() {
        let (store, _dir) = open_store();
        let user = store
            .sign_in("Student@Example.COM", "password123")
            .await
            .unwrap();
        assert_eq!(user.id, "1");
    }

    #[tokio::test]
    async fn failed_sign_in_leaves_session_unchanged() {
        let (store, _dir) = open_store();
        store
            .sign_in("student@example.com", "password123")
            .await
            .unwrap();

        let err = store
            .sign_in("student@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidCredentials));

        let state = store.auth_state();
        assert!(state.is_authenticated);
        assert_eq!(state.user.unwrap().id, "1");
    }

    #[tokio::test]
    async fn unknown_email_is_invalid_credentials() {
        let (store, _dir) = open_store();
        let err = store
            .sign_in("nobody@example.com", "password123")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidCredentials));
        assert!(!store.auth_state().is_authenticated);
    }

    #[tokio::test]
    async fn sign_up_establishes_session_and_allows_sign_back_in() {
        let (store, _dir) = open_store();
        let user = store
            .sign_up("New Student", "new@example.com", "hunter2!", UserRole::Student)
            .await
            .unwrap();
        assert_eq!(store.current_user().unwrap().id, user.id);
        assert!(user.profile_image.unwrap().contains("New+Student"));

        store.sign_out().await;
        let back = store.sign_in("new@example.com", "hunter2!").await.unwrap();
        assert_eq!(back.id, user.id);
    }

    #[tokio::test]
    async fn sign_up_rejects_duplicate_email() {
        let (store, _dir) = open_store();
        let err = store
            .sign_up("Impostor", "STUDENT@example.com", "pw", UserRole::Student)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));

        // Rejection also applies to emails registered through sign-up.
        store
            .sign_up("First", "dup@example.com", "pw", UserRole::Teacher)
            .await
            .unwrap();
        let err = store
            .sign_up("Second", "dup@example.com", "other", UserRole::Student)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));
    }

    #[tokio::test]
    async fn sign_up_rejects_manager_role() {
        let (store, _dir) = open_store();
        let err = store
            .sign_up("Boss", "boss@example.com", "pw", UserRole::Manager)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotAuthorized(_)));
    }

    #[tokio::test]
    async fn session_round_trips_across_restart() {
        let dir = TempDir::new().unwrap();
        {
            let store = IdentityStore::open(dir.path()).unwrap();
            store
                .sign_in("teacher@example.com", "password123")
                .await
                .unwrap();
        }

        let store = IdentityStore::open(dir.path()).unwrap();
        let state = store.auth_state();
        assert!(state.is_authenticated);
        let user = state.user.unwrap();
        assert_eq!(user.id, "2");
        assert_eq!(user.name, "Teacher User");
        assert_eq!(user.email, "teacher@example.com");
        assert_eq!(user.role, UserRole::Teacher);
        assert!(user.profile_image.is_some());
    }

    #[tokio::test]
    async fn sign_out_clears_persisted_session() {
        let dir = TempDir::new().unwrap();
        let store = IdentityStore::open(dir.path()).unwrap();
        store
            .sign_in("student@example.com", "password123")
            .await
            .unwrap();
        store.sign_out().await;
        assert!(!store.auth_state().is_authenticated);

        let store = IdentityStore::open(dir.path()).unwrap();
        assert!(!store.auth_state().is_authenticated);
    }

    #[tokio::test]
    async fn corrupt_session_file_is_discarded() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "{not json").unwrap();

        let store = IdentityStore::open(dir.path()).unwrap();
        assert!(!store.auth_state().is_authenticated);
        assert!(!dir.path().join(SESSION_FILE).exists());
    }

    #[tokio::test]
    async fn persisted_session_contains_no_credentials() {
        let dir = TempDir::new().unwrap();
        let store = IdentityStore::open(dir.path()).unwrap();
        store
            .sign_in("student@example.com", "password123")
            .await
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join(SESSION_FILE)).unwrap();
        assert!(!raw.contains("password"));
        assert!(!raw.contains("$argon2"));
    }

    #[tokio::test]
    async fn update_profile_requires_session_and_merges_fields() {
        let (store, _dir) = open_store();
        let err = store
            .update_profile(ProfileUpdate {
                name: Some("Ghost".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotAuthenticated));

        store
            .sign_in("student@example.com", "password123")
            .await
            .unwrap();
        let updated = store
            .update_profile(ProfileUpdate {
                name: Some("Renamed Student".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.name, "Renamed Student");
        assert_eq!(updated.email, "student@example.com");
        assert_eq!(store.get_user("1").unwrap().name, "Renamed Student");
    }

    #[tokio::test]
    async fn reset_password_reports_presence_only() {
        let (store, _dir) = open_store();
        store.reset_password("teacher@example.com").await.unwrap();
        let err = store
            .reset_password("missing@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn social_sign_in_is_unsupported() {
        let (store, _dir) = open_store();
        for provider in [SocialProvider::Google, SocialProvider::Facebook] {
            let err = store.social_sign_in(provider).await.unwrap_err();
            assert!(matches!(err, StoreError::Unsupported(_)));
        }
        assert!(!store.auth_state().is_authenticated);
    }
}
