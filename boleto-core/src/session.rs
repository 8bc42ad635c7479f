use std::sync::{Arc, RwLock};

use crate::models::User;
use crate::store::{CredentialStore, StoreError, StoredCredentials};

/// The currently authenticated user and their bearer credential. At most one
/// session is active per process; only `login`/`logout` mutate it.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Credential store failure: {0}")]
    Store(#[from] StoreError),
}

/// Shared, read-mostly handle to the session. Gateways hold a clone and read
/// the token per request; all access happens on the single runtime so the
/// lock is never contended for long.
#[derive(Clone)]
pub struct SessionHandle {
    current: Arc<RwLock<Option<Session>>>,
    store: Arc<dyn CredentialStore>,
}

impl SessionHandle {
    /// Starts with an empty session. Call [`restore`](Self::restore) before
    /// serving anything that depends on authentication state.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            store,
        }
    }

    /// Loads persisted credentials, if any. Malformed stored state is cleared
    /// rather than propagated so a corrupt file cannot wedge startup.
    pub fn restore(&self) -> Result<(), SessionError> {
        match self.store.load() {
            Ok(Some(StoredCredentials { token, user })) => {
                *self.current.write().unwrap() = Some(Session { user, token });
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(StoreError::Malformed(e)) => {
                tracing::warn!("Discarding malformed stored session: {}", e);
                self.store.clear()?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persists the credentials and swaps the in-memory session in one go, so
    /// the next gateway call already carries the new token.
    pub fn login(&self, user: User, token: String) -> Result<(), SessionError> {
        self.store.save(&StoredCredentials {
            token: token.clone(),
            user: user.clone(),
        })?;
        tracing::info!("Session established for user {}", user.id);
        *self.current.write().unwrap() = Some(Session { user, token });
        Ok(())
    }

    /// Clears both durable and in-memory state.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.store.clear()?;
        *self.current.write().unwrap() = None;
        Ok(())
    }

    pub fn current(&self) -> Option<Session> {
        self.current.read().unwrap().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current.read().unwrap().as_ref().map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.current.read().unwrap().as_ref().map(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().unwrap().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoleType;
    use crate::store::MemoryCredentialStore;

    fn sample_user(id: i64) -> User {
        User {
            id,
            name: "Ana".into(),
            email: "ana@example.com".into(),
            role_type: RoleType::Customer,
            enabled: true,
            created_at: None,
        }
    }

    #[test]
    fn restore_with_empty_store_leaves_session_empty() {
        let session = SessionHandle::new(Arc::new(MemoryCredentialStore::new()));
        session.restore().unwrap();
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
    }

    #[test]
    fn login_sets_token_and_persists() {
        let store = Arc::new(MemoryCredentialStore::new());
        let session = SessionHandle::new(store.clone());

        session.login(sample_user(1), "abc".into()).unwrap();
        assert_eq!(session.token().as_deref(), Some("abc"));

        // A fresh handle over the same store sees the persisted session.
        let restored = SessionHandle::new(store);
        restored.restore().unwrap();
        assert_eq!(restored.token().as_deref(), Some("abc"));
        assert_eq!(restored.user().unwrap().id, 1);
    }

    #[test]
    fn restore_discards_malformed_stored_state() {
        use crate::store::FileCredentialStore;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json").unwrap();

        let session = SessionHandle::new(Arc::new(FileCredentialStore::new(path.clone())));
        session.restore().unwrap();

        assert!(!session.is_authenticated());
        assert!(!path.exists());
    }

    #[test]
    fn logout_clears_durable_and_in_memory_state() {
        let store = Arc::new(MemoryCredentialStore::new());
        let session = SessionHandle::new(store.clone());

        session.login(sample_user(1), "abc".into()).unwrap();
        session.logout().unwrap();

        assert!(!session.is_authenticated());
        let restored = SessionHandle::new(store);
        restored.restore().unwrap();
        assert!(!restored.is_authenticated());
    }
}
