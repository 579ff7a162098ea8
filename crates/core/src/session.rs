//! Authentication session and its persistent store

use crate::error::CoreResult;
use crate::storage::{KeyValueStorage, MemoryStorage};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

pub const ACCESS_TOKEN_KEY: &str = "qroom_access_token";
pub const REFRESH_TOKEN_KEY: &str = "qroom_refresh_token";
pub const USER_KEY: &str = "qroom_user";

/// Minimal identity returned alongside tokens at login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i64,
    pub nickname: String,
}

/// Access/refresh token pair issued by one login response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Option<UserIdentity>,
}

/// Single source of truth for the current session
///
/// Every operation degrades to a no-op or `None` when storage fails; failures
/// are logged, never returned.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Store backed by a fresh [`MemoryStorage`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Underlying storage, shared with other caches
    pub fn storage(&self) -> Arc<dyn KeyValueStorage> {
        Arc::clone(&self.storage)
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // The guard protects no data, so a poisoned lock is still usable
        self.write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Persist a whole session after login
    ///
    /// The access token is written last and the partial write is rolled back on
    /// failure, so an access token never lands without its refresh token.
    pub fn save(&self, session: &Session) {
        let _guard = self.guard();
        if let Err(e) = self.write_session(session) {
            warn!("Failed to persist session, rolling back: {e}");
            self.remove_all();
        } else {
            debug!("Session saved");
        }
    }

    fn write_session(&self, session: &Session) -> CoreResult<()> {
        self.storage.set(REFRESH_TOKEN_KEY, &session.refresh_token)?;
        match &session.user {
            Some(user) => self
                .storage
                .set(USER_KEY, &serde_json::to_string(user)?)?,
            None => self.storage.remove(USER_KEY)?,
        }
        self.storage.set(ACCESS_TOKEN_KEY, &session.access_token)
    }

    /// Remove all session data; safe when nothing is stored
    pub fn clear(&self) {
        let _guard = self.guard();
        self.remove_all();
        debug!("Session cleared");
    }

    fn remove_all(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!("Failed to remove {key}: {e}");
            }
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read {key}: {e}");
                None
            }
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    pub fn user(&self) -> Option<UserIdentity> {
        let raw = self.read(USER_KEY)?;
        serde_json::from_str(&raw)
            .inspect_err(|e| warn!("Ignoring malformed stored user: {e}"))
            .ok()
    }

    /// Full session, present only when both tokens are stored
    pub fn load(&self) -> Option<Session> {
        Some(Session {
            access_token: self.access_token()?,
            refresh_token: self.refresh_token()?,
            user: self.user(),
        })
    }

    /// Replace only the access token after a successful refresh
    ///
    /// Skipped when no refresh token is stored, e.g. the session was cleared
    /// while the refresh was in flight.
    pub fn update_access_token(&self, token: &str) {
        let _guard = self.guard();
        if self.read(REFRESH_TOKEN_KEY).is_none() {
            warn!("No refresh token stored; dropping refreshed access token");
            return;
        }
        if let Err(e) = self.storage.set(ACCESS_TOKEN_KEY, token) {
            warn!("Failed to update access token: {e}");
        }
    }
}
