//! Session store
//!
//! Single source of truth for "is a user signed in". Holds the in-memory
//! [`Session`] and mirrors it to a [`SessionStorage`]. Storage failures are
//! logged and otherwise ignored: the in-memory session is what counts for
//! the rest of the process.

use crate::error::{Result, SyncError};
use crate::storage::{SessionStorage, StoredSession};
use ohako_core::{IdentityPatch, Session, UserIdentity};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    session: RwLock<Session>,
}

impl SessionStore {
    /// Anonymous store; call [`SessionStore::restore`] to pick up a saved session
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            session: RwLock::new(Session::anonymous()),
        }
    }

    /// Store restored from whatever `storage` holds
    pub fn open(storage: impl SessionStorage + 'static) -> Self {
        let store = Self::new(storage);
        store.restore();
        store
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rebuild the session from durable storage.
    ///
    /// Missing or unreadable records leave the store signed out.
    pub fn restore(&self) -> Session {
        let restored = match self.storage.load() {
            Ok(Some(stored)) => {
                info!(user_id = %stored.user.id, username = %stored.user.username, "Session restored");
                Session::authenticated(stored.token, stored.user)
            }
            Ok(None) => {
                debug!("No saved session");
                Session::anonymous()
            }
            Err(e) => {
                warn!(error = %e, "Saved session unreadable, starting signed out");
                if let Err(e) = self.storage.clear() {
                    warn!(error = %e, "Failed to remove unreadable session");
                }
                Session::anonymous()
            }
        };

        *self.write() = restored.clone();
        restored
    }

    /// Sign in and persist both records
    pub fn login(&self, token: impl Into<String>, user: UserIdentity) -> Session {
        let token = token.into();
        let session = Session::authenticated(token.clone(), user.clone());
        *self.write() = session.clone();

        info!(user_id = %user.id, username = %user.username, "Logged in");
        self.persist(&StoredSession { token, user });
        session
    }

    /// Sign out and erase the durable copies
    pub fn logout(&self) -> Session {
        let was = std::mem::take(&mut *self.write());

        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Failed to erase saved session");
        }

        if let Some(user) = was.user() {
            info!(user_id = %user.id, "Logged out");
        }
        Session::anonymous()
    }

    /// Merge a partial profile edit into the signed-in user
    pub fn update_identity(&self, patch: &IdentityPatch) -> Result<Session> {
        let session = {
            let mut guard = self.write();
            if !guard.apply_identity(patch) {
                return Err(SyncError::NotAuthenticated);
            }
            guard.clone()
        };

        self.persist_session(&session);
        Ok(session)
    }

    /// Replace the signed-in user with the server's copy
    pub fn replace_identity(&self, user: UserIdentity) -> Result<Session> {
        let session = {
            let mut guard = self.write();
            if !guard.is_authenticated() {
                return Err(SyncError::NotAuthenticated);
            }
            let updated = std::mem::take(&mut *guard).with_user(user);
            *guard = updated.clone();
            updated
        };

        self.persist_session(&session);
        Ok(session)
    }

    pub fn current(&self) -> Session {
        self.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token().map(str::to_string)
    }

    pub fn user(&self) -> Option<UserIdentity> {
        self.read().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    fn persist_session(&self, session: &Session) {
        if let (Some(token), Some(user)) = (session.token(), session.user()) {
            self.persist(&StoredSession {
                token: token.to_string(),
                user: user.clone(),
            });
        }
    }

    fn persist(&self, stored: &StoredSession) {
        if let Err(e) = self.storage.save(stored) {
            warn!(error = %e, user_id = %stored.user.id, "Failed to persist session");
        }
    }
}
