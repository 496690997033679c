//! Authentication session
//!
//! `user` is present exactly when `token` is present. The fields are private
//! and the only constructors are `anonymous` and `authenticated`, so a
//! half-populated session cannot be built.

use super::user::{IdentityPatch, UserIdentity};
use serde::Serialize;

/// Authentication state of the client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    token: Option<String>,
    user: Option<UserIdentity>,
}

impl Session {
    /// Session with no user signed in
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session for a signed-in user
    pub fn authenticated(token: impl Into<String>, user: UserIdentity) -> Self {
        Self {
            token: Some(token.into()),
            user: Some(user),
        }
    }

    /// Whether a user is signed in
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Bearer token, if signed in
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Signed-in user, if any
    pub fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    /// Merge a profile update into the signed-in user
    ///
    /// Returns `false` (and changes nothing) when no user is signed in.
    pub fn apply_identity(&mut self, patch: &IdentityPatch) -> bool {
        match self.user.as_mut() {
            Some(user) => {
                user.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Replace the signed-in user's identity with a fresh snapshot
    pub(crate) fn replace_user(&mut self, user: UserIdentity) -> bool {
        if self.token.is_none() {
            return false;
        }
        self.user = Some(user);
        true
    }

    /// Replace the stored identity wholesale, keeping the token
    pub fn with_user(mut self, user: UserIdentity) -> Self {
        self.replace_user(user);
        self
    }
}
