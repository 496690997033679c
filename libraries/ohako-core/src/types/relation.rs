//! Membership relation keys
//!
//! A membership relation is a boolean fact about one subject from the current
//! user's point of view: "this track is in my playlist", "I follow this user".

use super::ids::{TrackId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of membership relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Subject is a track id; true when the track is in the current user's playlist
    TrackInPlaylist,
    /// Subject is a user id; true when the current user follows that user
    UserIsFollowed,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::TrackInPlaylist => write!(f, "track_in_playlist"),
            RelationKind::UserIsFollowed => write!(f, "user_is_followed"),
        }
    }
}

/// Subject of a relation, stored in its string form
///
/// Track ids are already strings; user ids are rendered in decimal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    /// Create a subject id from its raw string form
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&TrackId> for SubjectId {
    fn from(id: &TrackId) -> Self {
        Self(id.as_str().to_string())
    }
}

impl From<TrackId> for SubjectId {
    fn from(id: TrackId) -> Self {
        Self::from(&id)
    }
}

impl From<UserId> for SubjectId {
    fn from(id: UserId) -> Self {
        Self(id.to_string())
    }
}

impl From<&UserId> for SubjectId {
    fn from(id: &UserId) -> Self {
        Self::from(*id)
    }
}

impl From<&str> for SubjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
