//! Types for OHAKO API requests and responses.

use ohako_core::{Track, TrackId, UserId, UserIdentity};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for connecting to the OHAKO API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "https://ohako.example.com/api")
    pub url: String,
    /// Whole-request timeout
    pub timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl ClientConfig {
    /// Create a config with default timeouts.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Override both timeouts.
    #[must_use]
    pub fn with_timeouts(mut self, timeout: Duration, connect_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.connect_timeout = connect_timeout;
        self
    }
}

/// Token and identity returned by login and registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub token: String,
    pub user: UserIdentity,
}

// =============================================================================
// Authentication Types
// =============================================================================

/// Request body for the login and register endpoints.
#[derive(Debug, Serialize)]
pub(crate) struct CredentialsRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response from successful login or registration.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    pub access: String,
    pub user: UserIdentity,
}

/// Field errors returned by a rejected registration.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RegisterErrorBody {
    #[serde(default)]
    pub username: Option<serde_json::Value>,
}

// =============================================================================
// Playlist Types
// =============================================================================

/// The current user's playlist.
#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistResponse {
    pub tracks: Vec<Track>,
}

/// Request body for add/remove track.
#[derive(Debug, Serialize)]
pub(crate) struct TrackRequest<'a> {
    pub track_id: &'a TrackId,
}

// =============================================================================
// Social Types
// =============================================================================

/// Request body for the follow status lookup.
#[derive(Debug, Serialize)]
pub(crate) struct FollowStatusRequest<'a> {
    pub user_ids: &'a [UserId],
}

/// Subset of the requested users that the current user follows.
#[derive(Debug, Deserialize)]
pub(crate) struct FollowStatusResponse {
    pub following: Vec<UserId>,
}

/// Request body for follow/unfollow.
#[derive(Debug, Serialize)]
pub(crate) struct UserRequest {
    pub user_id: UserId,
}

/// Both follow lists with their counts.
#[derive(Debug, Deserialize)]
pub(crate) struct FollowDataResponse {
    #[serde(default)]
    pub following: Vec<UserIdentity>,
    #[serde(default)]
    pub followers: Vec<UserIdentity>,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub followers_count: u64,
}
