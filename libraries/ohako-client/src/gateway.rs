//! The network boundary the client core is written against.

use crate::error::Result;
use crate::types::Authenticated;
use async_trait::async_trait;
use ohako_core::{
    FollowData, FollowList, IdentityPatch, ProfileImage, Recommendation, Track, TrackId, UserId,
    UserIdentity, UserPlaylist,
};
use std::collections::HashSet;

/// Remote operations consumed by the sync core.
///
/// Every call is a single attempt; implementations do not retry.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Exchange credentials for a token and identity.
    async fn authenticate(&self, username: &str, password: &str) -> Result<Authenticated>;

    /// Create an account and sign in to it.
    async fn register(&self, username: &str, password: &str) -> Result<Authenticated>;

    /// The current user's playlist in playlist order.
    async fn fetch_playlist(&self, token: &str) -> Result<Vec<Track>>;

    /// Add a track to the current user's playlist.
    async fn add_track(&self, token: &str, track_id: &TrackId) -> Result<()>;

    /// Remove a track from the current user's playlist.
    async fn remove_track(&self, token: &str, track_id: &TrackId) -> Result<()>;

    /// The subset of `user_ids` the current user follows.
    async fn fetch_follow_status(&self, token: &str, user_ids: &[UserId])
        -> Result<HashSet<UserId>>;

    /// Follow a user.
    async fn follow_user(&self, token: &str, user_id: UserId) -> Result<()>;

    /// Stop following a user.
    async fn unfollow_user(&self, token: &str, user_id: UserId) -> Result<()>;

    /// Users the current user follows.
    async fn fetch_followed_users(&self, token: &str) -> Result<FollowList>;

    /// Both follow lists with counts.
    async fn fetch_follow_data(&self, token: &str) -> Result<FollowData>;

    /// Users following the current user.
    async fn fetch_followers(&self, token: &str) -> Result<FollowList> {
        Ok(self.fetch_follow_data(token).await?.followers)
    }

    /// Users who have `track_id` in their playlist.
    async fn fetch_track_listeners(&self, token: &str, track_id: &TrackId)
        -> Result<Vec<UserIdentity>>;

    /// Another user's playlist. No token required.
    async fn fetch_user_playlist(&self, user_id: UserId) -> Result<UserPlaylist>;

    /// Tracks matching a name query.
    async fn search_tracks(&self, token: &str, query: &str) -> Result<Vec<Track>>;

    /// Recommendations in a compatible key.
    async fn recommend_by_key(&self, token: &str, query: &str) -> Result<Recommendation>;

    /// Recommendations with a similar tempo.
    async fn recommend_by_tempo(&self, token: &str, query: &str) -> Result<Recommendation>;

    /// Apply a profile edit and return the server's view of the user.
    async fn update_profile(&self, token: &str, patch: &IdentityPatch) -> Result<UserIdentity>;

    /// Upload a new profile picture and return the server's view of the user.
    async fn upload_profile_image(&self, token: &str, image: &ProfileImage)
        -> Result<UserIdentity>;
}
