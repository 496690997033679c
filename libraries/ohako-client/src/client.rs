//! Main OHAKO API client.

use crate::auth::AuthClient;
use crate::discovery::DiscoveryClient;
use crate::error::{ClientError, Result};
use crate::gateway::RemoteGateway;
use crate::playlist::PlaylistClient;
use crate::social::SocialClient;
use crate::types::{Authenticated, ClientConfig};
use async_trait::async_trait;
use ohako_core::{
    FollowData, FollowList, IdentityPatch, ProfileImage, Recommendation, Track, TrackId, UserId,
    UserIdentity, UserPlaylist,
};
use reqwest::Client;
use std::collections::HashSet;

/// HTTP implementation of [`RemoteGateway`].
///
/// The client holds no session state: every authenticated call takes the
/// bearer token explicitly, since the session belongs to the caller.
///
/// # Example
///
/// ```ignore
/// use ohako_client::{ClientConfig, OhakoClient};
///
/// let client = OhakoClient::new(ClientConfig::new("https://ohako.example.com/api"))?;
/// let tracks = client.discovery("token").search_tracks("blue").await?;
/// println!("Found {} tracks", tracks.len());
/// ```
#[derive(Debug, Clone)]
pub struct OhakoClient {
    http: Client,
    url: String,
}

impl OhakoClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        // Validate URL
        if config.url.is_empty() {
            return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
        }

        // Parse and normalize URL
        let url = config.url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(format!("OHAKO/{} (Terminal)", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self { http, url })
    }

    /// Get the API base URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Authentication and profile operations.
    pub fn auth(&self) -> AuthClient<'_> {
        AuthClient::new(&self.http, &self.url)
    }

    /// Playlist operations; `access_token` may be omitted for public reads.
    pub fn playlists<'a>(&'a self, access_token: Option<&'a str>) -> PlaylistClient<'a> {
        PlaylistClient::new(&self.http, &self.url, access_token)
    }

    /// Follow graph operations.
    pub fn social<'a>(&'a self, access_token: &'a str) -> SocialClient<'a> {
        SocialClient::new(&self.http, &self.url, access_token)
    }

    /// Search and recommendations.
    pub fn discovery<'a>(&'a self, access_token: &'a str) -> DiscoveryClient<'a> {
        DiscoveryClient::new(&self.http, &self.url, access_token)
    }
}

#[async_trait]
impl RemoteGateway for OhakoClient {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Authenticated> {
        self.auth().login(username, password).await
    }

    async fn register(&self, username: &str, password: &str) -> Result<Authenticated> {
        self.auth().register(username, password).await
    }

    async fn fetch_playlist(&self, token: &str) -> Result<Vec<Track>> {
        self.playlists(Some(token)).get_playlist().await
    }

    async fn add_track(&self, token: &str, track_id: &TrackId) -> Result<()> {
        self.playlists(Some(token)).add_track(track_id).await
    }

    async fn remove_track(&self, token: &str, track_id: &TrackId) -> Result<()> {
        self.playlists(Some(token)).remove_track(track_id).await
    }

    async fn fetch_follow_status(
        &self,
        token: &str,
        user_ids: &[UserId],
    ) -> Result<HashSet<UserId>> {
        self.social(token).follow_status(user_ids).await
    }

    async fn follow_user(&self, token: &str, user_id: UserId) -> Result<()> {
        self.social(token).follow(user_id).await
    }

    async fn unfollow_user(&self, token: &str, user_id: UserId) -> Result<()> {
        self.social(token).unfollow(user_id).await
    }

    async fn fetch_followed_users(&self, token: &str) -> Result<FollowList> {
        self.social(token).followed_users().await
    }

    async fn fetch_follow_data(&self, token: &str) -> Result<FollowData> {
        self.social(token).follow_data().await
    }

    async fn fetch_track_listeners(
        &self,
        token: &str,
        track_id: &TrackId,
    ) -> Result<Vec<UserIdentity>> {
        self.social(token).track_listeners(track_id).await
    }

    async fn fetch_user_playlist(&self, user_id: UserId) -> Result<UserPlaylist> {
        self.playlists(None).get_user_playlist(user_id).await
    }

    async fn search_tracks(&self, token: &str, query: &str) -> Result<Vec<Track>> {
        self.discovery(token).search_tracks(query).await
    }

    async fn recommend_by_key(&self, token: &str, query: &str) -> Result<Recommendation> {
        self.discovery(token).recommend_by_key(query).await
    }

    async fn recommend_by_tempo(&self, token: &str, query: &str) -> Result<Recommendation> {
        self.discovery(token).recommend_by_tempo(query).await
    }

    async fn update_profile(&self, token: &str, patch: &IdentityPatch) -> Result<UserIdentity> {
        self.auth().update_profile(token, patch).await
    }

    async fn upload_profile_image(
        &self,
        token: &str,
        image: &ProfileImage,
    ) -> Result<UserIdentity> {
        self.auth().upload_profile_image(token, image).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_validation() {
        // Valid URLs
        assert!(OhakoClient::new(ClientConfig::new("https://example.com")).is_ok());
        assert!(OhakoClient::new(ClientConfig::new("http://localhost:8000/api")).is_ok());

        // Invalid URLs
        assert!(OhakoClient::new(ClientConfig::new("")).is_err());
        assert!(OhakoClient::new(ClientConfig::new("not-a-url")).is_err());
        assert!(OhakoClient::new(ClientConfig::new("ftp://example.com")).is_err());
    }

    #[test]
    fn test_url_normalization() {
        let client = OhakoClient::new(ClientConfig::new("https://example.com/api//"))
            .expect("valid url");
        assert_eq!(client.url(), "https://example.com/api");
    }
}
