//! Playlist operations for the OHAKO API.

use crate::error::{ClientError, Result};
use crate::response;
use crate::types::{PlaylistResponse, TrackRequest};
use ohako_core::{Track, TrackId, UserId, UserPlaylist};
use reqwest::Client;
use tracing::debug;

/// Playlist client for the OHAKO API.
///
/// Reading another user's playlist works without a token; everything that
/// touches the current user's playlist needs one.
pub struct PlaylistClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    access_token: Option<&'a str>,
}

impl<'a> PlaylistClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, access_token: Option<&'a str>) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    fn token(&self) -> Result<&'a str> {
        self.access_token.ok_or(ClientError::AuthRequired)
    }

    /// Get the current user's playlist, in playlist order.
    pub async fn get_playlist(&self) -> Result<Vec<Track>> {
        let url = format!("{}/playlists/", self.base_url);
        debug!(url = %url, "Fetching playlist");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.token()?)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        let playlist: PlaylistResponse = response::read_json(response, "playlist").await?;
        debug!(tracks = playlist.tracks.len(), "Fetched playlist");
        Ok(playlist.tracks)
    }

    /// Add a track to the current user's playlist.
    pub async fn add_track(&self, track_id: &TrackId) -> Result<()> {
        self.post_track("add_track", track_id).await
    }

    /// Remove a track from the current user's playlist.
    pub async fn remove_track(&self, track_id: &TrackId) -> Result<()> {
        self.post_track("remove_track", track_id).await
    }

    async fn post_track(&self, endpoint: &str, track_id: &TrackId) -> Result<()> {
        let url = format!("{}/{}/", self.base_url, endpoint);
        debug!(url = %url, track_id = %track_id, "Updating playlist");

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.token()?)
            .json(&TrackRequest { track_id })
            .send()
            .await
            .map_err(ClientError::from_send)?;

        response::expect_success(response, &format!("track {}", track_id)).await
    }

    /// Get another user's playlist. Does not require authentication.
    pub async fn get_user_playlist(&self, user_id: UserId) -> Result<UserPlaylist> {
        let url = format!("{}/user_playlist/{}/", self.base_url, user_id);
        debug!(url = %url, user_id = %user_id, "Fetching user playlist");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        let playlist: UserPlaylist =
            response::read_json(response, &format!("playlist of user {}", user_id)).await?;

        debug!(
            user_id = %user_id,
            name = %playlist.name,
            tracks = playlist.tracks.len(),
            "Fetched user playlist"
        );
        Ok(playlist)
    }
}
