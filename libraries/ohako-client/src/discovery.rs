//! Search and recommendation operations for the OHAKO API.

use crate::error::{ClientError, Result};
use crate::response;
use ohako_core::{Recommendation, Track};
use reqwest::Client;
use tracing::debug;

/// Discovery client for the OHAKO API.
pub struct DiscoveryClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    access_token: &'a str,
}

impl<'a> DiscoveryClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, access_token: &'a str) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    /// Search tracks by name.
    pub async fn search_tracks(&self, query: &str) -> Result<Vec<Track>> {
        let url = format!(
            "{}/search/?query={}",
            self.base_url,
            urlencoding::encode(query)
        );
        debug!(url = %url, query = %query, "Searching tracks");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.access_token)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        let tracks: Vec<Track> = response::read_json(response, "search results").await?;
        debug!(results = tracks.len(), "Search complete");
        Ok(tracks)
    }

    /// Tracks in a key compatible with the named track.
    pub async fn recommend_by_key(&self, track_name: &str) -> Result<Recommendation> {
        self.recommend("key", track_name).await
    }

    /// Tracks with a tempo close to the named track.
    pub async fn recommend_by_tempo(&self, track_name: &str) -> Result<Recommendation> {
        self.recommend("tempo", track_name).await
    }

    async fn recommend(&self, by: &str, track_name: &str) -> Result<Recommendation> {
        let url = format!(
            "{}/recommendations/{}/?track_name={}",
            self.base_url,
            by,
            urlencoding::encode(track_name)
        );
        debug!(url = %url, by = %by, track_name = %track_name, "Fetching recommendations");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.access_token)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        let recommendation: Recommendation =
            response::read_json(response, "recommendations").await?;

        debug!(
            reference = %recommendation.reference.id,
            results = recommendation.tracks.len(),
            "Recommendations fetched"
        );
        Ok(recommendation)
    }
}

// URL encoding helper
mod urlencoding {
    pub fn encode(s: &str) -> String {
        url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
    }
}
