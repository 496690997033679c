//! Follow graph operations for the OHAKO API.

use crate::error::{ClientError, Result};
use crate::response;
use crate::types::{FollowDataResponse, FollowStatusRequest, FollowStatusResponse, UserRequest};
use ohako_core::{FollowData, FollowList, TrackId, UserId, UserIdentity};
use reqwest::Client;
use std::collections::HashSet;
use tracing::debug;

/// Social client for the OHAKO API.
pub struct SocialClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    access_token: &'a str,
}

impl<'a> SocialClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, access_token: &'a str) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    /// Which of `user_ids` the current user follows.
    pub async fn follow_status(&self, user_ids: &[UserId]) -> Result<HashSet<UserId>> {
        let url = format!("{}/follow_status/", self.base_url);
        debug!(url = %url, users = user_ids.len(), "Fetching follow status");

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.access_token)
            .json(&FollowStatusRequest { user_ids })
            .send()
            .await
            .map_err(ClientError::from_send)?;

        let status: FollowStatusResponse = response::read_json(response, "follow status").await?;
        Ok(status.following.into_iter().collect())
    }

    /// Follow a user.
    pub async fn follow(&self, user_id: UserId) -> Result<()> {
        self.post_user("follow_user", user_id).await
    }

    /// Stop following a user.
    pub async fn unfollow(&self, user_id: UserId) -> Result<()> {
        self.post_user("unfollow_user", user_id).await
    }

    async fn post_user(&self, endpoint: &str, user_id: UserId) -> Result<()> {
        let url = format!("{}/{}/", self.base_url, endpoint);
        debug!(url = %url, user_id = %user_id, "Updating follow edge");

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.access_token)
            .json(&UserRequest { user_id })
            .send()
            .await
            .map_err(ClientError::from_send)?;

        response::expect_success(response, &format!("user {}", user_id)).await
    }

    /// Users the current user follows.
    pub async fn followed_users(&self) -> Result<FollowList> {
        let url = format!("{}/followed_users/", self.base_url);
        debug!(url = %url, "Fetching followed users");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.access_token)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        let users: Vec<UserIdentity> = response::read_json(response, "followed users").await?;
        Ok(FollowList {
            count: users.len() as u64,
            users,
        })
    }

    /// Both follow lists with counts.
    pub async fn follow_data(&self) -> Result<FollowData> {
        let url = format!("{}/follow_data/", self.base_url);
        debug!(url = %url, "Fetching follow data");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.access_token)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        let data: FollowDataResponse = response::read_json(response, "follow data").await?;

        debug!(
            following = data.following_count,
            followers = data.followers_count,
            "Fetched follow data"
        );

        Ok(FollowData {
            following: FollowList {
                users: data.following,
                count: data.following_count,
            },
            followers: FollowList {
                users: data.followers,
                count: data.followers_count,
            },
        })
    }

    /// Users who have a track in their playlist.
    pub async fn track_listeners(&self, track_id: &TrackId) -> Result<Vec<UserIdentity>> {
        let url = format!("{}/track_users/{}/", self.base_url, track_id);
        debug!(url = %url, track_id = %track_id, "Fetching track listeners");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.access_token)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        response::read_json(response, &format!("listeners of track {}", track_id)).await
    }
}
