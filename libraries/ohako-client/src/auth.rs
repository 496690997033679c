//! Authentication methods for the OHAKO API.

use crate::error::{ClientError, Result};
use crate::response;
use crate::types::{AuthResponse, Authenticated, CredentialsRequest, RegisterErrorBody};
use ohako_core::{IdentityPatch, ProfileImage, UserIdentity};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, info, warn};

/// Authentication client for the OHAKO API.
pub struct AuthClient<'a> {
    http: &'a Client,
    base_url: &'a str,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str) -> Self {
        Self { http, base_url }
    }

    /// Login with username and password.
    pub async fn login(&self, username: &str, password: &str) -> Result<Authenticated> {
        let url = format!("{}/login/", self.base_url);
        debug!(url = %url, username = %username, "Attempting login");

        let response = self
            .http
            .post(&url)
            .json(&CredentialsRequest { username, password })
            .send()
            .await
            .map_err(ClientError::from_send)?;

        let status = response.status();

        if status.is_success() {
            let auth = Self::read_auth(response, "login response").await?;
            info!(
                username = %auth.user.username,
                user_id = %auth.user.id,
                "Login successful"
            );
            Ok(auth)
        } else if matches!(status.as_u16(), 400 | 401) {
            warn!(status = %status, "Login failed: invalid credentials");
            Err(ClientError::InvalidCredentials)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(ClientError::ServerError {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }

    /// Create an account and sign in to it.
    pub async fn register(&self, username: &str, password: &str) -> Result<Authenticated> {
        let url = format!("{}/register/", self.base_url);
        debug!(url = %url, username = %username, "Attempting registration");

        let response = self
            .http
            .post(&url)
            .json(&CredentialsRequest { username, password })
            .send()
            .await
            .map_err(ClientError::from_send)?;

        let status = response.status();

        if status.is_success() {
            let auth = Self::read_auth(response, "register response").await?;
            info!(
                username = %auth.user.username,
                user_id = %auth.user.id,
                "Registration successful"
            );
            Ok(auth)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            let body: RegisterErrorBody = serde_json::from_str(&error_text).unwrap_or_default();

            if status.as_u16() == 400 && body.username.is_some() {
                warn!(username = %username, "Registration failed: username taken");
                Err(ClientError::UsernameTaken)
            } else {
                Err(ClientError::ServerError {
                    status: status.as_u16(),
                    message: error_text,
                })
            }
        }
    }

    /// Update the signed-in user's profile.
    pub async fn update_profile(
        &self,
        access_token: &str,
        patch: &IdentityPatch,
    ) -> Result<UserIdentity> {
        let url = format!("{}/update_user/", self.base_url);
        debug!(url = %url, "Updating profile");

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(patch)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        let user: UserIdentity = response::read_json(response, "updated user").await?;
        debug!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// Replace the profile picture with an uploaded image file.
    pub async fn upload_profile_image(
        &self,
        access_token: &str,
        image: &ProfileImage,
    ) -> Result<UserIdentity> {
        let url = format!("{}/update_user/", self.base_url);
        debug!(
            url = %url,
            file = %image.file_name,
            size = image.bytes.len(),
            "Uploading profile image"
        );

        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(image.mime_type())?;
        let form = Form::new().part("profile_image", part);

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        let user: UserIdentity = response::read_json(response, "updated user").await?;
        info!(user_id = %user.id, file = %image.file_name, "Profile image uploaded");
        Ok(user)
    }

    async fn read_auth(response: reqwest::Response, what: &str) -> Result<Authenticated> {
        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse {}: {}", what, e)))?;

        Ok(Authenticated {
            token: auth.access,
            user: auth.user,
        })
    }
}
