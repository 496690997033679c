//! Shared status handling for API responses.

use crate::error::{ClientError, Result};
use reqwest::Response;
use serde::de::DeserializeOwned;

/// Decode a successful JSON body, or map the failure status.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    if response.status().is_success() {
        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse {}: {}", what, e)))
    } else {
        Err(error_for_status(response, what).await)
    }
}

/// Accept any 2xx response, discarding the body.
pub(crate) async fn expect_success(response: Response, what: &str) -> Result<()> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(error_for_status(response, what).await)
    }
}

/// Map a non-success response of an authenticated call.
pub(crate) async fn error_for_status(response: Response, what: &str) -> ClientError {
    let status = response.status();
    match status.as_u16() {
        401 => ClientError::AuthRequired,
        404 => ClientError::NotFound(what.to_string()),
        code => {
            let error_text = response.text().await.unwrap_or_default();
            ClientError::ServerError {
                status: code,
                message: error_text,
            }
        }
    }
}
