//! Client for the LINE Platform endpoints used for login.
//!
//! A bearer access token is checked with `/oauth2/v2.1/verify`, then the
//! profile is read from `/v2/profile`. Nothing is cached: every
//! authenticated request costs two round trips to LINE.

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::server::config::ServerConfig;

pub const BEARER_PREFIX: &str = "Bearer ";

#[derive(Error, Debug)]
pub enum LineError {
    #[error("Missing or malformed bearer credential")]
    MissingCredential,
    #[error("Access token rejected: {0}")]
    Rejected(String),
    #[error("LINE API unavailable: {0}")]
    Unavailable(String),
    #[error("Unexpected LINE API response: {0}")]
    BadResponse(String),
}

/// Profile returned by `GET /v2/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineProfile {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub picture_url: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub scope: String,
    pub client_id: String,
    pub expires_in: i64,
}

/// One instance per process, shared across requests.
#[derive(Debug, Clone)]
pub struct LineClient {
    http: Client,
    base_url: String,
    channel_id: String,
    channel_secret: String,
}

impl LineClient {
    pub fn new(
        base_url: &str,
        channel_id: &str,
        channel_secret: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tsundoku-backend/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            channel_id: channel_id.to_string(),
            channel_secret: channel_secret.to_string(),
        })
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            &config.line_api_base_url,
            &config.line_channel_id,
            &config.line_channel_secret,
            config.line_timeout(),
        )
    }

    /// Checks the token and returns the LINE profile behind it.
    pub async fn authenticate(&self, authorization: &str) -> Result<LineProfile, LineError> {
        let token = strip_bearer(authorization)?;
        self.verify_access_token(token).await?;
        let profile = self.fetch_profile(token).await?;
        debug!(line_user_id = %profile.user_id, "LINE access token verified.");
        Ok(profile)
    }

    pub async fn verify_access_token(&self, token: &str) -> Result<VerifyResponse, LineError> {
        let response = self
            .http
            .get(format!("{}/oauth2/v2.1/verify", self.base_url))
            .query(&[("access_token", token)])
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;

        let verified: VerifyResponse = response
            .json()
            .await
            .map_err(|e| LineError::BadResponse(format!("verify: {e}")))?;

        if verified.client_id != self.channel_id {
            warn!(client_id = %verified.client_id, "Access token was issued for another channel.");
            return Err(LineError::Rejected("token was issued for another channel".to_string()));
        }
        if verified.expires_in <= 0 {
            return Err(LineError::Rejected("token has expired".to_string()));
        }
        Ok(verified)
    }

    pub async fn fetch_profile(&self, token: &str) -> Result<LineProfile, LineError> {
        let response = self
            .http
            .get(format!("{}/v2/profile", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;

        let profile: LineProfile = response
            .json()
            .await
            .map_err(|e| LineError::BadResponse(format!("profile: {e}")))?;
        if profile.user_id.is_empty() {
            return Err(LineError::BadResponse("profile without userId".to_string()));
        }
        Ok(profile)
    }

    /// Invalidates the token on the LINE side. This is the whole of logout.
    pub async fn revoke(&self, authorization: &str) -> Result<(), LineError> {
        let token = strip_bearer(authorization)?;
        let params = [
            ("client_id", self.channel_id.as_str()),
            ("client_secret", self.channel_secret.as_str()),
            ("access_token", token),
        ];
        let response = self
            .http
            .post(format!("{}/oauth2/v2.1/revoke", self.base_url))
            .form(&params)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).await?;
        Ok(())
    }
}

/// Extracts the raw token from an `Authorization` header value.
pub fn strip_bearer(authorization: &str) -> Result<&str, LineError> {
    let token = authorization
        .trim()
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .unwrap_or_default();
    if token.is_empty() {
        return Err(LineError::MissingCredential);
    }
    Ok(token)
}

fn transport_error(e: reqwest::Error) -> LineError {
    if e.is_timeout() {
        LineError::Unavailable(format!("request timed out: {e}"))
    } else {
        LineError::Unavailable(e.to_string())
    }
}

async fn check_status(response: Response) -> Result<Response, LineError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
        Err(LineError::Rejected(format!("{status}: {body}")))
    } else {
        Err(LineError::Unavailable(format!("{status}: {body}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_bearer() {
        assert_eq!(strip_bearer("Bearer abc.def").unwrap(), "abc.def");
        assert_eq!(strip_bearer("  Bearer  abc ").unwrap(), "abc");
    }

    #[test]
    fn test_strip_bearer_rejects_malformed() {
        for header in ["", "Bearer", "Bearer   ", "abc", "Basic abc", "bearer abc"] {
            assert!(
                matches!(strip_bearer(header), Err(LineError::MissingCredential)),
                "accepted {header:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_unavailable() {
        // Nothing listens on port 1.
        let client = LineClient::new("http://127.0.0.1:1/", "c", "s", Duration::from_secs(2)).unwrap();
        let result = client.authenticate("Bearer token").await;
        assert!(matches!(result, Err(LineError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_malformed_credential_skips_network() {
        let client = LineClient::new("http://127.0.0.1:1", "c", "s", Duration::from_secs(2)).unwrap();
        assert!(matches!(
            client.authenticate("token-without-prefix").await,
            Err(LineError::MissingCredential)
        ));
        assert!(matches!(client.revoke("").await, Err(LineError::MissingCredential)));
    }
}
