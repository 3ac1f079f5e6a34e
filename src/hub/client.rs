//! Shared HTTP plumbing for hub clients
//!
//! This module handles:
//! - Building the HTTP client with a stable user agent and timeouts
//! - Attaching the access token
//! - Turning non-success responses into classified [`HubError`]s

use crate::hub::{HubError, HubResult};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Longest response body excerpt kept in an API error message
const MAX_ERROR_BODY: usize = 512;

/// Connection settings handed to a hub client unchanged
#[derive(Debug, Clone)]
pub struct HubSettings {
    /// Base endpoint override; the platform default is used when `None`
    pub endpoint: Option<String>,
    /// Access token sent as a bearer credential
    pub token: Option<String>,
    /// Items requested per enumeration page
    pub page_size: u32,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: None,
            page_size: 100,
        }
    }
}

impl HubSettings {
    /// Resolves the endpoint, trimming any trailing slash
    pub fn endpoint_or(&self, default: &str) -> String {
        self.endpoint
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }
}

/// Builds an HTTP client for talking to hub APIs
///
/// # Example
///
/// ```no_run
/// use oslm_crawler::hub::build_http_client;
///
/// let client = build_http_client().unwrap();
/// ```
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Attaches the bearer token, if any
pub(crate) fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Checks the status of `response` and decodes its JSON body
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> HubResult<T> {
    let response = check_status(response).await?;
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Converts non-success responses into [`HubError::Api`]
pub(crate) async fn check_status(response: Response) -> HubResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let mut message = response.text().await.unwrap_or_default();
    if message.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
    }

    Err(HubError::Api {
        status: status.as_u16(),
        url,
        message,
    })
}
