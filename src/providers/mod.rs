//! HTTP clients for the external data providers.
//!
//! Every client call ends in a `ProviderResponse`: the parsed JSON body on
//! success, `None` on any failure. Failures are logged here and go no
//! further.

use std::fmt;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::tools::ErrorKind;

pub mod calendar;
pub mod credentials;
pub mod oura;
pub mod weather;

pub use calendar::CalendarClient;
pub use credentials::{CalendarCredential, CredentialStore, FileCredentialStore};
pub use oura::OuraClient;
pub use weather::WeatherClient;

/// Raw provider payload, or `None` if the call failed for any reason.
pub type ProviderResponse = Option<Value>;

/// Why a provider call failed. Never leaves this module tree.
#[derive(Debug, Clone)]
pub enum ProviderError {
    /// Connection failure, timeout or a 5xx/unexpected status.
    Unavailable(String),
    /// The provider answered with a 4xx status.
    Rejected(String),
    /// The body was not the JSON we asked for.
    Malformed(String),
    /// A required secret is not configured.
    MissingCredential(String),
}

impl ProviderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unavailable(_) | Self::Rejected(_) | Self::MissingCredential(_) => {
                ErrorKind::ProviderUnavailable
            }
            Self::Malformed(_) => ErrorKind::MalformedPayload,
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "Provider unavailable: {}", msg),
            Self::Rejected(msg) => write!(f, "Provider rejected the request: {}", msg),
            Self::Malformed(msg) => write!(f, "Malformed provider payload: {}", msg),
            Self::MissingCredential(name) => write!(f, "Missing credential: {}", name),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Build the shared HTTP client with the per-request timeout.
pub fn build_http_client(timeout: Duration) -> anyhow::Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("fitness-agent/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Parse a configured base URL.
pub(crate) fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    Url::parse(raw).map_err(|e| anyhow::anyhow!("Invalid provider URL {}: {}", raw, e))
}

/// Append path segments to a base URL, tolerating a trailing slash.
pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, ProviderError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ProviderError::Unavailable(format!("{} cannot be a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Send a request and decode the JSON body.
pub(crate) async fn send_json(request: RequestBuilder) -> Result<Value, ProviderError> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            ProviderError::Unavailable(format!("request timed out: {}", e))
        } else {
            ProviderError::Unavailable(e.to_string())
        }
    })?;

    let status = response.status();
    if status.is_client_error() {
        return Err(ProviderError::Rejected(format!("HTTP {}", status)));
    }
    if !status.is_success() {
        return Err(ProviderError::Unavailable(format!("HTTP {}", status)));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| ProviderError::Malformed(e.to_string()))
}

/// Collapse a provider result into a `ProviderResponse`, logging the failure.
pub(crate) fn into_response(
    provider: &str,
    result: Result<Value, ProviderError>,
) -> ProviderResponse {
    match result {
        Ok(value) => {
            debug!(provider, "Provider call succeeded");
            Some(value)
        }
        Err(e) => {
            warn!(provider, kind = %e.kind(), "{}", e);
            None
        }
    }
}
