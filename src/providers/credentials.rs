//! Calendar OAuth credential storage and refresh.
//!
//! The interactive consent flow lives outside this crate; it is expected to
//! leave a token file behind. This module reads that file, refreshes the
//! access token when it expires and writes the refreshed token back.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::providers::{ProviderError, send_json};
use crate::tools::ToolError;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens are treated as expired this long before their actual expiry.
const EXPIRY_SKEW_SECONDS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// A stored OAuth2 credential for read-only calendar access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarCredential {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
}

impl CalendarCredential {
    /// A token without an expiry is assumed valid.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - Duration::seconds(EXPIRY_SKEW_SECONDS) > now,
            None => true,
        }
    }

    fn can_refresh(&self) -> bool {
        self.refresh_token.is_some() && self.client_id.is_some() && self.client_secret.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Source of a usable calendar credential.
pub trait CredentialStore: Send + Sync {
    /// Return a non-expired credential, refreshing it if needed.
    ///
    /// Fails with `ToolError::AuthRequired` when a human must re-authorize.
    fn get_valid_credential(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<CalendarCredential, ToolError>> + Send + '_>>;
}

/// Credential store backed by a JSON token file.
pub struct FileCredentialStore {
    path: PathBuf,
    client: Client,
    /// Serializes refreshes; holds the last known credential.
    current: Mutex<Option<CalendarCredential>>,
}

impl FileCredentialStore {
    /// Open the store, reading the token file if it exists.
    pub fn open(path: impl Into<PathBuf>, client: Client) -> Self {
        let path = path.into();
        let current = match read_credential(&path) {
            Ok(credential) => credential,
            Err(e) => {
                warn!("Ignoring unreadable calendar token {}: {}", path.display(), e);
                None
            }
        };
        Self {
            path,
            client,
            current: Mutex::new(current),
        }
    }

    fn auth_required(&self, reason: &str) -> ToolError {
        ToolError::AuthRequired(format!(
            "{}; complete the Google Calendar consent flow and save the token to {}",
            reason,
            self.path.display()
        ))
    }

    async fn refresh(
        &self,
        credential: &CalendarCredential,
    ) -> Result<CalendarCredential, ProviderError> {
        let (Some(refresh_token), Some(client_id), Some(client_secret)) = (
            credential.refresh_token.as_deref(),
            credential.client_id.as_deref(),
            credential.client_secret.as_deref(),
        ) else {
            return Err(ProviderError::MissingCredential("refresh_token".to_string()));
        };

        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "refresh_token")
            .append_pair("refresh_token", refresh_token)
            .append_pair("client_id", client_id)
            .append_pair("client_secret", client_secret)
            .finish();

        debug!("Refreshing calendar access token via {}", credential.token_uri);
        let value = send_json(
            self.client
                .post(&credential.token_uri)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(body),
        )
        .await?;

        let refreshed: RefreshResponse =
            serde_json::from_value(value).map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(CalendarCredential {
            access_token: refreshed.access_token,
            refresh_token: refreshed.refresh_token.or_else(|| credential.refresh_token.clone()),
            expires_at: refreshed.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
            ..credential.clone()
        })
    }
}

impl CredentialStore for FileCredentialStore {
    fn get_valid_credential(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<CalendarCredential, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let mut current = self.current.lock().await;

            // The consent flow may have written the file since startup.
            if current.is_none() {
                *current = read_credential(&self.path).unwrap_or_else(|e| {
                    warn!("Ignoring unreadable calendar token {}: {}", self.path.display(), e);
                    None
                });
            }

            let Some(credential) = current.clone() else {
                return Err(self.auth_required("no calendar token found"));
            };

            if credential.is_valid_at(Utc::now()) {
                return Ok(credential);
            }

            if !credential.can_refresh() {
                return Err(self.auth_required("calendar token expired and cannot be refreshed"));
            }

            let refreshed = match self.refresh(&credential).await {
                Ok(refreshed) => refreshed,
                Err(e @ (ProviderError::Rejected(_) | ProviderError::MissingCredential(_))) => {
                    warn!(kind = %e.kind(), "Calendar token refresh rejected: {}", e);
                    return Err(self.auth_required("calendar token refresh was rejected"));
                }
                // Outages keep the stored token; the next call tries again.
                Err(e) => {
                    warn!(kind = %e.kind(), "Calendar token refresh failed: {}", e);
                    return Err(ToolError::Handler(format!(
                        "calendar token refresh failed, try again later: {}",
                        e
                    )));
                }
            };

            if let Err(e) = write_credential(&self.path, &refreshed).await {
                warn!("Could not persist refreshed calendar token: {}", e);
            } else {
                info!("Refreshed calendar token saved to {}", self.path.display());
            }

            *current = Some(refreshed.clone());
            Ok(refreshed)
        })
    }
}

fn read_credential(path: &Path) -> anyhow::Result<Option<CalendarCredential>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&raw)?))
}

/// Write the credential next to its final path, then rename over it.
async fn write_credential(path: &Path, credential: &CalendarCredential) -> anyhow::Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("calendar_token.json");
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    let raw = serde_json::to_vec_pretty(credential)?;
    tokio::fs::write(&tmp, raw).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}
