//! Google Calendar events client (read-only scope).

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::FitnessConfig;
use crate::providers::{
    CredentialStore, ProviderError, ProviderResponse, into_response, join_segments, send_json,
};
use crate::tools::ToolError;

const PROVIDER: &str = "google_calendar";

#[derive(Clone)]
pub struct CalendarClient {
    client: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialStore>,
}

impl CalendarClient {
    pub fn new(client: Client, base_url: Url, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            client,
            base_url,
            credentials,
        }
    }

    pub fn from_config(
        client: Client,
        config: &FitnessConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> anyhow::Result<Self> {
        Ok(Self::new(
            client,
            super::parse_base_url(&config.calendar_base_url)?,
            credentials,
        ))
    }

    /// List single-instance events from `start` through `end` inclusive,
    /// ordered by start time.
    ///
    /// `Err` comes only from the credential store: `AuthRequired` when the
    /// user has to re-authorize, a handler error when the token endpoint is
    /// down. Every other failure is an empty `ProviderResponse`.
    pub async fn list_events(
        &self,
        calendar_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ProviderResponse, ToolError> {
        let credential = self.credentials.get_valid_credential().await?;
        let result = self
            .fetch(calendar_id, start, end, &credential.access_token)
            .await;
        Ok(into_response(PROVIDER, result))
    }

    async fn fetch(
        &self,
        calendar_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        access_token: &str,
    ) -> Result<serde_json::Value, ProviderError> {
        // The upper bound is exclusive, so add a day to keep `end` inclusive.
        let end_exclusive = end
            .checked_add_days(Days::new(1))
            .ok_or_else(|| ProviderError::Unavailable(format!("end date out of range: {}", end)))?;

        let mut url = join_segments(&self.base_url, &["calendars", calendar_id, "events"])?;
        url.query_pairs_mut()
            .append_pair("timeMin", &rfc3339_midnight(start))
            .append_pair("timeMax", &rfc3339_midnight(end_exclusive))
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        debug!(provider = PROVIDER, calendar_id, %start, %end, "Listing calendar events");
        send_json(self.client.get(url).bearer_auth(access_token)).await
    }
}

fn rfc3339_midnight(day: NaiveDate) -> String {
    format!("{}T00:00:00Z", day.format("%Y-%m-%d"))
}
