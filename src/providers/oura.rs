//! Oura ring API client (daily sleep, activity and readiness).

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::FitnessConfig;
use crate::dates::DateRange;
use crate::providers::{ProviderError, ProviderResponse, into_response, join_segments, send_json};

const PROVIDER: &str = "oura";

#[derive(Clone)]
pub struct OuraClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl OuraClient {
    pub fn new(client: Client, base_url: Url, token: Option<String>) -> Self {
        Self {
            client,
            base_url,
            token,
        }
    }

    pub fn from_config(client: Client, config: &FitnessConfig) -> anyhow::Result<Self> {
        Ok(Self::new(
            client,
            super::parse_base_url(&config.oura_base_url)?,
            config.oura_token.clone(),
        ))
    }

    pub async fn daily_sleep(&self, range: DateRange) -> ProviderResponse {
        self.usercollection("daily_sleep", range).await
    }

    pub async fn daily_activity(&self, range: DateRange) -> ProviderResponse {
        self.usercollection("daily_activity", range).await
    }

    pub async fn daily_readiness(&self, range: DateRange) -> ProviderResponse {
        self.usercollection("daily_readiness", range).await
    }

    async fn usercollection(&self, collection: &str, range: DateRange) -> ProviderResponse {
        into_response(PROVIDER, self.fetch(collection, range).await)
    }

    async fn fetch(
        &self,
        collection: &str,
        range: DateRange,
    ) -> Result<serde_json::Value, ProviderError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| ProviderError::MissingCredential("OURA_API_KEY".to_string()))?;

        let mut url = join_segments(&self.base_url, &["usercollection", collection])?;
        url.query_pairs_mut()
            .append_pair("start_date", &range.start_param())
            .append_pair("end_date", &range.end_param());

        debug!(provider = PROVIDER, collection, "GET {}", url.path());
        send_json(self.client.get(url).bearer_auth(token)).await
    }
}
