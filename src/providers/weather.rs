//! OpenWeatherMap current-conditions client.

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::FitnessConfig;
use crate::providers::{ProviderError, ProviderResponse, into_response, join_segments, send_json};

const PROVIDER: &str = "openweather";

#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl WeatherClient {
    pub fn new(client: Client, base_url: Url, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    pub fn from_config(client: Client, config: &FitnessConfig) -> anyhow::Result<Self> {
        Ok(Self::new(
            client,
            super::parse_base_url(&config.weather_base_url)?,
            config.weather_api_key.clone(),
        ))
    }

    /// Current conditions for `city,country`, in metric units.
    pub async fn current(&self, city: &str, country: &str) -> ProviderResponse {
        into_response(PROVIDER, self.fetch(city, country).await)
    }

    async fn fetch(&self, city: &str, country: &str) -> Result<serde_json::Value, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::MissingCredential("OPENWEATHER_API_KEY".to_string()))?;

        let mut url = join_segments(&self.base_url, &["weather"])?;
        url.query_pairs_mut()
            .append_pair("q", &format!("{},{}", city, country))
            .append_pair("appid", api_key)
            .append_pair("units", "metric");

        debug!(provider = PROVIDER, city, country, "Fetching current weather");
        send_json(self.client.get(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{build_http_client, stub};
    use axum::{Json, Router, extract::Query, routing::get};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::time::Duration;

    async fn weather_route(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
        Json(json!({
            "weather": [{"description": "light rain"}],
            "main": {"temp": 11.5, "feels_like": 9.8, "humidity": 81},
            "wind": {"speed": 4.1},
            "query": q,
        }))
    }

    #[tokio::test]
    async fn test_current_builds_query() {
        let base = stub::serve(Router::new().route("/data/2.5/weather", get(weather_route))).await;
        let client = WeatherClient::new(
            build_http_client(Duration::from_secs(5)).unwrap(),
            Url::parse(&format!("{}/data/2.5/", base)).unwrap(),
            Some("k3y".to_string()),
        );

        let body = client.current("San Jose", "US").await.unwrap();
        assert_eq!(body["query"]["q"], json!("San Jose,US"));
        assert_eq!(body["query"]["appid"], json!("k3y"));
        assert_eq!(body["query"]["units"], json!("metric"));
        assert_eq!(body["main"]["humidity"], json!(81));
    }

    #[tokio::test]
    async fn test_missing_api_key_yields_none() {
        let client = WeatherClient::new(
            build_http_client(Duration::from_secs(5)).unwrap(),
            Url::parse("http://127.0.0.1:9/").unwrap(),
            None,
        );
        assert!(client.current("Paris", "FR").await.is_none());
    }
}
