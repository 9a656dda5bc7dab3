//! Handler for the `get_weather` tool.

use rmcp::model::JsonObject;
use serde_json::json;

use crate::format::format_weather;
use crate::providers::WeatherClient;
use crate::tools::{
    ParamType, ParameterSchema, ToolContext, ToolFuture, ToolHandler, ToolOutput, string_arg,
};

pub const WEATHER_TOOL: &str = "get_weather";

/// Reports current conditions for a city.
pub struct WeatherHandler {
    client: WeatherClient,
    schema: ParameterSchema,
}

impl WeatherHandler {
    /// `default_city`/`default_country` are advertised as the parameter
    /// defaults and used when the caller omits them.
    pub fn new(client: WeatherClient, default_city: &str, default_country: &str) -> Self {
        Self {
            client,
            schema: ParameterSchema::new()
                .with_default("city", ParamType::String, json!(default_city), "City name.")
                .with_default(
                    "country",
                    ParamType::String,
                    json!(default_country),
                    "ISO 3166 country code, e.g. US.",
                ),
        }
    }
}

impl ToolHandler for WeatherHandler {
    fn name(&self) -> &str {
        WEATHER_TOOL
    }

    fn title(&self) -> Option<&str> {
        Some("Current Weather")
    }

    fn description(&self) -> &str {
        "Get the current weather for a city: conditions, temperature, \
         feels-like temperature, humidity and wind speed."
    }

    fn parameters(&self) -> &ParameterSchema {
        &self.schema
    }

    fn execute(&self, args: JsonObject, _ctx: &ToolContext) -> ToolFuture<'_> {
        Box::pin(async move {
            let city = string_arg(&args, "city")?;
            let country = string_arg(&args, "country")?;

            let response = self.client.current(&city, &country).await;
            let location = format!("{},{}", city, country);
            Ok(ToolOutput::Text(format_weather(response.as_ref(), &location)))
        })
    }
}
