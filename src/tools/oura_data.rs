//! Handler for the `get_oura_data` tool.
//!
//! Returns raw daily sleep and readiness records for a caller-chosen range,
//! for questions that go beyond last night's score.

use rmcp::model::JsonObject;
use serde_json::{Value, json};

use crate::dates::DateRange;
use crate::providers::OuraClient;
use crate::tools::{
    ParamType, ParameterSchema, ToolContext, ToolFuture, ToolHandler, ToolOutput, date_arg,
};

pub const OURA_DATA_TOOL: &str = "get_oura_data";

pub const SLEEP_FETCH_ERROR: &str = "Error fetching Oura sleep data";
pub const READINESS_FETCH_ERROR: &str = "Error fetching Oura readiness data";

pub struct OuraDataHandler {
    oura: OuraClient,
    schema: ParameterSchema,
}

impl OuraDataHandler {
    pub fn new(oura: OuraClient) -> Self {
        Self {
            oura,
            schema: ParameterSchema::new()
                .required("start_date", ParamType::Date, "First day to fetch (YYYY-MM-DD).")
                .required("end_date", ParamType::Date, "Last day to fetch (YYYY-MM-DD)."),
        }
    }
}

/// The `data` array of a collection, or an empty array.
fn records(payload: &Value) -> Value {
    payload.get("data").cloned().unwrap_or_else(|| json!([]))
}

impl ToolHandler for OuraDataHandler {
    fn name(&self) -> &str {
        OURA_DATA_TOOL
    }

    fn title(&self) -> Option<&str> {
        Some("Oura Sleep and Readiness")
    }

    fn description(&self) -> &str {
        "Fetch daily sleep and readiness data from the Oura ring for a date range."
    }

    fn parameters(&self) -> &ParameterSchema {
        &self.schema
    }

    fn execute(&self, args: JsonObject, _ctx: &ToolContext) -> ToolFuture<'_> {
        Box::pin(async move {
            let range =
                DateRange::new(date_arg(&args, "start_date")?, date_arg(&args, "end_date")?);

            let Some(sleep) = self.oura.daily_sleep(range).await else {
                return Ok(ToolOutput::Text(SLEEP_FETCH_ERROR.to_string()));
            };
            let Some(readiness) = self.oura.daily_readiness(range).await else {
                return Ok(ToolOutput::Text(READINESS_FETCH_ERROR.to_string()));
            };

            Ok(ToolOutput::Structured(json!({
                "sleep": records(&sleep),
                "readiness": records(&readiness),
            })))
        })
    }
}
