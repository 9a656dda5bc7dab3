//! Handler for the `get_sleep_score` tool.

use rmcp::model::JsonObject;

use crate::dates::{DateRange, today};
use crate::format::format_sleep;
use crate::providers::OuraClient;
use crate::tools::{ParameterSchema, ToolContext, ToolFuture, ToolHandler, ToolOutput};

pub const SLEEP_SCORE_TOOL: &str = "get_sleep_score";

/// Reports last night's sleep score.
pub struct SleepScoreHandler {
    oura: OuraClient,
    schema: ParameterSchema,
}

impl SleepScoreHandler {
    pub fn new(oura: OuraClient) -> Self {
        Self {
            oura,
            schema: ParameterSchema::new(),
        }
    }
}

impl ToolHandler for SleepScoreHandler {
    fn name(&self) -> &str {
        SLEEP_SCORE_TOOL
    }

    fn title(&self) -> Option<&str> {
        Some("Sleep Score")
    }

    fn description(&self) -> &str {
        "Get the person's sleep score from last night. \
         It captures how well the person slept, on a scale of 0 to 100."
    }

    fn parameters(&self) -> &ParameterSchema {
        &self.schema
    }

    fn execute(&self, _args: JsonObject, _ctx: &ToolContext) -> ToolFuture<'_> {
        Box::pin(async move {
            let response = self.oura.daily_sleep(DateRange::single_day(today())).await;
            Ok(ToolOutput::Text(format_sleep(response.as_ref())))
        })
    }
}
