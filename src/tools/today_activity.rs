//! Handler for the `get_today_activity` tool.

use rmcp::model::JsonObject;

use crate::dates::{DateRange, today};
use crate::format::format_activity;
use crate::providers::OuraClient;
use crate::tools::{ParameterSchema, ToolContext, ToolFuture, ToolHandler, ToolOutput};

pub const TODAY_ACTIVITY_TOOL: &str = "get_today_activity";

/// Reports calories and activity minutes so far today.
pub struct TodayActivityHandler {
    oura: OuraClient,
    schema: ParameterSchema,
}

impl TodayActivityHandler {
    pub fn new(oura: OuraClient) -> Self {
        Self {
            oura,
            schema: ParameterSchema::new(),
        }
    }
}

impl ToolHandler for TodayActivityHandler {
    fn name(&self) -> &str {
        TODAY_ACTIVITY_TOOL
    }

    fn title(&self) -> Option<&str> {
        Some("Today's Activity")
    }

    fn description(&self) -> &str {
        "Get information about the person's activity so far for the day: \
         calories burnt and minutes spent at high, medium and low intensity."
    }

    fn parameters(&self) -> &ParameterSchema {
        &self.schema
    }

    fn execute(&self, _args: JsonObject, _ctx: &ToolContext) -> ToolFuture<'_> {
        Box::pin(async move {
            let response = self.oura.daily_activity(DateRange::day_and_next(today())).await;
            Ok(ToolOutput::Text(format_activity(response.as_ref())))
        })
    }
}
