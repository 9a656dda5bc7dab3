//! Handler for the `get_calendar_events` tool.

use rmcp::model::JsonObject;
use serde_json::json;

use crate::format::format_calendar;
use crate::providers::CalendarClient;
use crate::tools::{
    ParamType, ParameterSchema, ToolContext, ToolError, ToolFuture, ToolHandler, date_arg,
    string_arg,
};

pub const CALENDAR_EVENTS_TOOL: &str = "get_calendar_events";

pub struct CalendarEventsHandler {
    client: CalendarClient,
    schema: ParameterSchema,
}

impl CalendarEventsHandler {
    pub fn new(client: CalendarClient) -> Self {
        Self {
            client,
            schema: ParameterSchema::new()
                .required("start_date", ParamType::Date, "First day (YYYY-MM-DD).")
                .required("end_date", ParamType::Date, "Last day, inclusive (YYYY-MM-DD).")
                .with_default(
                    "calendar_id",
                    ParamType::String,
                    json!("primary"),
                    "Calendar to read.",
                ),
        }
    }
}

impl ToolHandler for CalendarEventsHandler {
    fn name(&self) -> &str {
        CALENDAR_EVENTS_TOOL
    }

    fn title(&self) -> Option<&str> {
        Some("Calendar Events")
    }

    fn description(&self) -> &str {
        "Fetch Google Calendar events for a time period. Returns a list of \
         events with summary, start, end, location and id."
    }

    fn parameters(&self) -> &ParameterSchema {
        &self.schema
    }

    fn execute(&self, args: JsonObject, _ctx: &ToolContext) -> ToolFuture<'_> {
        Box::pin(async move {
            let start = date_arg(&args, "start_date")?;
            let end = date_arg(&args, "end_date")?;
            let calendar_id = string_arg(&args, "calendar_id")?;

            if end < start {
                return Err(ToolError::InvalidArguments(format!(
                    "end_date {} is before start_date {}",
                    end, start
                ))
                .into());
            }

            let response = self.client.list_events(&calendar_id, start, end).await?;
            Ok(format_calendar(response.as_ref()))
        })
    }
}
