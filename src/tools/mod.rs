//! Tool handlers and the registry/dispatcher that serve them.
//!
//! Adding a tool means implementing `ToolHandler` and registering it; the
//! MCP `ServerHandler` never changes.

mod dispatcher;
mod error;
mod registry;
mod schema;

pub use dispatcher::{Dispatcher, InvocationRequest, InvocationResult};
pub use error::{ErrorKind, ToolError};
pub use registry::{
    ToolAdvertisement, ToolContext, ToolFuture, ToolHandler, ToolOutput, ToolRegistry,
};
pub use schema::{ParamSpec, ParamType, ParameterSchema};

// Tool handler implementations
mod calendar_events;
mod oura_data;
mod sleep_score;
mod today_activity;
mod weather;
mod workout_recommendation;

#[cfg(test)]
mod integration_tests;

pub use calendar_events::{CALENDAR_EVENTS_TOOL, CalendarEventsHandler};
pub use oura_data::{OURA_DATA_TOOL, OuraDataHandler};
pub use sleep_score::{SLEEP_SCORE_TOOL, SleepScoreHandler};
pub use today_activity::{TODAY_ACTIVITY_TOOL, TodayActivityHandler};
pub use weather::{WEATHER_TOOL, WeatherHandler};
pub use workout_recommendation::{
    WORKOUT_RECOMMENDATION_TOOL, WorkoutRecommendationHandler, compose_brief,
};

use chrono::NaiveDate;
use rmcp::model::JsonObject;

use crate::dates::parse_iso_date;

/// Read a validated string argument.
pub(crate) fn string_arg(args: &JsonObject, name: &str) -> Result<String, ToolError> {
    args.get(name)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| ToolError::InvalidArguments(format!("`{}` must be a string", name)))
}

/// Read a validated ISO date argument.
pub(crate) fn date_arg(args: &JsonObject, name: &str) -> Result<NaiveDate, ToolError> {
    args.get(name)
        .and_then(|v| v.as_str())
        .and_then(parse_iso_date)
        .ok_or_else(|| ToolError::InvalidArguments(format!("`{}` must be a YYYY-MM-DD date", name)))
}
