//! Handler for the `get_workout_recommendation` tool.
//!
//! Calls the sleep and weather tools through the dispatcher and folds their
//! answers into one brief for the model. It does not pick a workout itself.

use rmcp::model::JsonObject;

use crate::tools::{
    InvocationRequest, ParamType, ParameterSchema, SLEEP_SCORE_TOOL, ToolContext, ToolFuture,
    ToolHandler, ToolOutput, WEATHER_TOOL,
};

pub const WORKOUT_RECOMMENDATION_TOOL: &str = "get_workout_recommendation";

const WEIGHTING_GUIDE: &str = "\
Weigh these factors when choosing the workout:
1. Sleep quality: a low sleep score calls for lower intensity, mobility or recovery work; \
a high score allows a harder session.
2. Weather suitability: rain, snow, storms or strong wind favour an indoor session; \
clear or cloudy skies suit an outdoor one.
3. Temperature: very hot or very cold conditions favour a shorter or indoor session; \
mild temperatures suit longer outdoor efforts.

Recommend one workout for today, with its type, duration and intensity, and explain \
briefly how each factor shaped the choice.";

/// Compose the brief from the two inner answers. Sleep comes first.
pub fn compose_brief(sleep: &str, weather: &str) -> String {
    format!(
        "Use the following information to recommend a workout for today.\n\n\
         Sleep:\n{}\n\n\
         Weather:\n{}\n\n\
         {}",
        sleep.trim(),
        weather.trim(),
        WEIGHTING_GUIDE
    )
}

pub struct WorkoutRecommendationHandler {
    schema: ParameterSchema,
}

impl WorkoutRecommendationHandler {
    pub fn new() -> Self {
        Self {
            schema: ParameterSchema::new()
                .optional("city", ParamType::String, "City to check the weather for.")
                .optional("country", ParamType::String, "ISO 3166 country code for the city."),
        }
    }
}

impl Default for WorkoutRecommendationHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolHandler for WorkoutRecommendationHandler {
    fn name(&self) -> &str {
        WORKOUT_RECOMMENDATION_TOOL
    }

    fn title(&self) -> Option<&str> {
        Some("Workout Recommendation")
    }

    fn description(&self) -> &str {
        "Gather last night's sleep score and the current weather and return a brief \
         for recommending today's workout, weighing sleep quality, weather \
         suitability and temperature."
    }

    fn parameters(&self) -> &ParameterSchema {
        &self.schema
    }

    fn execute(&self, args: JsonObject, ctx: &ToolContext) -> ToolFuture<'_> {
        let dispatcher = ctx.dispatcher.clone();

        Box::pin(async move {
            // Forward only the location fields the caller actually gave.
            let mut weather_args = JsonObject::new();
            for key in ["city", "country"] {
                if let Some(value) = args.get(key) {
                    weather_args.insert(key.to_string(), value.clone());
                }
            }

            let (sleep, weather) = tokio::join!(
                dispatcher.dispatch(InvocationRequest::new(SLEEP_SCORE_TOOL)),
                dispatcher.dispatch(InvocationRequest::with_arguments(WEATHER_TOOL, weather_args)),
            );

            Ok(ToolOutput::Text(compose_brief(&sleep.to_text(), &weather.to_text())))
        })
    }
}
