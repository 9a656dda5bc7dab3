//! Turns provider payloads into text for the model.
//!
//! Every formatter accepts the absent response and returns a fixed sentence
//! for it. Payloads that do not have the expected shape produce a "no data"
//! sentence instead of an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::ToolOutput;

pub const SLEEP_UNAVAILABLE: &str = "Unable to fetch sleep data right now.";
pub const ACTIVITY_UNAVAILABLE: &str = "Unable to fetch activity data right now.";
pub const WEATHER_UNAVAILABLE: &str = "Unable to fetch weather data right now.";
pub const CALENDAR_UNAVAILABLE: &str = "Unable to fetch calendar events right now.";

pub const SLEEP_NO_DATA: &str = "No sleep data has been recorded for last night yet.";
pub const ACTIVITY_NO_DATA: &str = "No activity data has been recorded for today yet.";
pub const WEATHER_NO_DATA: &str = "The weather service returned no usable conditions.";
pub const CALENDAR_NO_DATA: &str = "The calendar service returned no usable events.";

#[derive(Debug, Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

// Oura fields may be null or fractional. A missing activity value reads as 0.
#[derive(Debug, Deserialize)]
struct DailySleep {
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DailyActivity {
    active_calories: Option<f64>,
    high_activity_time: Option<f64>,
    medium_activity_time: Option<f64>,
    low_activity_time: Option<f64>,
    sedentary_time: Option<f64>,
}

fn whole(value: Option<f64>) -> i64 {
    value.map(|v| v.round() as i64).unwrap_or(0)
}

/// Seconds to whole minutes, rounding down.
fn minutes(seconds: Option<f64>) -> i64 {
    seconds.map(|s| s as i64).unwrap_or(0) / 60
}

/// Decode the first ("today") record of an Oura collection.
fn first_record<T: for<'de> Deserialize<'de>>(payload: &Value) -> Option<T> {
    serde_json::from_value::<Collection<T>>(payload.clone())
        .ok()?
        .data
        .into_iter()
        .next()
}

pub fn format_sleep(response: Option<&Value>) -> String {
    let Some(payload) = response else {
        return SLEEP_UNAVAILABLE.to_string();
    };
    match first_record::<DailySleep>(payload).and_then(|d| d.score) {
        Some(score) => format!(
            "The sleep score this night was {} out of 100.",
            whole(Some(score))
        ),
        None => SLEEP_NO_DATA.to_string(),
    }
}

pub fn format_activity(response: Option<&Value>) -> String {
    let Some(payload) = response else {
        return ACTIVITY_UNAVAILABLE.to_string();
    };
    let Some(day) = first_record::<DailyActivity>(payload) else {
        return ACTIVITY_NO_DATA.to_string();
    };
    format!(
        "Here are the metrics so far for today:\n\
         Calories burnt: {}\n\
         High activity minutes: {}\n\
         Medium activity minutes: {}\n\
         Low activity minutes: {}\n\
         Sedentary minutes: {}",
        whole(day.active_calories),
        minutes(day.high_activity_time),
        minutes(day.medium_activity_time),
        minutes(day.low_activity_time),
        minutes(day.sedentary_time),
    )
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    weather: Vec<WeatherCondition>,
    main: MainReadings,
    #[serde(default)]
    wind: Option<Wind>,
}

#[derive(Debug, Deserialize)]
struct WeatherCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f64,
}

/// Summarize current conditions. `location` is used when the payload has
/// no place name of its own.
pub fn format_weather(response: Option<&Value>, location: &str) -> String {
    let Some(payload) = response else {
        return WEATHER_UNAVAILABLE.to_string();
    };
    let Ok(current) = serde_json::from_value::<CurrentWeather>(payload.clone()) else {
        return WEATHER_NO_DATA.to_string();
    };

    let place = current
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| location.to_string());
    let description = current
        .weather
        .first()
        .map(|w| w.description.as_str())
        .unwrap_or("no description");

    let mut text = format!(
        "Current weather in {}: {}. Temperature {}°C (feels like {}°C), humidity {}%",
        place, description, current.main.temp, current.main.feels_like, current.main.humidity
    );
    if let Some(wind) = current.wind {
        text.push_str(&format!(", wind {} m/s", wind.speed));
    }
    text.push('.');
    text
}

/// One calendar event as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub start: String,
    pub end: String,
    pub location: String,
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct EventsPage {
    #[serde(default)]
    items: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    start: EventTime,
    #[serde(default)]
    end: EventTime,
}

#[derive(Debug, Default, Deserialize)]
struct EventTime {
    #[serde(rename = "dateTime", default)]
    date_time: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

impl EventTime {
    /// Timed value first, all-day date second.
    fn render(self) -> String {
        self.date_time.or(self.date).unwrap_or_default()
    }
}

/// Map an events page into flat event records.
pub fn calendar_events(payload: &Value) -> Option<Vec<CalendarEvent>> {
    let page = serde_json::from_value::<EventsPage>(payload.clone()).ok()?;
    Some(
        page.items
            .into_iter()
            .map(|event| CalendarEvent {
                summary: event.summary.unwrap_or_else(|| "No Title".to_string()),
                start: event.start.render(),
                end: event.end.render(),
                location: event.location.unwrap_or_default(),
                id: event.id.unwrap_or_default(),
            })
            .collect(),
    )
}

/// Structured event list on success, a sentence otherwise.
pub fn format_calendar(response: Option<&Value>) -> ToolOutput {
    let Some(payload) = response else {
        return ToolOutput::Text(CALENDAR_UNAVAILABLE.to_string());
    };
    match calendar_events(payload).and_then(|events| serde_json::to_value(events).ok()) {
        Some(events) => ToolOutput::Structured(events),
        None => ToolOutput::Text(CALENDAR_NO_DATA.to_string()),
    }
}
