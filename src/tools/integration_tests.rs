//! End-to-end dispatch tests against local stub providers.
//!
//! The full registry is built from a `FitnessConfig` whose base URLs point
//! at an axum server on an ephemeral port.

#![cfg(test)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};

use crate::config::FitnessConfig;
use crate::format::{SLEEP_UNAVAILABLE, WEATHER_UNAVAILABLE};
use crate::providers::stub;
use crate::tools::{
    CALENDAR_EVENTS_TOOL, Dispatcher, ErrorKind, InvocationRequest, InvocationResult,
    OURA_DATA_TOOL, SLEEP_SCORE_TOOL, TODAY_ACTIVITY_TOOL, ToolOutput, WEATHER_TOOL,
    WORKOUT_RECOMMENDATION_TOOL,
};

#[derive(Clone, Copy)]
struct StubBehaviour {
    sleep_ok: bool,
    weather_ok: bool,
}

/// `q` values the weather stub has received.
type SeenQueries = Arc<Mutex<Vec<String>>>;

fn stub_router(behaviour: StubBehaviour, seen: SeenQueries) -> Router {
    let sleep = move || async move {
        if behaviour.sleep_ok {
            (StatusCode::OK, Json(json!({"data": [{"day": "2024-01-05", "score": 87}]})))
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": "boom"})))
        }
    };
    let weather = move |Query(params): Query<HashMap<String, String>>| async move {
        let q = params.get("q").cloned().unwrap_or_default();
        seen.lock().unwrap().push(q.clone());
        let city = q.split(',').next().unwrap_or_default().to_string();
        if behaviour.weather_ok {
            (
                StatusCode::OK,
                Json(json!({
                    "name": city,
                    "weather": [{"description": "clear sky"}],
                    "main": {"temp": 22.5, "feels_like": 21.9, "humidity": 40},
                    "wind": {"speed": 3.6}
                })),
            )
        } else {
            (StatusCode::UNAUTHORIZED, Json(json!({"cod": 401})))
        }
    };

    Router::new()
        .route("/v2/usercollection/daily_sleep", get(sleep))
        .route(
            "/v2/usercollection/daily_activity",
            get(|| async {
                Json(json!({"data": [{
                    "active_calories": 350,
                    "high_activity_time": 1800,
                    "medium_activity_time": 600,
                    "low_activity_time": 3000,
                    "sedentary_time": 7200
                }]}))
            }),
        )
        .route(
            "/v2/usercollection/daily_readiness",
            get(|| async { Json(json!({"data": [{"day": "2024-01-05", "score": 78}]})) }),
        )
        .route("/data/2.5/weather", get(weather))
        .route(
            "/calendar/v3/calendars/{calendar_id}/events",
            get(|Path(calendar_id): Path<String>| async move {
                Json(json!({"items": [
                    {
                        "id": format!("{}-1", calendar_id),
                        "start": {"date": "2024-01-05"},
                        "end": {"date": "2024-01-06"}
                    }
                ]}))
            }),
        )
}

struct Harness {
    dispatcher: Dispatcher,
    weather_queries: SeenQueries,
    _token_dir: tempfile::TempDir,
}

async fn harness(behaviour: StubBehaviour, with_token: bool) -> Harness {
    let weather_queries = SeenQueries::default();
    let base = stub::serve(stub_router(behaviour, weather_queries.clone())).await;

    let token_dir = tempfile::tempdir().unwrap();
    let token_path = token_dir.path().join("calendar_token.json");
    if with_token {
        std::fs::write(&token_path, r#"{"access_token": "cal-token"}"#).unwrap();
    }

    let config = FitnessConfig {
        oura_base_url: format!("{}/v2", base),
        oura_token: Some("oura-token".to_string()),
        weather_base_url: format!("{}/data/2.5", base),
        weather_api_key: Some("weather-key".to_string()),
        default_city: "Lisbon".to_string(),
        default_country: "PT".to_string(),
        calendar_base_url: format!("{}/calendar/v3", base),
        calendar_token_path: token_path,
        request_timeout_secs: 5,
    };

    Harness {
        dispatcher: Dispatcher::new(Arc::new(crate::build_registry(&config).unwrap())),
        weather_queries,
        _token_dir: token_dir,
    }
}

const HEALTHY: StubBehaviour = StubBehaviour {
    sleep_ok: true,
    weather_ok: true,
};

fn text(result: InvocationResult) -> String {
    match result {
        InvocationResult::Success(ToolOutput::Text(text)) => text,
        other => panic!("expected text success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_registry_advertises_all_tools() {
    let h = harness(HEALTHY, true).await;
    let names = h.dispatcher.registry().list_names();
    for name in [
        SLEEP_SCORE_TOOL,
        TODAY_ACTIVITY_TOOL,
        OURA_DATA_TOOL,
        WEATHER_TOOL,
        CALENDAR_EVENTS_TOOL,
        WORKOUT_RECOMMENDATION_TOOL,
    ] {
        assert!(names.iter().any(|n| n == name), "missing {}", name);
    }

    let weather = h
        .dispatcher
        .registry()
        .list()
        .into_iter()
        .find(|t| t.name == WEATHER_TOOL)
        .unwrap();
    assert_eq!(weather.parameters["city"]["default"], json!("Lisbon"));
}

#[tokio::test]
async fn test_unknown_tool_for_every_registered_name() {
    let h = harness(HEALTHY, true).await;
    for name in h.dispatcher.registry().list_names() {
        let unknown = format!("{}_v2", name);
        let result = h.dispatcher.dispatch(InvocationRequest::new(unknown)).await;
        assert_eq!(result.error_kind(), Some(ErrorKind::UnknownTool));
    }
}

#[tokio::test]
async fn test_required_fields_are_enforced() {
    let h = harness(HEALTHY, true).await;
    for tool in [OURA_DATA_TOOL, CALENDAR_EVENTS_TOOL] {
        let missing = InvocationRequest::new(tool).arg("start_date", json!("2024-01-05"));
        let result = h.dispatcher.dispatch(missing).await;
        assert_eq!(result.error_kind(), Some(ErrorKind::InvalidArguments), "{}", tool);

        let wrong_type = InvocationRequest::new(tool)
            .arg("start_date", json!("2024-01-05"))
            .arg("end_date", json!(false));
        let result = h.dispatcher.dispatch(wrong_type).await;
        assert_eq!(result.error_kind(), Some(ErrorKind::InvalidArguments), "{}", tool);
    }
}

#[tokio::test]
async fn test_sleep_score() {
    let h = harness(HEALTHY, true).await;
    let result = h.dispatcher.dispatch(InvocationRequest::new(SLEEP_SCORE_TOOL)).await;
    assert!(text(result).contains("87"));
}

#[tokio::test]
async fn test_sleep_score_provider_down() {
    let h = harness(StubBehaviour { sleep_ok: false, weather_ok: true }, true).await;
    let result = h.dispatcher.dispatch(InvocationRequest::new(SLEEP_SCORE_TOOL)).await;
    assert_eq!(text(result), SLEEP_UNAVAILABLE);
}

#[tokio::test]
async fn test_today_activity() {
    let h = harness(HEALTHY, true).await;
    let result = h.dispatcher.dispatch(InvocationRequest::new(TODAY_ACTIVITY_TOOL)).await;
    let text = text(result);
    assert!(text.contains("High activity minutes: 30"));
    assert!(text.contains("Low activity minutes: 50"));
}

#[tokio::test]
async fn test_oura_data_structured() {
    let h = harness(HEALTHY, true).await;
    let request = InvocationRequest::new(OURA_DATA_TOOL)
        .arg("start_date", json!("2024-01-05"))
        .arg("end_date", json!("2024-01-05"));
    let result = h.dispatcher.dispatch(request).await;
    assert_eq!(
        result,
        InvocationResult::Success(ToolOutput::Structured(json!({
            "sleep": [{"day": "2024-01-05", "score": 87}],
            "readiness": [{"day": "2024-01-05", "score": 78}],
        })))
    );
}

#[tokio::test]
async fn test_weather_uses_defaults() {
    let h = harness(HEALTHY, true).await;
    let result = h.dispatcher.dispatch(InvocationRequest::new(WEATHER_TOOL)).await;
    assert!(text(result).starts_with("Current weather in Lisbon: clear sky."));
}

#[tokio::test]
async fn test_calendar_events_default_calendar() {
    let h = harness(HEALTHY, true).await;
    let request = InvocationRequest::new(CALENDAR_EVENTS_TOOL)
        .arg("start_date", json!("2024-01-05"))
        .arg("end_date", json!("2024-01-05"));
    let result = h.dispatcher.dispatch(request).await;

    let events = match result {
        InvocationResult::Success(ToolOutput::Structured(Value::Array(events))) => events,
        other => panic!("expected structured events, got {:?}", other),
    };
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"], json!("primary-1"));
    assert_eq!(events[0]["summary"], json!("No Title"));
    assert_eq!(events[0]["start"], json!("2024-01-05"));
}

#[tokio::test]
async fn test_calendar_reversed_range() {
    let h = harness(HEALTHY, true).await;
    let request = InvocationRequest::new(CALENDAR_EVENTS_TOOL)
        .arg("start_date", json!("2024-01-06"))
        .arg("end_date", json!("2024-01-05"));
    let result = h.dispatcher.dispatch(request).await;
    assert_eq!(result.error_kind(), Some(ErrorKind::InvalidArguments));
}

#[tokio::test]
async fn test_calendar_without_token_requires_auth() {
    let h = harness(HEALTHY, false).await;
    let request = InvocationRequest::new(CALENDAR_EVENTS_TOOL)
        .arg("start_date", json!("2024-01-05"))
        .arg("end_date", json!("2024-01-05"));
    let result = h.dispatcher.dispatch(request).await;
    assert_eq!(result.error_kind(), Some(ErrorKind::AuthRequired));
}

#[tokio::test]
async fn test_recommendation_combines_inputs() {
    let h = harness(HEALTHY, true).await;
    let result = h
        .dispatcher
        .dispatch(InvocationRequest::new(WORKOUT_RECOMMENDATION_TOOL))
        .await;
    let brief = text(result);

    let sleep_at = brief.find("The sleep score this night was 87 out of 100.").unwrap();
    let weather_at = brief.find("Current weather in Lisbon: clear sky.").unwrap();
    assert!(sleep_at < weather_at);
    assert!(brief.contains("Sleep quality"));
    assert!(brief.contains("Weather suitability"));
    assert!(brief.contains("Temperature"));
}

#[tokio::test]
async fn test_recommendation_with_failed_sleep() {
    let h = harness(StubBehaviour { sleep_ok: false, weather_ok: true }, true).await;
    let result = h
        .dispatcher
        .dispatch(InvocationRequest::new(WORKOUT_RECOMMENDATION_TOOL))
        .await;
    let brief = text(result);
    assert!(brief.contains(SLEEP_UNAVAILABLE));
    assert!(brief.contains("Current weather in Lisbon: clear sky."));
}

#[tokio::test]
async fn test_recommendation_with_everything_down() {
    let h = harness(StubBehaviour { sleep_ok: false, weather_ok: false }, true).await;
    let result = h
        .dispatcher
        .dispatch(InvocationRequest::new(WORKOUT_RECOMMENDATION_TOOL))
        .await;
    let brief = text(result);
    assert!(brief.contains(SLEEP_UNAVAILABLE));
    assert!(brief.contains(WEATHER_UNAVAILABLE));
}

#[tokio::test]
async fn test_recommendation_location_arguments() {
    let h = harness(HEALTHY, true).await;
    let request = InvocationRequest::new(WORKOUT_RECOMMENDATION_TOOL).arg("city", json!("Porto"));
    let result = h.dispatcher.dispatch(request).await;
    assert!(text(result).contains("Current weather in Porto: clear sky."));

    let request = InvocationRequest::new(WORKOUT_RECOMMENDATION_TOOL)
        .arg("city", json!("Madrid"))
        .arg("country", json!("ES"));
    h.dispatcher.dispatch(request).await;

    h.dispatcher
        .dispatch(InvocationRequest::new(WORKOUT_RECOMMENDATION_TOOL))
        .await;

    assert_eq!(
        *h.weather_queries.lock().unwrap(),
        vec!["Porto,PT", "Madrid,ES", "Lisbon,PT"]
    );

    let request = InvocationRequest::new(WORKOUT_RECOMMENDATION_TOOL).arg("city", json!(42));
    let result = h.dispatcher.dispatch(request).await;
    assert_eq!(result.error_kind(), Some(ErrorKind::InvalidArguments));
}
