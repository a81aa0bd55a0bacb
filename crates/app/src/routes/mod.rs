pub mod activities;
pub mod challenge;
pub mod dashboard;
pub mod health;
pub mod topics;

use axum::Router;
use axum::routing::{get, post, put};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use services::AppServices;
use tower_http::cors::CorsLayer;

pub fn build_router(services: AppServices) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/topics",
            get(topics::list_topics).post(topics::create_topic),
        )
        .route(
            "/topics/{id}",
            get(topics::get_topic)
                .put(topics::update_topic)
                .delete(topics::delete_topic),
        )
        .route("/topics/{id}/sub-topics", post(topics::create_subtopic))
        .route(
            "/sub-topics/{id}",
            get(topics::get_subtopic)
                .put(topics::update_subtopic)
                .delete(topics::delete_subtopic),
        )
        .route("/sub-topics/{id}/reps", post(topics::adjust_reps))
        .route("/categories", get(topics::categories))
        .route("/dashboard", get(dashboard::topic_dashboard))
        .route("/dashboard/global-goal", put(dashboard::update_global_goal))
        .route("/dashboard/activities", get(dashboard::activity_dashboard))
        .route(
            "/dashboard/activities/summary",
            get(dashboard::activity_summaries),
        )
        .route(
            "/activities",
            get(activities::list_activities).post(activities::create_activity),
        )
        .route(
            "/activities/{id}",
            get(activities::get_activity)
                .put(activities::update_activity)
                .delete(activities::delete_activity),
        )
        .route("/activities/{id}/increment", post(activities::increment))
        .route("/activities/{id}/decrement", post(activities::decrement))
        .route("/activities/{id}/progress", get(activities::progress))
        .route("/activities/{id}/timer", get(activities::timer_status))
        .route("/activities/{id}/sessions", get(activities::list_sessions))
        .route(
            "/activities/{id}/sessions/start",
            post(activities::start_session),
        )
        .route(
            "/activities/{id}/sessions/{sid}/end",
            post(activities::end_session),
        )
        .route("/challenge", post(challenge::create_challenge))
        .route("/challenge/current", get(challenge::current_challenge))
        .route("/challenge/countdown/sync", post(challenge::sync_countdown))
        .route("/challenge/quote", get(challenge::daily_quote))
        .route("/challenge/stats", get(challenge::stats))
        .route("/challenge/timer/status", get(challenge::timer_status))
        .layer(CorsLayer::permissive())
        .with_state(services)
}

/// Accept any JSON shape for a URL list; anything that is not an array of
/// strings silently becomes empty.
pub(crate) fn lenient_urls<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(urls_from_value(value))
}

/// Optional variant for partial updates: an absent field stays `None`, a
/// present field goes through the same lenient coercion.
pub(crate) fn lenient_urls_opt<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(urls_from_value(value)))
}

fn urls_from_value(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(str::to_owned))
            .collect(),
        _ => Vec::new(),
    }
}

/// JavaScript-style boolean coercion for flags the original API accepted
/// loosely typed.
pub(crate) fn coerce_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(truthy(&value))
}

pub(crate) fn coerce_bool_opt<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(truthy(&value)))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty() && s != "false" && s != "0",
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct UrlsProbe {
        #[serde(default, deserialize_with = "lenient_urls")]
        urls: Vec<String>,
    }

    #[derive(Deserialize)]
    struct FlagProbe {
        #[serde(default, deserialize_with = "coerce_bool")]
        locked: bool,
    }

    #[test]
    fn urls_accept_string_arrays() {
        let probe: UrlsProbe =
            serde_json::from_str(r#"{"urls": ["https://a.example"]}"#).unwrap();
        assert_eq!(probe.urls, ["https://a.example"]);
    }

    #[test]
    fn non_array_urls_become_empty() {
        for raw in [
            r#"{"urls": "not-an-array"}"#,
            r#"{"urls": 42}"#,
            r#"{"urls": {"a": 1}}"#,
            r"{}",
        ] {
            let probe: UrlsProbe = serde_json::from_str(raw).unwrap();
            assert!(probe.urls.is_empty(), "raw: {raw}");
        }
    }

    #[test]
    fn mixed_arrays_keep_only_strings() {
        let probe: UrlsProbe =
            serde_json::from_str(r#"{"urls": ["https://a.example", 1, null]}"#).unwrap();
        assert_eq!(probe.urls, ["https://a.example"]);
    }

    #[test]
    fn flags_are_coerced() {
        for (raw, expected) in [
            (r#"{"locked": true}"#, true),
            (r#"{"locked": 1}"#, true),
            (r#"{"locked": "yes"}"#, true),
            (r#"{"locked": 0}"#, false),
            (r#"{"locked": ""}"#, false),
            (r#"{"locked": null}"#, false),
            (r"{}", false),
        ] {
            let probe: FlagProbe = serde_json::from_str(raw).unwrap();
            assert_eq!(probe.locked, expected, "raw: {raw}");
        }
    }
}
