use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use calrss_core::{PUBLIC_LOGIN, prelude::*};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::store::CalendarStore;

/// Server-level configuration.
pub struct ServerConfig {
    /// Base URL used for channel and item links
    pub base_url: String,
    /// Global feed switch; when off, every feed request is denied
    pub rss_enabled: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CalendarStore>,
    pub config: Arc<ServerConfig>,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// Feed request parameters
#[derive(Deserialize)]
struct FeedQuery {
    /// Calendar login; defaults to the public calendar
    user: Option<String>,
    /// Start date, YYYYMMDD; defaults to today
    date: Option<String>,
    /// Window length in days
    days: Option<i64>,
    /// Item cap
    max: Option<usize>,
    /// Legacy repeat flag: 0 off, 1 on, 2 daily-once
    repeats: Option<i64>,
    /// Category id filter
    cat_id: Option<i64>,
    /// Put the date (and time) in item titles: "1" or "true"
    showdate: Option<String>,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/rss", get(feed_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Root handler
async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "calrss feed service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "RSS 2.0 feeds of calendar events",
        "endpoints": {
            "health": "/health",
            "feed": "/rss"
        }
    }))
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Feed handler: parameter parsing, feed authorization, engine run,
/// XML response.
async fn feed_handler(
    Query(params): Query<FeedQuery>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    if !state.config.rss_enabled {
        return Ok(not_authorized());
    }

    let login = match params.user.as_deref() {
        None | Some("public") => PUBLIC_LOGIN.to_string(),
        Some(user) => user.to_string(),
    };
    let calendar = state
        .store
        .get(&login)
        .ok_or_else(|| calrss_core::Error::Config(format!("Unknown calendar: {login}")))?;
    let subject_is_public = calendar.login == PUBLIC_LOGIN;

    // The public calendar is exempt from the per-user switch.
    if !subject_is_public && !calendar.prefs.rss_enabled {
        return Ok(not_authorized());
    }

    let category = params
        .cat_id
        .and_then(|id| calendar.category_name(id))
        .map(str::to_string);

    let options = FeedOptions {
        start_date: parse_start_date(params.date.as_deref()),
        days: params.days.unwrap_or(DEFAULT_WINDOW_DAYS),
        max_events: params.max.unwrap_or(DEFAULT_MAX_EVENTS).min(MAX_FEED_EVENTS),
        repeats: RepeatPolicy::from_param(params.repeats.unwrap_or(0)),
        date_in_title: matches!(params.showdate.as_deref(), Some("1") | Some("true")),
        category,
        login: calendar.login.clone(),
        base_url: state.config.base_url.clone(),
    };
    let policy = AccessPolicy::from_remote_access(calendar.prefs.remote_access, subject_is_public);
    let source = JsonEventSource::new(calendar.clone()).with_category(params.cat_id);

    let items = MergeEngine::new(source, policy, options).run().await?;

    let channel = ChannelInfo {
        title: feed_title(&calendar.login),
        link: state.config.base_url.clone(),
        description: feed_title(&calendar.login),
        language: "en-us".to_string(),
    };
    let rss_content = RssGenerator::new(channel).generate(&items)?;

    Ok((
        StatusCode::OK,
        [("Content-Type", "text/xml; charset=utf-8")],
        rss_content,
    )
        .into_response())
}

/// Start date parameter: exactly eight digits, YYYYMMDD. Anything else
/// falls back to today, matching the permissive legacy behavior.
fn parse_start_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?;
    if raw.len() != 8 {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y%m%d").ok()
}

fn feed_title(login: &str) -> String {
    if login == PUBLIC_LOGIN {
        "Public calendar".to_string()
    } else {
        format!("Calendar of {login}")
    }
}

fn not_authorized() -> Response {
    (
        StatusCode::FORBIDDEN,
        [("Content-Type", "text/plain; charset=utf-8")],
        "You are not authorized.",
    )
        .into_response()
}

/// Application error type
#[derive(Debug)]
struct AppError(calrss_core::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self.0 {
            calrss_core::Error::Config(_) => (StatusCode::BAD_REQUEST, "configuration error"),
            calrss_core::Error::Source { .. } => (StatusCode::BAD_GATEWAY, "event source error"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error"),
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
            message: self.0.to_string(),
        });

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<calrss_core::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
