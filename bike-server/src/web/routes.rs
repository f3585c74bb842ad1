//! HTTP route handlers.

use askama::Template;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde_json::Value;
use tower_http::services::ServeDir;
use tracing::error;

use crate::classify::ClassificationResult;
use crate::session::{SessionHandle, SessionId};

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Name of the cookie carrying the session ID.
pub const SESSION_COOKIE: &str = "bike_session";

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/health", get(health))
        .route("/api/status", get(status))
        .route("/api/stations", get(stations))
        .route("/api/boundary", get(boundary))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(not_found)
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The dashboard. Every load is a refresh tick for the caller's session.
async fn dashboard_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, AppError> {
    let (id, handle, created) = state.sessions.get_or_create(session_cookie(&headers)).await;

    let html = {
        let mut session = handle.lock().await;
        session
            .tick(&state.feed, Utc::now(), state.utc_offset_secs)
            .await;

        DashboardTemplate::new(
            session.snapshot(),
            session.next_refresh_time(),
            state.offset(),
            TableSort::parse(query.sort.as_deref()),
            SortOrder::parse(query.order.as_deref()),
        )
        .render()?
    };

    Ok(with_session(Html(html).into_response(), id, created))
}

/// Classification summary as JSON. Also a refresh tick.
async fn status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (id, handle, created) = state.sessions.get_or_create(session_cookie(&headers)).await;

    let response = {
        let mut session = handle.lock().await;
        session
            .tick(&state.feed, Utc::now(), state.utc_offset_secs)
            .await;

        match session.snapshot() {
            Some(snapshot) => StatusResponse::from_snapshot(snapshot),
            None => StatusResponse::from_classification(&ClassificationResult::empty(
                Utc::now().with_timezone(&state.offset()),
            )),
        }
    };

    Ok(with_session(Json(response).into_response(), id, created))
}

/// Map markers from the caller's latest snapshot. Does not tick.
async fn stations(State(state): State<AppState>, headers: HeaderMap) -> Json<StationsResponse> {
    let Some(handle) = existing_session(&state, &headers).await else {
        return Json(StationsResponse {
            stations: Vec::new(),
        });
    };

    let session = handle.lock().await;
    let records = session
        .snapshot()
        .map(|s| s.stations.as_slice())
        .unwrap_or_default();
    Json(StationsResponse::from_records(records))
}

/// District boundaries as GeoJSON.
async fn boundary(State(state): State<AppState>) -> Json<Value> {
    Json(state.boundary.load().await.geojson)
}

async fn not_found() -> Response {
    let page = ErrorTemplate {
        title: "페이지를 찾을 수 없습니다".to_string(),
        message: "요청하신 페이지가 존재하지 않습니다.".to_string(),
    };
    match page.render() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}

/// The session named by the request's cookie, if it is still live.
async fn existing_session(state: &AppState, headers: &HeaderMap) -> Option<SessionHandle> {
    let id = session_cookie(headers).and_then(SessionId::parse)?;
    state.sessions.get(&id).await
}

/// Extract the session cookie value from the request headers.
fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name.trim() == SESSION_COOKIE).then_some(value.trim())
        })
}

fn set_cookie_value(id: SessionId) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

/// Attach a `Set-Cookie` header when the session was just created.
fn with_session(mut response: Response, id: SessionId, created: bool) -> Response {
    if created && let Ok(value) = HeaderValue::from_str(&set_cookie_value(id)) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    Internal { message: String },
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Internal {
            message: format!("Template error: {e}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        error!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
