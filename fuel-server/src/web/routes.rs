//! HTTP route handlers.

use askama::Template;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::Local;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::domain::minutes_of_day;
use crate::filter;
use crate::store::RefreshOutcome;

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/api/stations", get(list_stations))
        .route("/api/provinces", get(list_provinces))
        .route("/api/fuels", get(list_fuels))
        .route("/api/status", get(status))
        .route("/api/refresh", post(refresh))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Current local time as minutes since midnight.
fn local_minutes() -> u16 {
    minutes_of_day(Local::now().time())
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Map page.
async fn index_page(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.store.snapshot().await;
    let template = IndexTemplate {
        brand: state.brand.to_string(),
        fuels: FuelOption::all(),
        provinces: snapshot.provinces(),
    };
    Html(
        template
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e)),
    )
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Filter the in-memory stations.
async fn list_stations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StationQuery>,
) -> Result<Response, AppError> {
    let criteria = query.criteria().map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    let now = local_minutes();
    let snapshot = state.store.snapshot().await;
    let matched = filter::apply(&snapshot.stations, &criteria, now);
    let response = StationsResponse::build(&snapshot, &matched, now);

    // Return HTML or JSON based on Accept header
    if accepts_html(&headers) {
        let template = StationListTemplate {
            matched: response.matched,
            markers: response.markers,
            notice: response.notice,
        };
        let html = template.render().map_err(|e| AppError::Internal {
            message: format!("Template error: {}", e),
        })?;

        Ok(Html(html).into_response())
    } else {
        Ok(Json(response).into_response())
    }
}

/// Provinces present in the current collection.
async fn list_provinces(State(state): State<AppState>) -> Json<ProvincesResponse> {
    let snapshot = state.store.snapshot().await;
    Json(ProvincesResponse {
        provinces: snapshot.provinces(),
    })
}

/// The fuels that can be filtered on.
async fn list_fuels() -> Json<FuelsResponse> {
    Json(FuelsResponse {
        fuels: FuelOption::all(),
    })
}

/// Where the current data came from.
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let snapshot = state.store.snapshot().await;
    Json(StatusResponse::from_snapshot(&snapshot))
}

/// Revalidate against the feed now.
async fn refresh(State(state): State<AppState>) -> (StatusCode, Json<RefreshOutcome>) {
    let outcome = state.store.refresh().await;
    info!(?outcome, "manual refresh finished");

    let status = match outcome {
        RefreshOutcome::Fetched { .. } => StatusCode::OK,
        RefreshOutcome::FellBack { .. } | RefreshOutcome::Failed { .. } => StatusCode::BAD_GATEWAY,
    };
    (status, Json(outcome))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Internal { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
