//! # API REST
//!
//! REST API implementation for the caregiver worklist.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (headers, status codes, CORS)
//!
//! Uses `api-shared` for response types and authentication helpers. The server itself is run by
//! the workspace's `worklist-run` binary.

#![warn(rust_2018_idioms)]

use api_shared::auth::{self, API_KEY_HEADER, CAREGIVER_HEADER};
use api_shared::{
    HealthRes, HealthService, RefreshRes, SummaryRes, TaskRes, WorklistParams, WorklistRes,
};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use worklist_core::{
    view, AggregationError, Clock, RefreshCoordinator, RefreshOutcome, SnapshotSource,
    SystemClock, Task, WorklistAggregator, WorklistConfig, WorklistSources, WorklistSummary,
};

type ApiError = (StatusCode, &'static str);

/// Application state shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    cfg: Arc<WorklistConfig>,
    source: SnapshotSource,
    api_key: Arc<str>,
    clock: Arc<dyn Clock>,
    refreshers: Arc<Mutex<HashMap<String, Arc<RefreshCoordinator>>>>,
}

impl AppState {
    pub fn new(cfg: Arc<WorklistConfig>, source: SnapshotSource, api_key: String) -> Self {
        Self {
            cfg,
            source,
            api_key: api_key.into(),
            clock: Arc::new(SystemClock),
            refreshers: Arc::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Caregiver named in `headers`, after checking the API key. `None` means no session.
    fn caregiver_for<'a>(&self, headers: &'a HeaderMap) -> Result<Option<&'a str>, ApiError> {
        if let Err(e) = auth::validate_api_key(header(headers, API_KEY_HEADER), &self.api_key) {
            tracing::warn!("Rejected request: {}", e);
            return Err((StatusCode::UNAUTHORIZED, "Invalid API key"));
        }
        Ok(auth::caregiver_from_header(header(headers, CAREGIVER_HEADER)))
    }

    fn aggregator(&self, caregiver: Option<&str>) -> WorklistAggregator {
        let source = Arc::new(self.source.for_caregiver(caregiver));
        WorklistAggregator::new(self.cfg.clone(), WorklistSources::from_single(source))
            .with_clock(self.clock.clone())
    }

    /// The caregiver's refresh coordinator, created on first use.
    async fn refresher(&self, caregiver: &str) -> Arc<RefreshCoordinator> {
        let mut refreshers = self.refreshers.lock().await;
        refreshers
            .entry(caregiver.to_owned())
            .or_insert_with(|| Arc::new(RefreshCoordinator::new(self.aggregator(Some(caregiver)))))
            .clone()
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

#[derive(OpenApi)]
#[openapi(
    paths(health, worklist, worklist_summary, refresh_worklist),
    components(schemas(HealthRes, TaskRes, WorklistRes, SummaryRes, RefreshRes))
)]
struct ApiDoc;

/// Build the REST router with OpenAPI docs at `/api-docs/openapi.json` and Swagger UI.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/worklist", get(worklist))
        .route("/worklist/summary", get(worklist_summary))
        .route("/worklist/refresh", post(refresh_worklist))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP status for a fatal build error.
fn aggregation_status(err: &AggregationError) -> ApiError {
    match err {
        AggregationError::Unauthenticated => (StatusCode::UNAUTHORIZED, "Not signed in"),
        AggregationError::SourceUnavailable(_) => {
            (StatusCode::SERVICE_UNAVAILABLE, "Assignments unavailable, try again")
        }
    }
}

async fn build(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(Vec<Task>, DateTime<Utc>), ApiError> {
    let aggregator = state.aggregator(state.caregiver_for(headers)?);
    let now = aggregator.now();
    match aggregator.build_worklist_at(now).await {
        Ok(tasks) => Ok((tasks, now)),
        Err(e) => {
            tracing::error!("Build worklist error: {:?}", e);
            Err(aggregation_status(&e))
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks. Does not require an API key.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/worklist",
    params(
        WorklistParams,
        ("x-api-key" = String, Header, description = "Shared API key"),
        ("x-caregiver-ref" = String, Header, description = "Signed-in caregiver")
    ),
    responses(
        (status = 200, description = "Today's worklist for the caregiver", body = WorklistRes),
        (status = 400, description = "Unknown status or sort value"),
        (status = 401, description = "Missing API key or caregiver"),
        (status = 503, description = "Assignment source unavailable")
    )
)]
/// Today's worklist for the signed-in caregiver
///
/// Rebuilds the worklist from the care snapshot on every call, then applies the requested
/// search, status filter and sort.
///
/// # Errors
/// Returns `400 Bad Request` for an unknown `status` or `sort`, `401 Unauthorized` without a
/// valid API key or caregiver, and `503 Service Unavailable` if assignments cannot be fetched.
#[axum::debug_handler]
async fn worklist(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<WorklistParams>,
) -> Result<Json<WorklistRes>, ApiError> {
    let query = match params.to_query() {
        Ok(query) => query,
        Err(e) => {
            tracing::error!("Invalid worklist query: {:?}", e);
            return Err((StatusCode::BAD_REQUEST, "Invalid status or sort"));
        }
    };

    let (tasks, now) = build(&state, &headers).await?;
    let shown = view::apply(&tasks, &query, now);
    Ok(Json(WorklistRes::new(
        &shown,
        now,
        state.cfg.reference_zone().to_string(),
    )))
}

#[utoipa::path(
    get,
    path = "/worklist/summary",
    params(
        ("x-api-key" = String, Header, description = "Shared API key"),
        ("x-caregiver-ref" = String, Header, description = "Signed-in caregiver")
    ),
    responses(
        (status = 200, description = "Counts for today's worklist", body = SummaryRes),
        (status = 401, description = "Missing API key or caregiver"),
        (status = 503, description = "Assignment source unavailable")
    )
)]
/// Pending, completed and overdue counts for the signed-in caregiver
#[axum::debug_handler]
async fn worklist_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SummaryRes>, ApiError> {
    let (tasks, now) = build(&state, &headers).await?;
    Ok(Json(SummaryRes::new(
        WorklistSummary::from_tasks(&tasks, now),
        now,
    )))
}

#[utoipa::path(
    post,
    path = "/worklist/refresh",
    params(
        ("x-api-key" = String, Header, description = "Shared API key"),
        ("x-caregiver-ref" = String, Header, description = "Signed-in caregiver")
    ),
    responses(
        (status = 200, description = "Rebuilt and published worklist", body = RefreshRes),
        (status = 401, description = "Missing API key or caregiver"),
        (status = 409, description = "A newer refresh started before this one finished"),
        (status = 503, description = "Assignment source unavailable")
    )
)]
/// Rebuild the caregiver's worklist, latest request wins
///
/// Concurrent refreshes for one caregiver share a coordinator. Only the most recently started
/// refresh publishes; an older one that finishes late gets `409 Conflict` and its result is
/// dropped.
#[axum::debug_handler]
async fn refresh_worklist(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshRes>, ApiError> {
    let Some(caregiver) = state.caregiver_for(&headers)? else {
        return Err(aggregation_status(&AggregationError::Unauthenticated));
    };

    let refresher = state.refresher(caregiver).await;
    match refresher.refresh().await {
        Ok(RefreshOutcome::Current(snapshot)) => Ok(Json(RefreshRes::new(
            &snapshot,
            state.cfg.reference_zone().to_string(),
        ))),
        Ok(RefreshOutcome::Superseded { ticket, latest }) => {
            tracing::info!(caregiver, ticket, latest, "refresh superseded");
            Err((StatusCode::CONFLICT, "Superseded by a newer refresh"))
        }
        Err(e) => {
            tracing::error!("Refresh worklist error: {:?}", e);
            Err(aggregation_status(&e))
        }
    }
}
