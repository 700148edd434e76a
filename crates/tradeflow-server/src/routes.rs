//! HTTP routes: graph submission and trade verification.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tradeflow_core::protocol::{
    ErrorBody, GRAPH_FAILED, GraphPayload, GraphResponse, METHOD_NOT_ALLOWED, ONLY_POST,
    TradeLimits, VERIFY_FAILED, VerifyRequest, VerifyResponse,
};
use tradeflow_core::verify;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    limits: Arc<TradeLimits>,
}

impl AppState {
    pub fn new(limits: TradeLimits) -> Self {
        Self {
            limits: Arc::new(limits),
        }
    }
}

/// A refused request, rendered as an [`ErrorBody`].
#[derive(Debug)]
struct ApiFailure {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiFailure {
    fn bad_request(error: &str, details: impl ToString) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody::new(error, details.to_string()),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Build the router. The trade endpoints are served both at the root and
/// under `/api`.
pub fn router(state: AppState) -> Router {
    let endpoints = Router::new()
        .route("/graph-data", post(graph_data).fallback(method_not_allowed))
        .route("/verify-trade", post(verify_trade).fallback(method_not_allowed));

    Router::new()
        .route("/health", get(health))
        .merge(endpoints.clone())
        .nest("/api", endpoints)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn method_not_allowed() -> ApiFailure {
    ApiFailure {
        status: StatusCode::METHOD_NOT_ALLOWED,
        body: ErrorBody::new(METHOD_NOT_ALLOWED, ONLY_POST),
    }
}

async fn graph_data(body: Bytes) -> Result<Json<GraphResponse>, ApiFailure> {
    let data = GraphPayload::from_slice(&body).map_err(|e| {
        warn!("Rejected graph: {}", e);
        ApiFailure::bad_request(GRAPH_FAILED, e)
    })?;

    info!(
        nodes = data.nodes.len(),
        connections = data.connections.len(),
        "Graph accepted"
    );
    Ok(Json(GraphResponse::accept(data, Utc::now())))
}

async fn verify_trade(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<VerifyResponse>, ApiFailure> {
    let request: VerifyRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!("Unreadable verification request: {}", e);
        ApiFailure::bad_request(VERIFY_FAILED, e)
    })?;

    let data = verify::verify_trade(&request, &state.limits).map_err(|e| {
        warn!("Verification refused: {}", e);
        ApiFailure::bad_request(VERIFY_FAILED, e)
    })?;

    info!(
        has_balance = data.balance_check.has_balance,
        within_limits = data.slippage_check.within_limits,
        "Trade verified"
    );
    Ok(Json(VerifyResponse::ok(data)))
}
