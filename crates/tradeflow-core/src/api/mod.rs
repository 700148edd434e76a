//! Clients for the graph and verification endpoints.

mod http;
mod local;

pub use http::HttpTradeApi;
pub use local::LocalTradeApi;

use crate::protocol::{GraphData, GraphResponse, VerifyRequest, VerifyResponse};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Endpoint errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Server rejected request ({status}): {error}")]
    Rejected {
        status: u16,
        error: String,
        details: Option<String>,
    },
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status of a rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for endpoint calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// The two trade endpoints.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait TradeApi: Send + Sync {
    /// Submit an exported graph.
    fn submit_graph(&self, graph: &GraphData) -> BoxFuture<'_, ApiResult<GraphResponse>>;

    /// Check a trade against the server's limits.
    fn verify_trade(&self, request: &VerifyRequest) -> BoxFuture<'_, ApiResult<VerifyResponse>>;
}

/// The two trade endpoints (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait TradeApi {
    /// Submit an exported graph.
    fn submit_graph(&self, graph: &GraphData) -> BoxFuture<'_, ApiResult<GraphResponse>>;

    /// Check a trade against the server's limits.
    fn verify_trade(&self, request: &VerifyRequest) -> BoxFuture<'_, ApiResult<VerifyResponse>>;
}
