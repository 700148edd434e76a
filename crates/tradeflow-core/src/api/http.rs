//! HTTP client for a remote trade server.

use super::{ApiError, ApiResult, BoxFuture, TradeApi};
use crate::protocol::{ErrorBody, GraphData, GraphResponse, VerifyRequest, VerifyResponse};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Path of the graph endpoint.
pub const GRAPH_PATH: &str = "/graph-data";
/// Path of the verification endpoint.
pub const VERIFY_PATH: &str = "/verify-trade";

/// Talks to a trade server over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTradeApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTradeApi {
    /// Create a client for the server at `base_url`, e.g. `http://localhost:3030`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing connection pool.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Full URL of an endpoint path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B, T>(&self, path: &str, body: B) -> ApiResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        log::debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let (error, details) = match serde_json::from_slice::<ErrorBody>(&bytes) {
            Ok(body) => (body.error, body.details),
            Err(_) => (
                status.canonical_reason().unwrap_or("Request failed").to_string(),
                None,
            ),
        };
        log::warn!("{url} rejected with {status}: {error}");
        Err(ApiError::Rejected {
            status: status.as_u16(),
            error,
            details,
        })
    }
}

impl TradeApi for HttpTradeApi {
    fn submit_graph(&self, graph: &GraphData) -> BoxFuture<'_, ApiResult<GraphResponse>> {
        let graph = graph.clone();
        Box::pin(async move { self.post(GRAPH_PATH, graph).await })
    }

    fn verify_trade(&self, request: &VerifyRequest) -> BoxFuture<'_, ApiResult<VerifyResponse>> {
        let request = request.clone();
        Box::pin(async move { self.post(VERIFY_PATH, request).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let api = HttpTradeApi::new("http://localhost:3030/");
        assert_eq!(api.url(GRAPH_PATH), "http://localhost:3030/graph-data");
        assert_eq!(api.url(VERIFY_PATH), "http://localhost:3030/verify-trade");
    }
}
