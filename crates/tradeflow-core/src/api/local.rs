//! In-process endpoint, applying the same rules as the server.

use super::{ApiError, ApiResult, BoxFuture, TradeApi};
use crate::protocol::{
    ErrorBody, GRAPH_FAILED, GraphData, GraphPayload, GraphResponse, TradeLimits, VERIFY_FAILED,
    VerifyRequest, VerifyResponse,
};
use crate::verify;
use chrono::Utc;

const BAD_REQUEST: u16 = 400;

/// Answers endpoint calls without a network round trip.
#[derive(Debug, Clone, Default)]
pub struct LocalTradeApi {
    limits: TradeLimits,
}

impl LocalTradeApi {
    pub fn new(limits: TradeLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &TradeLimits {
        &self.limits
    }
}

fn rejected(body: ErrorBody) -> ApiError {
    ApiError::Rejected {
        status: BAD_REQUEST,
        error: body.error,
        details: body.details,
    }
}

impl TradeApi for LocalTradeApi {
    fn submit_graph(&self, graph: &GraphData) -> BoxFuture<'_, ApiResult<GraphResponse>> {
        // Re-validate through the wire form so the same checks apply.
        let value = serde_json::to_value(graph);
        Box::pin(async move {
            let value = value.map_err(|e| ApiError::Decode(e.to_string()))?;
            let data = GraphPayload::from_value(value)
                .map_err(|e| rejected(ErrorBody::new(GRAPH_FAILED, e.to_string())))?;
            Ok(GraphResponse::accept(data, Utc::now()))
        })
    }

    fn verify_trade(&self, request: &VerifyRequest) -> BoxFuture<'_, ApiResult<VerifyResponse>> {
        let request = request.clone();
        Box::pin(async move {
            verify::verify_trade(&request, &self.limits)
                .map(VerifyResponse::ok)
                .map_err(|e| rejected(ErrorBody::new(VERIFY_FAILED, e.to_string())))
        })
    }
}
