//! Graph export and verification merge.
//!
//! Exporting reads the canvas and never changes it. Verification is the one
//! network result that writes back, and only onto the verification node.

use crate::api::{ApiResult, TradeApi};
use crate::canvas::{Canvas, CanvasDocument};
use crate::protocol::{
    ExternalLimits, GraphConnection, GraphData, GraphNode, GraphResponse, SCHEMA_VERSION,
    TradeLimits, VerificationData, VerifyRequest,
};
use crate::shapes::{NodeData, TradeConfig, WorkflowStep};
use chrono::Utc;

/// Trade parameters in effect: `base`, overridden by whatever the user
/// input node carries.
pub fn effective_config(document: &CanvasDocument, base: &TradeConfig) -> TradeConfig {
    let mut config = base.clone();
    let data = document
        .find_step(WorkflowStep::UserInput)
        .and_then(|id| document.get_node(id))
        .and_then(|node| node.data.as_ref());

    if let Some(data) = data {
        if let Some(pair) = &data.token_pair {
            config.token_pair = pair.clone();
        }
        if let Some(trade_type) = data.trade_type {
            config.trade_type = trade_type;
        }
        if let Some(amount) = &data.trade_amount {
            config.trade_amount = amount.clone();
        }
        if let Some(slippage) = &data.slippage_tolerance {
            config.slippage_tolerance = slippage.clone();
        }
        if data.wallet_address.is_some() {
            config.wallet_address = data.wallet_address.clone();
        }
    }
    config
}

/// Build the wire payload for `document` stamped with `timestamp` (ms).
///
/// Each node carries its step's default payload with its own stored fields
/// layered on top.
pub fn collect_graph_at(document: &CanvasDocument, config: &TradeConfig, timestamp: i64) -> GraphData {
    let config = effective_config(document, config);

    let nodes = document
        .nodes_ordered()
        .map(|node| {
            let data = document
                .step_of(node.id())
                .map(|step| NodeData::for_step(step, &config))
                .unwrap_or_default()
                .overlay(node.data.clone().unwrap_or_default());
            GraphNode {
                id: node.id().to_string(),
                kind: node.kind,
                position: node.position.into(),
                data: Some(data),
            }
        })
        .collect();

    let connections = document
        .connections
        .iter()
        .map(|c| GraphConnection {
            id: c.id().to_string(),
            source_id: c.source.to_string(),
            target_id: c.target.map(|t| t.to_string()),
        })
        .collect();

    GraphData {
        nodes,
        connections,
        version: SCHEMA_VERSION.to_string(),
        timestamp,
    }
}

/// Build the wire payload for `document` stamped with the current time.
pub fn collect_graph(document: &CanvasDocument, config: &TradeConfig) -> GraphData {
    collect_graph_at(document, config, Utc::now().timestamp_millis())
}

/// Serialize the canvas and submit it.
pub async fn export_graph<A: TradeApi + ?Sized>(
    api: &A,
    canvas: &Canvas,
    config: &TradeConfig,
) -> ApiResult<GraphResponse> {
    let graph = collect_graph(&canvas.document, config);
    log::info!(
        "Exporting graph with {} nodes and {} connections",
        graph.nodes.len(),
        graph.connections.len()
    );
    let result = api.submit_graph(&graph).await;
    if let Err(e) = &result {
        log::warn!("Graph export failed: {e}");
    }
    result
}

/// Request body for checking the trade `document` describes over `base`.
/// Without `limits` the server's own limits apply.
pub fn verification_request(
    document: &CanvasDocument,
    base: &TradeConfig,
    limits: Option<&TradeLimits>,
) -> VerifyRequest {
    let config = effective_config(document, base);
    VerifyRequest {
        wallet_address: config.wallet_address,
        token_pair: Some(config.token_pair),
        trade_amount: Some(config.trade_amount),
        slippage_tolerance: Some(config.slippage_tolerance),
        external_limits: limits.cloned().map(ExternalLimits::from),
        verification_results: None,
    }
}

/// Ask the endpoint to check a trade.
pub async fn verify_trade<A: TradeApi + ?Sized>(
    api: &A,
    request: &VerifyRequest,
) -> ApiResult<VerificationData> {
    log::info!(
        "Verifying {} {}",
        request.trade_amount.as_deref().unwrap_or("?"),
        request.token_pair.as_deref().unwrap_or("?")
    );
    match api.verify_trade(request).await {
        Ok(response) => Ok(response.data),
        Err(e) => {
            log::warn!("Verification failed: {e}");
            Err(e)
        }
    }
}

/// Check a trade and write the result onto the verification node.
///
/// Returns the verification result whether or not a verification node was
/// there to receive it. On error the canvas is untouched.
pub async fn verify_and_merge<A: TradeApi + ?Sized>(
    api: &A,
    canvas: &mut Canvas,
    request: &VerifyRequest,
) -> ApiResult<VerificationData> {
    let data = verify_trade(api, request).await?;
    canvas.apply_verification(&data);
    Ok(data)
}
