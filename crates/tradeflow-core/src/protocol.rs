//! Wire format shared by the canvas client and the trade server.
//!
//! Field names are camelCase on the wire. Both endpoints answer with a
//! `success` flag; failures carry an [`ErrorBody`].

use crate::shapes::{NodeData, ShapeKind};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Version stamped on exported graphs and response metadata.
pub const SCHEMA_VERSION: &str = "1.0";

/// Error message of a rejected graph submission.
pub const GRAPH_FAILED: &str = "Failed to process graph data";
/// Error message of a rejected verification request.
pub const VERIFY_FAILED: &str = "Verification failed";
/// Error message for any method other than POST.
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
/// Details accompanying [`METHOD_NOT_ALLOWED`].
pub const ONLY_POST: &str = "Only POST requests are accepted";

/// Reasons a graph payload is refused.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Invalid nodes data")]
    InvalidNodes,

    #[error("Graph has no nodes")]
    EmptyGraph,

    #[error("Invalid connections data")]
    InvalidConnections,
}

/// Node position on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphPosition {
    pub x: f64,
    pub y: f64,
}

impl From<kurbo::Point> for GraphPosition {
    fn from(p: kurbo::Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// A node as exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub position: GraphPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<NodeData>,
}

/// A connection as exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphConnection {
    pub id: String,
    pub source_id: String,
    #[serde(default)]
    pub target_id: Option<String>,
}

/// Graph exported from a canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub connections: Vec<GraphConnection>,
    pub version: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Body of `POST /graph-data` as received.
///
/// Only the shape of `nodes` and `connections` is checked. Their entries
/// are echoed back exactly as sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPayload {
    pub nodes: Vec<Value>,
    pub connections: Vec<Value>,
    #[serde(default)]
    pub version: Value,
    #[serde(default)]
    pub timestamp: Value,
}

impl GraphPayload {
    /// Parse and validate a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, GraphError> {
        let value: Value = serde_json::from_slice(body).map_err(GraphError::InvalidJson)?;
        Self::from_value(value)
    }

    /// Validate a decoded body: `nodes` must be a non-empty array and
    /// `connections` an array. Other top-level fields are dropped.
    pub fn from_value(value: Value) -> Result<Self, GraphError> {
        let Value::Object(mut body) = value else {
            return Err(GraphError::InvalidNodes);
        };
        let nodes = match body.remove("nodes") {
            Some(Value::Array(nodes)) if nodes.is_empty() => return Err(GraphError::EmptyGraph),
            Some(Value::Array(nodes)) => nodes,
            _ => return Err(GraphError::InvalidNodes),
        };
        let Some(Value::Array(connections)) = body.remove("connections") else {
            return Err(GraphError::InvalidConnections);
        };
        Ok(Self {
            nodes,
            connections,
            version: body.remove("version").unwrap_or_default(),
            timestamp: body.remove("timestamp").unwrap_or_default(),
        })
    }
}

/// `null`, `false`, `0`, `""` and a missing field all count as unset.
fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_none_or(|v| v == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Metadata attached to an accepted graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub version: String,
    /// RFC 3339 time the server accepted the graph.
    pub timestamp: String,
    pub format: String,
    pub schema: String,
    pub source: String,
}

impl ResponseMetadata {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            format: "JSON".to_string(),
            schema: "graph-workflow".to_string(),
            source: "python-client".to_string(),
        }
    }
}

/// Successful answer of `POST /graph-data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphResponse {
    pub success: bool,
    pub data: GraphPayload,
    pub metadata: ResponseMetadata,
}

impl GraphResponse {
    /// Echo `data`, filling an unset version and timestamp.
    pub fn accept(mut data: GraphPayload, now: DateTime<Utc>) -> Self {
        if is_unset(&data.version) {
            data.version = Value::from(SCHEMA_VERSION);
        }
        if is_unset(&data.timestamp) {
            data.timestamp = Value::from(now.timestamp_millis());
        }
        Self {
            success: true,
            data,
            metadata: ResponseMetadata::at(now),
        }
    }
}

/// Body of every non-success response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Thresholds a trade is checked against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeLimits {
    pub max_balance: String,
    pub max_slippage: String,
    pub recommended_slippage: String,
}

impl Default for TradeLimits {
    fn default() -> Self {
        Self {
            max_balance: "0.1 ETH".to_string(),
            max_slippage: "1.5%".to_string(),
            recommended_slippage: "1%".to_string(),
        }
    }
}

/// Caller-supplied limits; each missing or empty field falls back on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_balance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_slippage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_slippage: Option<String>,
}

impl ExternalLimits {
    /// Merge with `fallback`.
    pub fn resolve(&self, fallback: &TradeLimits) -> TradeLimits {
        fn pick(value: &Option<String>, fallback: &str) -> String {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
                .to_string()
        }

        TradeLimits {
            max_balance: pick(&self.max_balance, &fallback.max_balance),
            max_slippage: pick(&self.max_slippage, &fallback.max_slippage),
            recommended_slippage: pick(&self.recommended_slippage, &fallback.recommended_slippage),
        }
    }
}

impl From<TradeLimits> for ExternalLimits {
    fn from(limits: TradeLimits) -> Self {
        Self {
            max_balance: Some(limits.max_balance),
            max_slippage: Some(limits.max_slippage),
            recommended_slippage: Some(limits.recommended_slippage),
        }
    }
}

/// Body of `POST /verify-trade`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_pair: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slippage_tolerance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_limits: Option<ExternalLimits>,
    /// Opaque results from an earlier check, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_results: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceCheck {
    pub has_balance: bool,
    /// The balance limit the amount was checked against.
    pub balance: String,
    pub required_amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlippageCheck {
    pub within_limits: bool,
    pub current_slippage: String,
    pub max_slippage: String,
    pub recommended_slippage: String,
}

/// Result of a trade verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationData {
    pub wallet_connected: bool,
    pub token_pair_valid: bool,
    pub balance_check: BalanceCheck,
    pub slippage_check: SlippageCheck,
}

/// Successful answer of `POST /verify-trade`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub data: VerificationData,
}

impl VerifyResponse {
    pub fn ok(data: VerificationData) -> Self {
        Self { success: true, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample_node() -> Value {
        json!({"id": "n1", "type": "circle", "position": {"x": 1.0, "y": 2.0}})
    }

    #[test]
    fn test_missing_nodes_rejected() {
        let err = GraphPayload::from_value(json!({"connections": []})).unwrap_err();
        assert!(matches!(err, GraphError::InvalidNodes));

        let err = GraphPayload::from_value(json!([1, 2])).unwrap_err();
        assert!(matches!(err, GraphError::InvalidNodes));
    }

    #[test]
    fn test_empty_nodes_rejected() {
        let err = GraphPayload::from_value(json!({"nodes": [], "connections": []})).unwrap_err();
        assert!(matches!(err, GraphError::EmptyGraph));
    }

    #[test]
    fn test_missing_connections_rejected() {
        let err = GraphPayload::from_value(json!({"nodes": [sample_node()]})).unwrap_err();
        assert!(matches!(err, GraphError::InvalidConnections));
        assert_eq!(err.to_string(), "Invalid connections data");
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = GraphPayload::from_slice(b"{not json").unwrap_err();
        assert!(matches!(err, GraphError::InvalidJson(_)));
    }

    #[test]
    fn test_defaults_filled() {
        let data = GraphPayload::from_value(json!({
            "nodes": [sample_node()],
            "connections": [{"id": "c1", "sourceId": "n1", "targetId": null}]
        }))
        .unwrap();
        assert!(data.version.is_null());
        assert!(data.timestamp.is_null());

        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let response = GraphResponse::accept(data, now);
        assert_eq!(response.data.version, json!("1.0"));
        assert_eq!(response.data.timestamp, json!(now.timestamp_millis()));
        assert_eq!(response.metadata.timestamp, "2024-05-01T12:00:00.000Z");
        assert_eq!(response.metadata.schema, "graph-workflow");
    }

    #[test]
    fn test_unset_values_fall_back() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        for (version, timestamp) in [(json!(null), json!(0)), (json!(""), json!(false))] {
            let data = GraphPayload::from_value(json!({
                "nodes": [sample_node()],
                "connections": [],
                "version": version,
                "timestamp": timestamp
            }))
            .unwrap();
            let response = GraphResponse::accept(data, now);
            assert_eq!(response.data.version, json!("1.0"));
            assert_eq!(response.data.timestamp, json!(now.timestamp_millis()));
        }
    }

    #[test]
    fn test_supplied_values_kept() {
        let data = GraphPayload::from_value(json!({
            "nodes": [sample_node()],
            "connections": [],
            "version": "2.0",
            "timestamp": 1715000000000.5
        }))
        .unwrap();
        let response = GraphResponse::accept(data, Utc::now());
        assert_eq!(response.data.version, json!("2.0"));
        assert_eq!(response.data.timestamp, json!(1715000000000.5));
    }

    #[test]
    fn test_entries_echoed_untouched() {
        let node = json!({
            "id": "a",
            "type": "circle",
            "label": "Sender",
            "position": {"x": 1, "y": 2},
            "data": {"tokenPair": "ETH/RLUSD", "receiver": "0xabc"}
        });
        let connection = json!({"id": "c", "sourceId": "a", "weight": 3});
        let data = GraphPayload::from_value(json!({
            "nodes": [node.clone()],
            "connections": [connection.clone()]
        }))
        .unwrap();

        let echoed = serde_json::to_value(GraphResponse::accept(data, Utc::now())).unwrap();
        assert_eq!(echoed["data"]["nodes"][0], node);
        assert_eq!(echoed["data"]["connections"][0], connection);
    }

    #[test]
    fn test_external_limits_fall_back_per_field() {
        let external = ExternalLimits {
            max_balance: Some("5 ETH".to_string()),
            max_slippage: Some(String::new()),
            recommended_slippage: None,
        };
        let limits = external.resolve(&TradeLimits::default());
        assert_eq!(limits.max_balance, "5 ETH");
        assert_eq!(limits.max_slippage, "1.5%");
        assert_eq!(limits.recommended_slippage, "1%");
    }

    #[test]
    fn test_verify_request_wire_names() {
        let request: VerifyRequest = serde_json::from_value(json!({
            "walletAddress": "0xabc",
            "tradeAmount": "0.02 ETH",
            "externalLimits": {"maxBalance": "1 ETH"}
        }))
        .unwrap();
        assert_eq!(request.wallet_address.as_deref(), Some("0xabc"));
        assert_eq!(
            request.external_limits.unwrap().max_balance.as_deref(),
            Some("1 ETH")
        );
        assert!(request.slippage_tolerance.is_none());
    }

    #[test]
    fn test_error_body_shape() {
        let body = serde_json::to_value(ErrorBody::new(METHOD_NOT_ALLOWED, ONLY_POST)).unwrap();
        assert_eq!(
            body,
            json!({"success": false, "error": "Method not allowed", "details": "Only POST requests are accepted"})
        );
    }
}
