//! Per-step node payloads.

use super::WorkflowStep;
use crate::protocol::{BalanceCheck, SlippageCheck, VerificationData};
use crate::verify::parse_amount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reference price used for the mock quote token.
const STATIC_PRICE: f64 = 2700.0;
/// Native balance shown by the on-chain data step.
const MOCK_NATIVE_BALANCE: f64 = 0.1;
/// Quote token balance shown by the on-chain data step.
const MOCK_QUOTE_BALANCE: f64 = 538.45;
/// Gas cost assumed by the confirmation step.
const MOCK_GAS_FEE: f64 = 0.002;

const AI_PROMPTS: [&str; 6] = [
    "Analyzing market volatility patterns",
    "Checking historical price correlations",
    "Evaluating liquidity depth across exchanges",
    "Monitoring gas price fluctuations",
    "Assessing trading volume trends",
    "Calculating optimal entry points",
];

/// Direction of the trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TradeType {
    #[default]
    Buy,
    Sell,
}

impl TradeType {
    pub fn as_str(self) -> &'static str {
        match self {
            TradeType::Buy => "Buy",
            TradeType::Sell => "Sell",
        }
    }
}

/// Trade parameters entered in the user input step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeConfig {
    pub token_pair: String,
    pub trade_type: TradeType,
    pub trade_amount: String,
    pub slippage_tolerance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            token_pair: "ETH/RLUSD".to_string(),
            trade_type: TradeType::Buy,
            trade_amount: "0.02 ETH".to_string(),
            slippage_tolerance: "1%".to_string(),
            wallet_address: None,
        }
    }
}

impl TradeConfig {
    /// Base and quote symbols of the token pair.
    pub fn symbols(&self) -> (&str, &str) {
        self.token_pair
            .split_once('/')
            .unwrap_or((self.token_pair.as_str(), ""))
    }

    /// Numeric trade amount, zero when it cannot be parsed.
    pub fn amount(&self) -> f64 {
        parse_amount(&self.trade_amount).unwrap_or(0.0)
    }
}

/// Summary of the trade produced by the AI step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeDetails {
    pub token_pair: String,
    pub direction: String,
    pub amount: String,
    pub minimum_output: String,
}

/// Verification flags shown by the verification step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationStatus {
    pub wallet_connected: bool,
    pub token_pair_valid: bool,
    pub sufficient_balance: bool,
    pub slippage_within_limits: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_check: Option<BalanceCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slippage_check: Option<SlippageCheck>,
}

impl From<&VerificationData> for VerificationStatus {
    fn from(data: &VerificationData) -> Self {
        Self {
            wallet_connected: data.wallet_connected,
            token_pair_valid: data.token_pair_valid,
            sufficient_balance: data.balance_check.has_balance,
            slippage_within_limits: data.slippage_check.within_limits,
            balance_check: Some(data.balance_check.clone()),
            slippage_check: Some(data.slippage_check.clone()),
        }
    }
}

/// Outcome shown by the confirmation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeConfirmation {
    pub status: String,
    pub transaction_hash: String,
    pub gas_fees: String,
    pub updated_balances: BTreeMap<String, f64>,
    pub historical_trades: Vec<String>,
}

/// Payload attached to a node. Which fields are set depends on the step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    // User input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_pair: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_type: Option<TradeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slippage_tolerance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    // On-chain data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_history: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_balances: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_feeds: Option<BTreeMap<String, f64>>,

    // AI reasoning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_prompts: Option<Vec<String>>,

    // Trade details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_details: Option<TradeDetails>,

    // Verification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<VerificationStatus>,

    // Confirmation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_confirmation: Option<TradeConfirmation>,
}

impl NodeData {
    /// Default payload of `step` for the given trade.
    pub fn for_step(step: WorkflowStep, config: &TradeConfig) -> Self {
        let (base, quote) = config.symbols();
        let amount = config.amount();

        match step {
            WorkflowStep::UserInput => Self {
                token_pair: Some(config.token_pair.clone()),
                trade_type: Some(config.trade_type),
                trade_amount: Some(config.trade_amount.clone()),
                slippage_tolerance: Some(config.slippage_tolerance.clone()),
                wallet_address: config.wallet_address.clone(),
                ..Self::default()
            },
            WorkflowStep::OnChainData => Self {
                user_prompt: Some(String::new()),
                transaction_history: Some(vec!["Last 5 transactions...".to_string()]),
                token_balances: Some(BTreeMap::from([
                    (base.to_string(), MOCK_NATIVE_BALANCE),
                    (quote.to_string(), MOCK_QUOTE_BALANCE),
                ])),
                price_feeds: Some(BTreeMap::from([(config.token_pair.clone(), STATIC_PRICE)])),
                ..Self::default()
            },
            WorkflowStep::AiReasoning => Self {
                ai_prompts: Some(AI_PROMPTS.iter().map(|p| p.to_string()).collect()),
                ..Self::default()
            },
            WorkflowStep::TradeDetails => Self {
                trade_details: Some(TradeDetails {
                    token_pair: config.token_pair.clone(),
                    direction: config.trade_type.as_str().to_string(),
                    amount: config.trade_amount.clone(),
                    minimum_output: format!("{:.2} {}", amount * STATIC_PRICE, quote),
                }),
                ..Self::default()
            },
            WorkflowStep::Verification => Self {
                verification_status: Some(VerificationStatus::default()),
                ..Self::default()
            },
            WorkflowStep::Confirmation => Self {
                trade_confirmation: Some(TradeConfirmation {
                    status: "Success".to_string(),
                    transaction_hash: "0x7d3c...8f4e".to_string(),
                    gas_fees: format!("{} {}", MOCK_GAS_FEE, base),
                    updated_balances: BTreeMap::from([
                        (base.to_string(), MOCK_NATIVE_BALANCE - amount - MOCK_GAS_FEE),
                        (quote.to_string(), MOCK_QUOTE_BALANCE + amount * STATIC_PRICE),
                    ]),
                    historical_trades: vec![
                        format!("Buy 0.02 {base} @ 54.63 {quote}"),
                        format!("Sell 0.01 {base} @ 28.56 {quote}"),
                        format!("Buy 0.04 {base} @ 98.27 {quote}"),
                    ],
                }),
                ..Self::default()
            },
            WorkflowStep::Execute => Self::default(),
        }
    }

    /// Layer `other` on top of `self`: fields set in `other` win.
    pub fn overlay(self, other: NodeData) -> NodeData {
        NodeData {
            token_pair: other.token_pair.or(self.token_pair),
            trade_type: other.trade_type.or(self.trade_type),
            trade_amount: other.trade_amount.or(self.trade_amount),
            slippage_tolerance: other.slippage_tolerance.or(self.slippage_tolerance),
            wallet_address: other.wallet_address.or(self.wallet_address),
            network: other.network.or(self.network),
            user_prompt: other.user_prompt.or(self.user_prompt),
            transaction_history: other.transaction_history.or(self.transaction_history),
            token_balances: other.token_balances.or(self.token_balances),
            price_feeds: other.price_feeds.or(self.price_feeds),
            ai_prompts: other.ai_prompts.or(self.ai_prompts),
            trade_details: other.trade_details.or(self.trade_details),
            verification_status: other.verification_status.or(self.verification_status),
            trade_confirmation: other.trade_confirmation.or(self.trade_confirmation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_input_carries_trade_config() {
        let config = TradeConfig::default();
        let data = NodeData::for_step(WorkflowStep::UserInput, &config);
        assert_eq!(data.token_pair.as_deref(), Some("ETH/RLUSD"));
        assert_eq!(data.trade_amount.as_deref(), Some("0.02 ETH"));
        assert_eq!(data.slippage_tolerance.as_deref(), Some("1%"));
        assert!(data.ai_prompts.is_none());
    }

    #[test]
    fn test_trade_details_minimum_output() {
        let config = TradeConfig::default();
        let data = NodeData::for_step(WorkflowStep::TradeDetails, &config);
        let details = data.trade_details.unwrap();
        assert_eq!(details.minimum_output, "54.00 RLUSD");
        assert_eq!(details.direction, "Buy");
    }

    #[test]
    fn test_execute_has_empty_payload() {
        let data = NodeData::for_step(WorkflowStep::Execute, &TradeConfig::default());
        assert_eq!(data, NodeData::default());
        assert_eq!(serde_json::to_string(&data).unwrap(), "{}");
    }

    #[test]
    fn test_overlay_prefers_stored_fields() {
        let defaults = NodeData::for_step(WorkflowStep::Verification, &TradeConfig::default());
        let stored = NodeData {
            verification_status: Some(VerificationStatus {
                wallet_connected: true,
                ..VerificationStatus::default()
            }),
            ..NodeData::default()
        };
        let merged = defaults.overlay(stored);
        assert!(merged.verification_status.unwrap().wallet_connected);
    }

    #[test]
    fn test_payload_uses_camel_case() {
        let data = NodeData::for_step(WorkflowStep::OnChainData, &TradeConfig::default());
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("tokenBalances").is_some());
        assert!(json.get("transactionHistory").is_some());
    }
}
