//! Threshold checks applied to a trade before it is executed.

use crate::protocol::{BalanceCheck, SlippageCheck, TradeLimits, VerificationData, VerifyRequest};
use thiserror::Error;

/// Reasons a verification request is refused.
#[derive(Debug, Error, PartialEq)]
pub enum VerifyError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("cannot read a number from {field} {value:?}")]
    InvalidAmount { field: &'static str, value: String },
}

/// Read the leading number of a `"<number> <unit>"` or `"<number>%"` string.
///
/// Only the first whitespace separated token is considered, and within it
/// the longest prefix that forms a finite number. `"0.02 ETH"` gives `0.02`,
/// `"1.5%"` gives `1.5`, `"ETH"` gives `None`.
pub fn parse_amount(input: &str) -> Option<f64> {
    let token = input.split_whitespace().next()?;
    token
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .rev()
        .find_map(|end| token[..end].parse::<f64>().ok().filter(|v| v.is_finite()))
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, VerifyError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(VerifyError::MissingField(field))
}

fn amount(value: &str, field: &'static str) -> Result<f64, VerifyError> {
    parse_amount(value).ok_or_else(|| VerifyError::InvalidAmount {
        field,
        value: value.to_string(),
    })
}

/// Check a trade against `defaults`, overridden field by field by any
/// limits carried in the request.
pub fn verify_trade(
    request: &VerifyRequest,
    defaults: &TradeLimits,
) -> Result<VerificationData, VerifyError> {
    let trade_amount = required(&request.trade_amount, "tradeAmount")?;
    let slippage = required(&request.slippage_tolerance, "slippageTolerance")?;

    let limits = match &request.external_limits {
        Some(external) => external.resolve(defaults),
        None => defaults.clone(),
    };

    let has_balance =
        amount(trade_amount, "tradeAmount")? <= amount(&limits.max_balance, "maxBalance")?;
    let within_limits =
        amount(slippage, "slippageTolerance")? <= amount(&limits.max_slippage, "maxSlippage")?;

    Ok(VerificationData {
        wallet_connected: request
            .wallet_address
            .as_deref()
            .is_some_and(|a| !a.is_empty()),
        token_pair_valid: true,
        balance_check: BalanceCheck {
            has_balance,
            balance: limits.max_balance,
            required_amount: trade_amount.to_string(),
        },
        slippage_check: SlippageCheck {
            within_limits,
            current_slippage: slippage.to_string(),
            max_slippage: limits.max_slippage,
            recommended_slippage: limits.recommended_slippage,
        },
    })
}
