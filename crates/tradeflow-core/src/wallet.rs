//! Wallet connection and balance display.
//!
//! The actual wallet (browser extension, WalletConnect, a test double) sits
//! behind [`WalletProvider`]. [`WalletState`] holds what the canvas shows.

use crate::api::BoxFuture;
use crate::shapes::TradeConfig;
use thiserror::Error;

/// Tickers offered in the balance selector.
pub const TICKERS: [&str; 8] = ["ETH", "USDT", "USDC", "DAI", "WETH", "WBTC", "UNI", "LINK"];

/// ERC-20 contracts with a known address.
pub const TOKEN_ADDRESSES: [(&str, &str); 1] =
    [("RLUSD", "0x9702230A8Ea53601f5cD2dc00fDBc13d4dF4A8c7")];

/// Tickers read as the chain's native currency.
const NATIVE_TICKERS: [&str; 2] = ["ETH", "AVAX"];

/// Decimals of native currencies.
const NATIVE_DECIMALS: u8 = 18;

/// Wallet errors.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("No wallet provider available")]
    NoProvider,
    #[error("Wallet request rejected: {0}")]
    Rejected(String),
    #[error("Wallet returned no accounts")]
    NoAccounts,
    #[error("Balance read failed: {0}")]
    Read(String),
}

/// Result type for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;

/// Access to a user's wallet.
#[cfg(not(target_arch = "wasm32"))]
pub trait WalletProvider: Send + Sync {
    /// Ask the user to expose their accounts.
    fn request_accounts(&self) -> BoxFuture<'_, WalletResult<Vec<String>>>;

    /// Native balance of `address` in the smallest unit.
    fn native_balance(&self, address: &str) -> BoxFuture<'_, WalletResult<u128>>;

    /// ERC-20 balance of `owner` at `token`, in the smallest unit.
    fn token_balance(&self, token: &str, owner: &str) -> BoxFuture<'_, WalletResult<u128>>;

    /// Decimals of the ERC-20 contract at `token`.
    fn token_decimals(&self, token: &str) -> BoxFuture<'_, WalletResult<u8>>;
}

/// Access to a user's wallet (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait WalletProvider {
    /// Ask the user to expose their accounts.
    fn request_accounts(&self) -> BoxFuture<'_, WalletResult<Vec<String>>>;

    /// Native balance of `address` in the smallest unit.
    fn native_balance(&self, address: &str) -> BoxFuture<'_, WalletResult<u128>>;

    /// ERC-20 balance of `owner` at `token`, in the smallest unit.
    fn token_balance(&self, token: &str, owner: &str) -> BoxFuture<'_, WalletResult<u128>>;

    /// Decimals of the ERC-20 contract at `token`.
    fn token_decimals(&self, token: &str) -> BoxFuture<'_, WalletResult<u8>>;
}

/// Contract address of `ticker`, if known.
pub fn token_address(ticker: &str) -> Option<&'static str> {
    TOKEN_ADDRESSES
        .iter()
        .find(|(t, _)| *t == ticker)
        .map(|(_, address)| *address)
}

/// Convert a raw integer amount to units.
pub fn format_units(raw: u128, decimals: u8) -> f64 {
    raw as f64 / 10f64.powi(i32::from(decimals))
}

/// Balance text, e.g. `"0.1000 ETH"`.
pub fn format_balance(amount: f64, ticker: &str, places: usize) -> String {
    format!("{amount:.places$} {ticker}")
}

/// Text shown when a balance cannot be read.
pub fn zero_balance(ticker: &str) -> String {
    format_balance(0.0, ticker, 2)
}

/// Connected account and the balance shown for it.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletState {
    address: Option<String>,
    ticker: String,
    balance: Option<String>,
}

impl Default for WalletState {
    fn default() -> Self {
        Self {
            address: None,
            ticker: TICKERS[0].to_string(),
            balance: None,
        }
    }
}

impl WalletState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Last balance text read.
    pub fn balance(&self) -> Option<&str> {
        self.balance.as_deref()
    }

    /// Address shortened to `0x1234...abcd`.
    pub fn short_address(&self) -> Option<String> {
        let address = self.address.as_deref()?;
        if address.len() <= 10 || !address.is_ascii() {
            return Some(address.to_string());
        }
        Some(format!("{}...{}", &address[..6], &address[address.len() - 4..]))
    }

    /// Request accounts and adopt the first one.
    pub async fn connect<P: WalletProvider + ?Sized>(&mut self, provider: &P) -> WalletResult<&str> {
        let accounts = provider.request_accounts().await.inspect_err(|e| {
            log::warn!("Wallet connection failed: {e}");
        })?;
        let first = accounts.into_iter().next().ok_or(WalletError::NoAccounts)?;
        log::info!("Wallet connected: {first}");
        self.balance = None;
        Ok(self.address.insert(first).as_str())
    }

    /// Forget the connected account.
    pub fn disconnect(&mut self) {
        self.address = None;
        self.balance = None;
    }

    /// Follow an account switch in the wallet. An empty list disconnects.
    pub fn on_accounts_changed(&mut self, accounts: &[String]) {
        match accounts.first() {
            Some(first) => {
                if self.address.as_deref() != Some(first.as_str()) {
                    self.address = Some(first.clone());
                    self.balance = None;
                }
            }
            None => self.disconnect(),
        }
    }

    /// Switch the ticker whose balance is shown.
    pub fn set_ticker(&mut self, ticker: impl Into<String>) {
        self.ticker = ticker.into();
        self.balance = None;
    }

    /// Read the balance of the current ticker.
    ///
    /// Native currencies show 4 decimals and known tokens 2. Unknown tickers
    /// and failed reads show a zero balance. Returns `None` when no account
    /// is connected.
    pub async fn refresh_balance<P: WalletProvider + ?Sized>(&mut self, provider: &P) -> Option<&str> {
        let address = self.address.clone()?;
        let ticker = self.ticker.clone();

        let text = match read_balance(provider, &address, &ticker).await {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Could not read {ticker} balance: {e}");
                zero_balance(&ticker)
            }
        };
        Some(self.balance.insert(text).as_str())
    }

    /// Copy the connected address into a trade.
    pub fn apply_to(&self, config: &mut TradeConfig) {
        config.wallet_address = self.address.clone();
    }
}

async fn read_balance<P: WalletProvider + ?Sized>(
    provider: &P,
    address: &str,
    ticker: &str,
) -> WalletResult<String> {
    if NATIVE_TICKERS.contains(&ticker) {
        let raw = provider.native_balance(address).await?;
        return Ok(format_balance(format_units(raw, NATIVE_DECIMALS), ticker, 4));
    }
    match token_address(ticker) {
        Some(token) => {
            let raw = provider.token_balance(token, address).await?;
            let decimals = provider.token_decimals(token).await?;
            Ok(format_balance(format_units(raw, decimals), ticker, 2))
        }
        None => Ok(zero_balance(ticker)),
    }
}
