//! Chain connectors: the per-chain logic that asks a wallet provider to connect and to
//! submit a native transfer.
//!
//! Every connector follows the same fallback policy, made explicit by [`ProviderOutcome`]:
//!
//! - **Connect** is total. A [`ProviderOutcome::Failed`] attempt collapses into a simulated
//!   [`ConnectResult`] carrying the chain's placeholder address.
//! - **Send** is not. A [`ProviderOutcome::Failed`] attempt is returned as a [`WalletError`];
//!   only the headless [`ProviderOutcome::Simulated`] case yields a simulated transaction.

pub mod eip155;
pub mod solana;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use crate::util::{AmountError, NativeAmount};

/// Default bound on a single provider round trip.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    /// EVM chains, addressed with `0x`-prefixed 20-byte hex. Native coin ETH, 18 decimals.
    Ethereum,
    /// Solana clusters, addressed with base58 public keys. Native coin SOL, 9 decimals.
    Solana,
}

impl Chain {
    pub fn variants() -> &'static [Chain] {
        &[Chain::Ethereum, Chain::Solana]
    }

    /// Address reported when no real signer is reachable.
    pub fn placeholder_address(&self) -> &'static str {
        match self {
            Chain::Ethereum => eip155::PLACEHOLDER_ADDRESS,
            Chain::Solana => solana::PLACEHOLDER_ADDRESS,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ETH",
            Chain::Solana => "SOL",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Chain::Ethereum => "Ethereum",
            Chain::Solana => "Solana",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", json.trim_matches('"'))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported chain {0}")]
pub struct UnsupportedChainError(String);

impl FromStr for Chain {
    type Err = UnsupportedChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let json = format!("\"{}\"", s);
        serde_json::from_str(&json).map_err(|_| UnsupportedChainError(s.to_string()))
    }
}

/// Outcome of a connect attempt, as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResult {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    pub simulated: bool,
}

/// Outcome of a submitted transfer. `tx_hash` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    pub tx_hash: String,
    pub simulated: bool,
}

/// Account handed out by a live provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletAccount {
    pub address: String,
    pub network: String,
}

/// Where a connector runs.
///
/// `Headless` is server-side execution with no wallet-capable context at all: every call
/// is answered with a simulated result. `Interactive` has a context, which may or may not
/// have a provider attached.
#[derive(Debug, Clone)]
pub enum WalletContext<P> {
    Headless,
    Interactive(Option<P>),
}

impl<P> WalletContext<P> {
    pub fn provider(&self) -> Result<Option<&P>, WalletError> {
        match self {
            WalletContext::Headless => Ok(None),
            WalletContext::Interactive(Some(provider)) => Ok(Some(provider)),
            WalletContext::Interactive(None) => Err(WalletError::ProviderUnavailable(
                "no wallet provider is attached".to_string(),
            )),
        }
    }
}

/// Three-state result of talking to a provider.
#[derive(Debug)]
pub enum ProviderOutcome<T> {
    /// The provider answered.
    Live(T),
    /// No wallet-capable context; nothing was attempted.
    Simulated,
    /// A provider was expected but is missing, refused, or failed.
    Failed(WalletError),
}

impl<T> From<Result<Option<T>, WalletError>> for ProviderOutcome<T> {
    fn from(value: Result<Option<T>, WalletError>) -> Self {
        match value {
            Ok(Some(value)) => ProviderOutcome::Live(value),
            Ok(None) => ProviderOutcome::Simulated,
            Err(error) => ProviderOutcome::Failed(error),
        }
    }
}

impl ConnectResult {
    /// Applies the connect fallback policy: `Failed` degrades to a placeholder, it never errors.
    pub fn from_outcome(chain: Chain, outcome: ProviderOutcome<WalletAccount>) -> Self {
        match outcome {
            ProviderOutcome::Live(account) => {
                tracing::info!(
                    %chain,
                    address = %account.address,
                    network = %account.network,
                    "Wallet connected"
                );
                ConnectResult {
                    address: account.address,
                    network: Some(account.network),
                    simulated: false,
                }
            }
            ProviderOutcome::Simulated => {
                tracing::warn!(%chain, "No wallet context, returning placeholder account");
                ConnectResult {
                    address: chain.placeholder_address().to_string(),
                    network: Some("mock".to_string()),
                    simulated: true,
                }
            }
            ProviderOutcome::Failed(error) => {
                match &error {
                    error if error.is_unavailable() => tracing::warn!(
                        %chain,
                        %error,
                        "No wallet provider answered, returning placeholder account"
                    ),
                    WalletError::UserRejected => {
                        tracing::warn!(%chain, "User rejected connection request")
                    }
                    _ => tracing::error!(%chain, %error, "Wallet connection failed"),
                }
                ConnectResult {
                    address: chain.placeholder_address().to_string(),
                    network: None,
                    simulated: true,
                }
            }
        }
    }
}

impl TransactionResult {
    /// Applies the send policy: only `Simulated` fabricates a hash, `Failed` stays an error.
    pub fn from_outcome(
        chain: Chain,
        outcome: ProviderOutcome<String>,
    ) -> Result<Self, WalletError> {
        match outcome {
            ProviderOutcome::Live(tx_hash) => Ok(TransactionResult {
                tx_hash,
                simulated: false,
            }),
            ProviderOutcome::Simulated => {
                let tx_hash = simulated_tx_hash(chain);
                tracing::info!(%chain, %tx_hash, "Simulating transaction");
                Ok(TransactionResult {
                    tx_hash,
                    simulated: true,
                })
            }
            ProviderOutcome::Failed(error) => Err(error),
        }
    }
}

/// Pseudo-random 32-byte hex hash; `0x`-prefixed on EVM chains.
pub fn simulated_tx_hash(chain: Chain) -> String {
    let bytes: [u8; 32] = rand::random();
    match chain {
        Chain::Ethereum => format!("0x{}", hex::encode(bytes)),
        Chain::Solana => hex::encode(bytes),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("Wallet provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("Request rejected by the user")]
    UserRejected,
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
    #[error("Wallet provider did not answer within {0:?}")]
    ProviderTimeout(Duration),
    #[error("No connector registered for {0}")]
    UnsupportedChain(Chain),
    #[error("Wallet provider error: {0}")]
    Provider(String),
}

impl WalletError {
    pub fn invalid_address(address: &str, reason: impl fmt::Display) -> Self {
        WalletError::InvalidAddress {
            address: address.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Timeouts are shown to users the same way as a missing provider.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            WalletError::ProviderUnavailable(_) | WalletError::ProviderTimeout(_)
        )
    }
}

/// Bounds a provider round trip, turning a hang into [`WalletError::ProviderTimeout`].
pub async fn with_timeout<T, F>(timeout: Duration, call: F) -> Result<T, WalletError>
where
    F: Future<Output = Result<T, WalletError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| WalletError::ProviderTimeout(timeout))?
}

/// Chain-specific connect and send against a wallet provider.
///
/// Implementors only produce [`ProviderOutcome`]s; the provided `connect` and `send`
/// apply the shared fallback policy on top.
#[async_trait]
pub trait ChainConnector: Send + Sync {
    fn chain(&self) -> Chain;

    async fn try_connect(&self) -> ProviderOutcome<WalletAccount>;

    /// Must validate `to` and convert `amount` before touching the provider.
    async fn try_send(&self, to: &str, amount: &NativeAmount) -> ProviderOutcome<String>;

    async fn connect(&self) -> ConnectResult {
        let outcome = self.try_connect().await;
        ConnectResult::from_outcome(self.chain(), outcome)
    }

    async fn send(&self, to: &str, amount: &str) -> Result<TransactionResult, WalletError> {
        let amount = NativeAmount::parse(amount)?;
        let outcome = self.try_send(to, &amount).await;
        TransactionResult::from_outcome(self.chain(), outcome)
    }
}
