//! EVM connector.
//!
//! The wallet provider is any JSON-RPC endpoint that manages accounts and signs on their
//! behalf: a wallet's local RPC bridge, or a dev node with unlocked accounts. Connect issues
//! `eth_requestAccounts` and `eth_chainId`; send issues `eth_sendTransaction` from the first
//! account, so keys never reach this process.

use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types_eth::TransactionRequest;
use alloy_transport::TransportError;
use alloy_transport_http::Http;
use async_trait::async_trait;
use std::fmt::{Debug, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::chain::{
    Chain, ChainConnector, ProviderOutcome, WalletAccount, WalletContext, WalletError,
    with_timeout,
};
use crate::networks::eip155_network_name;
use crate::util::{NativeAmount, ether_to_wei};

pub const PLACEHOLDER_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// EIP-1193 "User Rejected Request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// Operations the EVM connector needs from a wallet provider.
#[async_trait]
pub trait Eip155WalletProvider: Send + Sync {
    /// Requests account access; the first address is the active one.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;
    async fn network_name(&self) -> Result<String, WalletError>;
    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<TxHash, WalletError>;
}

/// Parses a recipient: `0x` followed by 40 hex digits; mixed case must be a valid EIP-55 checksum.
pub fn parse_address(address: &str) -> Result<Address, WalletError> {
    let hex_part = address
        .strip_prefix("0x")
        .ok_or_else(|| WalletError::invalid_address(address, "address must start with 0x"))?;
    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WalletError::invalid_address(
            address,
            "expected 40 hex characters",
        ));
    }
    let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(address, None)
            .map_err(|e| WalletError::invalid_address(address, e))
    } else {
        Address::from_str(address).map_err(|e| WalletError::invalid_address(address, e))
    }
}

/// Maps a JSON-RPC failure onto the wallet error taxonomy.
pub fn classify_rpc_error(error: TransportError) -> WalletError {
    if let Some(payload) = error.as_error_resp() {
        if payload.code == USER_REJECTED_CODE {
            return WalletError::UserRejected;
        }
        if payload.message.to_lowercase().contains("insufficient funds") {
            return WalletError::InsufficientFunds(payload.message.to_string());
        }
        return WalletError::Provider(format!("{} (code {})", payload.message, payload.code));
    }
    if error.is_transport_error() {
        return WalletError::ProviderUnavailable(error.to_string());
    }
    WalletError::Provider(error.to_string())
}

/// [`Eip155WalletProvider`] backed by a JSON-RPC endpoint.
pub struct Eip155RpcWallet {
    rpc_url: Url,
    inner: RootProvider,
}

impl Debug for Eip155RpcWallet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Eip155RpcWallet")
            .field("rpc_url", &self.rpc_url.as_str())
            .finish()
    }
}

impl Eip155RpcWallet {
    pub fn new(rpc_url: Url) -> Self {
        tracing::info!(rpc = %rpc_url, "Using EVM wallet provider");
        let client = RpcClient::new(Http::new(rpc_url.clone()), false);
        Self {
            rpc_url,
            inner: RootProvider::new(client),
        }
    }
}

#[async_trait]
impl Eip155WalletProvider for Eip155RpcWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.inner
            .client()
            .request_noparams::<Vec<Address>>("eth_requestAccounts")
            .await
            .map_err(classify_rpc_error)
    }

    async fn network_name(&self) -> Result<String, WalletError> {
        let chain_id = self
            .inner
            .get_chain_id()
            .await
            .map_err(classify_rpc_error)?;
        Ok(eip155_network_name(chain_id).to_string())
    }

    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<TxHash, WalletError> {
        let request = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_value(value);
        if let Err(error) = self.inner.estimate_gas(request.clone()).await {
            tracing::warn!(%error, "Gas estimate failed, continuing");
        }
        let pending = self
            .inner
            .send_transaction(request)
            .await
            .map_err(classify_rpc_error)?;
        Ok(*pending.tx_hash())
    }
}

pub struct Eip155Connector {
    context: WalletContext<Arc<dyn Eip155WalletProvider>>,
    timeout: Duration,
}

impl Eip155Connector {
    pub fn new(context: WalletContext<Arc<dyn Eip155WalletProvider>>, timeout: Duration) -> Self {
        Self { context, timeout }
    }

    async fn connect_live(&self) -> Result<Option<WalletAccount>, WalletError> {
        let Some(provider) = self.context.provider()? else {
            return Ok(None);
        };
        let accounts = with_timeout(self.timeout, provider.request_accounts()).await?;
        let address = accounts.first().ok_or_else(|| {
            WalletError::ProviderUnavailable("provider reported no accounts".to_string())
        })?;
        let network = with_timeout(self.timeout, provider.network_name()).await?;
        Ok(Some(WalletAccount {
            address: address.to_checksum(None),
            network,
        }))
    }

    async fn send_live(
        &self,
        to: &str,
        amount: &NativeAmount,
    ) -> Result<Option<String>, WalletError> {
        let to = parse_address(to)?;
        let value = U256::from(ether_to_wei(amount)?);
        let Some(provider) = self.context.provider()? else {
            return Ok(None);
        };
        let accounts = with_timeout(self.timeout, provider.request_accounts()).await?;
        let from = *accounts.first().ok_or_else(|| {
            WalletError::ProviderUnavailable("provider reported no accounts".to_string())
        })?;
        let tx_hash =
            with_timeout(self.timeout, provider.send_transaction(from, to, value)).await?;
        tracing::info!(%from, %to, %amount, %tx_hash, "Sent ETH transfer");
        Ok(Some(tx_hash.to_string()))
    }
}

#[async_trait]
impl ChainConnector for Eip155Connector {
    fn chain(&self) -> Chain {
        Chain::Ethereum
    }

    async fn try_connect(&self) -> ProviderOutcome<WalletAccount> {
        self.connect_live().await.into()
    }

    async fn try_send(&self, to: &str, amount: &NativeAmount) -> ProviderOutcome<String> {
        self.send_live(to, amount).await.into()
    }
}
