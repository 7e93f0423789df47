//! Routes connect and send calls to the connector registered for a chain.

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::chain::eip155::{Eip155Connector, Eip155RpcWallet, Eip155WalletProvider};
use crate::chain::solana::{SolanaConnector, SolanaRpcWallet, SolanaWalletProvider};
use crate::chain::{
    Chain, ChainConnector, ConnectResult, TransactionResult, WalletContext, WalletError,
};
use crate::config::{Config, WalletMode};

/// Stateless chain router. Every call is a fresh attempt against the connector.
#[derive(Clone, Default)]
pub struct WalletGateway(HashMap<Chain, Arc<dyn ChainConnector>>);

impl Debug for WalletGateway {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let chains: Vec<String> = self.0.keys().map(|c| c.to_string()).collect();
        f.debug_tuple("WalletGateway").field(&chains).finish()
    }
}

impl WalletGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `connector` under its own chain, replacing any previous one.
    pub fn register(
        &mut self,
        connector: Arc<dyn ChainConnector>,
    ) -> Option<Arc<dyn ChainConnector>> {
        self.0.insert(connector.chain(), connector)
    }

    pub fn and_register(mut self, connector: Arc<dyn ChainConnector>) -> Self {
        self.register(connector);
        self
    }

    pub fn chains(&self) -> impl Iterator<Item = Chain> + '_ {
        self.0.keys().copied()
    }

    fn connector(&self, chain: Chain) -> Result<&Arc<dyn ChainConnector>, WalletError> {
        self.0.get(&chain).ok_or(WalletError::UnsupportedChain(chain))
    }

    pub async fn connect(&self, chain: Chain) -> Result<ConnectResult, WalletError> {
        let connector = self.connector(chain)?;
        Ok(connector.connect().await)
    }

    pub async fn send(
        &self,
        chain: Chain,
        to: &str,
        amount: &str,
    ) -> Result<TransactionResult, WalletError> {
        self.connector(chain)?.send(to, amount).await
    }

    /// Builds a connector for every chain.
    ///
    /// Headless mode simulates everything. Interactive mode wires the configured providers;
    /// a chain without one stays registered but reports its provider as unavailable.
    pub fn from_config(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let timeout = config.provider_timeout();
        let (eip155, solana) = match config.mode() {
            WalletMode::Headless => (WalletContext::Headless, WalletContext::Headless),
            WalletMode::Interactive => {
                let eip155 = config.ethereum().map(|ethereum| {
                    let wallet: Arc<dyn Eip155WalletProvider> =
                        Arc::new(Eip155RpcWallet::new(ethereum.rpc.inner().clone()));
                    wallet
                });
                let solana = match config.solana() {
                    Some(solana) => match &solana.signer {
                        Some(signer) => {
                            let keypair = signer.to_keypair()?;
                            let wallet: Arc<dyn SolanaWalletProvider> = Arc::new(
                                SolanaRpcWallet::new(keypair, solana.rpc_url(), solana.cluster),
                            );
                            Some(wallet)
                        }
                        None => None,
                    },
                    None => None,
                };
                for (chain, configured) in [
                    (Chain::Ethereum, eip155.is_some()),
                    (Chain::Solana, solana.is_some()),
                ] {
                    if !configured {
                        tracing::warn!(%chain, "No wallet provider configured");
                    }
                }
                (
                    WalletContext::Interactive(eip155),
                    WalletContext::Interactive(solana),
                )
            }
        };
        let gateway = WalletGateway::new()
            .and_register(Arc::new(Eip155Connector::new(eip155, timeout)))
            .and_register(Arc::new(SolanaConnector::new(solana, timeout)));
        tracing::info!(mode = ?config.mode(), ?gateway, "Wallet gateway ready");
        Ok(gateway)
    }
}
