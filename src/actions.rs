//! The wallet actions: list wallets, connect, disconnect, prompt for a transfer, send it.
//!
//! | action              | session     | gateway   |
//! |---------------------|-------------|-----------|
//! | `show_wallets`      | -           | -         |
//! | `connect_wallet`    | set         | `connect` |
//! | `disconnect_wallet` | clear       | -         |
//! | `send_prompt`       | read        | -         |
//! | `confirm_send`      | read        | `send`    |
//!
//! Send failures become failure cards; they are never reported as a sent transaction.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use crate::card::{Block, Button, Card};
use crate::chain::{Chain, TransactionResult, WalletError};
use crate::config::Config;
use crate::dispatcher::{ActionContext, ActionDispatcher, ActionHandler, HandlerError};
use crate::gateway::WalletGateway;
use crate::networks::default_explorer;
use crate::params::{
    ActionParams, CONFIRM_SEND, CONNECT_WALLET, ConfirmSendParams, ConnectWalletParams,
    DISCONNECT_WALLET, OPEN_URL, SEND_PROMPT, SHOW_WALLETS, SendPromptParams,
};
use crate::session::WalletSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletOption {
    pub id: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub icon: Option<&'static str>,
    pub chain: Chain,
}

pub static WALLET_CATALOG: &[WalletOption] = &[
    WalletOption {
        id: "metamask",
        title: "MetaMask",
        subtitle: "Browser-based wallet",
        icon: Some(
            "https://raw.githubusercontent.com/MetaMask/brand-resources/master/SVG/metamask-fox.svg",
        ),
        chain: Chain::Ethereum,
    },
    WalletOption {
        id: "walletconnect",
        title: "WalletConnect",
        subtitle: "Connect via QR code (mobile wallets)",
        icon: Some("https://walletconnect.com/walletconnect-logo.svg"),
        chain: Chain::Ethereum,
    },
    WalletOption {
        id: "coinbase",
        title: "Coinbase Wallet",
        subtitle: "Mobile or web wallet",
        icon: Some("https://avatars.githubusercontent.com/u/188712?v=4"),
        chain: Chain::Ethereum,
    },
    WalletOption {
        id: "phantom",
        title: "Phantom",
        subtitle: "Solana wallet",
        icon: None,
        chain: Chain::Solana,
    },
];

fn catalog_entry(provider: &str) -> Option<&'static WalletOption> {
    WALLET_CATALOG
        .iter()
        .find(|wallet| wallet.id.eq_ignore_ascii_case(provider))
}

/// Display label for the advisory `provider` parameter.
fn provider_label(provider: Option<&str>) -> String {
    match provider {
        Some(id) => catalog_entry(id)
            .map(|wallet| wallet.title.to_string())
            .unwrap_or_else(|| id.to_string()),
        None => "Wallet".to_string(),
    }
}

fn quick_amounts(chain: Chain) -> &'static [&'static str] {
    match chain {
        Chain::Ethereum => &["0.01", "0.05", "0.1"],
        Chain::Solana => &["0.1", "0.5", "1"],
    }
}

/// Transaction explorer base URL per chain.
#[derive(Debug, Clone)]
pub struct Explorers(HashMap<Chain, String>);

impl Default for Explorers {
    fn default() -> Self {
        Self(
            Chain::variants()
                .iter()
                .map(|chain| (*chain, default_explorer(*chain).to_string()))
                .collect(),
        )
    }
}

impl Explorers {
    pub fn from_config(config: &Config) -> Self {
        let mut explorers = Self::default();
        let overrides = [
            (Chain::Ethereum, config.ethereum().and_then(|c| c.explorer.clone())),
            (Chain::Solana, config.solana().and_then(|c| c.explorer.clone())),
        ];
        for (chain, explorer) in overrides {
            if let Some(explorer) = explorer {
                explorers.0.insert(chain, explorer);
            }
        }
        explorers
    }

    pub fn tx_url(&self, chain: Chain, tx_hash: &str) -> String {
        let base = self
            .0
            .get(&chain)
            .map(String::as_str)
            .unwrap_or_else(|| default_explorer(chain));
        format!("{base}{tx_hash}")
    }
}

fn show_wallets_button() -> Button {
    Button::new("Show Wallets", SHOW_WALLETS)
}

fn no_wallet_card(chain: Option<Chain>) -> Card {
    let subtitle = match chain {
        Some(chain) => format!("Please connect a {} wallet first.", chain.display_name()),
        None => "Please connect a wallet first.".to_string(),
    };
    Card::new("❌ No Wallet Connected")
        .subtitle(subtitle)
        .button(show_wallets_button())
}

/// The connected wallet, if it is on `requested` (or any chain when not given).
fn wallet_for(cx: &ActionContext, requested: Option<Chain>) -> Result<WalletSession, Card> {
    match cx.wallet() {
        Some(wallet) if requested.is_none_or(|chain| chain == wallet.chain) => Ok(wallet),
        Some(wallet) => {
            tracing::info!(
                connected = %wallet.chain,
                ?requested,
                "Requested chain is not connected"
            );
            Err(no_wallet_card(requested))
        }
        None => Err(no_wallet_card(requested)),
    }
}

fn send_failure_card(chain: Chain, error: &WalletError) -> Card {
    let retry = Button::new("Try Again", SEND_PROMPT).with_data(json!({ "chain": chain }));
    let (kind, card) = match error {
        WalletError::UserRejected => (
            "user_rejected",
            Card::new("🚫 Transaction Rejected")
                .subtitle("The transfer was declined in the wallet.")
                .button(retry),
        ),
        WalletError::InsufficientFunds(message) => (
            "insufficient_funds",
            Card::new("❌ Insufficient Funds")
                .subtitle(message.clone())
                .button(retry),
        ),
        WalletError::InvalidAddress { .. } => (
            "invalid_address",
            Card::new("❌ Invalid Recipient")
                .subtitle(error.to_string())
                .button(retry),
        ),
        WalletError::InvalidAmount(_) => (
            "invalid_amount",
            Card::new("❌ Invalid Amount")
                .subtitle(error.to_string())
                .button(retry),
        ),
        WalletError::ProviderUnavailable(_) | WalletError::ProviderTimeout(_) => (
            "provider_unavailable",
            Card::new("⚠️ Wallet Unavailable")
                .subtitle(
                    "No wallet provider is reachable. Install or unlock a wallet and try again.",
                )
                .button(retry),
        ),
        WalletError::UnsupportedChain(_) => (
            "unsupported_chain",
            Card::new("❌ Unsupported Chain")
                .subtitle(error.to_string())
                .button(show_wallets_button()),
        ),
        WalletError::Provider(message) => (
            "provider_error",
            Card::new("❌ Transaction Failed")
                .subtitle(message.clone())
                .button(retry),
        ),
    };
    card.meta("error", json!(kind)).meta("chain", json!(chain))
}

pub struct ShowWallets;

#[async_trait]
impl ActionHandler for ShowWallets {
    async fn handle(
        &self,
        _cx: &ActionContext,
        params: ActionParams,
    ) -> Result<Card, HandlerError> {
        let ActionParams::ShowWallets = params else {
            return Err(HandlerError::UnexpectedParams {
                expected: SHOW_WALLETS,
            });
        };
        let card = WALLET_CATALOG.iter().fold(
            Card::new("🔗 Connect Your Wallet")
                .subtitle("Choose a wallet to link with Firstember."),
            |card, wallet| {
                card.block(Block::WalletRow {
                    icon: wallet.icon.map(str::to_string),
                    title: wallet.title.to_string(),
                    subtitle: wallet.subtitle.to_string(),
                    button: Button::new("Connect", CONNECT_WALLET)
                        .with_data(json!({ "provider": wallet.id, "chain": wallet.chain })),
                })
            },
        );
        Ok(card)
    }
}

pub struct ConnectWallet {
    gateway: Arc<WalletGateway>,
}

impl ConnectWallet {
    pub fn new(gateway: Arc<WalletGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl ActionHandler for ConnectWallet {
    async fn handle(
        &self,
        cx: &ActionContext,
        params: ActionParams,
    ) -> Result<Card, HandlerError> {
        let ActionParams::ConnectWallet(ConnectWalletParams { chain, provider }) = params else {
            return Err(HandlerError::UnexpectedParams {
                expected: CONNECT_WALLET,
            });
        };
        let chain = chain.unwrap_or(Chain::Ethereum);
        let label = provider_label(provider.as_deref());
        let result = match self.gateway.connect(chain).await {
            Ok(result) => result,
            Err(error) => {
                tracing::warn!(%chain, %error, "Connect failed");
                return Ok(Card::new("❌ Wallet Connection Failed")
                    .subtitle(error.to_string())
                    .button(show_wallets_button()));
            }
        };
        cx.set_wallet(WalletSession::from_connect(chain, &result));

        let marker = if result.simulated { "(Simulated)" } else { "✅" };
        let subtitle = match &result.network {
            Some(network) => format!("Address: {} ({network})", result.address),
            None => format!("Address: {}", result.address),
        };
        let icon = provider
            .as_deref()
            .and_then(catalog_entry)
            .and_then(|wallet| wallet.icon);
        let card = Card::new(format!("{label} Connected {marker}")).subtitle(subtitle);
        let card = match icon {
            Some(icon) => card.image(icon),
            None => card,
        };
        Ok(card
            .button(
                Button::new(format!("Send {}", chain.symbol()), SEND_PROMPT)
                    .with_data(json!({ "chain": chain })),
            )
            .button(Button::new("Disconnect", DISCONNECT_WALLET))
            .meta("chain", json!(chain))
            .meta("address", json!(result.address))
            .meta("simulated", json!(result.simulated)))
    }
}

pub struct DisconnectWallet;

#[async_trait]
impl ActionHandler for DisconnectWallet {
    async fn handle(
        &self,
        cx: &ActionContext,
        params: ActionParams,
    ) -> Result<Card, HandlerError> {
        let ActionParams::DisconnectWallet = params else {
            return Err(HandlerError::UnexpectedParams {
                expected: DISCONNECT_WALLET,
            });
        };
        if let Some(wallet) = cx.clear_wallet() {
            tracing::info!(
                chain = %wallet.chain,
                address = %wallet.address,
                "Wallet disconnected"
            );
        }
        Ok(Card::new("🔌 Disconnected")
            .subtitle("You can reconnect anytime.")
            .button(show_wallets_button()))
    }
}

pub struct SendPrompt;

#[async_trait]
impl ActionHandler for SendPrompt {
    async fn handle(
        &self,
        cx: &ActionContext,
        params: ActionParams,
    ) -> Result<Card, HandlerError> {
        let ActionParams::SendPrompt(SendPromptParams { chain }) = params else {
            return Err(HandlerError::UnexpectedParams {
                expected: SEND_PROMPT,
            });
        };
        let wallet = match wallet_for(cx, chain) {
            Ok(wallet) => wallet,
            Err(card) => return Ok(card),
        };
        let chain = wallet.chain;
        let symbol = chain.symbol();
        let mut rows = vec![
            vec!["Chain".to_string(), chain.display_name().to_string()],
            vec!["From".to_string(), wallet.address.clone()],
        ];
        if let Some(network) = &wallet.network {
            rows.push(vec!["Network".to_string(), network.clone()]);
        }
        let card = quick_amounts(chain).iter().fold(
            Card::new(format!("💸 Send {symbol}"))
                .subtitle(format!("Connected: {}", wallet.address))
                .block(Block::table(["Field", "Value"], rows))
                .footer("Choose an amount and provide the recipient address.")
                .meta("chain", json!(chain))
                .meta("requires", json!(["to"])),
            |card, amount| {
                card.button(
                    Button::new(format!("Send {amount} {symbol}"), CONFIRM_SEND)
                        .with_data(json!({ "chain": chain, "amount": amount })),
                )
            },
        );
        Ok(card)
    }
}

pub struct ConfirmSend {
    gateway: Arc<WalletGateway>,
    explorers: Explorers,
}

impl ConfirmSend {
    pub fn new(gateway: Arc<WalletGateway>, explorers: Explorers) -> Self {
        Self { gateway, explorers }
    }

    fn sent_card(
        &self,
        chain: Chain,
        params: &ConfirmSendParams,
        tx: &TransactionResult,
    ) -> Card {
        let title = if tx.simulated {
            "✅ Transaction Sent (Simulated)"
        } else {
            "✅ Transaction Sent"
        };
        let card = Card::new(title)
            .subtitle(format!(
                "Sent {} {} to {}\nHash: {}",
                params.amount,
                chain.symbol(),
                params.to,
                tx.tx_hash
            ))
            .meta("chain", json!(chain))
            .meta("txHash", json!(tx.tx_hash))
            .meta("simulated", json!(tx.simulated));
        if tx.simulated {
            return card;
        }
        card.button(
            Button::new("🔍 View on Explorer", OPEN_URL)
                .with_data(json!({ "url": self.explorers.tx_url(chain, &tx.tx_hash) })),
        )
    }
}

#[async_trait]
impl ActionHandler for ConfirmSend {
    async fn handle(
        &self,
        cx: &ActionContext,
        params: ActionParams,
    ) -> Result<Card, HandlerError> {
        let ActionParams::ConfirmSend(params) = params else {
            return Err(HandlerError::UnexpectedParams {
                expected: CONFIRM_SEND,
            });
        };
        let wallet = match wallet_for(cx, params.chain) {
            Ok(wallet) => wallet,
            Err(card) => return Ok(card),
        };
        let chain = wallet.chain;
        match self.gateway.send(chain, &params.to, &params.amount).await {
            Ok(tx) => Ok(self.sent_card(chain, &params, &tx)),
            Err(error) => {
                tracing::warn!(
                    %chain,
                    to = %params.to,
                    amount = %params.amount,
                    %error,
                    "Send failed"
                );
                Ok(send_failure_card(chain, &error))
            }
        }
    }
}

/// Registers the five wallet actions on `dispatcher`.
pub fn register_wallet_actions(
    dispatcher: ActionDispatcher,
    gateway: Arc<WalletGateway>,
    explorers: Explorers,
) -> ActionDispatcher {
    dispatcher
        .and_register(SHOW_WALLETS, Arc::new(ShowWallets))
        .and_register(CONNECT_WALLET, Arc::new(ConnectWallet::new(gateway.clone())))
        .and_register(DISCONNECT_WALLET, Arc::new(DisconnectWallet))
        .and_register(SEND_PROMPT, Arc::new(SendPrompt))
        .and_register(CONFIRM_SEND, Arc::new(ConfirmSend::new(gateway, explorers)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::eip155::{Eip155Connector, Eip155WalletProvider};
    use crate::chain::solana::SolanaConnector;
    use crate::chain::{ChainConnector, WalletContext};
    use crate::dispatcher::DispatchError;
    use crate::session::{SessionId, SessionStore};
    use alloy_primitives::{Address, TxHash, U256};
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const EVM_RECIPIENT: &str = "0xABCDEF0123456789ABCDEF0123456789ABCDEF01";

    fn headless_gateway() -> Arc<WalletGateway> {
        Arc::new(
            WalletGateway::new()
                .and_register(Arc::new(Eip155Connector::new(
                    WalletContext::Headless,
                    Duration::from_secs(1),
                )))
                .and_register(Arc::new(SolanaConnector::new(
                    WalletContext::Headless,
                    Duration::from_secs(1),
                ))),
        )
    }

    fn dispatcher(gateway: Arc<WalletGateway>) -> ActionDispatcher {
        register_wallet_actions(
            ActionDispatcher::new(SessionStore::new()),
            gateway,
            Explorers::default(),
        )
    }

    async fn call(dispatcher: &ActionDispatcher, name: &str, body: Value) -> Card {
        dispatcher
            .dispatch(SessionId::default(), name, body)
            .await
            .unwrap()
    }

    /// Counts sends and answers with a fixed live hash, a fixed error, or never.
    #[derive(Default)]
    struct ScriptedWallet {
        sends: AtomicUsize,
        fail_with: Option<WalletError>,
        hang: bool,
    }

    #[async_trait]
    impl Eip155WalletProvider for ScriptedWallet {
        async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
            Ok(vec![Address::repeat_byte(0x11)])
        }

        async fn network_name(&self) -> Result<String, WalletError> {
            Ok("sepolia".to_string())
        }

        async fn send_transaction(
            &self,
            _from: Address,
            _to: Address,
            _value: U256,
        ) -> Result<TxHash, WalletError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                std::future::pending::<()>().await;
            }
            match &self.fail_with {
                Some(error) => Err(error.clone()),
                None => Ok(TxHash::repeat_byte(0xab)),
            }
        }
    }

    fn live_gateway(wallet: Arc<ScriptedWallet>) -> Arc<WalletGateway> {
        let provider: Arc<dyn Eip155WalletProvider> = wallet;
        let connector: Arc<dyn ChainConnector> = Arc::new(Eip155Connector::new(
            WalletContext::Interactive(Some(provider)),
            Duration::from_millis(50),
        ));
        Arc::new(WalletGateway::new().and_register(connector))
    }

    #[tokio::test]
    async fn test_show_wallets_lists_catalog() {
        let dispatcher = dispatcher(headless_gateway());
        let card = call(&dispatcher, SHOW_WALLETS, json!({})).await;
        assert_eq!(card.blocks.len(), WALLET_CATALOG.len());
        let Block::WalletRow { button, .. } = &card.blocks[3] else {
            panic!("expected a wallet row");
        };
        assert_eq!(button.action, CONNECT_WALLET);
        assert_eq!(
            button.data,
            Some(json!({ "provider": "phantom", "chain": "solana" }))
        );
    }

    #[tokio::test]
    async fn test_send_prompt_defaults_to_connected_chain() {
        let dispatcher = dispatcher(headless_gateway());
        let card = call(
            &dispatcher,
            CONNECT_WALLET,
            json!({ "data": { "chain": "solana", "provider": "phantom" } }),
        )
        .await;
        assert_eq!(card.title, "Phantom Connected (Simulated)");

        let card = call(&dispatcher, SEND_PROMPT, json!({})).await;
        assert_eq!(card.title, "💸 Send SOL");
        let meta = card.meta.unwrap();
        assert_eq!(meta["chain"], "solana");
        assert_eq!(meta["requires"], json!(["to"]));
        assert!(
            card.buttons
                .iter()
                .all(|b| b.data.as_ref().unwrap()["chain"] == "solana")
        );
    }

    #[tokio::test]
    async fn test_connect_then_send_simulated_evm() {
        let dispatcher = dispatcher(headless_gateway());
        call(&dispatcher, CONNECT_WALLET, json!({ "chain": "ethereum" })).await;
        let session = dispatcher.sessions().get(&SessionId::default()).unwrap();
        assert_eq!(session.chain, Chain::Ethereum);
        assert_eq!(session.address, "0x0000000000000000000000000000000000000000");

        let card = call(
            &dispatcher,
            CONFIRM_SEND,
            json!({ "data": { "to": EVM_RECIPIENT, "amount": "0.01" } }),
        )
        .await;
        let meta = card.meta.unwrap();
        assert_eq!(meta["simulated"], true);
        let hash = meta["txHash"].as_str().unwrap();
        assert!(hash.starts_with("0x"));
        assert_eq!(hash.len(), 66);
        assert!(hash[2..].chars().all(|c| c.is_ascii_hexdigit()));
        assert!(card.buttons.is_empty());
    }

    #[tokio::test]
    async fn test_send_without_connect_skips_gateway() {
        let wallet = Arc::new(ScriptedWallet::default());
        let dispatcher = dispatcher(live_gateway(wallet.clone()));
        let card = call(
            &dispatcher,
            CONFIRM_SEND,
            json!({ "to": EVM_RECIPIENT, "amount": "0.01" }),
        )
        .await;
        assert_eq!(card.title, "❌ No Wallet Connected");
        assert_eq!(wallet.sends.load(Ordering::SeqCst), 0);

        let card = call(&dispatcher, SEND_PROMPT, Value::Null).await;
        assert_eq!(card.title, "❌ No Wallet Connected");
    }

    #[tokio::test]
    async fn test_send_on_other_chain_is_not_connected() {
        let dispatcher = dispatcher(headless_gateway());
        call(&dispatcher, CONNECT_WALLET, json!({ "chain": "ethereum" })).await;
        let card = call(
            &dispatcher,
            CONFIRM_SEND,
            json!({
                "chain": "solana",
                "to": "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM",
                "amount": "1"
            }),
        )
        .await;
        assert_eq!(card.title, "❌ No Wallet Connected");
    }

    #[tokio::test]
    async fn test_live_send_links_explorer() {
        let wallet = Arc::new(ScriptedWallet::default());
        let dispatcher = dispatcher(live_gateway(wallet.clone()));
        let card = call(&dispatcher, CONNECT_WALLET, json!({ "provider": "metamask" })).await;
        assert_eq!(card.title, "MetaMask Connected ✅");
        assert_eq!(card.image.as_deref(), WALLET_CATALOG[0].icon);
        let card = call(
            &dispatcher,
            CONFIRM_SEND,
            json!({ "to": EVM_RECIPIENT, "amount": "0.01" }),
        )
        .await;
        assert_eq!(card.title, "✅ Transaction Sent");
        let hash = TxHash::repeat_byte(0xab).to_string();
        assert_eq!(
            card.buttons[0].data,
            Some(json!({ "url": format!("https://sepolia.etherscan.io/tx/{hash}") }))
        );
        assert_eq!(card.buttons[0].action, OPEN_URL);
        assert_eq!(wallet.sends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_send_is_a_failure_card() {
        let wallet = Arc::new(ScriptedWallet {
            fail_with: Some(WalletError::UserRejected),
            ..Default::default()
        });
        let dispatcher = dispatcher(live_gateway(wallet));
        call(&dispatcher, CONNECT_WALLET, json!({})).await;
        let card = call(
            &dispatcher,
            CONFIRM_SEND,
            json!({ "to": EVM_RECIPIENT, "amount": "0.01" }),
        )
        .await;
        assert_eq!(card.title, "🚫 Transaction Rejected");
        assert_eq!(card.meta.unwrap()["error"], "user_rejected");
    }

    #[tokio::test]
    async fn test_hanging_send_is_wallet_unavailable() {
        let wallet = Arc::new(ScriptedWallet {
            hang: true,
            ..Default::default()
        });
        let dispatcher = dispatcher(live_gateway(wallet.clone()));
        call(&dispatcher, CONNECT_WALLET, json!({})).await;
        let card = call(
            &dispatcher,
            CONFIRM_SEND,
            json!({ "to": EVM_RECIPIENT, "amount": "0.01" }),
        )
        .await;
        assert_eq!(card.title, "⚠️ Wallet Unavailable");
        let meta = card.meta.unwrap();
        assert_eq!(meta["error"], "provider_unavailable");
        assert!(meta.get("txHash").is_none());
        assert_eq!(card.buttons[0].action, SEND_PROMPT);
        assert_eq!(wallet.sends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_amount_fails_fast() {
        let wallet = Arc::new(ScriptedWallet::default());
        let dispatcher = dispatcher(live_gateway(wallet.clone()));
        call(&dispatcher, CONNECT_WALLET, json!({})).await;
        let card = call(
            &dispatcher,
            CONFIRM_SEND,
            json!({ "to": EVM_RECIPIENT, "amount": "-1" }),
        )
        .await;
        assert_eq!(card.title, "❌ Invalid Amount");
        assert_eq!(wallet.sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let dispatcher = dispatcher(headless_gateway());
        let card = call(&dispatcher, DISCONNECT_WALLET, json!({})).await;
        assert_eq!(card.title, "🔌 Disconnected");
        call(&dispatcher, CONNECT_WALLET, json!({ "chain": "solana" })).await;
        call(&dispatcher, DISCONNECT_WALLET, json!({})).await;
        assert!(dispatcher.sessions().get(&SessionId::default()).is_none());
        let card = call(&dispatcher, DISCONNECT_WALLET, json!({})).await;
        assert_eq!(card.title, "🔌 Disconnected");
    }

    #[tokio::test]
    async fn test_unsupported_action() {
        let dispatcher = dispatcher(headless_gateway());
        let result = dispatcher
            .dispatch(SessionId::default(), "teleport_funds", json!({}))
            .await;
        assert!(matches!(result, Err(DispatchError::UnknownAction(_))));
    }

    #[tokio::test]
    async fn test_connect_unregistered_chain() {
        let dispatcher = dispatcher(live_gateway(Arc::new(ScriptedWallet::default())));
        let card = call(&dispatcher, CONNECT_WALLET, json!({ "chain": "solana" })).await;
        assert_eq!(card.title, "❌ Wallet Connection Failed");
        assert!(dispatcher.sessions().is_empty());
    }

    #[test]
    fn test_explorer_override() {
        let config =
            Config::from_json(r#"{ "solana": { "explorer": "https://solscan.io/tx/" } }"#)
                .unwrap();
        let explorers = Explorers::from_config(&config);
        assert_eq!(
            explorers.tx_url(Chain::Solana, "abc"),
            "https://solscan.io/tx/abc"
        );
        assert_eq!(
            explorers.tx_url(Chain::Ethereum, "0x01"),
            "https://sepolia.etherscan.io/tx/0x01"
        );
        assert_eq!(provider_label(Some("COINBASE")), "Coinbase Wallet");
        assert_eq!(provider_label(Some("rabby")), "rabby");
    }
}
