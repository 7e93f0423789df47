//! Solana connector.
//!
//! The wallet provider holds an unlocked keypair: connect reports its public key and
//! cluster, send builds a system transfer as a v0 message, signs it and submits it over
//! the cluster's JSON-RPC.

use async_trait::async_trait;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_instruction::Instruction;
use solana_keypair::Keypair;
use solana_message::VersionedMessage;
use solana_message::v0::Message as MessageV0;
use solana_pubkey::{Pubkey, pubkey};
use solana_signature::Signature;
use solana_signer::Signer;
use solana_system_interface::instruction as system_instruction;
use solana_transaction::versioned::VersionedTransaction;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::chain::{
    Chain, ChainConnector, ProviderOutcome, WalletAccount, WalletContext, WalletError,
    with_timeout,
};
use crate::networks::SolanaCluster;
use crate::util::{NativeAmount, sol_to_lamports};

/// The system program; doubles as the placeholder account when no signer is reachable.
pub const SYSTEM_PROGRAM_ID: Pubkey = pubkey!("11111111111111111111111111111111");

pub const PLACEHOLDER_ADDRESS: &str = "11111111111111111111111111111111";

/// Operations the Solana connector needs from a wallet provider.
#[async_trait]
pub trait SolanaWalletProvider: Send + Sync {
    /// Requests account access and returns the wallet's public key.
    async fn connect(&self) -> Result<Pubkey, WalletError>;
    fn cluster(&self) -> SolanaCluster;
    /// Builds, signs and submits a system transfer; returns the transaction signature.
    async fn sign_and_send(&self, to: Pubkey, lamports: u64) -> Result<Signature, WalletError>;
}

pub fn parse_address(address: &str) -> Result<Pubkey, WalletError> {
    Pubkey::from_str(address).map_err(|e| WalletError::invalid_address(address, e))
}

/// System program `Transfer` of `lamports` from `from` to `to`.
pub fn system_transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> Instruction {
    system_instruction::transfer(from, to, lamports)
}

pub fn classify_client_error(error: ClientError) -> WalletError {
    let message = error.to_string();
    let lowercase = message.to_lowercase();
    if lowercase.contains("insufficient") || lowercase.contains("no record of a prior credit") {
        return WalletError::InsufficientFunds(message);
    }
    match &*error.kind {
        ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_) => {
            WalletError::ProviderUnavailable(message)
        }
        _ => WalletError::Provider(message),
    }
}

/// A base58-encoded 64-byte keypair (secret key followed by public key).
#[derive(Clone, PartialEq, Eq)]
pub struct SolanaSignerKey([u8; 64]);

impl SolanaSignerKey {
    pub fn to_keypair(&self) -> Result<Keypair, String> {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&self.0[..32]);
        let keypair = Keypair::new_from_array(secret);
        if keypair.pubkey().to_bytes()[..] != self.0[32..] {
            return Err("public key half does not match the secret key".to_string());
        }
        Ok(keypair)
    }
}

impl FromStr for SolanaSignerKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| format!("Invalid base58: {e}"))?;
        let bytes: [u8; 64] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| format!("Keypair must be 64 bytes, got {} bytes", v.len()))?;
        Ok(Self(bytes))
    }
}

impl Debug for SolanaSignerKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SolanaSignerKey(<redacted>)")
    }
}

impl Display for SolanaSignerKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("<redacted>")
    }
}

/// [`SolanaWalletProvider`] holding an unlocked keypair and submitting through cluster RPC.
pub struct SolanaRpcWallet {
    keypair: Arc<Keypair>,
    rpc_client: Arc<RpcClient>,
    cluster: SolanaCluster,
}

impl Debug for SolanaRpcWallet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaRpcWallet")
            .field("pubkey", &self.keypair.pubkey())
            .field("cluster", &self.cluster)
            .field("rpc_url", &self.rpc_client.url())
            .finish()
    }
}

impl SolanaRpcWallet {
    pub fn new(keypair: Keypair, rpc_url: String, cluster: SolanaCluster) -> Self {
        tracing::info!(
            pubkey = %keypair.pubkey(),
            %cluster,
            rpc = rpc_url,
            "Using Solana wallet provider"
        );
        Self {
            keypair: Arc::new(keypair),
            rpc_client: Arc::new(RpcClient::new(rpc_url)),
            cluster,
        }
    }
}

#[async_trait]
impl SolanaWalletProvider for SolanaRpcWallet {
    async fn connect(&self) -> Result<Pubkey, WalletError> {
        Ok(self.keypair.pubkey())
    }

    fn cluster(&self) -> SolanaCluster {
        self.cluster
    }

    async fn sign_and_send(&self, to: Pubkey, lamports: u64) -> Result<Signature, WalletError> {
        let from = self.keypair.pubkey();
        let recent_blockhash = self
            .rpc_client
            .get_latest_blockhash()
            .await
            .map_err(classify_client_error)?;
        let message = MessageV0::try_compile(
            &from,
            &[system_transfer(&from, &to, lamports)],
            &[],
            recent_blockhash,
        )
        .map_err(|e| WalletError::Provider(format!("{e:?}")))?;
        let message = VersionedMessage::V0(message);
        let signature = self
            .keypair
            .try_sign_message(&message.serialize())
            .map_err(|e| WalletError::Provider(e.to_string()))?;
        let tx = VersionedTransaction {
            signatures: vec![signature],
            message,
        };
        self.rpc_client
            .send_transaction(&tx)
            .await
            .map_err(classify_client_error)
    }
}

pub struct SolanaConnector {
    context: WalletContext<Arc<dyn SolanaWalletProvider>>,
    timeout: Duration,
}

impl SolanaConnector {
    pub fn new(context: WalletContext<Arc<dyn SolanaWalletProvider>>, timeout: Duration) -> Self {
        Self { context, timeout }
    }

    async fn connect_live(&self) -> Result<Option<WalletAccount>, WalletError> {
        let Some(provider) = self.context.provider()? else {
            return Ok(None);
        };
        let pubkey = with_timeout(self.timeout, provider.connect()).await?;
        Ok(Some(WalletAccount {
            address: pubkey.to_string(),
            network: provider.cluster().to_string(),
        }))
    }

    async fn send_live(
        &self,
        to: &str,
        amount: &NativeAmount,
    ) -> Result<Option<String>, WalletError> {
        let to = parse_address(to)?;
        let lamports = sol_to_lamports(amount)?;
        let Some(provider) = self.context.provider()? else {
            return Ok(None);
        };
        let signature = with_timeout(self.timeout, provider.sign_and_send(to, lamports)).await?;
        tracing::info!(%to, %amount, %signature, "Sent SOL transfer");
        Ok(Some(signature.to_string()))
    }
}

#[async_trait]
impl ChainConnector for SolanaConnector {
    fn chain(&self) -> Chain {
        Chain::Solana
    }

    async fn try_connect(&self) -> ProviderOutcome<WalletAccount> {
        self.connect_live().await.into()
    }

    async fn try_send(&self, to: &str, amount: &NativeAmount) -> ProviderOutcome<String> {
        self.send_live(to, amount).await.into()
    }
}
