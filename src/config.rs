//! Configuration for the wallet action server.
//!
//! Loaded from a JSON file given by `--config` (or `$CONFIG`), falling back to defaults
//! when the file does not exist. String values may reference environment variables, see
//! [`LiteralOrEnv`].
//!
//! ```json
//! {
//!   "port": 4000,
//!   "mode": "interactive",
//!   "ethereum": { "rpc": "$ETH_RPC_URL" },
//!   "solana": { "cluster": "devnet", "signer": "$SOLANA_WALLET_KEY" }
//! }
//! ```

use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::chain::solana::SolanaSignerKey;
use crate::networks::SolanaCluster;
use crate::util::LiteralOrEnv;

#[derive(Parser, Debug)]
#[command(name = "firstember-wallet")]
#[command(about = "Wallet connect and send actions for chat hosts")]
struct CliArgs {
    /// Path to the JSON configuration file
    #[arg(long, short, env = "CONFIG", default_value = "config.json")]
    config: PathBuf,
}

/// Whether connectors may reach a wallet provider at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletMode {
    /// No wallet-capable context; every connect and send is simulated.
    #[default]
    Headless,
    /// Connectors talk to the configured providers.
    Interactive,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "config_defaults::default_port")]
    port: u16,
    #[serde(default = "config_defaults::default_host")]
    host: IpAddr,
    #[serde(default = "config_defaults::default_manifest")]
    manifest: PathBuf,
    #[serde(default = "config_defaults::default_openapi")]
    openapi: PathBuf,
    #[serde(default)]
    mode: WalletMode,
    #[serde(default = "config_defaults::default_provider_timeout_secs")]
    provider_timeout_secs: u64,
    #[serde(default)]
    ethereum: Option<EthereumConfig>,
    #[serde(default)]
    solana: Option<SolanaConfig>,
}

/// EVM wallet provider: a JSON-RPC endpoint holding unlocked accounts.
#[derive(Debug, Clone, Deserialize)]
pub struct EthereumConfig {
    pub rpc: LiteralOrEnv<Url>,
    /// Transaction explorer base URL; the hash is appended.
    #[serde(default)]
    pub explorer: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolanaConfig {
    #[serde(default)]
    pub cluster: SolanaCluster,
    /// Overrides the public RPC endpoint of `cluster`.
    #[serde(default)]
    pub rpc: Option<LiteralOrEnv<Url>>,
    #[serde(default)]
    pub signer: Option<LiteralOrEnv<SolanaSignerKey>>,
    #[serde(default)]
    pub explorer: Option<String>,
}

impl SolanaConfig {
    pub fn rpc_url(&self) -> String {
        match &self.rpc {
            Some(rpc) => rpc.inner().to_string(),
            None => self.cluster.rpc_url().to_string(),
        }
    }
}

pub mod config_defaults {
    use std::env;
    use std::net::{IpAddr, Ipv4Addr};
    use std::path::PathBuf;

    pub const DEFAULT_PORT: u16 = 4000;
    pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
    pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

    /// `$PORT`, then 4000.
    pub fn default_port() -> u16 {
        env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT)
    }

    /// `$HOST`, then 0.0.0.0.
    pub fn default_host() -> IpAddr {
        env::var("HOST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_HOST)
    }

    pub fn default_manifest() -> PathBuf {
        PathBuf::from("openai-app.json")
    }

    pub fn default_openapi() -> PathBuf {
        PathBuf::from("openapi.json")
    }

    pub fn default_provider_timeout_secs() -> u64 {
        DEFAULT_PROVIDER_TIMEOUT_SECS
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {0}: {1}")]
    FileRead(PathBuf, std::io::Error),
    #[error("Failed to parse config file: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("provider_timeout_secs must be greater than zero")]
    ZeroTimeout,
}

impl Config {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn host(&self) -> IpAddr {
        self.host
    }

    /// Path of the app manifest served at `/openai-app.json`.
    pub fn manifest(&self) -> &Path {
        &self.manifest
    }

    /// Path of the OpenAPI document served at `/openapi.json`.
    pub fn openapi(&self) -> &Path {
        &self.openapi
    }

    pub fn mode(&self) -> WalletMode {
        self.mode
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn ethereum(&self) -> Option<&EthereumConfig> {
        self.ethereum.as_ref()
    }

    pub fn solana(&self) -> Option<&SolanaConfig> {
        self.solana.as_ref()
    }

    /// Loads the file named on the command line, or defaults if it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let cli_args = CliArgs::parse();
        if !cli_args.config.exists() {
            tracing::info!(
                path = %cli_args.config.display(),
                "Config file not found, using defaults"
            );
            return Self::from_json("{}");
        }
        Self::load_from_path(&cli_args.config)
    }

    fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(content)?;
        if config.provider_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.mode(), WalletMode::Headless);
        assert_eq!(config.manifest(), Path::new("openai-app.json"));
        assert_eq!(config.openapi(), Path::new("openapi.json"));
        assert_eq!(config.provider_timeout(), Duration::from_secs(30));
        assert!(config.ethereum().is_none());
        assert!(config.solana().is_none());
    }

    #[test]
    fn test_interactive_chains() {
        let config = Config::from_json(
            r#"{
                "port": 4100,
                "mode": "interactive",
                "provider_timeout_secs": 5,
                "ethereum": { "rpc": "http://localhost:8545" },
                "solana": { "cluster": "devnet" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.port(), 4100);
        assert_eq!(config.mode(), WalletMode::Interactive);
        assert_eq!(config.provider_timeout(), Duration::from_secs(5));
        let ethereum = config.ethereum().unwrap();
        assert_eq!(ethereum.rpc.as_str(), "http://localhost:8545/");
        let solana = config.solana().unwrap();
        assert_eq!(solana.cluster, SolanaCluster::Devnet);
        assert_eq!(solana.rpc_url(), "https://api.devnet.solana.com");
        assert!(solana.signer.is_none());
    }

    #[test]
    fn test_rpc_from_env() {
        // SAFETY: the variable is unique to this test and only read here
        unsafe {
            std::env::set_var("FIRSTEMBER_TEST_ETH_RPC", "http://127.0.0.1:9545");
        }
        let config =
            Config::from_json(r#"{ "ethereum": { "rpc": "$FIRSTEMBER_TEST_ETH_RPC" } }"#).unwrap();
        assert_eq!(
            config.ethereum().unwrap().rpc.as_str(),
            "http://127.0.0.1:9545/"
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Config::from_json(r#"{ "mode": "browser" }"#),
            Err(ConfigError::JsonParse(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{ "provider_timeout_secs": 0 }"#),
            Err(ConfigError::ZeroTimeout)
        ));
        assert!(matches!(
            Config::from_json(r#"{ "solana": { "signer": "not-a-key" } }"#),
            Err(ConfigError::JsonParse(_))
        ));
    }
}
