//! Well-known networks, used to name the network a wallet is connected to and to link
//! transactions to a block explorer.
//!
//! - [`KNOWN_EIP155_NETWORKS`]: EVM chain ids with the names wallets report for them
//! - [`eip155_network_name`]: chain id to network name, `"unknown"` otherwise
//! - [`SolanaCluster`]: the public Solana clusters and their RPC endpoints
//! - [`default_explorer`]: transaction explorer base URL per chain

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::chain::Chain;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eip155NetworkInfo {
    pub chain_id: u64,
    pub name: &'static str,
}

pub static KNOWN_EIP155_NETWORKS: &[Eip155NetworkInfo] = &[
    Eip155NetworkInfo {
        chain_id: 1,
        name: "mainnet",
    },
    Eip155NetworkInfo {
        chain_id: 11155111,
        name: "sepolia",
    },
    Eip155NetworkInfo {
        chain_id: 17000,
        name: "holesky",
    },
    Eip155NetworkInfo {
        chain_id: 10,
        name: "optimism",
    },
    Eip155NetworkInfo {
        chain_id: 137,
        name: "matic",
    },
    Eip155NetworkInfo {
        chain_id: 8453,
        name: "base",
    },
    Eip155NetworkInfo {
        chain_id: 84532,
        name: "base-sepolia",
    },
    Eip155NetworkInfo {
        chain_id: 42161,
        name: "arbitrum",
    },
    Eip155NetworkInfo {
        chain_id: 31337,
        name: "anvil",
    },
];

/// Network name for an EVM chain id, `"unknown"` when not in [`KNOWN_EIP155_NETWORKS`].
pub fn eip155_network_name(chain_id: u64) -> &'static str {
    KNOWN_EIP155_NETWORKS
        .iter()
        .find(|network| network.chain_id == chain_id)
        .map(|network| network.name)
        .unwrap_or("unknown")
}

/// Public Solana clusters, named as in configuration (`"mainnet-beta"`, `"devnet"`, `"testnet"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolanaCluster {
    /// Solana mainnet (`mainnet-beta`).
    MainnetBeta,
    /// Solana devnet; airdrops available.
    Devnet,
    /// Solana testnet, used for validator releases.
    Testnet,
}

impl SolanaCluster {
    pub fn rpc_url(&self) -> &'static str {
        match self {
            SolanaCluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
            SolanaCluster::Devnet => "https://api.devnet.solana.com",
            SolanaCluster::Testnet => "https://api.testnet.solana.com",
        }
    }
}

impl Default for SolanaCluster {
    fn default() -> Self {
        SolanaCluster::MainnetBeta
    }
}

impl fmt::Display for SolanaCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", json.trim_matches('"'))
    }
}

/// Transaction explorer base; the hash is appended.
pub fn default_explorer(chain: Chain) -> &'static str {
    match chain {
        Chain::Ethereum => "https://sepolia.etherscan.io/tx/",
        Chain::Solana => "https://explorer.solana.com/tx/",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eip155_network_name() {
        assert_eq!(eip155_network_name(1), "mainnet");
        assert_eq!(eip155_network_name(11155111), "sepolia");
        assert_eq!(eip155_network_name(999999), "unknown");
    }

    #[test]
    fn test_solana_cluster_names() {
        assert_eq!(SolanaCluster::MainnetBeta.to_string(), "mainnet-beta");
        assert_eq!(
            serde_json::from_str::<SolanaCluster>(r#""devnet""#).unwrap(),
            SolanaCluster::Devnet
        );
        assert!(serde_json::from_str::<SolanaCluster>(r#""localnet""#).is_err());
    }
}
