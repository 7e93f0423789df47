//! Per-session wallet state.
//!
//! Each session holds at most one connected wallet. Sessions are isolated from each other;
//! within one session, concurrent `connect_wallet` and `disconnect_wallet` calls race on the
//! same slot and the last writer wins.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::chain::{Chain, ConnectResult};

/// Identifies a caller's session. Hosts that do not send one share [`SessionId::default`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self("default".to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The connected wallet of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSession {
    pub chain: Chain,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    pub simulated: bool,
}

impl WalletSession {
    pub fn from_connect(chain: Chain, result: &ConnectResult) -> Self {
        Self {
            chain,
            address: result.address.clone(),
            network: result.network.clone(),
            simulated: result.simulated,
        }
    }
}

/// In-memory session slots. Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct SessionStore(Arc<DashMap<SessionId, WalletSession>>);

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, session: &SessionId) -> Option<WalletSession> {
        self.0.get(session).map(|entry| entry.value().clone())
    }

    /// Sets the slot, returning the wallet it replaced.
    pub fn connect(&self, session: &SessionId, wallet: WalletSession) -> Option<WalletSession> {
        self.0.insert(session.clone(), wallet)
    }

    /// Clears the slot. Clearing an empty slot is a no-op.
    pub fn disconnect(&self, session: &SessionId) -> Option<WalletSession> {
        self.0.remove(session).map(|(_, wallet)| wallet)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
