//! Named action registry.
//!
//! [`ActionDispatcher::dispatch`] resolves the action name first, validates the body into
//! [`ActionParams`] second, and only then runs the handler. Unknown names never reach a
//! handler.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::instrument;

use crate::card::Card;
use crate::chain::WalletError;
use crate::params::ActionParams;
use crate::session::{SessionId, SessionStore, WalletSession};

/// What a handler sees of the calling session.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub session: SessionId,
    sessions: SessionStore,
}

impl ActionContext {
    pub fn new(session: SessionId, sessions: SessionStore) -> Self {
        Self { session, sessions }
    }

    pub fn wallet(&self) -> Option<WalletSession> {
        self.sessions.get(&self.session)
    }

    pub fn set_wallet(&self, wallet: WalletSession) -> Option<WalletSession> {
        self.sessions.connect(&self.session, wallet)
    }

    pub fn clear_wallet(&self) -> Option<WalletSession> {
        self.sessions.disconnect(&self.session)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("handler for {expected} received parameters of another action")]
    UnexpectedParams { expected: &'static str },
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn handle(&self, cx: &ActionContext, params: ActionParams) -> Result<Card, HandlerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("No handler for {0}")]
    UnknownAction(String),
    #[error("Invalid parameters for {action}: {source}")]
    InvalidParams {
        action: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Action {action} failed: {source}")]
    Handler {
        action: String,
        #[source]
        source: HandlerError,
    },
}

#[derive(Clone, Default)]
pub struct ActionDispatcher {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
    sessions: SessionStore,
}

impl Debug for ActionDispatcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut actions: Vec<&String> = self.handlers.keys().collect();
        actions.sort();
        f.debug_struct("ActionDispatcher")
            .field("actions", &actions)
            .field("sessions", &self.sessions.len())
            .finish()
    }
}

impl ActionDispatcher {
    pub fn new(sessions: SessionStore) -> Self {
        Self {
            handlers: HashMap::new(),
            sessions,
        }
    }

    /// Registers `handler` under `name`. A later registration for the same name replaces
    /// the earlier one, which is returned.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn ActionHandler>,
    ) -> Option<Arc<dyn ActionHandler>> {
        let name = name.into();
        let previous = self.handlers.insert(name.clone(), handler);
        if previous.is_some() {
            tracing::debug!(action = name, "Replaced action handler");
        }
        previous
    }

    pub fn and_register(
        mut self,
        name: impl Into<String>,
        handler: Arc<dyn ActionHandler>,
    ) -> Self {
        self.register(name, handler);
        self
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[instrument(skip_all, fields(action = name, session = %session))]
    pub async fn dispatch(
        &self,
        session: SessionId,
        name: &str,
        body: Value,
    ) -> Result<Card, DispatchError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| DispatchError::UnknownAction(name.to_string()))?;
        let params =
            ActionParams::parse(name, body).map_err(|source| DispatchError::InvalidParams {
                action: name.to_string(),
                source,
            })?;
        let cx = ActionContext::new(session, self.sessions.clone());
        handler
            .handle(&cx, params)
            .await
            .map_err(|source| DispatchError::Handler {
                action: name.to_string(),
                source,
            })
    }
}
