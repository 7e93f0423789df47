//! Wallet connect and send actions for chat hosts.
//!
//! A host calls named actions (`show_wallets`, `connect_wallet`, `disconnect_wallet`,
//! `send_prompt`, `confirm_send`) and renders the declarative cards they return. Behind the
//! actions sits a multi-chain wallet abstraction for Ethereum-compatible chains and Solana
//! that falls back to simulated results whenever no live wallet provider is reachable.
//!
//! # Modules
//!
//! - [`actions`] - The wallet action handlers and the cards they produce.
//! - [`card`] - Declarative UI payloads (`ui.card`, `ui.button`, tables, images, layouts).
//! - [`chain`] - Per-chain connectors for EIP-155 chains and Solana.
//! - [`config`] - Server configuration loaded from JSON and environment variables.
//! - [`dispatcher`] - Registry of named actions and the per-session context they run in.
//! - [`gateway`] - Routes connect and send calls to the connector of a chain.
//! - [`handlers`] - HTTP endpoints: manifest, OpenAPI document, `/call`.
//! - [`networks`] - Well-known EVM networks, Solana clusters, and explorers.
//! - [`params`] - Typed action parameters.
//! - [`session`] - Per-session connected wallet slots.
//! - [`util`] - Amounts, config helpers, telemetry, and signal handling.

pub mod actions;
pub mod card;
pub mod chain;
pub mod config;
pub mod dispatcher;
pub mod gateway;
pub mod handlers;
pub mod networks;
pub mod params;
pub mod session;
pub mod util;
