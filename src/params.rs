//! Typed parameters for each action, validated before any handler runs.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::chain::Chain;

pub const SHOW_WALLETS: &str = "show_wallets";
pub const CONNECT_WALLET: &str = "connect_wallet";
pub const DISCONNECT_WALLET: &str = "disconnect_wallet";
pub const SEND_PROMPT: &str = "send_prompt";
pub const CONFIRM_SEND: &str = "confirm_send";
/// Client-side action carried by explorer buttons; never dispatched here.
pub const OPEN_URL: &str = "open_url";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectWalletParams {
    #[serde(default)]
    pub chain: Option<Chain>,
    /// Display label only; it does not select a connector.
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SendPromptParams {
    #[serde(default)]
    pub chain: Option<Chain>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfirmSendParams {
    #[serde(default)]
    pub chain: Option<Chain>,
    pub to: String,
    /// Positive decimal in the chain's native unit.
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionParams {
    ShowWallets,
    ConnectWallet(ConnectWalletParams),
    DisconnectWallet,
    SendPrompt(SendPromptParams),
    ConfirmSend(ConfirmSendParams),
    /// Parameters of an action this crate does not define.
    Custom(Value),
}

impl ActionParams {
    /// Parses the request body for `action`.
    ///
    /// Buttons post their parameters under `data`; when the body has a `data` object, that
    /// object is used, otherwise the body itself. An absent body means no parameters.
    pub fn parse(action: &str, body: Value) -> Result<Self, serde_json::Error> {
        let payload = Self::payload(body);
        let params = match action {
            SHOW_WALLETS => ActionParams::ShowWallets,
            CONNECT_WALLET => ActionParams::ConnectWallet(serde_json::from_value(payload)?),
            DISCONNECT_WALLET => ActionParams::DisconnectWallet,
            SEND_PROMPT => ActionParams::SendPrompt(serde_json::from_value(payload)?),
            CONFIRM_SEND => ActionParams::ConfirmSend(serde_json::from_value(payload)?),
            _ => ActionParams::Custom(payload),
        };
        Ok(params)
    }

    fn payload(body: Value) -> Value {
        match body {
            Value::Null => Value::Object(Map::new()),
            Value::Object(mut map) => match map.remove("data") {
                Some(data @ Value::Object(_)) => data,
                Some(other) => {
                    map.insert("data".to_string(), other);
                    Value::Object(map)
                }
                None => Value::Object(map),
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reads_data_envelope() {
        let params = ActionParams::parse(
            CONNECT_WALLET,
            json!({ "data": { "chain": "solana", "provider": "phantom" } }),
        )
        .unwrap();
        assert_eq!(
            params,
            ActionParams::ConnectWallet(ConnectWalletParams {
                chain: Some(Chain::Solana),
                provider: Some("phantom".to_string()),
            })
        );
    }

    #[test]
    fn test_reads_flat_body_and_null() {
        let params = ActionParams::parse(
            CONFIRM_SEND,
            json!({ "to": "0xabc", "amount": "0.01" }),
        )
        .unwrap();
        assert_eq!(
            params,
            ActionParams::ConfirmSend(ConfirmSendParams {
                chain: None,
                to: "0xabc".to_string(),
                amount: "0.01".to_string(),
            })
        );
        assert_eq!(
            ActionParams::parse(SEND_PROMPT, Value::Null).unwrap(),
            ActionParams::SendPrompt(SendPromptParams::default())
        );
    }

    #[test]
    fn test_rejects_bad_params() {
        assert!(ActionParams::parse(CONFIRM_SEND, json!({ "amount": "0.01" })).is_err());
        assert!(ActionParams::parse(CONNECT_WALLET, json!({ "chain": "bitcoin" })).is_err());
        assert!(ActionParams::parse(CONFIRM_SEND, json!({ "to": "x", "amount": 1 })).is_err());
    }

    #[test]
    fn test_custom_action_keeps_payload() {
        let params = ActionParams::parse("ping", json!({ "data": { "n": 1 } })).unwrap();
        assert_eq!(params, ActionParams::Custom(json!({ "n": 1 })));
    }
}
