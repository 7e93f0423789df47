//! HTTP endpoints.
//!
//! - `GET /openai-app.json` - the app manifest, read from the configured path
//! - `GET /openapi.json` - the OpenAPI document, read from the configured path
//! - `POST /call?action=<name>` - runs an action; the JSON body carries its parameters
//!
//! `/call` always answers with an envelope: `{"ok": true, "result": <card>}` or
//! `{"ok": false, "error": "<message>"}`. The caller's session is taken from the
//! `x-session-id` header. Calls without the header (or with a blank one) all land in the
//! shared `"default"` session, which keeps single-user hosts working; multi-user hosts must
//! send the header.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

use crate::card::Card;
use crate::dispatcher::{ActionDispatcher, DispatchError};
use crate::session::SessionId;

pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Debug, Clone)]
pub struct AppState {
    dispatcher: Arc<ActionDispatcher>,
    manifest: Arc<PathBuf>,
    openapi: Arc<PathBuf>,
}

impl AppState {
    pub fn new(dispatcher: ActionDispatcher, manifest: PathBuf, openapi: PathBuf) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            manifest: Arc::new(manifest),
            openapi: Arc::new(openapi),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/openai-app.json", get(get_manifest))
        .route("/openapi.json", get(get_openapi))
        .route("/call", post(post_call))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CallResponse {
    Ok { ok: bool, result: Card },
    Err { ok: bool, error: String },
}

impl CallResponse {
    fn success(result: Card) -> Self {
        CallResponse::Ok { ok: true, result }
    }

    fn failure(error: impl ToString) -> Self {
        CallResponse::Err {
            ok: false,
            error: error.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CallQuery {
    #[serde(default)]
    action: String,
}

async fn read_json_document(path: &Path) -> Response {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "Document not readable");
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("{} not found", path.display()),
                }),
            )
                .into_response();
        }
    };
    match serde_json::from_str::<Value>(&content) {
        Ok(document) => (StatusCode::OK, Json(document)).into_response(),
        Err(error) => {
            tracing::error!(path = %path.display(), %error, "Document is not valid JSON");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("{} is not valid JSON", path.display()),
                }),
            )
                .into_response()
        }
    }
}

/// `GET /openai-app.json`: the app manifest.
#[instrument(skip_all)]
pub async fn get_manifest(State(state): State<AppState>) -> impl IntoResponse {
    read_json_document(&state.manifest).await
}

/// `GET /openapi.json`: the OpenAPI document describing `/call`.
#[instrument(skip_all)]
pub async fn get_openapi(State(state): State<AppState>) -> impl IntoResponse {
    read_json_document(&state.openapi).await
}

fn session_id(headers: &HeaderMap) -> SessionId {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(SessionId::new)
        .unwrap_or_default()
}

/// `POST /call?action=<name>`: dispatches `name` with the request body as parameters.
///
/// Unknown actions and handler failures answer 500, malformed parameters 400. Without an
/// `x-session-id` header the call uses the shared default session.
#[instrument(skip_all, fields(action = %query.action))]
pub async fn post_call(
    State(state): State<AppState>,
    Query(query): Query<CallQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let body = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(body) => body,
            Err(error) => {
                tracing::warn!(%error, "Request body is not JSON");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(CallResponse::failure(format!("Invalid JSON body: {error}"))),
                );
            }
        }
    };
    let session = session_id(&headers);
    match state.dispatcher.dispatch(session, &query.action, body).await {
        Ok(card) => (StatusCode::OK, Json(CallResponse::success(card))),
        Err(error) => {
            let status = match &error {
                DispatchError::InvalidParams { .. } => StatusCode::BAD_REQUEST,
                DispatchError::UnknownAction(_) | DispatchError::Handler { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            tracing::warn!(error = ?error, "Action failed");
            (status, Json(CallResponse::failure(error)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{Explorers, register_wallet_actions};
    use crate::chain::eip155::Eip155Connector;
    use crate::chain::solana::SolanaConnector;
    use crate::chain::WalletContext;
    use crate::gateway::WalletGateway;
    use crate::session::SessionStore;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(manifest: PathBuf) -> Router {
        let gateway = Arc::new(
            WalletGateway::new()
                .and_register(Arc::new(Eip155Connector::new(
                    WalletContext::Headless,
                    Duration::from_secs(1),
                )))
                .and_register(Arc::new(SolanaConnector::new(
                    WalletContext::Headless,
                    Duration::from_secs(1),
                ))),
        );
        let dispatcher = register_wallet_actions(
            ActionDispatcher::new(SessionStore::new()),
            gateway,
            Explorers::default(),
        );
        routes().with_state(AppState::new(
            dispatcher,
            manifest,
            PathBuf::from("does-not-exist/openapi.json"),
        ))
    }

    fn call(action: &str, session: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/call?action={action}"))
            .header("content-type", "application/json")
            .header(SESSION_HEADER, session)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_action_is_a_server_error() {
        let response = app(PathBuf::new())
            .oneshot(call("teleport_funds", "s1", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "No handler for teleport_funds");
    }

    #[tokio::test]
    async fn test_invalid_params_are_a_bad_request() {
        let response = app(PathBuf::new())
            .oneshot(call("confirm_send", "s1", json!({ "data": { "amount": "1" } })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["ok"], false);
    }

    #[tokio::test]
    async fn test_sessions_follow_header() {
        let app = app(PathBuf::new());
        let response = app
            .clone()
            .oneshot(call(
                "connect_wallet",
                "alice",
                json!({ "data": { "chain": "solana" } }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["result"]["type"], "ui.card");

        let alice = json_body(
            app.clone()
                .oneshot(call("send_prompt", "alice", json!({})))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(alice["result"]["title"], "💸 Send SOL");

        let bob = json_body(
            app.oneshot(call("send_prompt", "bob", json!({})))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(bob["result"]["title"], "❌ No Wallet Connected");
    }

    #[tokio::test]
    async fn test_missing_session_header_shares_default_session() {
        let app = app(PathBuf::new());
        let request = Request::builder()
            .method("POST")
            .uri("/call?action=connect_wallet")
            .body(Body::from(r#"{ "chain": "solana" }"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let blank = json_body(
            app.clone()
                .oneshot(call("send_prompt", "  ", json!({})))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(blank["result"]["title"], "💸 Send SOL");

        let named = json_body(
            app.oneshot(call("send_prompt", "carol", json!({})))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(named["result"]["title"], "❌ No Wallet Connected");
    }

    #[tokio::test]
    async fn test_empty_body_means_no_params() {
        let request = Request::builder()
            .method("POST")
            .uri("/call?action=show_wallets")
            .body(Body::empty())
            .unwrap();
        let response = app(PathBuf::new()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["result"]["blocks"][0]["type"], "wallet_row");
    }

    #[tokio::test]
    async fn test_documents() {
        let manifest = std::env::temp_dir().join(format!(
            "firstember-manifest-{}.json",
            std::process::id()
        ));
        std::fs::write(&manifest, r#"{ "name": "Firstember Wallet" }"#).unwrap();
        let app = app(manifest.clone());

        let request = Request::builder()
            .uri("/openai-app.json")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["name"], "Firstember Wallet");

        let request = Request::builder()
            .uri("/openapi.json")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        std::fs::remove_file(manifest).unwrap();
    }
}
