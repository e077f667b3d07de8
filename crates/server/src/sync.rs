//! Bank sync trigger.
//!
//! The bank bridge is an external service: we ask it for a user's accounts
//! and store what comes back. The bridge may refuse with a cooldown answer
//! when asked too often; that is reported to the caller as is.

use api_types::sync::SyncResponse;
use axum::{Extension, Json, extract::State};
use engine::{AccountUpsert, Engine, SOURCE_BRIDGE, users};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::{ServerError, server::ServerState};

const API_KEY_HEADER: &str = "secret";

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("bank sync is not configured")]
    NotConfigured,
    #[error("invalid sync url: {0}")]
    InvalidUrl(String),
    #[error("sync request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("sync endpoint answered {status}: {body}")]
    Upstream { status: u16, body: String },
}

/// Result of a sync request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Accounts were refreshed.
    Synced { accounts: usize },
    /// The bridge asked to wait; nothing was stored.
    Cooldown { message: String },
}

impl From<SyncOutcome> for SyncResponse {
    fn from(value: SyncOutcome) -> Self {
        match value {
            SyncOutcome::Synced { accounts } => SyncResponse::Synced { accounts },
            SyncOutcome::Cooldown { message } => SyncResponse::Cooldown { message },
        }
    }
}

#[derive(Debug, Deserialize)]
struct BridgeOrg {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BridgeAccount {
    id: Option<String>,
    name: Option<String>,
    org: Option<BridgeOrg>,
    /// Sent either as a string or as a number.
    balance: Option<Value>,
    #[serde(rename = "balance-date")]
    balance_date: Option<i64>,
}

#[derive(Debug, PartialEq, Eq)]
enum BridgeReply {
    Cooldown { message: String },
    Accounts(Vec<AccountUpsert>),
}

fn balance_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Interprets a bridge answer. Accounts without an id or a balance are
/// skipped.
fn parse_reply(body: Value) -> Result<BridgeReply, SyncError> {
    if body.get("status").and_then(Value::as_str) == Some("cooldown") {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("sync is cooling down")
            .to_string();
        return Ok(BridgeReply::Cooldown { message });
    }

    let accounts = match body.get("accounts") {
        None | Some(Value::Null) => Vec::new(),
        Some(accounts) => Vec::<BridgeAccount>::deserialize(accounts).map_err(|err| {
            SyncError::Upstream {
                status: 200,
                body: format!("unexpected accounts payload: {err}"),
            }
        })?,
    };

    let accounts = accounts
        .into_iter()
        .filter_map(|account| {
            let id = account.id.filter(|id| !id.is_empty())?;
            let balance = account.balance.and_then(balance_string)?;
            Some(AccountUpsert {
                sf_account_id: Some(id),
                sf_account_name: account.name,
                sf_name: account.org.and_then(|org| org.name),
                balance,
                sf_balance_date: account.balance_date,
            })
        })
        .collect();

    Ok(BridgeReply::Accounts(accounts))
}

/// HTTP client for the bank bridge.
#[derive(Debug, Clone)]
pub struct SyncClient {
    url: Url,
    api_key: String,
    http: reqwest::Client,
}

impl SyncClient {
    pub fn new(url: &str, api_key: impl Into<String>) -> Result<Self, SyncError> {
        let url = Url::parse(url).map_err(|err| SyncError::InvalidUrl(err.to_string()))?;
        Ok(Self {
            url,
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        })
    }

    async fn fetch(&self, user_id: &str) -> Result<BridgeReply, SyncError> {
        let res = self
            .http
            .get(self.url.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("user_id", user_id)])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(SyncError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        parse_reply(res.json::<Value>().await?)
    }

    /// Ask the bridge for `user_id`'s accounts and store them.
    pub async fn sync(&self, engine: &Engine, user_id: &str) -> Result<SyncOutcome, ServerError> {
        match self.fetch(user_id).await? {
            BridgeReply::Cooldown { message } => {
                tracing::warn!("sync for {user_id} is cooling down: {message}");
                Ok(SyncOutcome::Cooldown { message })
            }
            BridgeReply::Accounts(accounts) => {
                let accounts = engine
                    .upsert_accounts(user_id, accounts, SOURCE_BRIDGE)
                    .await?;
                engine.record_sync(user_id).await?;
                tracing::info!("synced {accounts} accounts for {user_id}");
                Ok(SyncOutcome::Synced { accounts })
            }
        }
    }
}

pub async fn trigger(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<SyncResponse>, ServerError> {
    let client = state.sync.as_ref().ok_or(SyncError::NotConfigured)?;
    let outcome = client.sync(&state.engine, &user.username).await?;
    Ok(Json(outcome.into()))
}
