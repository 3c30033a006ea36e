// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # JSON-RPC Wallet Provider
//!
//! Talks EIP-1193 requests to a wallet that exposes them over HTTP
//! (desktop wallets such as Frame listen on `http://127.0.0.1:1248`).
//!
//! HTTP carries no push notifications, so [`JsonRpcWalletProvider::watch`]
//! polls `eth_accounts` / `eth_chainId` and broadcasts a [`WalletEvent`]
//! whenever either changes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::provider::{ProviderError, WalletEvent, WalletProvider};
use crate::blockchain::{parse_chain_id, AddChainParams};

/// Default interval between watcher polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Wallet prompts wait on a human; keep the transport timeout generous.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

const EVENT_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    #[serde(default)]
    message: String,
}

/// EIP-1193 provider over HTTP JSON-RPC.
pub struct JsonRpcWalletProvider {
    endpoint: String,
    http: Client,
    next_id: AtomicU64,
    events: broadcast::Sender<WalletEvent>,
    poll_interval: Duration,
}

impl JsonRpcWalletProvider {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Transport(format!("failed to build HTTP client: {e}")))?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            endpoint: endpoint.into(),
            http,
            next_id: AtomicU64::new(1),
            events,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ProviderError::Unavailable(format!("{}: {e}", self.endpoint))
                } else {
                    ProviderError::Transport(format!("{method} failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Transport(format!(
                "{method} returned {status}: {body}"
            )));
        }

        let envelope: RpcResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("{method} invalid JSON: {e}")))?;

        if let Some(error) = envelope.error {
            return Err(ProviderError::rpc(error.code, error.message));
        }

        serde_json::from_value(envelope.result.unwrap_or(Value::Null))
            .map_err(|e| ProviderError::InvalidResponse(format!("{method} unexpected result: {e}")))
    }

    /// Poll accounts and chain id until `shutdown` is cancelled, broadcasting
    /// changes to subscribers.
    ///
    /// ```rust,ignore
    /// tokio::spawn(provider.clone().watch(shutdown.clone()));
    /// ```
    pub async fn watch(self: Arc<Self>, shutdown: CancellationToken) {
        info!(
            endpoint = %self.endpoint,
            interval_ms = self.poll_interval.as_millis() as u64,
            "Wallet watcher starting"
        );

        let mut last = Observed::default();
        loop {
            if shutdown.is_cancelled() {
                info!("Wallet watcher shutting down");
                return;
            }

            self.poll_step(&mut last).await;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Wallet watcher shutting down");
                    return;
                }
            }
        }
    }

    async fn poll_step(&self, last: &mut Observed) {
        match self.accounts().await {
            Ok(accounts) => {
                if last.accounts.as_ref().is_some_and(|prev| prev != &accounts) {
                    debug!(count = accounts.len(), "Wallet accounts changed");
                    let _ = self.events.send(WalletEvent::AccountsChanged(accounts.clone()));
                }
                last.accounts = Some(accounts);
            }
            Err(e) => warn!(error = %e, "Wallet watcher: eth_accounts failed"),
        }

        match self.chain_id().await {
            Ok(chain_id) => {
                if last.chain_id.is_some_and(|prev| prev != chain_id) {
                    debug!(chain_id, "Wallet chain changed");
                    let _ = self.events.send(WalletEvent::ChainChanged(chain_id));
                }
                last.chain_id = Some(chain_id);
            }
            Err(e) => warn!(error = %e, "Wallet watcher: eth_chainId failed"),
        }
    }
}

/// Last values seen by the watcher. The first poll only sets the baseline.
#[derive(Default)]
struct Observed {
    accounts: Option<Vec<String>>,
    chain_id: Option<u64>,
}

#[async_trait]
impl WalletProvider for JsonRpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.call("eth_requestAccounts", json!([])).await
    }

    async fn accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.call("eth_accounts", json!([])).await
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        let raw: String = self.call("eth_chainId", json!([])).await?;
        parse_chain_id(&raw).map_err(ProviderError::InvalidResponse)
    }

    async fn switch_chain(&self, chain_id_hex: &str) -> Result<(), ProviderError> {
        let _: Value = self
            .call(
                "wallet_switchEthereumChain",
                json!([{ "chainId": chain_id_hex }]),
            )
            .await?;
        Ok(())
    }

    async fn add_chain(&self, params: &AddChainParams) -> Result<(), ProviderError> {
        let _: Value = self.call("wallet_addEthereumChain", json!([params])).await?;
        Ok(())
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<WalletEvent>> {
        Some(self.events.subscribe())
    }
}
