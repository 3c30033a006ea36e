// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scriptable wallets for tests: an in-memory [`MockWallet`] and a JSON-RPC
//! wallet served over loopback HTTP.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Notify};

use super::provider::{
    ProviderError, WalletEvent, WalletProvider, UNRECOGNIZED_CHAIN_CODE, USER_REJECTED_CODE,
};
use crate::blockchain::{parse_chain_id, AddChainParams};

pub const ACCOUNT: &str = "0xABCD000000000000000000000000000000001234";

pub struct MockWallet {
    accounts: Mutex<Result<Vec<String>, ProviderError>>,
    chain_id: Mutex<u64>,
    known_chains: Mutex<HashSet<u64>>,
    switch_error: Mutex<Option<ProviderError>>,
    add_error: Mutex<Option<ProviderError>>,
    switch_is_ignored: Mutex<bool>,
    switch_gate: Mutex<Option<Arc<Notify>>>,
    added: Mutex<Vec<AddChainParams>>,
    calls: Mutex<Vec<String>>,
    events: broadcast::Sender<WalletEvent>,
}

impl MockWallet {
    /// Wallet holding [`ACCOUNT`], active on `chain_id`, knowing only that chain.
    pub fn on_chain(chain_id: u64) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            accounts: Mutex::new(Ok(vec![ACCOUNT.to_string()])),
            chain_id: Mutex::new(chain_id),
            known_chains: Mutex::new(HashSet::from([chain_id])),
            switch_error: Mutex::new(None),
            add_error: Mutex::new(None),
            switch_is_ignored: Mutex::new(false),
            switch_gate: Mutex::new(None),
            added: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            events,
        }
    }

    pub fn set_accounts(&self, accounts: Vec<String>) {
        *self.accounts.lock().unwrap() = Ok(accounts);
    }

    pub fn fail_accounts(&self, error: ProviderError) {
        *self.accounts.lock().unwrap() = Err(error);
    }

    pub fn know_chain(&self, chain_id: u64) {
        self.known_chains.lock().unwrap().insert(chain_id);
    }

    /// Every switch request fails with `error`.
    pub fn fail_switch(&self, error: ProviderError) {
        *self.switch_error.lock().unwrap() = Some(error);
    }

    /// Switch requests answer success but the active chain stays put.
    pub fn ignore_switch(&self) {
        *self.switch_is_ignored.lock().unwrap() = true;
    }

    /// Park every switch request until the returned gate is notified.
    pub fn hold_switch(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.switch_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn fail_add(&self, error: ProviderError) {
        *self.add_error.lock().unwrap() = Some(error);
    }

    pub fn emit(&self, event: WalletEvent) {
        let _ = self.events.send(event);
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.split(':').next() == Some(method))
            .count()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Only `switch_chain` / `add_chain` calls, in order.
    pub fn network_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with("switch_chain") || call.starts_with("add_chain"))
            .collect()
    }

    pub fn added_chains(&self) -> Vec<AddChainParams> {
        self.added.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.record("request_accounts");
        self.accounts.lock().unwrap().clone()
    }

    async fn accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.record("accounts");
        self.accounts.lock().unwrap().clone()
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        self.record("chain_id");
        Ok(*self.chain_id.lock().unwrap())
    }

    async fn switch_chain(&self, chain_id_hex: &str) -> Result<(), ProviderError> {
        self.record(format!("switch_chain:{chain_id_hex}"));
        let gate = self.switch_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(error) = self.switch_error.lock().unwrap().clone() {
            return Err(error);
        }
        let target = parse_chain_id(chain_id_hex).map_err(ProviderError::InvalidResponse)?;
        if !self.known_chains.lock().unwrap().contains(&target) {
            return Err(ProviderError::rpc(
                UNRECOGNIZED_CHAIN_CODE,
                format!("Unrecognized chain ID \"{chain_id_hex}\""),
            ));
        }
        if !*self.switch_is_ignored.lock().unwrap() {
            *self.chain_id.lock().unwrap() = target;
        }
        Ok(())
    }

    async fn add_chain(&self, params: &AddChainParams) -> Result<(), ProviderError> {
        self.record(format!("add_chain:{}", params.chain_id));
        if let Some(error) = self.add_error.lock().unwrap().clone() {
            return Err(error);
        }
        let chain_id = parse_chain_id(&params.chain_id).map_err(ProviderError::InvalidResponse)?;
        self.known_chains.lock().unwrap().insert(chain_id);
        self.added.lock().unwrap().push(params.clone());
        Ok(())
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<WalletEvent>> {
        Some(self.events.subscribe())
    }
}

/// State of a JSON-RPC wallet served by [`spawn_rpc_wallet`].
///
/// Holds one account and treats `0x66eee` as unknown to the wallet; adding
/// a chain is always rejected by the user.
#[derive(Clone)]
pub struct RpcWalletStub {
    chain: Arc<Mutex<String>>,
    accounts: Arc<Mutex<Vec<String>>>,
    methods: Arc<Mutex<Vec<String>>>,
}

impl RpcWalletStub {
    pub fn set_chain(&self, chain_id_hex: &str) {
        *self.chain.lock().unwrap() = chain_id_hex.to_string();
    }

    pub fn clear_accounts(&self) {
        self.accounts.lock().unwrap().clear();
    }

    /// JSON-RPC methods received so far, in order.
    pub fn methods(&self) -> Vec<String> {
        self.methods.lock().unwrap().clone()
    }
}

async fn rpc(State(stub): State<RpcWalletStub>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or_default().to_string();
    stub.methods.lock().unwrap().push(method.clone());

    let outcome: Result<Value, (i64, &str)> = match method.as_str() {
        "eth_requestAccounts" | "eth_accounts" => Ok(json!(stub.accounts.lock().unwrap().clone())),
        "eth_chainId" => Ok(json!(stub.chain.lock().unwrap().clone())),
        "wallet_switchEthereumChain" => {
            let target = request["params"][0]["chainId"].as_str().unwrap_or_default();
            if target == "0x66eee" {
                Err((UNRECOGNIZED_CHAIN_CODE, "Unrecognized chain ID"))
            } else {
                stub.set_chain(target);
                Ok(Value::Null)
            }
        }
        "wallet_addEthereumChain" => Err((USER_REJECTED_CODE, "User rejected the request.")),
        _ => Err((-32601, "method not found")),
    };

    Json(match outcome {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err((code, message)) => {
            json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
        }
    })
}

/// Serve a JSON-RPC wallet on `127.0.0.1:0` whose active chain is
/// `chain_id_hex`. Returns the endpoint URL and a handle on its state.
pub async fn spawn_rpc_wallet(chain_id_hex: &str) -> (String, RpcWalletStub) {
    let stub = RpcWalletStub {
        chain: Arc::new(Mutex::new(chain_id_hex.to_string())),
        accounts: Arc::new(Mutex::new(vec![ACCOUNT.to_lowercase()])),
        methods: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new().route("/", post(rpc)).with_state(stub.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/"), stub)
}
