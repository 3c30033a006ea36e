// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Flow Orchestrator
//!
//! Runs the whitelist sequence for one email:
//!
//! ```text
//! Idle -> Connecting -> NetworkCheck -> Encrypting -> Authorizing -> Delivering -> Complete
//!              \____________\______________\______________\______________\---> Errored
//! ```
//!
//! Steps run strictly in order; a step's external call must resolve before
//! the next one starts. Any failure ends the run with a classified
//! [`FlowError`]. Nothing is resumed: a new run encrypts the email again.
//!
//! When the protected-data client has a liveness check (the proxy client),
//! it runs before the first step. Clients without one go straight to
//! `Connecting`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::blockchain::NetworkConfig;
use crate::config::{ConfigError, FlowConfig, DEFAULT_STEP_TIMEOUT};
use crate::models::WalletAddress;
use crate::protector::{email_tag, ConfidentialData, ProxyClient};
use crate::wallet::{JsonRpcWalletProvider, Session, WalletProvider, WalletSession};

pub mod email;
pub mod error;
pub mod message;

pub use email::is_valid_email;
pub use error::{FlowError, FlowStage, BRIDGE_URL, WALLET_INSTALL_URL};
pub use message::{CONFIRMATION_HTML, CONFIRMATION_SUBJECT};

/// Observable state of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    Idle,
    Connecting,
    NetworkCheck,
    Encrypting,
    Authorizing,
    Delivering,
    Complete,
    Errored,
}

impl From<FlowStage> for FlowState {
    fn from(stage: FlowStage) -> Self {
        match stage {
            FlowStage::Connecting => FlowState::Connecting,
            FlowStage::NetworkCheck => FlowState::NetworkCheck,
            FlowStage::Encrypting => FlowState::Encrypting,
            FlowStage::Authorizing => FlowState::Authorizing,
            FlowStage::Delivering => FlowState::Delivering,
        }
    }
}

/// Progress notification, emitted when a step starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowProgress {
    pub step_index: u8,
    pub label: String,
}

impl From<FlowStage> for FlowProgress {
    fn from(stage: FlowStage) -> Self {
        Self {
            step_index: stage.index(),
            label: stage.label().to_string(),
        }
    }
}

/// Terminal value of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowResult {
    pub success: bool,
    pub protected_record_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

pub struct WhitelistFlow {
    wallet: Arc<WalletSession>,
    protector: Arc<dyn ConfidentialData>,
    subject: String,
    html_body: String,
    step_timeout: Duration,
    run_lock: Mutex<()>,
    state: watch::Sender<FlowState>,
}

impl WhitelistFlow {
    pub fn new(wallet: Arc<WalletSession>, protector: Arc<dyn ConfidentialData>) -> Self {
        let (state, _) = watch::channel(FlowState::Idle);
        Self {
            wallet,
            protector,
            subject: CONFIRMATION_SUBJECT.to_string(),
            html_body: CONFIRMATION_HTML.to_string(),
            step_timeout: DEFAULT_STEP_TIMEOUT,
            run_lock: Mutex::new(()),
            state,
        }
    }

    /// Flow against a JSON-RPC wallet and the backend proxy.
    ///
    /// Spawns the wallet watcher and the session's event listener; both stop
    /// when `shutdown` is cancelled. Must be called inside a Tokio runtime.
    pub fn from_config(config: &FlowConfig, shutdown: CancellationToken) -> Result<Self, ConfigError> {
        let provider = Arc::new(
            JsonRpcWalletProvider::new(config.wallet_rpc_url.clone())
                .map_err(|e| ConfigError::Client(e.to_string()))?,
        );
        let protector =
            ProxyClient::new(config.proxy_url.clone()).map_err(|e| ConfigError::Client(e.to_string()))?;

        let wallet = Arc::new(WalletSession::new(
            Some(provider.clone() as Arc<dyn WalletProvider>),
            config.network.clone(),
        ));
        wallet.spawn_event_listener(shutdown.clone());
        tokio::spawn(provider.watch(shutdown));

        Ok(Self::new(wallet, Arc::new(protector))
            .with_message(config.email_subject.clone(), config.email_html.clone())
            .with_step_timeout(config.step_timeout))
    }

    pub fn with_message(mut self, subject: impl Into<String>, html_body: impl Into<String>) -> Self {
        self.subject = subject.into();
        self.html_body = html_body.into();
        self
    }

    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }

    pub fn wallet(&self) -> &Arc<WalletSession> {
        &self.wallet
    }

    pub fn state(&self) -> FlowState {
        *self.state.borrow()
    }

    /// Receive every state transition of subsequent runs.
    pub fn subscribe_state(&self) -> watch::Receiver<FlowState> {
        self.state.subscribe()
    }

    /// Run the whole sequence for `email`, reporting each step to `on_progress`.
    ///
    /// Fails with [`FlowError::AlreadyRunning`] while another run holds this
    /// orchestrator, and with [`FlowError::InvalidEmail`] for a malformed
    /// address. Neither makes an external call.
    pub async fn run<F>(&self, email: &str, mut on_progress: F) -> Result<FlowResult, FlowError>
    where
        F: FnMut(FlowProgress),
    {
        let Ok(_guard) = self.run_lock.try_lock() else {
            warn!("Rejected overlapping whitelist run");
            return Err(FlowError::AlreadyRunning);
        };

        if !is_valid_email(email) {
            self.state.send_replace(FlowState::Errored);
            debug!("Rejected malformed email");
            return Err(FlowError::InvalidEmail);
        }

        let tag = email_tag(email);
        info!(email_tag = %tag, network = self.wallet.network().name, "Starting whitelist run");

        match self.execute(email, &mut on_progress).await {
            Ok(result) => {
                self.state.send_replace(FlowState::Complete);
                info!(
                    email_tag = %tag,
                    protected_record = %result.protected_record_address,
                    task_id = result.task_id.as_deref().unwrap_or("-"),
                    "Whitelist run complete"
                );
                Ok(result)
            }
            Err(e) => {
                self.state.send_replace(FlowState::Errored);
                warn!(
                    email_tag = %tag,
                    code = e.error_code(),
                    stage = ?e.stage(),
                    error = %e,
                    "Whitelist run failed"
                );
                Err(e)
            }
        }
    }

    async fn execute<F>(&self, email: &str, on_progress: &mut F) -> Result<FlowResult, FlowError>
    where
        F: FnMut(FlowProgress),
    {
        if self.protector.has_health_check() {
            tokio::time::timeout(self.step_timeout, self.protector.health_check())
                .await
                .map_err(|_| FlowError::BackendUnreachable("health check timed out".to_string()))?
                .map_err(|e| FlowError::BackendUnreachable(e.to_string()))?;
            debug!("Backend healthy");
        }

        self.enter(FlowStage::Connecting, on_progress);
        let session = self
            .bounded(FlowStage::Connecting, async {
                self.wallet
                    .connect()
                    .await
                    .map_err(|e| FlowError::from_wallet(FlowStage::Connecting, e))
            })
            .await?;

        self.enter(FlowStage::NetworkCheck, on_progress);
        if !session.is_correct_network {
            self.bounded(FlowStage::NetworkCheck, async {
                self.wallet
                    .ensure_network()
                    .await
                    .map_err(|e| FlowError::from_wallet(FlowStage::NetworkCheck, e))
            })
            .await?;
        }
        let address = ready_address(&self.wallet.snapshot().await, self.wallet.network())?;

        self.enter(FlowStage::Encrypting, on_progress);
        let record = self
            .bounded(FlowStage::Encrypting, async {
                self.protector
                    .encrypt(email)
                    .await
                    .map_err(|e| FlowError::from_data(FlowStage::Encrypting, e))
            })
            .await?;
        debug!(protected_record = %record, "Email encrypted");

        self.enter(FlowStage::Authorizing, on_progress);
        self.bounded(FlowStage::Authorizing, async {
            self.protector
                .authorize(&record, &address)
                .await
                .map_err(|e| FlowError::from_data(FlowStage::Authorizing, e))
        })
        .await?;

        self.enter(FlowStage::Delivering, on_progress);
        let receipt = self
            .bounded(FlowStage::Delivering, async {
                self.protector
                    .deliver(&record, &self.subject, &self.html_body)
                    .await
                    .map_err(|e| FlowError::from_data(FlowStage::Delivering, e))
            })
            .await?;

        Ok(FlowResult {
            success: true,
            protected_record_address: record.address().to_string(),
            task_id: receipt.task_id,
        })
    }

    fn enter<F>(&self, stage: FlowStage, on_progress: &mut F)
    where
        F: FnMut(FlowProgress),
    {
        self.state.send_replace(stage.into());
        info!(step = stage.index(), stage = %stage, "Entering step");
        on_progress(stage.into());
    }

    async fn bounded<T, Fut>(&self, stage: FlowStage, step: Fut) -> Result<T, FlowError>
    where
        Fut: Future<Output = Result<T, FlowError>>,
    {
        tokio::time::timeout(self.step_timeout, step)
            .await
            .map_err(|_| FlowError::StepTimedOut { stage })?
    }
}

/// Address to authorize. Account or chain events may have cleared readiness
/// since the network step.
fn ready_address(session: &Session, network: &NetworkConfig) -> Result<WalletAddress, FlowError> {
    match (&session.wallet_address, session.is_correct_network) {
        (Some(address), true) => Ok(address.clone()),
        (None, _) => Err(FlowError::NoAccounts),
        (Some(_), false) => Err(FlowError::NetworkUnavailable(format!(
            "wallet is not on {}",
            network.name
        ))),
    }
}
