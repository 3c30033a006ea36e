// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Session Manager
//!
//! Owns the [`Session`] (current address, chain id, network correctness) and
//! is its only writer. The flow orchestrator reads snapshots.
//!
//! ## Network switching
//!
//! Wallets do not pre-register uncommon chains. When the switch request fails
//! with `4902` the manager adds the chain with its complete descriptor and
//! retries the switch exactly once.
//!
//! ## Provider events
//!
//! Account/chain notifications are translated into session transitions by
//! [`WalletSession::apply_event`]; [`WalletSession::spawn_event_listener`]
//! drives that from the provider's subscription until cancelled.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::provider::{ProviderError, WalletEvent, WalletProvider};
use crate::blockchain::NetworkConfig;
use crate::models::WalletAddress;

/// Wallet session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub wallet_address: Option<WalletAddress>,
    pub chain_id: Option<u64>,
    pub is_correct_network: bool,
}

impl Session {
    /// Address on the configured network, if both hold.
    pub fn ready_address(&self) -> Option<&WalletAddress> {
        if self.is_correct_network {
            self.wallet_address.as_ref()
        } else {
            None
        }
    }
}

/// Errors that can occur while connecting or switching networks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("No wallet provider found; install a wallet to continue")]
    ProviderMissing,

    #[error("Request rejected in the wallet")]
    UserRejected,

    #[error("Wallet returned no accounts")]
    NoAccounts,

    #[error("Network switch rejected in the wallet")]
    NetworkSwitchRejected,

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error(transparent)]
    Provider(ProviderError),
}

/// Wallet session manager for one user session.
pub struct WalletSession {
    provider: Option<Arc<dyn WalletProvider>>,
    network: NetworkConfig,
    session: RwLock<Session>,
}

impl WalletSession {
    /// Create a manager targeting `network`. `None` means no wallet is present.
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, network: NetworkConfig) -> Self {
        Self {
            provider,
            network,
            session: RwLock::new(Session::default()),
        }
    }

    /// The configured target network.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Current session state.
    pub async fn snapshot(&self) -> Session {
        self.session.read().await.clone()
    }

    fn provider(&self) -> Result<&Arc<dyn WalletProvider>, WalletError> {
        self.provider.as_ref().ok_or(WalletError::ProviderMissing)
    }

    /// Request accounts and record the address and active chain.
    pub async fn connect(&self) -> Result<Session, WalletError> {
        let provider = self.provider()?;

        let accounts = provider
            .request_accounts()
            .await
            .map_err(classify_request_error)?;
        let first = accounts.into_iter().next().ok_or(WalletError::NoAccounts)?;
        let address = WalletAddress::parse(&first)
            .map_err(|e| WalletError::Provider(ProviderError::InvalidResponse(e)))?;

        let chain_id = provider.chain_id().await.map_err(classify_request_error)?;

        let mut session = self.session.write().await;
        session.wallet_address = Some(address);
        session.chain_id = Some(chain_id);
        session.is_correct_network = chain_id == self.network.chain_id;

        info!(
            address = %session.wallet_address.as_ref().map(WalletAddress::shortened).unwrap_or_default(),
            chain_id,
            correct_network = session.is_correct_network,
            "Wallet connected"
        );

        Ok(session.clone())
    }

    /// Restore an already-authorized session without prompting the user.
    pub async fn restore(&self) -> Result<Session, WalletError> {
        let provider = self.provider()?;

        let accounts = provider.accounts().await.map_err(classify_request_error)?;
        let Some(first) = accounts.into_iter().next() else {
            return Ok(self.snapshot().await);
        };
        let address = WalletAddress::parse(&first)
            .map_err(|e| WalletError::Provider(ProviderError::InvalidResponse(e)))?;
        let chain_id = provider.chain_id().await.map_err(classify_request_error)?;

        let mut session = self.session.write().await;
        session.wallet_address = Some(address);
        session.chain_id = Some(chain_id);
        session.is_correct_network = chain_id == self.network.chain_id;
        Ok(session.clone())
    }

    /// Make sure the wallet is on the configured network.
    ///
    /// Issues `switch`, and on `4902` exactly one `add` followed by one more
    /// `switch`. The session then records the chain the wallet reports, not
    /// the one requested.
    pub async fn ensure_network(&self) -> Result<Session, WalletError> {
        let provider = self.provider()?;

        let cached = self.session.read().await.chain_id;
        let current = match cached {
            Some(chain_id) => chain_id,
            None => provider.chain_id().await.map_err(classify_request_error)?,
        };
        if current == self.network.chain_id {
            return Ok(self.record_chain(current).await);
        }

        let target = self.network.chain_id_hex();
        info!(
            from_chain = current,
            to_chain = self.network.chain_id,
            network = self.network.name,
            "Switching wallet network"
        );

        match provider.switch_chain(&target).await {
            Ok(()) => {}
            Err(e) if e.is_unrecognized_chain() => {
                info!(network = self.network.name, "Network unknown to wallet, adding it");
                provider
                    .add_chain(&self.network.add_chain_params())
                    .await
                    .map_err(classify_network_error)?;
                provider
                    .switch_chain(&target)
                    .await
                    .map_err(classify_network_error)?;
            }
            Err(e) => return Err(classify_network_error(e)),
        }

        let active = provider.chain_id().await.map_err(classify_network_error)?;
        let session = self.record_chain(active).await;
        if !session.is_correct_network {
            warn!(chain_id = active, network = self.network.name, "Wallet did not switch");
            return Err(WalletError::NetworkUnavailable(format!(
                "wallet is still on chain {active} after switching to {}",
                self.network.name
            )));
        }
        Ok(session)
    }

    async fn record_chain(&self, chain_id: u64) -> Session {
        let mut session = self.session.write().await;
        session.chain_id = Some(chain_id);
        session.is_correct_network = chain_id == self.network.chain_id;
        session.clone()
    }

    /// Clear the local session. The wallet itself stays authorized.
    pub async fn disconnect(&self) {
        *self.session.write().await = Session::default();
    }

    /// Apply a provider-pushed notification to the session.
    pub async fn apply_event(&self, event: WalletEvent) {
        let mut session = self.session.write().await;
        match event {
            WalletEvent::AccountsChanged(accounts) => match accounts.first() {
                None => {
                    info!("Wallet reported no accounts, resetting session");
                    *session = Session::default();
                }
                Some(first) => match WalletAddress::parse(first) {
                    Ok(address) => {
                        debug!(address = %address.shortened(), "Wallet account changed");
                        session.wallet_address = Some(address);
                    }
                    Err(e) => warn!(error = %e, "Ignoring account change with invalid address"),
                },
            },
            WalletEvent::ChainChanged(chain_id) => {
                session.chain_id = Some(chain_id);
                session.is_correct_network = chain_id == self.network.chain_id;
                debug!(
                    chain_id,
                    correct_network = session.is_correct_network,
                    "Wallet chain changed"
                );
            }
        }
    }

    /// Apply provider events until `shutdown` is cancelled or the provider
    /// stops emitting. Returns `None` when the provider has no subscription.
    pub fn spawn_event_listener(
        self: &Arc<Self>,
        shutdown: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        let mut events = self.provider.as_ref()?.subscribe()?;
        let manager = Arc::clone(self);

        Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    received = events.recv() => match received {
                        Ok(event) => manager.apply_event(event).await,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Wallet event listener lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            debug!("Wallet event stream closed");
                            return;
                        }
                    },
                    _ = shutdown.cancelled() => {
                        debug!("Wallet event listener shutting down");
                        return;
                    }
                }
            }
        }))
    }
}

fn classify_request_error(error: ProviderError) -> WalletError {
    match error {
        ProviderError::Unavailable(_) => WalletError::ProviderMissing,
        e if e.is_user_rejection() => WalletError::UserRejected,
        e => WalletError::Provider(e),
    }
}

fn classify_network_error(error: ProviderError) -> WalletError {
    match error {
        ProviderError::Unavailable(_) => WalletError::ProviderMissing,
        e if e.is_user_rejection() => WalletError::NetworkSwitchRejected,
        e => WalletError::NetworkUnavailable(e.to_string()),
    }
}
