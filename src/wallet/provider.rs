// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet provider abstraction (EIP-1193 request surface).

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::blockchain::AddChainParams;

/// EIP-1193: the user rejected the request.
pub const USER_REJECTED_CODE: i64 = 4001;

/// EIP-3326: the requested chain has not been added to the wallet.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// Errors reported by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// No wallet is reachable in this environment.
    #[error("Wallet provider unavailable: {0}")]
    Unavailable(String),

    /// The wallet answered with an RPC error object.
    #[error("Wallet RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The request could not be completed (timeout, broken connection).
    #[error("Wallet transport error: {0}")]
    Transport(String),

    /// The wallet answered with something that is not a valid result.
    #[error("Wallet response was invalid: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            ProviderError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code() == Some(USER_REJECTED_CODE)
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code() == Some(UNRECOGNIZED_CHAIN_CODE)
    }
}

/// Notifications pushed by the wallet (`accountsChanged` / `chainChanged`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    AccountsChanged(Vec<String>),
    ChainChanged(u64),
}

/// Request surface of a browser-style wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// `eth_requestAccounts`: may suspend until the user approves in the wallet.
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// `eth_accounts`: already-authorized accounts, never prompts.
    async fn accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// `eth_chainId`.
    async fn chain_id(&self) -> Result<u64, ProviderError>;

    /// `wallet_switchEthereumChain` with a hex chain id.
    async fn switch_chain(&self, chain_id_hex: &str) -> Result<(), ProviderError>;

    /// `wallet_addEthereumChain` with the complete chain descriptor.
    async fn add_chain(&self, params: &AddChainParams) -> Result<(), ProviderError>;

    /// Subscribe to pushed account/chain notifications, if the provider emits any.
    fn subscribe(&self) -> Option<broadcast::Receiver<WalletEvent>> {
        None
    }
}
