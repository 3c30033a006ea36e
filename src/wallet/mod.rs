// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet connection and network management.
//!
//! - `provider` - the EIP-1193 request surface and its error codes
//! - `session` - the session manager (connect, network switching, events)
//! - `rpc` - a provider speaking JSON-RPC over HTTP

pub mod provider;
pub mod rpc;
pub mod session;

#[cfg(test)]
pub(crate) mod mock;

pub use provider::{
    ProviderError, WalletEvent, WalletProvider, UNRECOGNIZED_CHAIN_CODE, USER_REJECTED_CODE,
};
pub use rpc::JsonRpcWalletProvider;
pub use session::{Session, WalletError, WalletSession};
