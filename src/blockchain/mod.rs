// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain configuration for the whitelist deployment.
//!
//! This module provides:
//! - Compiled-in network descriptors (Arbitrum One, Arbitrum Sepolia)
//! - Hex chain id encoding and parsing as used by EIP-1193 wallets
//! - The `wallet_addEthereumChain` parameter shape

pub mod types;

pub use types::*;
