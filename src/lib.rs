// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Quintes Whitelist - Privacy-preserving whitelist onboarding
//!
//! Turns a visitor into a whitelist subscriber: connect a wallet, make sure
//! it is on the configured Arbitrum network, encrypt the email into a
//! protected record, grant access on it, and have the confirmation email
//! delivered to the record's owner.
//!
//! ## Modules
//!
//! - `api` - HTTP façade over the protected-data service (Axum)
//! - `blockchain` - Network descriptors and chain id handling
//! - `flow` - The whitelist flow orchestrator
//! - `protector` - Protected-data clients (proxy and in-process)
//! - `wallet` - Wallet session manager and providers

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod flow;
pub mod models;
pub mod protector;
pub mod state;
pub mod wallet;
