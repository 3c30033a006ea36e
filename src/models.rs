// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the backend proxy façade. Field names are
//! camelCase on the wire to match the browser clients of the façade.
//!
//! ## Wallet Address Type
//!
//! The [`WalletAddress`] newtype wraps Ethereum-style addresses (0x-prefixed,
//! 40 hex characters). Parsing goes through `alloy` primitives; the original
//! casing is preserved.

use std::str::FromStr;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Ethereum-compatible wallet address wrapper.
///
/// Format: `0x` followed by 40 hexadecimal characters (20 bytes).
///
/// # Example
///
/// ```rust,ignore
/// let addr = WalletAddress::parse("0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12")?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    /// Validate and wrap an address as reported by a wallet.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if !(trimmed.starts_with("0x") || trimmed.starts_with("0X")) {
            return Err(format!("invalid address `{trimmed}`: missing 0x prefix"));
        }
        Address::from_str(trimmed)
            .map_err(|e| format!("invalid address `{trimmed}`: {e}"))?;
        Ok(Self(trimmed.to_string()))
    }

    /// Short display form: `0x742d...aB12`.
    pub fn shortened(&self) -> String {
        let value = self.0.as_str();
        if value.len() <= 10 || !value.is_ascii() {
            return value.to_string();
        }
        format!("{}...{}", &value[..6], &value[value.len() - 4..])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(value: String) -> Self {
        WalletAddress(value)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        WalletAddress(value.to_string())
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

// =============================================================================
// Protect Email
// =============================================================================

/// Request to encrypt an email into a protected record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ProtectEmailRequest {
    /// Email address to protect. Never stored or logged in clear.
    pub email: String,
}

/// Result of a successful protect call.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProtectEmailResponse {
    pub success: bool,
    /// Address of the protected record.
    pub protected_data_address: String,
}

// =============================================================================
// Grant Access
// =============================================================================

/// Request to authorize a user to access a protected record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GrantAccessRequest {
    pub protected_data_address: String,
    /// Wallet address of the consumer being authorized.
    pub user_address: String,
}

/// Plain acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SuccessResponse {
    pub success: bool,
}

// =============================================================================
// Send Email
// =============================================================================

/// Request to trigger the confirmation email for a protected record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub protected_data_address: String,
}

/// Delivery acknowledgement. `taskId` identifies the asynchronous delivery task.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}
