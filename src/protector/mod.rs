// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Confidential Data Client
//!
//! Wrapper around the protected-data service: encrypt an email into a
//! protected record, authorize a consumer on it, and trigger delivery of a
//! message to the record's owner.
//!
//! Each operation is a single external call with no internal retry.
//!
//! ## Implementations
//!
//! - [`ProxyClient`] - HTTP calls through the backend proxy façade; has a
//!   liveness check the orchestrator runs before the flow.
//! - [`SandboxProtector`] - in-process service keeping records in memory;
//!   backs the façade by default and serves the direct deployment in tests
//!   and local runs.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::models::WalletAddress;

pub mod proxy;
pub mod sandbox;

pub use proxy::ProxyClient;
pub use sandbox::{DeliveryTask, SandboxProtector};

/// Prefix of protected record names.
pub const RECORD_NAME_PREFIX: &str = "Quintes Whitelist";

/// Opaque reference to an encrypted record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProtectedRecordHandle {
    address: String,
}

impl ProtectedRecordHandle {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl std::fmt::Display for ProtectedRecordHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.address)
    }
}

/// Acceptance of a delivery task. Acceptance is not receipt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub task_id: Option<String>,
}

/// Errors from the protected-data service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    /// The signer declined the transaction.
    #[error("Request rejected by the signer: {0}")]
    Rejected(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Protected record not found: {0}")]
    NotFound(String),

    #[error("No access granted on protected record: {0}")]
    NotAuthorized(String),

    /// The service could not be reached at all.
    #[error("Service unreachable: {0}")]
    Unreachable(String),

    #[error("Request failed: {0}")]
    Request(String),

    /// The service answered with an error status and message.
    #[error("Service returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Service response was invalid: {0}")]
    InvalidResponse(String),
}

/// Operations of the protected-data service.
#[async_trait]
pub trait ConfidentialData: Send + Sync {
    /// Encrypt `email` into a new protected record.
    async fn encrypt(&self, email: &str) -> Result<ProtectedRecordHandle, DataError>;

    /// Grant `consumer` access to `record`.
    async fn authorize(
        &self,
        record: &ProtectedRecordHandle,
        consumer: &WalletAddress,
    ) -> Result<(), DataError>;

    /// Trigger delivery of a message to the owner of `record`.
    async fn deliver(
        &self,
        record: &ProtectedRecordHandle,
        subject: &str,
        html_body: &str,
    ) -> Result<DeliveryReceipt, DataError>;

    /// Whether [`health_check`](Self::health_check) talks to anything.
    fn has_health_check(&self) -> bool {
        false
    }

    async fn health_check(&self) -> Result<(), DataError> {
        Ok(())
    }
}

/// Lowercased, trimmed email. The form digests and names are derived from.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Short stable tag for an email: first 8 bytes of its SHA-256, hex.
///
/// Safe to log; the raw email is not.
pub fn email_tag(email: &str) -> String {
    let digest = Sha256::digest(normalize_email(email).as_bytes());
    alloy::primitives::hex::encode(&digest[..8])
}

/// Record name for traceability without exposing the address itself.
pub fn record_name(email: &str) -> String {
    format!("{RECORD_NAME_PREFIX} - {}", email_tag(email))
}
