// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory protected-data service.
//!
//! Holds a SHA-256 digest of each email (never the email), the grants per
//! record, and a log of accepted delivery tasks. Nothing is persisted.

use std::collections::{HashMap, HashSet};

use alloy::primitives::{hex, Address};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::{
    email_tag, normalize_email, record_name, ConfidentialData, DataError, DeliveryReceipt,
    ProtectedRecordHandle,
};
use crate::models::WalletAddress;

struct StoredRecord {
    name: String,
    email_digest: [u8; 32],
    created_at: DateTime<Utc>,
    /// Lowercased consumer addresses.
    grants: HashSet<String>,
}

/// An accepted delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryTask {
    pub task_id: String,
    pub record_address: String,
    pub subject: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct SandboxProtector {
    records: RwLock<HashMap<String, StoredRecord>>,
    deliveries: RwLock<Vec<DeliveryTask>>,
}

impl SandboxProtector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn record_name(&self, address: &str) -> Option<String> {
        self.records
            .read()
            .await
            .get(&address.to_ascii_lowercase())
            .map(|record| record.name.clone())
    }

    pub async fn record_created_at(&self, address: &str) -> Option<DateTime<Utc>> {
        self.records
            .read()
            .await
            .get(&address.to_ascii_lowercase())
            .map(|record| record.created_at)
    }

    /// Whether the record was created from `email`.
    pub async fn matches_email(&self, address: &str, email: &str) -> bool {
        let digest: [u8; 32] = Sha256::digest(normalize_email(email).as_bytes()).into();
        self.records
            .read()
            .await
            .get(&address.to_ascii_lowercase())
            .is_some_and(|record| record.email_digest == digest)
    }

    pub async fn is_authorized(&self, address: &str, consumer: &str) -> bool {
        self.records
            .read()
            .await
            .get(&address.to_ascii_lowercase())
            .is_some_and(|record| record.grants.contains(&consumer.to_ascii_lowercase()))
    }

    pub async fn deliveries(&self) -> Vec<DeliveryTask> {
        self.deliveries.read().await.clone()
    }
}

/// Fresh 20-byte record address, EIP-55 checksummed.
fn new_record_address(email_digest: &[u8; 32]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(Uuid::new_v4().as_bytes());
    hasher.update(email_digest);
    let digest = hasher.finalize();
    Address::from_slice(&digest[12..]).to_checksum(None)
}

fn new_task_id() -> String {
    let digest = Sha256::digest(Uuid::new_v4().as_bytes());
    hex::encode_prefixed(digest)
}

#[async_trait]
impl ConfidentialData for SandboxProtector {
    async fn encrypt(&self, email: &str) -> Result<ProtectedRecordHandle, DataError> {
        let normalized = normalize_email(email);
        if normalized.is_empty() {
            return Err(DataError::InvalidInput("email is empty".to_string()));
        }

        let email_digest: [u8; 32] = Sha256::digest(normalized.as_bytes()).into();
        let address = new_record_address(&email_digest);
        let record = StoredRecord {
            name: record_name(email),
            email_digest,
            created_at: Utc::now(),
            grants: HashSet::new(),
        };

        self.records
            .write()
            .await
            .insert(address.to_ascii_lowercase(), record);

        info!(
            record = %address,
            email_tag = %email_tag(email),
            "Sandbox: protected record created"
        );
        Ok(ProtectedRecordHandle::new(address))
    }

    async fn authorize(
        &self,
        record: &ProtectedRecordHandle,
        consumer: &WalletAddress,
    ) -> Result<(), DataError> {
        let mut records = self.records.write().await;
        let stored = records
            .get_mut(&record.address().to_ascii_lowercase())
            .ok_or_else(|| DataError::NotFound(record.address().to_string()))?;
        stored.grants.insert(consumer.as_str().to_ascii_lowercase());

        info!(
            record = %record,
            consumer = %consumer.shortened(),
            "Sandbox: access granted"
        );
        Ok(())
    }

    async fn deliver(
        &self,
        record: &ProtectedRecordHandle,
        subject: &str,
        html_body: &str,
    ) -> Result<DeliveryReceipt, DataError> {
        {
            let records = self.records.read().await;
            let stored = records
                .get(&record.address().to_ascii_lowercase())
                .ok_or_else(|| DataError::NotFound(record.address().to_string()))?;
            if stored.grants.is_empty() {
                return Err(DataError::NotAuthorized(record.address().to_string()));
            }
        }
        if subject.trim().is_empty() || html_body.trim().is_empty() {
            return Err(DataError::InvalidInput(
                "subject and body are required".to_string(),
            ));
        }

        let task = DeliveryTask {
            task_id: new_task_id(),
            record_address: record.address().to_string(),
            subject: subject.to_string(),
            created_at: Utc::now(),
        };
        info!(record = %record, task_id = %task.task_id, "Sandbox: delivery accepted");

        let task_id = task.task_id.clone();
        self.deliveries.write().await.push(task);
        Ok(DeliveryReceipt {
            task_id: Some(task_id),
        })
    }
}
