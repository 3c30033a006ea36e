// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Backend proxy client for the protected-data service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ConfidentialData, DataError, DeliveryReceipt, ProtectedRecordHandle};
use crate::models::{
    GrantAccessRequest, ProtectEmailRequest, ProtectEmailResponse, SendEmailRequest,
    SendEmailResponse, SuccessResponse, WalletAddress,
};

/// Default base URL of the backend proxy.
pub const DEFAULT_PROXY_URL: &str = "http://localhost:3001";

/// Record creation is an on-chain transaction; allow for slow blocks.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the backend proxy façade.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    base_url: String,
    http: Client,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DataError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DataError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, DataError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(path, e))?;

        decode(path, response).await
    }
}

fn transport_error(path: &str, error: reqwest::Error) -> DataError {
    if error.is_connect() {
        DataError::Unreachable(format!(
            "cannot connect to backend service ({path}): {error}"
        ))
    } else {
        DataError::Request(format!("POST {path} failed: {error}"))
    }
}

async fn decode<R: DeserializeOwned>(path: &str, response: Response) -> Result<R, DataError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);
        return Err(DataError::Backend {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| DataError::InvalidResponse(format!("POST {path} invalid JSON: {e}")))
}

#[async_trait]
impl ConfidentialData for ProxyClient {
    async fn encrypt(&self, email: &str) -> Result<ProtectedRecordHandle, DataError> {
        debug!("Protecting email via backend proxy");
        let response: ProtectEmailResponse = self
            .post_json(
                "/api/protect-email",
                &ProtectEmailRequest {
                    email: email.to_string(),
                },
            )
            .await?;

        if !response.success || response.protected_data_address.trim().is_empty() {
            return Err(DataError::InvalidResponse(
                "protect-email did not return a protected data address".to_string(),
            ));
        }

        info!(record = %response.protected_data_address, "Email protected");
        Ok(ProtectedRecordHandle::new(response.protected_data_address))
    }

    async fn authorize(
        &self,
        record: &ProtectedRecordHandle,
        consumer: &WalletAddress,
    ) -> Result<(), DataError> {
        let response: SuccessResponse = self
            .post_json(
                "/api/grant-access",
                &GrantAccessRequest {
                    protected_data_address: record.address().to_string(),
                    user_address: consumer.to_string(),
                },
            )
            .await?;

        if !response.success {
            return Err(DataError::InvalidResponse(
                "grant-access reported failure".to_string(),
            ));
        }
        info!(record = %record, "Access granted");
        Ok(())
    }

    /// The façade renders the confirmation message itself; `subject` and
    /// `html_body` are not sent over the wire.
    async fn deliver(
        &self,
        record: &ProtectedRecordHandle,
        _subject: &str,
        _html_body: &str,
    ) -> Result<DeliveryReceipt, DataError> {
        let response: SendEmailResponse = self
            .post_json(
                "/api/send-email",
                &SendEmailRequest {
                    protected_data_address: record.address().to_string(),
                },
            )
            .await?;

        if !response.success {
            return Err(DataError::InvalidResponse(
                "send-email reported failure".to_string(),
            ));
        }
        info!(record = %record, task_id = ?response.task_id, "Delivery accepted");
        Ok(DeliveryReceipt {
            task_id: response.task_id,
        })
    }

    fn has_health_check(&self) -> bool {
        true
    }

    async fn health_check(&self) -> Result<(), DataError> {
        let response = self
            .http
            .get(self.url("/health"))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| DataError::Unreachable(format!("backend not responding: {e}")))?;

        if !response.status().is_success() {
            return Err(DataError::Unreachable(format!(
                "backend health returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::config::ProxyConfig;
    use crate::protector::SandboxProtector;
    use crate::state::AppState;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    const CONSUMER: &str = "0xABCD000000000000000000000000000000001234";

    async fn spawn_backend() -> (ProxyClient, Arc<SandboxProtector>) {
        let sandbox = Arc::new(SandboxProtector::new());
        let state = AppState::new(sandbox.clone(), ProxyConfig::default());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        (ProxyClient::new(format!("http://{addr}")).unwrap(), sandbox)
    }

    async fn unreachable_client() -> ProxyClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        ProxyClient::new(format!("http://{addr}")).unwrap()
    }

    #[tokio::test]
    async fn full_round_trip_through_the_facade() {
        let (client, sandbox) = spawn_backend().await;

        client.health_check().await.expect("backend healthy");
        let handle = client.encrypt("user@example.com").await.expect("encrypt");
        client
            .authorize(&handle, &WalletAddress::from(CONSUMER))
            .await
            .expect("authorize");
        let receipt = client
            .deliver(&handle, "ignored", "ignored")
            .await
            .expect("deliver");

        assert!(receipt.task_id.is_some());
        assert!(sandbox.is_authorized(handle.address(), CONSUMER).await);
        let deliveries = sandbox.deliveries().await;
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].subject, ProxyConfig::default().email_subject);
    }

    #[tokio::test]
    async fn backend_errors_carry_status_and_message() {
        let (client, _sandbox) = spawn_backend().await;
        let handle = client.encrypt("user@example.com").await.expect("encrypt");

        match client.deliver(&handle, "s", "b").await {
            Err(DataError::Backend { status, message }) => {
                assert_eq!(status, 403);
                assert!(message.contains("No access granted"));
            }
            other => panic!("expected backend error, got {other:?}"),
        }

        match client.encrypt("not-an-email").await {
            Err(DataError::Backend { status, .. }) => assert_eq!(status, 400),
            other => panic!("expected backend error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_backend_fails_health_check_and_calls() {
        let client = unreachable_client().await;
        assert!(client.has_health_check());
        assert!(matches!(
            client.health_check().await,
            Err(DataError::Unreachable(_))
        ));
        assert!(matches!(
            client.encrypt("user@example.com").await,
            Err(DataError::Unreachable(_))
        ));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let client = ProxyClient::new("http://localhost:3001/").unwrap();
        assert_eq!(client.url("/health"), "http://localhost:3001/health");
        assert_eq!(client.base_url(), "http://localhost:3001/");
    }
}
