// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use tracing::info;

use super::extract::ApiJson;
use crate::{
    error::ApiError,
    flow::is_valid_email,
    models::{
        GrantAccessRequest, ProtectEmailRequest, ProtectEmailResponse, SendEmailRequest,
        SendEmailResponse, SuccessResponse, WalletAddress,
    },
    protector::{email_tag, ProtectedRecordHandle},
    state::AppState,
};

fn record_handle(raw: &str) -> Result<ProtectedRecordHandle, ApiError> {
    if raw.trim().is_empty() {
        return Err(ApiError::bad_request("protectedDataAddress is required"));
    }
    let address = WalletAddress::parse(raw)
        .map_err(|e| ApiError::bad_request(format!("Invalid protectedDataAddress: {e}")))?;
    Ok(ProtectedRecordHandle::new(address.0))
}

#[utoipa::path(
    post,
    path = "/api/protect-email",
    request_body = ProtectEmailRequest,
    tag = "Protected Data",
    responses(
        (status = 200, body = ProtectEmailResponse),
        (status = 400, description = "Missing or malformed email")
    )
)]
pub async fn protect_email(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ProtectEmailRequest>,
) -> Result<Json<ProtectEmailResponse>, ApiError> {
    let email = request.email.trim();
    if email.is_empty() {
        return Err(ApiError::bad_request("Email is required"));
    }
    if !is_valid_email(email) {
        return Err(ApiError::bad_request("Invalid email address"));
    }

    let record = state.protector.encrypt(email).await?;
    info!(email_tag = %email_tag(email), protected_record = %record, "Email protected");

    Ok(Json(ProtectEmailResponse {
        success: true,
        protected_data_address: record.address().to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/grant-access",
    request_body = GrantAccessRequest,
    tag = "Protected Data",
    responses(
        (status = 200, body = SuccessResponse),
        (status = 400, description = "Missing or malformed address"),
        (status = 404, description = "Unknown protected record")
    )
)]
pub async fn grant_access(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GrantAccessRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let record = record_handle(&request.protected_data_address)?;
    let user = WalletAddress::parse(&request.user_address)
        .map_err(|e| ApiError::bad_request(format!("Invalid userAddress: {e}")))?;

    state.protector.authorize(&record, &user).await?;
    info!(protected_record = %record, user = %user.shortened(), "Access granted");

    Ok(Json(SuccessResponse { success: true }))
}

/// Sends the configured confirmation email to the owner of the record.
#[utoipa::path(
    post,
    path = "/api/send-email",
    request_body = SendEmailRequest,
    tag = "Protected Data",
    responses(
        (status = 200, body = SendEmailResponse),
        (status = 403, description = "No access granted on the record"),
        (status = 404, description = "Unknown protected record")
    )
)]
pub async fn send_email(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SendEmailRequest>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    let record = record_handle(&request.protected_data_address)?;

    let receipt = state
        .protector
        .deliver(&record, &state.config.email_subject, &state.config.email_html)
        .await?;
    info!(
        protected_record = %record,
        task_id = receipt.task_id.as_deref().unwrap_or("-"),
        "Confirmation email queued"
    );

    Ok(Json(SendEmailResponse {
        success: true,
        task_id: receipt.task_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxyConfig;
    use crate::protector::SandboxProtector;
    use axum::http::StatusCode;
    use std::sync::Arc;

    const USER: &str = "0xABCD000000000000000000000000000000001234";

    fn test_state() -> (AppState, Arc<SandboxProtector>) {
        let sandbox = Arc::new(SandboxProtector::new());
        let state = AppState::new(sandbox.clone(), ProxyConfig::default());
        (state, sandbox)
    }

    async fn protect(state: &AppState, email: &str) -> Result<String, ApiError> {
        let Json(response) = protect_email(
            State(state.clone()),
            ApiJson(ProtectEmailRequest {
                email: email.to_string(),
            }),
        )
        .await?;
        Ok(response.protected_data_address)
    }

    #[tokio::test]
    async fn protect_email_returns_record_address() {
        let (state, sandbox) = test_state();

        let address = protect(&state, " user@example.com ").await.unwrap();

        assert!(WalletAddress::parse(&address).is_ok());
        assert!(sandbox.matches_email(&address, "user@example.com").await);
        assert_eq!(sandbox.record_count().await, 1);
    }

    #[tokio::test]
    async fn protect_email_rejects_missing_and_malformed() {
        let (state, sandbox) = test_state();

        let missing = protect(&state, "  ").await.unwrap_err();
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
        assert_eq!(missing.message, "Email is required");

        let malformed = protect(&state, "user@example").await.unwrap_err();
        assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
        assert_eq!(sandbox.record_count().await, 0);
    }

    #[tokio::test]
    async fn grant_then_send_delivers_configured_message() {
        let (state, sandbox) = test_state();
        let address = protect(&state, "user@example.com").await.unwrap();

        let Json(granted) = grant_access(
            State(state.clone()),
            ApiJson(GrantAccessRequest {
                protected_data_address: address.clone(),
                user_address: USER.to_string(),
            }),
        )
        .await
        .unwrap();
        assert!(granted.success);
        assert!(sandbox.is_authorized(&address, USER).await);

        let Json(sent) = send_email(
            State(state.clone()),
            ApiJson(SendEmailRequest {
                protected_data_address: address.clone(),
            }),
        )
        .await
        .unwrap();
        assert!(sent.success);
        assert!(sent.task_id.is_some());

        let deliveries = sandbox.deliveries().await;
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].subject, state.config.email_subject);
    }

    #[tokio::test]
    async fn send_without_grant_is_forbidden() {
        let (state, _) = test_state();
        let address = protect(&state, "user@example.com").await.unwrap();

        let err = send_email(
            State(state),
            ApiJson(SendEmailRequest {
                protected_data_address: address,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn grant_access_validates_addresses() {
        let (state, _) = test_state();

        let bad_user = grant_access(
            State(state.clone()),
            ApiJson(GrantAccessRequest {
                protected_data_address: "0x1111111111111111111111111111111111111111".to_string(),
                user_address: "not-an-address".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(bad_user.status, StatusCode::BAD_REQUEST);

        let missing_record = grant_access(
            State(state.clone()),
            ApiJson(GrantAccessRequest {
                protected_data_address: String::new(),
                user_address: USER.to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(missing_record.status, StatusCode::BAD_REQUEST);

        let unknown_record = grant_access(
            State(state),
            ApiJson(GrantAccessRequest {
                protected_data_address: "0x1111111111111111111111111111111111111111".to_string(),
                user_address: USER.to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(unknown_record.status, StatusCode::NOT_FOUND);
    }
}
