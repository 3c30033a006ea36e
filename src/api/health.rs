// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::state::AppState;

/// Liveness response of the proxy.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// "ok" or "degraded".
    pub status: String,
    /// Display name of the configured network.
    pub network: String,
    pub chain_id: u64,
}

/// Liveness probe.
///
/// 503 when the protected-data backend reports itself unhealthy.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Proxy is alive", body = HealthResponse),
        (status = 503, description = "Backend is unhealthy", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let backend_ok = match state.protector.health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Protected-data backend unhealthy");
            false
        }
    };

    let response = HealthResponse {
        status: if backend_ok { "ok" } else { "degraded" }.to_string(),
        network: state.config.network.name.to_string(),
        chain_id: state.config.network.chain_id,
    };
    let status = if backend_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::ARBITRUM_SEPOLIA;

    #[tokio::test]
    async fn health_reports_configured_network() {
        let (status, Json(body)) = health(State(AppState::default())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.network, ARBITRUM_SEPOLIA.name);
        assert_eq!(body.chain_id, 421614);
    }
}
