// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::Request,
    http::HeaderName,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        GrantAccessRequest, ProtectEmailRequest, ProtectEmailResponse, SendEmailRequest,
        SendEmailResponse, SuccessResponse,
    },
    state::AppState,
};

pub mod extract;
pub mod health;
pub mod protected_data;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/protect-email", post(protected_data::protect_email))
        .route("/grant-access", post(protected_data::grant_access))
        .route("/send-email", post(protected_data::send_email));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id
            )
        }))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        protected_data::protect_email,
        protected_data::grant_access,
        protected_data::send_email
    ),
    components(
        schemas(
            health::HealthResponse,
            ProtectEmailRequest,
            ProtectEmailResponse,
            GrantAccessRequest,
            SuccessResponse,
            SendEmailRequest,
            SendEmailResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness of the proxy"),
        (name = "Protected Data", description = "Email protection, access grants and delivery")
    )
)]
struct ApiDoc;
