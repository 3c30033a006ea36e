// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Backend proxy in front of the protected-data service.

use std::{net::SocketAddr, sync::Arc};

use axum_server::tls_rustls::RustlsConfig;
use quintes_whitelist::{
    api::router,
    config::{ProxyConfig, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV},
    protector::SandboxProtector,
    state::AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = ProxyConfig::from_env()?;
    let addr: SocketAddr = config.bind_address().parse()?;
    let tls = config.tls.clone();

    info!(
        network = config.network.name,
        chain_id = config.network.chain_id,
        tls = tls.is_some(),
        "Configuration loaded"
    );

    let state = AppState::new(Arc::new(SandboxProtector::new()), config);
    let app = router(state);

    match tls {
        Some(paths) => {
            // Must happen before any rustls config is built.
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| "Failed to install rustls crypto provider")?;
            let tls_config = RustlsConfig::from_pem_file(&paths.cert_path, &paths.key_path).await?;

            info!("Whitelist proxy listening on https://{addr} (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = TcpListener::bind(addr).await?;
            info!("Whitelist proxy listening on http://{addr} (docs at /docs)");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
