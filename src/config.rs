// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the two configuration structs:
//! [`ProxyConfig`] for the backend proxy binary and [`FlowConfig`] for a
//! whitelist flow driven against that proxy. Values are read once at start-up.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Proxy bind address | `0.0.0.0` |
//! | `PORT` | Proxy bind port | `3001` |
//! | `WHITELIST_NETWORK` | `arbitrum-sepolia` or `arbitrum-one` | `arbitrum-sepolia` |
//! | `PROTECTOR_API_URL` | Base URL of the backend proxy | `http://localhost:3001` |
//! | `WALLET_RPC_URL` | JSON-RPC endpoint of the wallet | `http://127.0.0.1:1248` |
//! | `FLOW_STEP_TIMEOUT_SECS` | Per-step timeout of a flow run | `300` |
//! | `TLS_CERT_PATH` | PEM certificate chain; enables TLS with `TLS_KEY_PATH` | unset |
//! | `TLS_KEY_PATH` | PEM private key | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::time::Duration;

use crate::blockchain::{network_by_name, NetworkConfig};
use crate::flow::message::{CONFIRMATION_HTML, CONFIRMATION_SUBJECT};
use crate::protector::proxy::DEFAULT_PROXY_URL;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const NETWORK_ENV: &str = "WHITELIST_NETWORK";
pub const PROXY_URL_ENV: &str = "PROTECTOR_API_URL";
pub const WALLET_RPC_URL_ENV: &str = "WALLET_RPC_URL";
pub const STEP_TIMEOUT_ENV: &str = "FLOW_STEP_TIMEOUT_SECS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_WALLET_RPC_URL: &str = "http://127.0.0.1:1248";

/// Wallet prompts wait on a person; five minutes per step.
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(300);

pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    InvalidNetwork(String),

    #[error("{name} must be a number, got `{value}`")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} is not a valid URL: {reason}")]
    InvalidUrl { name: &'static str, reason: String },

    #[error("TLS needs both TLS_CERT_PATH and TLS_KEY_PATH")]
    IncompleteTls,

    #[error("Failed to build client: {0}")]
    Client(String),
}

/// Certificate and key for serving the proxy over TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Configuration of the backend proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub network: NetworkConfig,
    pub email_subject: String,
    pub email_html: String,
    pub tls: Option<TlsPaths>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            network: crate::blockchain::ARBITRUM_SEPOLIA,
            email_subject: CONFIRMATION_SUBJECT.to_string(),
            email_html: CONFIRMATION_HTML.to_string(),
            tls: None,
        }
    }
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let network = network_by_name(non_empty(&lookup, NETWORK_ENV).as_deref())
            .map_err(ConfigError::InvalidNetwork)?;
        let host = non_empty(&lookup, HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_number(&lookup, PORT_ENV)?.unwrap_or(DEFAULT_PORT);

        let tls = match (
            non_empty(&lookup, TLS_CERT_PATH_ENV),
            non_empty(&lookup, TLS_KEY_PATH_ENV),
        ) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        Ok(Self {
            host,
            port,
            network,
            tls,
            ..Self::default()
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration of a whitelist flow run against the backend proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowConfig {
    pub network: NetworkConfig,
    pub proxy_url: String,
    pub wallet_rpc_url: String,
    pub step_timeout: Duration,
    pub email_subject: String,
    pub email_html: String,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            network: crate::blockchain::ARBITRUM_SEPOLIA,
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            wallet_rpc_url: DEFAULT_WALLET_RPC_URL.to_string(),
            step_timeout: DEFAULT_STEP_TIMEOUT,
            email_subject: CONFIRMATION_SUBJECT.to_string(),
            email_html: CONFIRMATION_HTML.to_string(),
        }
    }
}

impl FlowConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let network = network_by_name(non_empty(&lookup, NETWORK_ENV).as_deref())
            .map_err(ConfigError::InvalidNetwork)?;
        let proxy_url = parse_url(&lookup, PROXY_URL_ENV)?
            .unwrap_or_else(|| DEFAULT_PROXY_URL.to_string());
        let wallet_rpc_url = parse_url(&lookup, WALLET_RPC_URL_ENV)?
            .unwrap_or_else(|| DEFAULT_WALLET_RPC_URL.to_string());
        let step_timeout = parse_number::<u64, _>(&lookup, STEP_TIMEOUT_ENV)?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_STEP_TIMEOUT);

        Ok(Self {
            network,
            proxy_url,
            wallet_rpc_url,
            step_timeout,
            ..Self::default()
        })
    }
}

fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_number<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, name)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidNumber { name, value })
        })
        .transpose()
}

fn parse_url<F>(lookup: &F, name: &'static str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, name)
        .map(|value| {
            url::Url::parse(&value)
                .map(|_| value)
                .map_err(|e| ConfigError::InvalidUrl {
                    name,
                    reason: e.to_string(),
                })
        })
        .transpose()
}
