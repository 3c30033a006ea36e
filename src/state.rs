// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::config::ProxyConfig;
use crate::protector::{ConfidentialData, SandboxProtector};

#[derive(Clone)]
pub struct AppState {
    pub protector: Arc<dyn ConfidentialData>,
    pub config: Arc<ProxyConfig>,
}

impl AppState {
    pub fn new(protector: Arc<dyn ConfidentialData>, config: ProxyConfig) -> Self {
        Self {
            protector,
            config: Arc::new(config),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(SandboxProtector::new()), ProxyConfig::default())
    }
}
