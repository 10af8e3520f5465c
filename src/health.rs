// ABOUTME: Server health status model for operational visibility
// ABOUTME: Backs the /health endpoint with service name, version, and status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat

//! Server health reporting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Health check response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    /// A healthy response for the running server
    #[must_use]
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            service: "tapcat-server".into(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            timestamp: Utc::now(),
        }
    }
}
