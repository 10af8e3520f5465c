// ABOUTME: Environment-based configuration loading with development defaults
// ABOUTME: ServerConfig aggregates HTTP, database, and auth settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat

//! Server configuration loaded from environment variables

use anyhow::{Context, Result};
use std::env;

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret; generated at startup when not configured
    pub jwt_secret: Vec<u8>,
    /// JWT expiry time in hours
    pub token_expiry_hours: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables with development defaults
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but unparsable
    pub fn from_env() -> Result<Self> {
        let http_port = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8081".into())
            .parse::<u16>()
            .context("HTTP_PORT must be a valid port number")?;

        let url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data/tapcat.db".into());

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret.into_bytes(),
            Err(_) => {
                tracing::warn!(
                    "JWT_SECRET not set; generating an ephemeral secret (tokens will not survive restarts)"
                );
                crate::auth::generate_jwt_secret().to_vec()
            }
        };

        let token_expiry_hours = env::var("JWT_EXPIRY_HOURS")
            .unwrap_or_else(|_| "24".into())
            .parse::<i64>()
            .context("JWT_EXPIRY_HOURS must be an integer")?;

        Ok(Self {
            http_port,
            database: DatabaseConfig { url },
            auth: AuthConfig {
                jwt_secret,
                token_expiry_hours,
            },
        })
    }

    /// One-line configuration summary for startup logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "http_port={} database={} token_expiry_hours={}",
            self.http_port, self.database.url, self.auth.token_expiry_hours
        )
    }
}
