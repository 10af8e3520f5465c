// ABOUTME: Server binary for the Tapcat grooming appointment API
// ABOUTME: Loads configuration, opens the database, and serves the HTTP router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat

//! # Tapcat API Server Binary

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tapcat_server::{
    auth::AuthManager,
    config::environment::ServerConfig,
    database::Database,
    logging,
    routes::{self, ServerResources},
};
use tracing::info;

#[derive(Parser)]
#[command(name = "tapcat-server")]
#[command(about = "Tapcat - pet grooming appointment booking and pricing API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    info!("Configuration loaded: {}", config.summary());

    let database = Database::new(&config.database.url).await?;
    info!("Database initialized: {}", config.database.url);

    let auth_manager = AuthManager::new(
        config.auth.jwt_secret.clone(),
        config.auth.token_expiry_hours,
    );

    let resources = Arc::new(ServerResources::new(database, auth_manager));
    let app = routes::router(resources);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http_port)).await?;
    info!(port = config.http_port, "Tapcat server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
