// ABOUTME: HTTP route assembly and shared server resources
// ABOUTME: Wires auth, customer, pet, service, appointment, and health routes into one router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat

//! HTTP routes
//!
//! Each surface owns a route struct with a `routes()` constructor; this
//! module merges them into the application router and holds the shared
//! [`ServerResources`] handed to every handler.

pub mod appointments;
pub mod auth;
pub mod customers;
pub mod pets;
pub mod services;

use crate::auth::AuthManager;
use crate::database::Database;
use crate::health::HealthResponse;
use axum::{routing::get, Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared state for all route handlers
pub struct ServerResources {
    pub database: Database,
    pub auth_manager: AuthManager,
}

impl ServerResources {
    /// Bundle the server's shared components
    #[must_use]
    pub const fn new(database: Database, auth_manager: AuthManager) -> Self {
        Self {
            database,
            auth_manager,
        }
    }
}

/// Build the full application router
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .merge(auth::AuthRoutes::routes(resources.clone()))
        .merge(customers::CustomersRoutes::routes(resources.clone()))
        .merge(pets::PetsRoutes::routes(resources.clone()))
        .merge(services::ServicesRoutes::routes(resources.clone()))
        .merge(appointments::AppointmentsRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Handle GET /health
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
