// ABOUTME: Route handlers for the service catalog
// ABOUTME: CRUD surface with positive-price validation in the manager
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat

//! Service catalog routes

use crate::{
    database::{NewService, UpdateServiceRequest},
    errors::AppError,
    routes::ServerResources,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

/// Request body for creating a catalog entry
#[derive(Debug, Deserialize)]
pub struct CreateServiceBody {
    pub name: String,
    pub base_price: Decimal,
}

impl From<CreateServiceBody> for NewService {
    fn from(body: CreateServiceBody) -> Self {
        Self {
            name: body.name,
            base_price: body.base_price,
        }
    }
}

/// Request body for updating a catalog entry; omitted fields are unchanged
#[derive(Debug, Deserialize, Default)]
pub struct UpdateServiceBody {
    pub name: Option<String>,
    pub base_price: Option<Decimal>,
}

impl From<UpdateServiceBody> for UpdateServiceRequest {
    fn from(body: UpdateServiceBody) -> Self {
        Self {
            name: body.name,
            base_price: body.base_price,
        }
    }
}

/// Service catalog routes handler
pub struct ServicesRoutes;

impl ServicesRoutes {
    /// Create all service routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/services", get(Self::handle_list))
            .route("/api/v1/services", post(Self::handle_create))
            .route("/api/v1/services/:id", get(Self::handle_get))
            .route("/api/v1/services/:id", put(Self::handle_update))
            .route("/api/v1/services/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    /// Handle GET /api/v1/services
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let services = resources.database.services().list().await?;
        Ok((StatusCode::OK, Json(services)).into_response())
    }

    /// Handle POST /api/v1/services
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<CreateServiceBody>,
    ) -> Result<Response, AppError> {
        let request: NewService = body.into();
        let service = resources.database.services().create(&request).await?;

        Ok((StatusCode::CREATED, Json(service)).into_response())
    }

    /// Handle GET /api/v1/services/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let service = resources
            .database
            .services()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Service {id}")))?;

        Ok((StatusCode::OK, Json(service)).into_response())
    }

    /// Handle PUT /api/v1/services/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<i64>,
        Json(body): Json<UpdateServiceBody>,
    ) -> Result<Response, AppError> {
        let request: UpdateServiceRequest = body.into();
        let updated = resources.database.services().update(id, &request).await?;

        if !updated {
            return Err(AppError::not_found(format!("Service {id}")));
        }

        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle DELETE /api/v1/services/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let deleted = resources.database.services().delete(id).await?;

        if !deleted {
            return Err(AppError::not_found(format!("Service {id}")));
        }

        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}
