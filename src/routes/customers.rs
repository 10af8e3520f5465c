// ABOUTME: Route handlers for customer records
// ABOUTME: Read, update, and delete surface; creation happens at registration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat

//! Customer routes

use crate::{
    database::UpdateCustomerRequest,
    errors::AppError,
    routes::ServerResources,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Request body for updating a customer; omitted fields are unchanged
#[derive(Debug, Deserialize, Default)]
pub struct UpdateCustomerBody {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl From<UpdateCustomerBody> for UpdateCustomerRequest {
    fn from(body: UpdateCustomerBody) -> Self {
        Self {
            name: body.name,
            phone: body.phone,
            address: body.address,
        }
    }
}

/// Customer routes handler
pub struct CustomersRoutes;

impl CustomersRoutes {
    /// Create all customer routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/customers", get(Self::handle_list))
            .route("/api/v1/customers/:id", get(Self::handle_get))
            .route("/api/v1/customers/:id", put(Self::handle_update))
            .route("/api/v1/customers/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    /// Handle GET /api/v1/customers
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let customers = resources.database.customers().list().await?;
        Ok((StatusCode::OK, Json(customers)).into_response())
    }

    /// Handle GET /api/v1/customers/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let customer = resources
            .database
            .customers()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Customer {id}")))?;

        Ok((StatusCode::OK, Json(customer)).into_response())
    }

    /// Handle PUT /api/v1/customers/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<i64>,
        Json(body): Json<UpdateCustomerBody>,
    ) -> Result<Response, AppError> {
        let request: UpdateCustomerRequest = body.into();
        let updated = resources.database.customers().update(id, &request).await?;

        if !updated {
            return Err(AppError::not_found(format!("Customer {id}")));
        }

        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle DELETE /api/v1/customers/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let deleted = resources.database.customers().delete(id).await?;

        if !deleted {
            return Err(AppError::not_found(format!("Customer {id}")));
        }

        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}
