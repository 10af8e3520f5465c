// ABOUTME: Route handlers for the appointment booking REST API
// ABOUTME: Create, update, delete, and read endpoints backed by the transaction manager
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat

//! Appointment routes
//!
//! The booking surface of the server. Totals are computed server-side by the
//! pricing engine; clients never supply a price.

use crate::{
    database::{CreateAppointmentRequest, UpdateAppointmentRequest},
    errors::AppError,
    models::{AppointmentDetail, ServiceSummary},
    routes::ServerResources,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request body for booking an appointment
#[derive(Debug, Deserialize)]
pub struct CreateAppointmentBody {
    /// Pet the appointment is for
    pub pet_id: i64,
    /// When the visit is scheduled
    pub scheduled_at: DateTime<Utc>,
    /// Whether the pet is picked up at home (flat surcharge)
    #[serde(default)]
    pub is_home_pickup: bool,
    /// Whether the visit is paid in cash (5% discount)
    #[serde(default)]
    pub is_paid_in_cash: bool,
    /// Selected service ids; at least one is required
    pub service_ids: Vec<i64>,
}

impl From<CreateAppointmentBody> for CreateAppointmentRequest {
    fn from(body: CreateAppointmentBody) -> Self {
        Self {
            pet_id: body.pet_id,
            scheduled_at: body.scheduled_at,
            is_home_pickup: body.is_home_pickup,
            is_paid_in_cash: body.is_paid_in_cash,
            service_ids: body.service_ids,
        }
    }
}

/// Request body for updating an appointment; omitted fields are unchanged
#[derive(Debug, Deserialize, Default)]
pub struct UpdateAppointmentBody {
    pub pet_id: Option<i64>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub is_home_pickup: Option<bool>,
    pub is_paid_in_cash: Option<bool>,
    pub is_concluded: Option<bool>,
    /// Replaces the entire service set when present
    pub service_ids: Option<Vec<i64>>,
}

impl From<UpdateAppointmentBody> for UpdateAppointmentRequest {
    fn from(body: UpdateAppointmentBody) -> Self {
        Self {
            pet_id: body.pet_id,
            scheduled_at: body.scheduled_at,
            is_home_pickup: body.is_home_pickup,
            is_paid_in_cash: body.is_paid_in_cash,
            is_concluded: body.is_concluded,
            service_ids: body.service_ids,
        }
    }
}

/// Response for an appointment with joined detail
#[derive(Debug, Serialize, Deserialize)]
pub struct AppointmentResponse {
    pub id: i64,
    pub scheduled_at: String,
    pub is_home_pickup: bool,
    pub is_paid_in_cash: bool,
    pub is_concluded: bool,
    pub total_price: Decimal,
    pub pet_id: i64,
    pub pet_name: String,
    pub customer_id: i64,
    pub customer_name: String,
    pub services: Vec<ServiceSummary>,
}

impl From<AppointmentDetail> for AppointmentResponse {
    fn from(detail: AppointmentDetail) -> Self {
        Self {
            id: detail.id,
            scheduled_at: detail.scheduled_at.to_rfc3339(),
            is_home_pickup: detail.is_home_pickup,
            is_paid_in_cash: detail.is_paid_in_cash,
            is_concluded: detail.is_concluded,
            total_price: detail.total_price,
            pet_id: detail.pet_id,
            pet_name: detail.pet_name,
            customer_id: detail.customer_id,
            customer_name: detail.customer_name,
            services: detail.services,
        }
    }
}

/// Appointment routes handler
pub struct AppointmentsRoutes;

impl AppointmentsRoutes {
    /// Create all appointment routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/appointments", get(Self::handle_list))
            .route("/api/v1/appointments", post(Self::handle_create))
            .route("/api/v1/appointments/:id", get(Self::handle_get))
            .route("/api/v1/appointments/:id", put(Self::handle_update))
            .route("/api/v1/appointments/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    /// Handle POST /api/v1/appointments - book an appointment
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<CreateAppointmentBody>,
    ) -> Result<Response, AppError> {
        let request: CreateAppointmentRequest = body.into();
        let detail = resources.database.appointments().create(&request).await?;

        let response: AppointmentResponse = detail.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle PUT /api/v1/appointments/:id - update an appointment
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<i64>,
        Json(body): Json<UpdateAppointmentBody>,
    ) -> Result<Response, AppError> {
        let request: UpdateAppointmentRequest = body.into();
        resources.database.appointments().update(id, &request).await?;

        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle DELETE /api/v1/appointments/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        resources.database.appointments().delete(id).await?;

        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle GET /api/v1/appointments/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let detail = resources
            .database
            .appointments()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Appointment {id}")))?;

        let response: AppointmentResponse = detail.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/v1/appointments - list all appointments
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let details = resources.database.appointments().list().await?;

        let response: Vec<AppointmentResponse> = details.into_iter().map(Into::into).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
