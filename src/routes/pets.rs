// ABOUTME: Route handlers for pet records
// ABOUTME: CRUD surface with owning-customer and weight validation in the manager
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat

//! Pet routes

use crate::{
    database::{NewPet, UpdatePetRequest},
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
use serde::Deserialize;
use std::sync::Arc;

/// Request body for creating a pet
#[derive(Debug, Deserialize)]
pub struct CreatePetBody {
    pub customer_id: i64,
    pub name: String,
    pub species: String,
    pub weight_kg: f64,
}

impl From<CreatePetBody> for NewPet {
    fn from(body: CreatePetBody) -> Self {
        Self {
            customer_id: body.customer_id,
            name: body.name,
            species: body.species,
            weight_kg: body.weight_kg,
        }
    }
}

/// Request body for updating a pet; omitted fields are unchanged
#[derive(Debug, Deserialize, Default)]
pub struct UpdatePetBody {
    pub customer_id: Option<i64>,
    pub name: Option<String>,
    pub species: Option<String>,
    pub weight_kg: Option<f64>,
}

impl From<UpdatePetBody> for UpdatePetRequest {
    fn from(body: UpdatePetBody) -> Self {
        Self {
            customer_id: body.customer_id,
            name: body.name,
            species: body.species,
            weight_kg: body.weight_kg,
        }
    }
}

/// Pet routes handler
pub struct PetsRoutes;

impl PetsRoutes {
    /// Create all pet routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/pets", get(Self::handle_list))
            .route("/api/v1/pets", post(Self::handle_create))
            .route("/api/v1/pets/:id", get(Self::handle_get))
            .route("/api/v1/pets/:id", put(Self::handle_update))
            .route("/api/v1/pets/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    /// Handle GET /api/v1/pets
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let pets = resources.database.pets().list().await?;
        Ok((StatusCode::OK, Json(pets)).into_response())
    }

    /// Handle POST /api/v1/pets
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<CreatePetBody>,
    ) -> Result<Response, AppError> {
        let request: NewPet = body.into();
        let pet = resources.database.pets().create(&request).await?;

        Ok((StatusCode::CREATED, Json(pet)).into_response())
    }

    /// Handle GET /api/v1/pets/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let pet = resources
            .database
            .pets()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Pet {id}")))?;

        Ok((StatusCode::OK, Json(pet)).into_response())
    }

    /// Handle PUT /api/v1/pets/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<i64>,
        Json(body): Json<UpdatePetBody>,
    ) -> Result<Response, AppError> {
        let request: UpdatePetRequest = body.into();
        let updated = resources.database.pets().update(id, &request).await?;

        if !updated {
            return Err(AppError::not_found(format!("Pet {id}")));
        }

        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle DELETE /api/v1/pets/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let deleted = resources.database.pets().delete(id).await?;

        if !deleted {
            return Err(AppError::not_found(format!("Pet {id}")));
        }

        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}
