// ABOUTME: Route handlers for customer registration and login
// ABOUTME: Issues HS256 JWTs on successful registration or credential check
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat

//! Authentication routes

use crate::{
    auth::AuthManager,
    database::NewCustomer,
    errors::AppError,
    routes::ServerResources,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// Response for successful registration or login
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub customer_id: i64,
    pub name: String,
    pub email: String,
    pub token: String,
    pub expires_at: String,
}

/// Authentication routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all auth routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/auth/register", post(Self::handle_register))
            .route("/api/v1/auth/login", post(Self::handle_login))
            .with_state(resources)
    }

    /// Handle POST /api/v1/auth/register - create a customer account
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<RegisterBody>,
    ) -> Result<Response, AppError> {
        tracing::info!(email = %body.email, "Customer registration attempt");

        if !Self::is_valid_email(&body.email) {
            return Err(AppError::invalid_input("Invalid email format"));
        }
        if body.password.len() < 8 {
            return Err(AppError::invalid_input(
                "Password must be at least 8 characters",
            ));
        }

        let password_hash = AuthManager::hash_password(&body.password)?;
        let customer = resources
            .database
            .customers()
            .create(&NewCustomer {
                name: body.name,
                email: body.email,
                phone: body.phone,
                address: body.address,
                password_hash,
            })
            .await?;

        tracing::info!(customer.id = customer.id, "Customer registered");

        let response = Self::auth_response(&resources, &customer)?;
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle POST /api/v1/auth/login - verify credentials and issue a token
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<LoginBody>,
    ) -> Result<Response, AppError> {
        tracing::info!(email = %body.email, "Customer login attempt");

        let customer = resources
            .database
            .customers()
            .get_by_email(&body.email)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid email or password"))?;

        let is_valid =
            AuthManager::verify_password(body.password, customer.password_hash.clone()).await?;
        if !is_valid {
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        tracing::info!(customer.id = customer.id, "Customer logged in");

        let response = Self::auth_response(&resources, &customer)?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Build the token-bearing response for a customer
    fn auth_response(
        resources: &Arc<ServerResources>,
        customer: &crate::models::Customer,
    ) -> Result<AuthResponse, AppError> {
        let token = resources.auth_manager.generate_token(customer)?;
        let expires_at =
            Utc::now() + Duration::hours(resources.auth_manager.token_expiry_hours());

        Ok(AuthResponse {
            customer_id: customer.id,
            name: customer.name.clone(),
            email: customer.email.clone(),
            token,
            expires_at: expires_at.to_rfc3339(),
        })
    }

    /// Minimal structural email check
    fn is_valid_email(email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
    }
}
