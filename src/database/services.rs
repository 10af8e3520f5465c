// ABOUTME: Service catalog database operations and catalog lookup
// ABOUTME: CRUD with positive-price validation plus fail-fast resolution of service id sets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat

use crate::database::decimal_from_text;
use crate::errors::{AppError, AppResult};
use crate::models::Service;
use rust_decimal::Decimal;
use sqlx::{Row, Sqlite, SqlitePool};
use std::collections::HashMap;

/// A catalog entry as created
#[derive(Debug, Clone)]
pub struct NewService {
    pub name: String,
    pub base_price: Decimal,
}

/// Partial update for a catalog entry
#[derive(Debug, Clone, Default)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub base_price: Option<Decimal>,
}

/// Service catalog operations manager
pub struct ServicesManager {
    pool: SqlitePool,
}

impl ServicesManager {
    /// Create a new services manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a catalog entry
    ///
    /// # Errors
    ///
    /// Returns an error if the price is not positive or the database
    /// operation fails
    pub async fn create(&self, request: &NewService) -> AppResult<Service> {
        if request.base_price <= Decimal::ZERO {
            return Err(AppError::invalid_input("Service price must be positive"));
        }

        let result = sqlx::query("INSERT INTO services (name, base_price) VALUES ($1, $2)")
            .bind(&request.name)
            .bind(request.base_price.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create service: {e}")))?;

        Ok(Service {
            id: result.last_insert_rowid(),
            name: request.name.clone(),
            base_price: request.base_price,
        })
    }

    /// Get a catalog entry by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, service_id: i64) -> AppResult<Option<Service>> {
        let row = sqlx::query("SELECT id, name, base_price FROM services WHERE id = $1")
            .bind(service_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get service {service_id}: {e}")))?;

        row.map(|r| row_to_service(&r)).transpose()
    }

    /// List the full catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list(&self) -> AppResult<Vec<Service>> {
        let rows = sqlx::query("SELECT id, name, base_price FROM services ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list services: {e}")))?;

        rows.iter().map(row_to_service).collect()
    }

    /// Resolve a set of service ids against the catalog
    ///
    /// # Errors
    ///
    /// Returns a validation error naming any unresolvable id
    pub async fn resolve_by_ids(&self, service_ids: &[i64]) -> AppResult<Vec<Service>> {
        resolve_by_ids(&self.pool, service_ids).await
    }

    /// Update a catalog entry. Returns false if the entry does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the new price is not positive or the database
    /// operation fails
    pub async fn update(&self, service_id: i64, request: &UpdateServiceRequest) -> AppResult<bool> {
        if let Some(base_price) = request.base_price {
            if base_price <= Decimal::ZERO {
                return Err(AppError::invalid_input("Service price must be positive"));
            }
        }

        let Some(existing) = self.get(service_id).await? else {
            return Ok(false);
        };

        let name = request.name.as_ref().unwrap_or(&existing.name);
        let base_price = request.base_price.unwrap_or(existing.base_price);

        sqlx::query("UPDATE services SET name = $2, base_price = $3 WHERE id = $1")
            .bind(service_id)
            .bind(name)
            .bind(base_price.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to update service {service_id}: {e}"))
            })?;

        Ok(true)
    }

    /// Delete a catalog entry. Returns false if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails, including when the
    /// service is still referenced by an appointment
    pub async fn delete(&self, service_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(service_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to delete service {service_id}: {e}"))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

/// Resolve service ids on an arbitrary executor, so the appointment
/// transaction can run the lookup on its own connection.
///
/// Ids are returned in request order. Any unresolvable id fails the whole
/// lookup with a validation error rather than being silently dropped.
pub(crate) async fn resolve_by_ids<'e, E>(executor: E, service_ids: &[i64]) -> AppResult<Vec<Service>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    if service_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = service_ids
        .iter()
        .map(|_| "?")
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("SELECT id, name, base_price FROM services WHERE id IN ({placeholders})");

    let mut query = sqlx::query(&sql);
    for id in service_ids {
        query = query.bind(id);
    }

    let rows = query
        .fetch_all(executor)
        .await
        .map_err(|e| AppError::database(format!("Failed to resolve services: {e}")))?;

    let mut by_id: HashMap<i64, Service> = rows
        .iter()
        .map(|r| row_to_service(r).map(|s| (s.id, s)))
        .collect::<AppResult<_>>()?;

    let mut resolved = Vec::with_capacity(service_ids.len());
    let mut missing = Vec::new();
    for id in service_ids {
        match by_id.remove(id) {
            Some(service) => resolved.push(service),
            None => missing.push(*id),
        }
    }

    if !missing.is_empty() {
        let missing = missing
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        return Err(AppError::invalid_input(format!(
            "Unknown service ids: {missing}"
        )));
    }

    Ok(resolved)
}

/// Convert a database row to a `Service`
pub(crate) fn row_to_service(row: &sqlx::sqlite::SqliteRow) -> AppResult<Service> {
    let base_price: String = row.get("base_price");
    Ok(Service {
        id: row.get("id"),
        name: row.get("name"),
        base_price: decimal_from_text(&base_price, "base_price")?,
    })
}
