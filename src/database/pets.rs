// ABOUTME: Pet record database operations
// ABOUTME: CRUD with owning-customer checks and positive-weight validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat

use crate::errors::{AppError, AppResult};
use crate::models::Pet;
use sqlx::{Row, SqlitePool};

/// A pet record as created
#[derive(Debug, Clone)]
pub struct NewPet {
    pub customer_id: i64,
    pub name: String,
    pub species: String,
    pub weight_kg: f64,
}

/// Partial update for a pet record
#[derive(Debug, Clone, Default)]
pub struct UpdatePetRequest {
    pub customer_id: Option<i64>,
    pub name: Option<String>,
    pub species: Option<String>,
    pub weight_kg: Option<f64>,
}

/// Pet database operations manager
pub struct PetsManager {
    pool: SqlitePool,
}

impl PetsManager {
    /// Create a new pets manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a pet record
    ///
    /// # Errors
    ///
    /// Returns an error if the weight is not positive, the owning customer
    /// does not exist, or the database operation fails
    pub async fn create(&self, request: &NewPet) -> AppResult<Pet> {
        if request.weight_kg <= 0.0 {
            return Err(AppError::invalid_input("Pet weight must be positive"));
        }

        self.require_customer(request.customer_id).await?;

        let result = sqlx::query(
            r"
            INSERT INTO pets (customer_id, name, species, weight_kg)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(request.customer_id)
        .bind(&request.name)
        .bind(&request.species)
        .bind(request.weight_kg)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create pet: {e}")))?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Pet {id} vanished after insert")))
    }

    /// Get a pet by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, pet_id: i64) -> AppResult<Option<Pet>> {
        let row = sqlx::query(
            r"
            SELECT id, customer_id, name, species, weight_kg, created_at
            FROM pets WHERE id = $1
            ",
        )
        .bind(pet_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get pet {pet_id}: {e}")))?;

        row.map(|r| row_to_pet(&r)).transpose()
    }

    /// List all pets
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list(&self) -> AppResult<Vec<Pet>> {
        let rows = sqlx::query(
            r"
            SELECT id, customer_id, name, species, weight_kg, created_at
            FROM pets ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list pets: {e}")))?;

        rows.iter().map(row_to_pet).collect()
    }

    /// Update a pet record. Returns false if the pet does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the new weight is not positive, a new owning
    /// customer does not exist, or the database operation fails
    pub async fn update(&self, pet_id: i64, request: &UpdatePetRequest) -> AppResult<bool> {
        if let Some(weight_kg) = request.weight_kg {
            if weight_kg <= 0.0 {
                return Err(AppError::invalid_input("Pet weight must be positive"));
            }
        }

        let Some(existing) = self.get(pet_id).await? else {
            return Ok(false);
        };

        if let Some(customer_id) = request.customer_id {
            self.require_customer(customer_id).await?;
        }

        let customer_id = request.customer_id.unwrap_or(existing.customer_id);
        let name = request.name.as_ref().unwrap_or(&existing.name);
        let species = request.species.as_ref().unwrap_or(&existing.species);
        let weight_kg = request.weight_kg.unwrap_or(existing.weight_kg);

        sqlx::query(
            "UPDATE pets SET customer_id = $2, name = $3, species = $4, weight_kg = $5 WHERE id = $1",
        )
        .bind(pet_id)
        .bind(customer_id)
        .bind(name)
        .bind(species)
        .bind(weight_kg)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update pet {pet_id}: {e}")))?;

        Ok(true)
    }

    /// Delete a pet. Its appointments cascade. Returns false if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete(&self, pet_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(pet_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete pet {pet_id}: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Fail with `NotFound` unless the customer exists
    async fn require_customer(&self, customer_id: i64) -> AppResult<()> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM customers WHERE id = $1")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to check customer: {e}")))?;

        if exists.is_none() {
            return Err(AppError::not_found(format!("Customer {customer_id}")));
        }
        Ok(())
    }
}

/// Convert a database row to a `Pet`
fn row_to_pet(row: &sqlx::sqlite::SqliteRow) -> AppResult<Pet> {
    Ok(Pet {
        id: row.get("id"),
        customer_id: row.get("customer_id"),
        name: row.get("name"),
        species: row.get("species"),
        weight_kg: row.get("weight_kg"),
        created_at: row.get("created_at"),
    })
}
