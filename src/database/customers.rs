// ABOUTME: Customer record database operations
// ABOUTME: Registration insert, lookup by id/email, update, and delete
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat

use crate::errors::{AppError, AppResult};
use crate::models::Customer;
use sqlx::{Row, SqlitePool};

/// A customer record as created at registration
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password_hash: String,
}

/// Partial update for a customer record
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Customer database operations manager
pub struct CustomersManager {
    pool: SqlitePool,
}

impl CustomersManager {
    /// Create a new customers manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a customer record
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already registered or the database
    /// operation fails
    pub async fn create(&self, request: &NewCustomer) -> AppResult<Customer> {
        if self.get_by_email(&request.email).await?.is_some() {
            return Err(AppError::already_exists(format!(
                "Customer with email {} already exists",
                request.email
            )));
        }

        let result = sqlx::query(
            r"
            INSERT INTO customers (name, email, phone, address, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.address)
        .bind(&request.password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create customer: {e}")))?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Customer {id} vanished after insert")))
    }

    /// Get a customer by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, customer_id: i64) -> AppResult<Option<Customer>> {
        let row = sqlx::query(
            r"
            SELECT id, name, email, phone, address, password_hash, created_at
            FROM customers WHERE id = $1
            ",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get customer {customer_id}: {e}")))?;

        row.map(|r| row_to_customer(&r)).transpose()
    }

    /// Get a customer by email
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<Customer>> {
        let row = sqlx::query(
            r"
            SELECT id, name, email, phone, address, password_hash, created_at
            FROM customers WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get customer by email: {e}")))?;

        row.map(|r| row_to_customer(&r)).transpose()
    }

    /// List all customers
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list(&self) -> AppResult<Vec<Customer>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, email, phone, address, password_hash, created_at
            FROM customers ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list customers: {e}")))?;

        rows.iter().map(row_to_customer).collect()
    }

    /// Update a customer record. Returns false if the customer does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn update(
        &self,
        customer_id: i64,
        request: &UpdateCustomerRequest,
    ) -> AppResult<bool> {
        let Some(existing) = self.get(customer_id).await? else {
            return Ok(false);
        };

        let name = request.name.as_ref().unwrap_or(&existing.name);
        let phone = request.phone.as_ref().unwrap_or(&existing.phone);
        let address = request.address.as_ref().unwrap_or(&existing.address);

        sqlx::query("UPDATE customers SET name = $2, phone = $3, address = $4 WHERE id = $1")
            .bind(customer_id)
            .bind(name)
            .bind(phone)
            .bind(address)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to update customer {customer_id}: {e}"))
            })?;

        Ok(true)
    }

    /// Delete a customer. Pets and their appointments cascade.
    /// Returns false if the customer does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete(&self, customer_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(customer_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to delete customer {customer_id}: {e}"))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

/// Convert a database row to a `Customer`
fn row_to_customer(row: &sqlx::sqlite::SqliteRow) -> AppResult<Customer> {
    Ok(Customer {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        address: row.get("address"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    })
}
