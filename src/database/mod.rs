// ABOUTME: Database management for customers, pets, services, and appointments
// ABOUTME: Owns the SQLite pool, schema migration, and per-entity operation managers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat

//! # Database Management
//!
//! A [`Database`] owns the `SQLite` pool and creates the schema on startup.
//! Entity operations live in per-entity managers constructed from the pool;
//! the appointment manager is the transactional core of the server.

mod appointments;
mod customers;
mod pets;
mod services;
pub mod txn;

pub use appointments::{
    AppointmentsManager, CreateAppointmentRequest, UpdateAppointmentRequest,
};
pub use customers::{CustomersManager, NewCustomer, UpdateCustomerRequest};
pub use pets::{NewPet, PetsManager, UpdatePetRequest};
pub use services::{NewService, ServicesManager, UpdateServiceRequest};

use crate::errors::{AppError, AppResult};
use anyhow::Result;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

/// Database manager for the grooming domain
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or the
    /// schema migration fails
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // In-memory databases are per-connection; a larger pool would hand
        // each connection its own empty database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Customer record operations
    #[must_use]
    pub fn customers(&self) -> CustomersManager {
        CustomersManager::new(self.pool.clone())
    }

    /// Pet record operations
    #[must_use]
    pub fn pets(&self) -> PetsManager {
        PetsManager::new(self.pool.clone())
    }

    /// Service catalog operations
    #[must_use]
    pub fn services(&self) -> ServicesManager {
        ServicesManager::new(self.pool.clone())
    }

    /// Appointment booking, pricing, and query operations
    #[must_use]
    pub fn appointments(&self) -> AppointmentsManager {
        AppointmentsManager::new(self.pool.clone())
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS customers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                phone TEXT NOT NULL DEFAULT '',
                address TEXT NOT NULL DEFAULT '',
                password_hash TEXT NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS pets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                customer_id INTEGER NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                species TEXT NOT NULL,
                weight_kg REAL NOT NULL CHECK (weight_kg > 0),
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS services (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                base_price TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS appointments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                pet_id INTEGER NOT NULL REFERENCES pets(id) ON DELETE CASCADE,
                scheduled_at DATETIME NOT NULL,
                is_home_pickup BOOLEAN NOT NULL DEFAULT 0,
                is_paid_in_cash BOOLEAN NOT NULL DEFAULT 0,
                is_concluded BOOLEAN NOT NULL DEFAULT 0,
                total_price TEXT NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS appointment_services (
                appointment_id INTEGER NOT NULL REFERENCES appointments(id) ON DELETE CASCADE,
                service_id INTEGER NOT NULL REFERENCES services(id),
                PRIMARY KEY (appointment_id, service_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_customers_email ON customers(email)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_pets_customer_id ON pets(customer_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_appointments_pet_id ON appointments(pet_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Parse a price column stored as TEXT back into a `Decimal`
pub(crate) fn decimal_from_text(raw: &str, column: &str) -> AppResult<Decimal> {
    Decimal::from_str(raw)
        .map_err(|e| AppError::database(format!("Invalid decimal in column {column}: {e}")))
}
