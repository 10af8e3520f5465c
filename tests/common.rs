// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database creation and entity seeding helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat
#![allow(dead_code)]

//! Shared test utilities for `tapcat_server` integration tests

use rust_decimal::Decimal;
use std::sync::Once;
use tapcat_server::database::{Database, NewCustomer, NewPet, NewService};
use tapcat_server::models::{Customer, Pet, Service};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard in-memory test database with migrated schema
pub async fn create_test_database() -> Database {
    init_test_logging();
    Database::new("sqlite::memory:")
        .await
        .expect("in-memory database")
}

/// Create a customer with the given email
pub async fn seed_customer(db: &Database, email: &str) -> Customer {
    db.customers()
        .create(&NewCustomer {
            name: "Ana Souza".into(),
            email: email.into(),
            phone: "555-0100".into(),
            address: "12 Rose St".into(),
            password_hash: "test-hash".into(),
        })
        .await
        .expect("seed customer")
}

/// Create a pet for a customer
pub async fn seed_pet(db: &Database, customer_id: i64, species: &str, weight_kg: f64) -> Pet {
    db.pets()
        .create(&NewPet {
            customer_id,
            name: "Rex".into(),
            species: species.into(),
            weight_kg,
        })
        .await
        .expect("seed pet")
}

/// Create a catalog service
pub async fn seed_service(db: &Database, name: &str, base_price: Decimal) -> Service {
    db.services()
        .create(&NewService {
            name: name.into(),
            base_price,
        })
        .await
        .expect("seed service")
}

/// Count association rows for one appointment straight off the pool
pub async fn association_count(db: &Database, appointment_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM appointment_services WHERE appointment_id = $1")
        .bind(appointment_id)
        .fetch_one(db.pool())
        .await
        .expect("association count")
}
