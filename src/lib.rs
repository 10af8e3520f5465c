// ABOUTME: Main library entry point for the Tapcat grooming appointment API
// ABOUTME: Booking and pricing engine plus customer, pet, and service record surfaces
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat

#![deny(unsafe_code)]

//! # Tapcat Server
//!
//! A REST API for a pet-grooming business: customers register and log in,
//! record their pets, and book appointments against a service catalog.
//!
//! The core of the server is the appointment booking engine. Given a pet and
//! a set of services, it prices the visit (species- and weight-tiered
//! service prices, home-pickup surcharge, cash discount, every-10th-visit
//! loyalty deduction) and persists the appointment together with its service
//! associations in a single transaction.
//!
//! ## Architecture
//!
//! - **models**: Domain data structures
//! - **pricing**: Pure pricing calculator
//! - **database**: `SQLite` persistence with per-entity managers; the
//!   appointments manager owns the transactional core
//! - **routes**: Axum HTTP surface
//! - **auth**: Customer JWT issuance and password hashing
//! - **config** / **logging** / **errors**: server plumbing

/// Authentication and session management
pub mod auth;

/// Configuration management
pub mod config;

/// `SQLite` persistence and the appointment transaction manager
pub mod database;

/// Unified error handling with standard error codes and HTTP responses
pub mod errors;

/// Server health reporting
pub mod health;

/// Logging configuration and structured logging setup
pub mod logging;

/// Core domain models
pub mod models;

/// Appointment pricing rules
pub mod pricing;

/// HTTP routes
pub mod routes;
