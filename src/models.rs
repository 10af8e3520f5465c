// ABOUTME: Core domain models for customers, pets, services, and appointments
// ABOUTME: Plain data structures shared by the database layer and HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat

//! Domain models
//!
//! Pure data structures without business logic. Pricing rules live in
//! [`crate::pricing`]; persistence lives under [`crate::database`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Pet species as the pricing engine sees it.
///
/// Stored species strings are free text; this closed enumeration is derived
/// at the pricing boundary. Unrecognized values fall back to [`Species::Other`]
/// and price on the weight-based tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Cat,
    Other,
}

impl Species {
    /// Normalize a raw species string. "cat" and "gato" are recognized
    /// case-insensitively; everything else is `Other`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "cat" | "gato" => Self::Cat,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cat => "cat",
            Self::Other => "other",
        }
    }
}

/// A registered customer account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Bcrypt hash, never serialized into responses
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A customer's pet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub id: i64,
    pub customer_id: i64,
    pub name: String,
    /// Free-text species, normalized via [`Species::parse`] for pricing
    pub species: String,
    /// Weight in kilograms, always positive
    pub weight_kg: f64,
    pub created_at: DateTime<Utc>,
}

impl Pet {
    /// The closed species enumeration used by the pricing calculator
    #[must_use]
    pub fn species_kind(&self) -> Species {
        Species::parse(&self.species)
    }
}

/// A grooming service catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
    /// Flat catalog price, used when the name matches no pricing keyword
    pub base_price: Decimal,
}

/// A booked appointment row as stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub pet_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub is_home_pickup: bool,
    pub is_paid_in_cash: bool,
    pub is_concluded: bool,
    /// Computed by the pricing calculator at last write, never client-supplied
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Service detail attached to an appointment read model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub id: i64,
    pub name: String,
    /// Catalog price as stored, not the tiered price actually charged
    pub price: Decimal,
}

/// An appointment with its pet, customer, and service detail resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentDetail {
    pub id: i64,
    pub scheduled_at: DateTime<Utc>,
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
