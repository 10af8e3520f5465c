// ABOUTME: Pure pricing calculator for appointment totals
// ABOUTME: Species/weight-tiered service prices, pickup surcharge, cash discount, loyalty deduction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat

//! Appointment pricing
//!
//! A pure function of the selected services and the pet/payment context.
//! Service names select a tier by keyword: "bath" prices on the bath tier,
//! "groom" or "clip" on the grooming tier, anything else at the catalog
//! price. Every 10th visit of a customer earns one free bath-tier deduction
//! when a bath service is selected.
//!
//! Application order matters and is covered by tests: tier sum, milestone
//! deduction, home-pickup surcharge, then the cash multiplier last so it
//! compounds over the surcharge.

use crate::models::{Service, Species};
use rust_decimal::Decimal;

/// Flat surcharge added when the pet is picked up at home
const HOME_PICKUP_SURCHARGE: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Multiplier applied to the running total for cash payments (5% off)
const CASH_MULTIPLIER: Decimal = Decimal::from_parts(95, 0, 0, false, 2);

/// Pricing tier selected from a service's name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceTier {
    /// Name contains "bath"
    Bath,
    /// Name contains "groom" or "clip"
    Grooming,
    /// No keyword match; the catalog price applies
    Flat,
}

impl ServiceTier {
    /// Classify a service name, case-insensitively
    #[must_use]
    pub fn classify(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains("bath") {
            Self::Bath
        } else if name.contains("groom") || name.contains("clip") {
            Self::Grooming
        } else {
            Self::Flat
        }
    }
}

/// Pet and payment context an appointment is priced under
#[derive(Debug, Clone, Copy)]
pub struct PricingContext {
    pub species: Species,
    pub weight_kg: f64,
    pub is_home_pickup: bool,
    pub is_paid_in_cash: bool,
    /// Supplied by the loyalty counter; grants one free bath-tier deduction
    pub is_free_milestone_visit: bool,
}

/// Whether the appointment being created or updated is a milestone visit
/// (the customer's 10th, 20th, ... appointment)
#[must_use]
pub const fn is_milestone_visit(prior_appointment_count: i64) -> bool {
    (prior_appointment_count + 1) % 10 == 0
}

/// Bath-tier price for a pet: cats are flat, others tier on weight
fn bath_price(species: Species, weight_kg: f64) -> Decimal {
    match species {
        Species::Cat => Decimal::from(15),
        Species::Other => {
            if weight_kg <= 10.0 {
                Decimal::from(30)
            } else {
                Decimal::from(50)
            }
        }
    }
}

/// Grooming-tier price for a pet
fn grooming_price(species: Species, weight_kg: f64) -> Decimal {
    match species {
        Species::Cat => Decimal::from(25),
        Species::Other => {
            if weight_kg <= 10.0 {
                Decimal::from(75)
            } else {
                Decimal::from(95)
            }
        }
    }
}

/// Compute the total price for a set of resolved services.
///
/// Deterministic for identical inputs. The milestone deduction is applied at
/// most once, regardless of how many bath services were selected. No floor
/// is enforced; under the current tiers the deduction can never exceed the
/// bath price already summed.
#[must_use]
pub fn quote_total(services: &[Service], ctx: &PricingContext) -> Decimal {
    let mut total = Decimal::ZERO;
    let mut has_bath = false;

    for service in services {
        match ServiceTier::classify(&service.name) {
            ServiceTier::Bath => {
                has_bath = true;
                total += bath_price(ctx.species, ctx.weight_kg);
            }
            ServiceTier::Grooming => {
                total += grooming_price(ctx.species, ctx.weight_kg);
            }
            ServiceTier::Flat => {
                total += service.base_price;
            }
        }
    }

    if ctx.is_free_milestone_visit && has_bath {
        total -= bath_price(ctx.species, ctx.weight_kg);
    }

    if ctx.is_home_pickup {
        total += HOME_PICKUP_SURCHARGE;
    }

    if ctx.is_paid_in_cash {
        total *= CASH_MULTIPLIER;
    }

    total
}
