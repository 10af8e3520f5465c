// ABOUTME: Appointment booking engine - transactional create/update/delete plus read surface
// ABOUTME: Owns pricing orchestration, loyalty counting, and association-set replacement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat

//! Appointment transaction manager
//!
//! Create, update, and delete each run inside a single `SQLite` transaction
//! spanning the loyalty visit count, the appointment row, and its service
//! association rows. Either everything commits or nothing does. Writers are
//! wrapped in [`txn::retry_busy`] so a transaction that loses the write race
//! re-runs against the winner's committed state; this is what keeps the
//! every-10th-visit discount from being granted twice under concurrency.

use super::txn;
use crate::database::{decimal_from_text, services};
use crate::errors::{AppError, AppResult};
use crate::models::{AppointmentDetail, Service, ServiceSummary, Species};
use crate::pricing::{self, PricingContext};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use tracing::info;

/// Request to book a new appointment
#[derive(Debug, Clone)]
pub struct CreateAppointmentRequest {
    pub pet_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub is_home_pickup: bool,
    pub is_paid_in_cash: bool,
    pub service_ids: Vec<i64>,
}

/// Partial update for an existing appointment.
///
/// Supplying `service_ids` replaces the entire association set. The total
/// price is recomputed whenever any pricing-relevant field is present
/// (`service_ids`, `is_home_pickup`, `is_paid_in_cash`, `pet_id`).
#[derive(Debug, Clone, Default)]
pub struct UpdateAppointmentRequest {
    pub pet_id: Option<i64>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub is_home_pickup: Option<bool>,
    pub is_paid_in_cash: Option<bool>,
    pub is_concluded: Option<bool>,
    pub service_ids: Option<Vec<i64>>,
}

impl UpdateAppointmentRequest {
    /// Whether this patch touches any field the price depends on
    fn changes_pricing(&self) -> bool {
        self.service_ids.is_some()
            || self.is_home_pickup.is_some()
            || self.is_paid_in_cash.is_some()
            || self.pet_id.is_some()
    }
}

/// Pet context needed to price an appointment
struct PricingPet {
    pet_id: i64,
    customer_id: i64,
    species: Species,
    weight_kg: f64,
}

/// A stored appointment row, as loaded inside an update transaction
struct AppointmentRow {
    pet_id: i64,
    scheduled_at: DateTime<Utc>,
    is_home_pickup: bool,
    is_paid_in_cash: bool,
    is_concluded: bool,
    total_price: Decimal,
}

/// Appointment database operations manager
pub struct AppointmentsManager {
    pool: SqlitePool,
}

impl AppointmentsManager {
    /// Create a new appointments manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Book an appointment: resolve the pet and services, price the visit,
    /// and persist the appointment with its association rows atomically.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty or unresolvable service set,
    /// not-found for a missing pet, or a database error after rollback
    pub async fn create(
        &self,
        request: &CreateAppointmentRequest,
    ) -> AppResult<AppointmentDetail> {
        if request.service_ids.is_empty() {
            return Err(AppError::invalid_input("Select at least one service"));
        }
        let service_ids = dedup_preserving_order(&request.service_ids);

        let service_ids = &service_ids;
        let appointment_id = txn::retry_busy(
            || async move {
                let mut tx = self
                    .pool
                    .begin()
                    .await
                    .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

                let pet = fetch_pricing_pet(&mut tx, request.pet_id).await?;
                let prior_visits = count_customer_appointments(&mut tx, pet.customer_id).await?;
                let selected = services::resolve_by_ids(&mut *tx, service_ids).await?;

                let total_price = pricing::quote_total(
                    &selected,
                    &PricingContext {
                        species: pet.species,
                        weight_kg: pet.weight_kg,
                        is_home_pickup: request.is_home_pickup,
                        is_paid_in_cash: request.is_paid_in_cash,
                        is_free_milestone_visit: pricing::is_milestone_visit(prior_visits),
                    },
                );

                let result = sqlx::query(
                    r"
                    INSERT INTO appointments
                        (pet_id, scheduled_at, is_home_pickup, is_paid_in_cash, is_concluded, total_price)
                    VALUES ($1, $2, $3, $4, 0, $5)
                    ",
                )
                .bind(pet.pet_id)
                .bind(request.scheduled_at)
                .bind(request.is_home_pickup)
                .bind(request.is_paid_in_cash)
                .bind(total_price.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to insert appointment: {e}")))?;

                let appointment_id = result.last_insert_rowid();
                insert_associations(&mut tx, appointment_id, service_ids).await?;

                tx.commit()
                    .await
                    .map_err(|e| AppError::database(format!("Failed to commit appointment: {e}")))?;

                info!(
                    appointment.id = appointment_id,
                    customer.id = pet.customer_id,
                    total = %total_price,
                    milestone = pricing::is_milestone_visit(prior_visits),
                    "Appointment created"
                );

                Ok(appointment_id)
            },
            txn::DEFAULT_TXN_RETRIES,
        )
        .await?;

        self.get(appointment_id).await?.ok_or_else(|| {
            AppError::internal(format!("Appointment {appointment_id} vanished after commit"))
        })
    }

    /// Apply a partial update. Supplying `service_ids` replaces the whole
    /// association set; any pricing-relevant change recomputes the total.
    ///
    /// # Errors
    ///
    /// Returns not-found for a missing appointment or pet, a validation
    /// error for an empty replacement service set or an attempt to reopen a
    /// concluded appointment, or a database error after rollback
    pub async fn update(
        &self,
        appointment_id: i64,
        request: &UpdateAppointmentRequest,
    ) -> AppResult<()> {
        if let Some(ids) = &request.service_ids {
            if ids.is_empty() {
                return Err(AppError::invalid_input("Select at least one service"));
            }
        }

        txn::retry_busy(
            || async move {
                let mut tx = self
                    .pool
                    .begin()
                    .await
                    .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

                let existing = fetch_appointment_row(&mut tx, appointment_id)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Appointment {appointment_id}")))?;

                if existing.is_concluded && request.is_concluded == Some(false) {
                    return Err(AppError::invalid_input(
                        "Concluded appointments cannot be reopened",
                    ));
                }

                let pet_id = request.pet_id.unwrap_or(existing.pet_id);
                let pet = fetch_pricing_pet(&mut tx, pet_id).await?;

                let scheduled_at = request.scheduled_at.unwrap_or(existing.scheduled_at);
                let is_home_pickup = request.is_home_pickup.unwrap_or(existing.is_home_pickup);
                let is_paid_in_cash = request.is_paid_in_cash.unwrap_or(existing.is_paid_in_cash);
                let is_concluded = request.is_concluded.unwrap_or(existing.is_concluded);

                let total_price = if request.changes_pricing() {
                    let selected = if let Some(ids) = &request.service_ids {
                        let service_ids = dedup_preserving_order(ids);
                        let selected = services::resolve_by_ids(&mut *tx, &service_ids).await?;

                        sqlx::query("DELETE FROM appointment_services WHERE appointment_id = $1")
                            .bind(appointment_id)
                            .execute(&mut *tx)
                            .await
                            .map_err(|e| {
                                AppError::database(format!(
                                    "Failed to clear appointment services: {e}"
                                ))
                            })?;
                        insert_associations(&mut tx, appointment_id, &service_ids).await?;

                        selected
                    } else {
                        fetch_appointment_services(&mut tx, appointment_id).await?
                    };

                    let prior_visits =
                        count_customer_appointments(&mut tx, pet.customer_id).await?;

                    pricing::quote_total(
                        &selected,
                        &PricingContext {
                            species: pet.species,
                            weight_kg: pet.weight_kg,
                            is_home_pickup,
                            is_paid_in_cash,
                            is_free_milestone_visit: pricing::is_milestone_visit(prior_visits),
                        },
                    )
                } else {
                    existing.total_price
                };

                sqlx::query(
                    r"
                    UPDATE appointments SET
                        pet_id = $2,
                        scheduled_at = $3,
                        is_home_pickup = $4,
                        is_paid_in_cash = $5,
                        is_concluded = $6,
                        total_price = $7,
                        updated_at = CURRENT_TIMESTAMP
                    WHERE id = $1
                    ",
                )
                .bind(appointment_id)
                .bind(pet.pet_id)
                .bind(scheduled_at)
                .bind(is_home_pickup)
                .bind(is_paid_in_cash)
                .bind(is_concluded)
                .bind(total_price.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to update appointment: {e}")))?;

                tx.commit().await.map_err(|e| {
                    AppError::database(format!("Failed to commit appointment update: {e}"))
                })?;

                info!(
                    appointment.id = appointment_id,
                    total = %total_price,
                    repriced = request.changes_pricing(),
                    "Appointment updated"
                );

                Ok(())
            },
            txn::DEFAULT_TXN_RETRIES,
        )
        .await
    }

    /// Delete an appointment and its association rows in one transaction
    ///
    /// # Errors
    ///
    /// Returns not-found for a missing appointment, or a database error
    /// after rollback
    pub async fn delete(&self, appointment_id: i64) -> AppResult<()> {
        txn::retry_busy(
            || async move {
                let mut tx = self
                    .pool
                    .begin()
                    .await
                    .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

                sqlx::query("DELETE FROM appointment_services WHERE appointment_id = $1")
                    .bind(appointment_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        AppError::database(format!("Failed to delete appointment services: {e}"))
                    })?;

                let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
                    .bind(appointment_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        AppError::database(format!("Failed to delete appointment: {e}"))
                    })?;

                if result.rows_affected() == 0 {
                    return Err(AppError::not_found(format!("Appointment {appointment_id}")));
                }

                tx.commit().await.map_err(|e| {
                    AppError::database(format!("Failed to commit appointment delete: {e}"))
                })?;

                info!(appointment.id = appointment_id, "Appointment deleted");

                Ok(())
            },
            txn::DEFAULT_TXN_RETRIES,
        )
        .await
    }

    /// Fetch one appointment with pet, customer, and service detail
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, appointment_id: i64) -> AppResult<Option<AppointmentDetail>> {
        let sql = format!("{DETAIL_SELECT} WHERE a.id = $1");
        let row = sqlx::query(&sql)
            .bind(appointment_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to get appointment {appointment_id}: {e}"))
            })?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut detail = row_to_detail(&row)?;
        detail.services = self
            .services_for(&[appointment_id])
            .await?
            .remove(&appointment_id)
            .unwrap_or_default();

        Ok(Some(detail))
    }

    /// List all appointments with pet, customer, and service detail
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list(&self) -> AppResult<Vec<AppointmentDetail>> {
        let sql = format!("{DETAIL_SELECT} ORDER BY a.id");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list appointments: {e}")))?;

        let mut details = rows
            .iter()
            .map(row_to_detail)
            .collect::<AppResult<Vec<_>>>()?;

        let ids: Vec<i64> = details.iter().map(|d| d.id).collect();
        let mut services = self.services_for(&ids).await?;
        for detail in &mut details {
            detail.services = services.remove(&detail.id).unwrap_or_default();
        }

        Ok(details)
    }

    /// Fetch service detail for a set of appointments, grouped by appointment id
    async fn services_for(
        &self,
        appointment_ids: &[i64],
    ) -> AppResult<HashMap<i64, Vec<ServiceSummary>>> {
        if appointment_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = appointment_ids
            .iter()
            .map(|_| "?")
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r"
            SELECT aps.appointment_id, s.id, s.name, s.base_price
            FROM appointment_services aps
            JOIN services s ON aps.service_id = s.id
            WHERE aps.appointment_id IN ({placeholders})
            ORDER BY aps.appointment_id, s.id
            "
        );

        let mut query = sqlx::query(&sql);
        for id in appointment_ids {
            query = query.bind(id);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to fetch appointment services: {e}")))?;

        let mut grouped: HashMap<i64, Vec<ServiceSummary>> = HashMap::new();
        for row in &rows {
            let appointment_id: i64 = row.get("appointment_id");
            let base_price: String = row.get("base_price");
            grouped.entry(appointment_id).or_default().push(ServiceSummary {
                id: row.get("id"),
                name: row.get("name"),
                price: decimal_from_text(&base_price, "base_price")?,
            });
        }

        Ok(grouped)
    }
}

/// Shared SELECT for the joined appointment read model
const DETAIL_SELECT: &str = r"
    SELECT a.id, a.scheduled_at, a.is_home_pickup, a.is_paid_in_cash, a.is_concluded,
           a.total_price, p.id AS pet_id, p.name AS pet_name,
           c.id AS customer_id, c.name AS customer_name
    FROM appointments a
    JOIN pets p ON a.pet_id = p.id
    JOIN customers c ON p.customer_id = c.id
";

/// Count a customer's existing appointments across all their pets.
///
/// Runs on the transaction's own connection so the count and the write that
/// follows observe the same snapshot.
async fn count_customer_appointments(
    tx: &mut Transaction<'_, Sqlite>,
    customer_id: i64,
) -> AppResult<i64> {
    sqlx::query_scalar(
        r"
        SELECT COUNT(*)
        FROM appointments a
        JOIN pets p ON a.pet_id = p.id
        WHERE p.customer_id = $1
        ",
    )
    .bind(customer_id)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| AppError::database(format!("Failed to count customer appointments: {e}")))
}

/// Resolve the pet (and its owning customer) an appointment is priced for
async fn fetch_pricing_pet(
    tx: &mut Transaction<'_, Sqlite>,
    pet_id: i64,
) -> AppResult<PricingPet> {
    let row = sqlx::query("SELECT id, customer_id, species, weight_kg FROM pets WHERE id = $1")
        .bind(pet_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to fetch pet {pet_id}: {e}")))?
        .ok_or_else(|| AppError::not_found(format!("Pet {pet_id}")))?;

    let species: String = row.get("species");
    Ok(PricingPet {
        pet_id: row.get("id"),
        customer_id: row.get("customer_id"),
        species: Species::parse(&species),
        weight_kg: row.get("weight_kg"),
    })
}

/// Load a stored appointment row for update
async fn fetch_appointment_row(
    tx: &mut Transaction<'_, Sqlite>,
    appointment_id: i64,
) -> AppResult<Option<AppointmentRow>> {
    let row = sqlx::query(
        r"
        SELECT pet_id, scheduled_at, is_home_pickup, is_paid_in_cash, is_concluded, total_price
        FROM appointments WHERE id = $1
        ",
    )
    .bind(appointment_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| AppError::database(format!("Failed to fetch appointment: {e}")))?;

    let Some(row) = row else {
        return Ok(None);
    };

    let total_price: String = row.get("total_price");
    Ok(Some(AppointmentRow {
        pet_id: row.get("pet_id"),
        scheduled_at: row.get("scheduled_at"),
        is_home_pickup: row.get("is_home_pickup"),
        is_paid_in_cash: row.get("is_paid_in_cash"),
        is_concluded: row.get("is_concluded"),
        total_price: decimal_from_text(&total_price, "total_price")?,
    }))
}

/// Load the current service set of an appointment, for repricing when the
/// association set is not being replaced
async fn fetch_appointment_services(
    tx: &mut Transaction<'_, Sqlite>,
    appointment_id: i64,
) -> AppResult<Vec<Service>> {
    let rows = sqlx::query(
        r"
        SELECT s.id, s.name, s.base_price
        FROM appointment_services aps
        JOIN services s ON aps.service_id = s.id
        WHERE aps.appointment_id = $1
        ORDER BY s.id
        ",
    )
    .bind(appointment_id)
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| AppError::database(format!("Failed to fetch appointment services: {e}")))?;

    rows.iter().map(services::row_to_service).collect()
}

/// Insert one association row per selected service id
async fn insert_associations(
    tx: &mut Transaction<'_, Sqlite>,
    appointment_id: i64,
    service_ids: &[i64],
) -> AppResult<()> {
    for service_id in service_ids {
        sqlx::query(
            "INSERT INTO appointment_services (appointment_id, service_id) VALUES ($1, $2)",
        )
        .bind(appointment_id)
        .bind(service_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            AppError::database(format!(
                "Failed to link service {service_id} to appointment {appointment_id}: {e}"
            ))
        })?;
    }
    Ok(())
}

/// Drop duplicate ids, keeping first occurrences in request order
fn dedup_preserving_order(ids: &[i64]) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Convert a joined database row to an `AppointmentDetail` (services attached separately)
fn row_to_detail(row: &sqlx::sqlite::SqliteRow) -> AppResult<AppointmentDetail> {
    let total_price: String = row.get("total_price");
    Ok(AppointmentDetail {
        id: row.get("id"),
        scheduled_at: row.get("scheduled_at"),
        is_home_pickup: row.get("is_home_pickup"),
        is_paid_in_cash: row.get("is_paid_in_cash"),
        is_concluded: row.get("is_concluded"),
        total_price: decimal_from_text(&total_price, "total_price")?,
        pet_id: row.get("pet_id"),
        pet_name: row.get("pet_name"),
        customer_id: row.get("customer_id"),
        customer_name: row.get("customer_name"),
        services: Vec::new(),
    })
}
