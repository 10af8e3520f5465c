// ABOUTME: Integration tests for the appointment transaction manager
// ABOUTME: Covers pricing on write, rollback, association replacement, cascade delete, loyalty
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat
#![allow(clippy::unwrap_used)]

mod common;

use common::{association_count, create_test_database, seed_customer, seed_pet, seed_service};
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use tapcat_server::database::{CreateAppointmentRequest, UpdateAppointmentRequest};
use tapcat_server::errors::ErrorCode;

fn create_request(pet_id: i64, service_ids: Vec<i64>) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        pet_id,
        scheduled_at: Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap(),
        is_home_pickup: false,
        is_paid_in_cash: false,
        service_ids,
    }
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_prices_and_links_services() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 12.0).await;
    let bath = seed_service(&db, "Bath", dec!(20)).await;
    let groom = seed_service(&db, "Grooming", dec!(40)).await;

    let detail = db
        .appointments()
        .create(&create_request(pet.id, vec![bath.id, groom.id]))
        .await
        .unwrap();

    assert_eq!(detail.total_price, dec!(145));
    assert_eq!(detail.pet_name, "Rex");
    assert_eq!(detail.customer_name, "Ana Souza");
    assert_eq!(detail.services.len(), 2);
    assert!(!detail.is_concluded);
    assert_eq!(association_count(&db, detail.id).await, 2);
}

#[tokio::test]
async fn test_create_with_pickup_and_cash_compounds_discount() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 12.0).await;
    let bath = seed_service(&db, "Bath", dec!(20)).await;
    let groom = seed_service(&db, "Grooming", dec!(40)).await;

    let mut request = create_request(pet.id, vec![bath.id, groom.id]);
    request.is_home_pickup = true;
    request.is_paid_in_cash = true;

    let detail = db.appointments().create(&request).await.unwrap();

    // (50 + 95 + 10) * 0.95
    assert_eq!(detail.total_price, dec!(147.25));
}

#[tokio::test]
async fn test_create_cat_uses_flat_tier() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "Cat", 20.0).await;
    let bath = seed_service(&db, "Bath", dec!(20)).await;

    let detail = db
        .appointments()
        .create(&create_request(pet.id, vec![bath.id]))
        .await
        .unwrap();

    assert_eq!(detail.total_price, dec!(15));
}

#[tokio::test]
async fn test_create_with_empty_service_list_writes_nothing() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 12.0).await;

    let err = db
        .appointments()
        .create(&create_request(pet.id, vec![]))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert!(db.appointments().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_with_missing_pet_writes_nothing() {
    let db = create_test_database().await;
    seed_customer(&db, "ana@example.com").await;
    let service = seed_service(&db, "Bath", dec!(20)).await;

    let err = db
        .appointments()
        .create(&create_request(999, vec![service.id]))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    assert!(db.appointments().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_with_unknown_service_id_rolls_back() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 12.0).await;
    let bath = seed_service(&db, "Bath", dec!(20)).await;

    let err = db
        .appointments()
        .create(&create_request(pet.id, vec![bath.id, 999]))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert!(err.message.contains("999"));

    // no appointment, no association rows
    assert!(db.appointments().list().await.unwrap().is_empty());
    let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM appointment_services")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(orphans, 0);
}

#[tokio::test]
async fn test_create_dedupes_repeated_service_ids() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 8.0).await;
    let bath = seed_service(&db, "Bath", dec!(20)).await;

    let detail = db
        .appointments()
        .create(&create_request(pet.id, vec![bath.id, bath.id]))
        .await
        .unwrap();

    assert_eq!(detail.services.len(), 1);
    assert_eq!(detail.total_price, dec!(30));
}

// ============================================================================
// Loyalty milestone
// ============================================================================

#[tokio::test]
async fn test_tenth_visit_deducts_bath_once() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 12.0).await;
    let nails = seed_service(&db, "Nail Care", dec!(5)).await;
    let bath = seed_service(&db, "Bath", dec!(20)).await;
    let bath_premium = seed_service(&db, "Bath Premium", dec!(35)).await;

    for _ in 0..9 {
        db.appointments()
            .create(&create_request(pet.id, vec![nails.id]))
            .await
            .unwrap();
    }

    // 10th visit: two bath services selected, one tier price deducted
    let detail = db
        .appointments()
        .create(&create_request(pet.id, vec![bath.id, bath_premium.id]))
        .await
        .unwrap();

    assert_eq!(detail.total_price, dec!(50));
}

#[tokio::test]
async fn test_tenth_visit_without_bath_gets_no_deduction() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 12.0).await;
    let nails = seed_service(&db, "Nail Care", dec!(5)).await;
    let groom = seed_service(&db, "Grooming", dec!(40)).await;

    for _ in 0..9 {
        db.appointments()
            .create(&create_request(pet.id, vec![nails.id]))
            .await
            .unwrap();
    }

    let detail = db
        .appointments()
        .create(&create_request(pet.id, vec![groom.id]))
        .await
        .unwrap();

    assert_eq!(detail.total_price, dec!(95));
}

#[tokio::test]
async fn test_visit_count_spans_all_customer_pets() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let rex = seed_pet(&db, customer.id, "dog", 12.0).await;
    let mimi = seed_pet(&db, customer.id, "cat", 4.0).await;
    let nails = seed_service(&db, "Nail Care", dec!(5)).await;
    let bath = seed_service(&db, "Bath", dec!(20)).await;

    for _ in 0..9 {
        db.appointments()
            .create(&create_request(rex.id, vec![nails.id]))
            .await
            .unwrap();
    }

    // the cat's visit is still the customer's 10th
    let detail = db
        .appointments()
        .create(&create_request(mimi.id, vec![bath.id]))
        .await
        .unwrap();

    assert_eq!(detail.total_price, dec!(0));
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_replaces_association_set() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 12.0).await;
    let bath = seed_service(&db, "Bath", dec!(20)).await;
    let groom = seed_service(&db, "Grooming", dec!(40)).await;
    let nails = seed_service(&db, "Nail Care", dec!(5)).await;

    let detail = db
        .appointments()
        .create(&create_request(pet.id, vec![bath.id, groom.id]))
        .await
        .unwrap();

    db.appointments()
        .update(
            detail.id,
            &UpdateAppointmentRequest {
                service_ids: Some(vec![groom.id, nails.id]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let updated = db.appointments().get(detail.id).await.unwrap().unwrap();
    let ids: Vec<i64> = updated.services.iter().map(|s| s.id).collect();
    assert!(ids.contains(&groom.id));
    assert!(ids.contains(&nails.id));
    assert!(!ids.contains(&bath.id));
    assert_eq!(updated.total_price, dec!(100));
}

#[tokio::test]
async fn test_update_flag_change_recomputes_price() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 12.0).await;
    let bath = seed_service(&db, "Bath", dec!(20)).await;

    let detail = db
        .appointments()
        .create(&create_request(pet.id, vec![bath.id]))
        .await
        .unwrap();
    assert_eq!(detail.total_price, dec!(50));

    // no service change, but the cash flag is pricing-relevant
    db.appointments()
        .update(
            detail.id,
            &UpdateAppointmentRequest {
                is_paid_in_cash: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let updated = db.appointments().get(detail.id).await.unwrap().unwrap();
    assert_eq!(updated.total_price, dec!(47.50));
}

#[tokio::test]
async fn test_update_without_pricing_fields_keeps_price() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 12.0).await;
    let bath = seed_service(&db, "Bath", dec!(20)).await;

    let detail = db
        .appointments()
        .create(&create_request(pet.id, vec![bath.id]))
        .await
        .unwrap();

    db.appointments()
        .update(
            detail.id,
            &UpdateAppointmentRequest {
                scheduled_at: Some(Utc.with_ymd_and_hms(2025, 4, 1, 9, 30, 0).unwrap()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let updated = db.appointments().get(detail.id).await.unwrap().unwrap();
    assert_eq!(updated.total_price, dec!(50));
}

#[tokio::test]
async fn test_update_with_empty_service_list_is_rejected() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 12.0).await;
    let bath = seed_service(&db, "Bath", dec!(20)).await;

    let detail = db
        .appointments()
        .create(&create_request(pet.id, vec![bath.id]))
        .await
        .unwrap();

    let err = db
        .appointments()
        .update(
            detail.id,
            &UpdateAppointmentRequest {
                service_ids: Some(vec![]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert_eq!(association_count(&db, detail.id).await, 1);
}

#[tokio::test]
async fn test_update_missing_appointment_not_found() {
    let db = create_test_database().await;

    let err = db
        .appointments()
        .update(
            999,
            &UpdateAppointmentRequest {
                is_home_pickup: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_update_unknown_service_id_rolls_back_association_set() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 12.0).await;
    let bath = seed_service(&db, "Bath", dec!(20)).await;

    let detail = db
        .appointments()
        .create(&create_request(pet.id, vec![bath.id]))
        .await
        .unwrap();

    let err = db
        .appointments()
        .update(
            detail.id,
            &UpdateAppointmentRequest {
                service_ids: Some(vec![999]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    // the original association set survives the failed replacement
    let unchanged = db.appointments().get(detail.id).await.unwrap().unwrap();
    assert_eq!(unchanged.services.len(), 1);
    assert_eq!(unchanged.services[0].id, bath.id);
}

#[tokio::test]
async fn test_concluded_appointment_cannot_be_reopened() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 12.0).await;
    let bath = seed_service(&db, "Bath", dec!(20)).await;

    let detail = db
        .appointments()
        .create(&create_request(pet.id, vec![bath.id]))
        .await
        .unwrap();

    db.appointments()
        .update(
            detail.id,
            &UpdateAppointmentRequest {
                is_concluded: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = db
        .appointments()
        .update(
            detail.id,
            &UpdateAppointmentRequest {
                is_concluded: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_removes_appointment_and_associations() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 12.0).await;
    let bath = seed_service(&db, "Bath", dec!(20)).await;
    let groom = seed_service(&db, "Grooming", dec!(40)).await;

    let detail = db
        .appointments()
        .create(&create_request(pet.id, vec![bath.id, groom.id]))
        .await
        .unwrap();

    db.appointments().delete(detail.id).await.unwrap();

    assert!(db.appointments().get(detail.id).await.unwrap().is_none());
    assert_eq!(association_count(&db, detail.id).await, 0);
}

#[tokio::test]
async fn test_delete_missing_appointment_not_found() {
    let db = create_test_database().await;

    let err = db.appointments().delete(999).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

// ============================================================================
// Query surface
// ============================================================================

#[tokio::test]
async fn test_list_returns_joined_detail() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 8.0).await;
    let bath = seed_service(&db, "Bath", dec!(20)).await;
    let nails = seed_service(&db, "Nail Care", dec!(5)).await;

    db.appointments()
        .create(&create_request(pet.id, vec![bath.id]))
        .await
        .unwrap();
    db.appointments()
        .create(&create_request(pet.id, vec![bath.id, nails.id]))
        .await
        .unwrap();

    let all = db.appointments().list().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].customer_name, "Ana Souza");
    assert_eq!(all[0].services.len(), 1);
    assert_eq!(all[1].services.len(), 2);
}

#[tokio::test]
async fn test_stored_price_is_not_recomputed_on_read() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 8.0).await;
    let bath = seed_service(&db, "Bath", dec!(20)).await;

    let detail = db
        .appointments()
        .create(&create_request(pet.id, vec![bath.id]))
        .await
        .unwrap();
    assert_eq!(detail.total_price, dec!(30));

    // catalog changes after booking do not move the stored total
    db.services()
        .update(
            bath.id,
            &tapcat_server::database::UpdateServiceRequest {
                name: Some("Spa Day".into()),
                base_price: Some(dec!(200)),
            },
        )
        .await
        .unwrap();

    let reread = db.appointments().get(detail.id).await.unwrap().unwrap();
    assert_eq!(reread.total_price, dec!(30));
}
