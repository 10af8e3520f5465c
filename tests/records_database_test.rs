// ABOUTME: Integration tests for customer, pet, and service record CRUD
// ABOUTME: Covers validation rules, cascades, and fail-fast catalog resolution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat
#![allow(clippy::unwrap_used)]

mod common;

use common::{create_test_database, seed_customer, seed_pet, seed_service};
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use tapcat_server::database::{
    CreateAppointmentRequest, NewCustomer, NewPet, UpdatePetRequest, UpdateServiceRequest,
};
use tapcat_server::errors::ErrorCode;

// ============================================================================
// Customers
// ============================================================================

#[tokio::test]
async fn test_customer_create_and_lookup() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;

    let by_id = db.customers().get(customer.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "ana@example.com");

    let by_email = db
        .customers()
        .get_by_email("ana@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, customer.id);
}

#[tokio::test]
async fn test_customer_duplicate_email_is_rejected() {
    let db = create_test_database().await;
    seed_customer(&db, "ana@example.com").await;

    let err = db
        .customers()
        .create(&NewCustomer {
            name: "Someone Else".into(),
            email: "ana@example.com".into(),
            phone: String::new(),
            address: String::new(),
            password_hash: "hash".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
}

#[tokio::test]
async fn test_customer_update_and_delete() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;

    let updated = db
        .customers()
        .update(
            customer.id,
            &tapcat_server::database::UpdateCustomerRequest {
                phone: Some("555-0199".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated);

    let reread = db.customers().get(customer.id).await.unwrap().unwrap();
    assert_eq!(reread.phone, "555-0199");
    assert_eq!(reread.name, "Ana Souza");

    assert!(db.customers().delete(customer.id).await.unwrap());
    assert!(db.customers().get(customer.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_customer_delete_cascades_to_pets() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 9.0).await;

    db.customers().delete(customer.id).await.unwrap();

    assert!(db.pets().get(pet.id).await.unwrap().is_none());
}

// ============================================================================
// Pets
// ============================================================================

#[tokio::test]
async fn test_pet_requires_existing_customer() {
    let db = create_test_database().await;

    let err = db
        .pets()
        .create(&NewPet {
            customer_id: 999,
            name: "Rex".into(),
            species: "dog".into(),
            weight_kg: 9.0,
        })
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_pet_weight_must_be_positive() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;

    let err = db
        .pets()
        .create(&NewPet {
            customer_id: customer.id,
            name: "Rex".into(),
            species: "dog".into(),
            weight_kg: 0.0,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let pet = seed_pet(&db, customer.id, "dog", 9.0).await;
    let err = db
        .pets()
        .update(
            pet.id,
            &UpdatePetRequest {
                weight_kg: Some(-1.0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_pet_update_and_delete() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 9.0).await;

    let updated = db
        .pets()
        .update(
            pet.id,
            &UpdatePetRequest {
                weight_kg: Some(11.5),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated);

    let reread = db.pets().get(pet.id).await.unwrap().unwrap();
    assert!((reread.weight_kg - 11.5).abs() < f64::EPSILON);

    assert!(db.pets().delete(pet.id).await.unwrap());
    assert!(!db.pets().delete(pet.id).await.unwrap());
}

// ============================================================================
// Services
// ============================================================================

#[tokio::test]
async fn test_service_price_must_be_positive() {
    let db = create_test_database().await;

    let err = db
        .services()
        .create(&tapcat_server::database::NewService {
            name: "Bath".into(),
            base_price: dec!(0),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let service = seed_service(&db, "Bath", dec!(20)).await;
    let err = db
        .services()
        .update(
            service.id,
            &UpdateServiceRequest {
                base_price: Some(dec!(-5)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_service_price_round_trips_exactly() {
    let db = create_test_database().await;
    let service = seed_service(&db, "Ear Cleaning", dec!(18.50)).await;

    let reread = db.services().get(service.id).await.unwrap().unwrap();
    assert_eq!(reread.base_price, dec!(18.50));
}

#[tokio::test]
async fn test_resolve_by_ids_fails_fast_on_unknown_id() {
    let db = create_test_database().await;
    let bath = seed_service(&db, "Bath", dec!(20)).await;
    let groom = seed_service(&db, "Grooming", dec!(40)).await;

    let resolved = db
        .services()
        .resolve_by_ids(&[groom.id, bath.id])
        .await
        .unwrap();
    // request order preserved
    assert_eq!(resolved[0].id, groom.id);
    assert_eq!(resolved[1].id, bath.id);

    let err = db
        .services()
        .resolve_by_ids(&[bath.id, 999])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert!(err.message.contains("999"));
}

#[tokio::test]
async fn test_referenced_service_cannot_be_deleted() {
    let db = create_test_database().await;
    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 9.0).await;
    let bath = seed_service(&db, "Bath", dec!(20)).await;

    db.appointments()
        .create(&CreateAppointmentRequest {
            pet_id: pet.id,
            scheduled_at: Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap(),
            is_home_pickup: false,
            is_paid_in_cash: false,
            service_ids: vec![bath.id],
        })
        .await
        .unwrap();

    // the association row keeps the catalog entry alive
    let err = db.services().delete(bath.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::DatabaseError);
}
