// ABOUTME: Concurrency test for the loyalty milestone discount
// ABOUTME: Two simultaneous 10th-visit creations must yield at most one discount
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat
#![allow(clippy::unwrap_used)]

mod common;

use common::{init_test_logging, seed_customer, seed_pet, seed_service};
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use tapcat_server::database::{CreateAppointmentRequest, Database};

/// Two concurrent creates both targeting the customer's 10th visit. SQLite's
/// single-writer discipline plus whole-transaction retry means the loser
/// re-reads the visit count after the winner commits, so exactly one of the
/// two appointments is priced with the free-bath deduction.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tenth_visit_grants_single_discount() {
    init_test_logging();

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tapcat-test.db");
    let db = Database::new(&format!("sqlite:{}", db_path.display()))
        .await
        .unwrap();

    let customer = seed_customer(&db, "ana@example.com").await;
    let pet = seed_pet(&db, customer.id, "dog", 12.0).await;
    let nails = seed_service(&db, "Nail Care", dec!(5)).await;
    let bath = seed_service(&db, "Bath", dec!(20)).await;

    for _ in 0..9 {
        db.appointments()
            .create(&CreateAppointmentRequest {
                pet_id: pet.id,
                scheduled_at: Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap(),
                is_home_pickup: false,
                is_paid_in_cash: false,
                service_ids: vec![nails.id],
            })
            .await
            .unwrap();
    }

    let request = CreateAppointmentRequest {
        pet_id: pet.id,
        scheduled_at: Utc.with_ymd_and_hms(2025, 3, 21, 10, 0, 0).unwrap(),
        is_home_pickup: false,
        is_paid_in_cash: false,
        service_ids: vec![bath.id],
    };

    let db_a = db.clone();
    let db_b = db.clone();
    let request_a = request.clone();
    let request_b = request;

    let task_a = tokio::spawn(async move { db_a.appointments().create(&request_a).await });
    let task_b = tokio::spawn(async move { db_b.appointments().create(&request_b).await });

    let detail_a = task_a.await.unwrap().unwrap();
    let detail_b = task_b.await.unwrap().unwrap();

    let mut totals = vec![detail_a.total_price, detail_b.total_price];
    totals.sort();

    // the 10th visit baths for free, the 11th pays full tier price
    assert_eq!(totals, vec![dec!(0), dec!(50)]);

    let all = db.appointments().list().await.unwrap();
    assert_eq!(all.len(), 11);
}
