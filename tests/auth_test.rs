// ABOUTME: Tests for password hashing and JWT token lifecycle
// ABOUTME: Covers hash/verify round trips and token validation failure modes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat
#![allow(clippy::unwrap_used)]

use chrono::Utc;
use tapcat_server::auth::{generate_jwt_secret, AuthManager};
use tapcat_server::errors::ErrorCode;
use tapcat_server::models::Customer;

fn test_customer() -> Customer {
    Customer {
        id: 7,
        name: "Ana Souza".into(),
        email: "ana@example.com".into(),
        phone: "555-0100".into(),
        address: "12 Rose St".into(),
        password_hash: String::new(),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_password_hash_and_verify_round_trip() {
    let hash = AuthManager::hash_password("correct horse battery").unwrap();
    assert_ne!(hash, "correct horse battery");

    assert!(
        AuthManager::verify_password("correct horse battery".into(), hash.clone())
            .await
            .unwrap()
    );
    assert!(
        !AuthManager::verify_password("wrong password".into(), hash)
            .await
            .unwrap()
    );
}

#[test]
fn test_token_round_trip() {
    let manager = AuthManager::new(generate_jwt_secret().to_vec(), 24);
    let customer = test_customer();

    let token = manager.generate_token(&customer).unwrap();
    let claims = manager.validate_token(&token).unwrap();

    assert_eq!(claims.sub, "7");
    assert_eq!(claims.email, "ana@example.com");
    assert!(claims.exp > claims.iat);
}

#[test]
fn test_token_from_other_secret_is_rejected() {
    let manager = AuthManager::new(generate_jwt_secret().to_vec(), 24);
    let other = AuthManager::new(generate_jwt_secret().to_vec(), 24);

    let token = other.generate_token(&test_customer()).unwrap();
    let err = manager.validate_token(&token).unwrap_err();

    assert_eq!(err.code, ErrorCode::AuthInvalid);
}

#[test]
fn test_malformed_token_is_rejected() {
    let manager = AuthManager::new(generate_jwt_secret().to_vec(), 24);

    let err = manager.validate_token("not-a-jwt").unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthInvalid);
}

#[test]
fn test_expired_token_is_rejected() {
    // negative expiry puts exp in the past
    let manager = AuthManager::new(generate_jwt_secret().to_vec(), -2);

    let token = manager.generate_token(&test_customer()).unwrap();
    let err = manager.validate_token(&token).unwrap_err();

    assert_eq!(err.code, ErrorCode::AuthInvalid);
}
