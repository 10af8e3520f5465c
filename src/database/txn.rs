// ABOUTME: Retry helper for transactional writes against SQLite
// ABOUTME: Re-runs whole-transaction closures on transient busy/locked errors with backoff
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tapcat

//! Transaction retry discipline
//!
//! `SQLite` serializes writers; a transaction that loses the race observes a
//! busy, locked, or stale-snapshot error. Wrapping the whole closure in
//! [`retry_busy`] makes the loser re-run from the top, so reads made inside
//! the transaction (notably the loyalty visit count) are taken again against
//! the winner's committed state. Non-transient errors propagate immediately.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, warn};

use crate::errors::AppResult;

/// Default retry attempts for appointment transactions
pub const DEFAULT_TXN_RETRIES: u32 = 5;

/// Retry a transaction closure on transient `SQLite` contention errors.
///
/// The closure must begin and commit its own transaction; an uncommitted
/// `sqlx::Transaction` rolls back when dropped, so a failed attempt leaves
/// no partial state behind before the next run.
///
/// # Errors
///
/// Returns the last error if the operation failed after `max_retries`
/// attempts, or the first non-retryable error encountered
pub async fn retry_busy<F, Fut, T>(mut f: F, max_retries: u32) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempts = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempts += 1;
                if attempts >= max_retries {
                    error!(
                        attempts = attempts,
                        error = %e,
                        "Transaction failed after max retries"
                    );
                    return Err(e);
                }

                if is_retryable(&e.message) {
                    // Exponential backoff: 10ms, 20ms, 40ms, ...
                    let backoff_ms = 10 * (1 << attempts);
                    warn!(
                        attempt = attempts,
                        backoff_ms = backoff_ms,
                        error = %e,
                        "Transaction hit contention, retrying after backoff"
                    );
                    sleep(Duration::from_millis(backoff_ms)).await;
                } else {
                    return Err(e);
                }
            }
        }
    }
}

/// Whether an error message indicates transient `SQLite` contention
fn is_retryable(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("database is locked")
        || lower.contains("busy")
        || lower.contains("snapshot")
        || lower.contains("timed out")
}
