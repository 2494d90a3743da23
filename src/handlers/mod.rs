//! Command Handlers module
//!
//! Orchestrators that sequence validation, computation and persistence for
//! one user-facing operation inside one unit of work.

mod account_handler;
mod client_handler;
mod commands;
mod transaction_handler;

#[cfg(test)]
mod tests;

use std::future::Future;
use std::time::Duration;

use crate::error::AppError;

pub use account_handler::CreateAccountHandler;
pub use client_handler::CreateClientHandler;
pub use commands::*;
pub use transaction_handler::TransactionHandler;

/// Attempts per operation when balance writes hit a version conflict
pub const MAX_ATTEMPTS: u32 = 3;

/// Re-run a whole unit of work while it fails on an optimistic version
/// conflict. Every other error is returned as is.
pub(crate) async fn retry_on_conflict<T, F, Fut>(operation: &str, mut attempt_once: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    for attempt in 0..MAX_ATTEMPTS {
        match attempt_once().await {
            Err(e) if e.is_version_conflict() => {
                if attempt + 1 < MAX_ATTEMPTS {
                    tracing::warn!(
                        operation,
                        "Concurrency conflict, retrying (attempt {}/{})",
                        attempt + 1,
                        MAX_ATTEMPTS
                    );
                    let delay = Duration::from_millis(50 * (attempt as u64 + 1));
                    tokio::time::sleep(delay).await;
                }
            }
            result => return result,
        }
    }

    tracing::warn!(operation, "Concurrency conflict persisted after {} attempts", MAX_ATTEMPTS);
    Err(AppError::VersionConflict)
}
