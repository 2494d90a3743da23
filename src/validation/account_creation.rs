//! Account Creation Validator
//!
//! Account type legality and per-client type uniqueness.

use uuid::Uuid;

use crate::domain::DomainError;
use crate::error::AppError;
use crate::store::LedgerTx;

/// Comparison key for account types (case-insensitive, locale independent)
pub fn account_type_key(account_type: &str) -> String {
    account_type.trim().to_lowercase()
}

/// Trim the requested type and check it against the configured catalogue.
///
/// Returns the trimmed value with its original casing.
pub fn validate_and_normalize_account_type(
    account_type: &str,
    valid_types: &[String],
) -> Result<String, DomainError> {
    let trimmed = account_type.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_request("Account type cannot be empty."));
    }

    if valid_types.is_empty() {
        return Err(DomainError::NoAccountTypesConfigured);
    }

    let key = account_type_key(trimmed);
    if !valid_types.iter().any(|valid| account_type_key(valid) == key) {
        return Err(DomainError::InvalidAccountType {
            given: trimmed.to_string(),
            allowed: valid_types.to_vec(),
        });
    }

    Ok(trimmed.to_string())
}

pub async fn validate_client_exists<T: LedgerTx>(tx: &mut T, client_id: Uuid) -> Result<(), AppError> {
    if client_id.is_nil() {
        return Err(DomainError::invalid_request("Client ID cannot be empty.").into());
    }

    if !tx.client_exists(client_id).await? {
        return Err(DomainError::ClientNotFound(client_id.to_string()).into());
    }
    Ok(())
}

pub async fn validate_no_duplicate_account_type<T: LedgerTx>(
    tx: &mut T,
    client_id: Uuid,
    normalized_type: &str,
    valid_types: &[String],
) -> Result<(), AppError> {
    let existing: Vec<String> = tx
        .accounts_for_client(client_id)
        .await?
        .into_iter()
        .map(|account| account.account_type)
        .collect();

    let key = account_type_key(normalized_type);
    if existing.iter().any(|account_type| account_type_key(account_type) == key) {
        return Err(DomainError::DuplicateAccountType {
            account_type: normalized_type.to_string(),
            existing,
            allowed: valid_types.to_vec(),
        }
        .into());
    }
    Ok(())
}
