//! Client onboarding validation

use crate::domain::DomainError;
use crate::error::AppError;
use crate::store::LedgerTx;

/// Minimum tax id length after normalization
pub const MIN_TAX_ID_LENGTH: usize = 5;

/// Strip spaces and dashes, then enforce length and charset.
///
/// `"123-456-789"` becomes `"123456789"`.
pub fn normalize_tax_id(raw: &str) -> Result<String, DomainError> {
    if raw.trim().is_empty() {
        return Err(DomainError::InvalidTaxId("Tax ID cannot be empty.".to_string()));
    }

    let normalized: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if normalized.chars().count() < MIN_TAX_ID_LENGTH {
        return Err(DomainError::InvalidTaxId(format!(
            "Tax ID must be at least {} characters long.",
            MIN_TAX_ID_LENGTH
        )));
    }

    if !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(DomainError::InvalidTaxId(
            "Tax ID can only contain letters and numbers.".to_string(),
        ));
    }

    Ok(normalized)
}

pub async fn validate_tax_id_not_registered<T: LedgerTx>(tx: &mut T, tax_id: &str) -> Result<(), AppError> {
    if tx.tax_id_exists(tax_id).await? {
        return Err(DomainError::DuplicateTaxId(tax_id.to_string()).into());
    }
    Ok(())
}

/// Onboarding always opens a first account, so the type is mandatory.
pub fn require_account_type(account_type: Option<&str>) -> Result<&str, DomainError> {
    match account_type {
        Some(account_type) if !account_type.trim().is_empty() => Ok(account_type),
        _ => Err(DomainError::invalid_request(
            "Account type is required when creating a client.",
        )),
    }
}
