//! Request validation
//!
//! Shape checks run before any store access: authentication, required
//! fields, positive amounts, distinct transfer endpoints and paging bounds.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{Amount, DomainError, OperationContext};
use crate::handlers::{DepositCommand, TransferCommand, WithdrawCommand};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Resolve the caller, failing with Unauthenticated when there is none.
pub fn validate_authenticated(context: &OperationContext) -> Result<Uuid, DomainError> {
    context.require_client()
}

fn required(value: &str, message: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::invalid_request(message));
    }
    Ok(())
}

fn positive_amount(amount: Decimal, message: &str) -> Result<Amount, DomainError> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::InvalidAmount(message.to_string()));
    }
    Ok(Amount::new(amount)?)
}

pub fn validate_deposit(command: &DepositCommand) -> Result<Amount, DomainError> {
    required(&command.account_number, "Account number cannot be empty.")?;
    positive_amount(command.amount, "Transaction amount must be greater than zero.")
}

pub fn validate_withdraw(command: &WithdrawCommand) -> Result<Amount, DomainError> {
    required(&command.account_number, "Account number cannot be empty.")?;
    positive_amount(command.amount, "Transaction amount must be greater than zero.")
}

pub fn validate_transfer(command: &TransferCommand) -> Result<Amount, DomainError> {
    required(&command.from_account_number, "Source account number cannot be empty.")?;
    required(&command.to_account_number, "Destination account number cannot be empty.")?;

    if command.from_account_number.trim() == command.to_account_number.trim() {
        return Err(DomainError::invalid_request(
            "Source and destination accounts cannot be the same.",
        ));
    }

    positive_amount(command.amount, "Transfer amount must be greater than zero.")
}

/// Account number used for lookups
pub fn validate_account_number(account_number: &str) -> Result<&str, DomainError> {
    required(account_number, "Account number cannot be empty.")?;
    Ok(account_number.trim())
}

/// Apply defaults and bounds; returns `(page, page_size)`.
pub fn validate_pagination(page: Option<i64>, page_size: Option<i64>) -> Result<(i64, i64), DomainError> {
    let page = page.unwrap_or(DEFAULT_PAGE);
    let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    if page < 1 {
        return Err(DomainError::invalid_request("Page number must be greater than 0."));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(DomainError::invalid_request("Page size must be between 1 and 100."));
    }
    Ok((page, page_size))
}

/// Rows skipped before `page`; pages past the addressable range are rejected.
pub fn page_offset(page: i64, page_size: i64) -> Result<i64, DomainError> {
    (page - 1)
        .checked_mul(page_size)
        .ok_or_else(|| DomainError::invalid_request("Page number is too large."))
}
