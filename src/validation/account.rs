//! Account Validator
//!
//! Pure checks on a loaded account: existence, ownership and balance.
//! No store access, no mutation.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{Account, DomainError};

/// Operations guarded by the ownership check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedOperation {
    Deposit,
    Withdraw,
    Transfer,
}

impl GuardedOperation {
    fn forbidden_phrase(&self) -> &'static str {
        match self {
            GuardedOperation::Deposit => "deposit money to other accounts",
            GuardedOperation::Withdraw => "withdraw money from other accounts",
            GuardedOperation::Transfer => "transfer money from other accounts",
        }
    }
}

/// Unwrap a lookup result, failing with NotFound for the given number.
pub fn validate_account_exists(account: Option<Account>, account_number: &str) -> Result<Account, DomainError> {
    account.ok_or_else(|| DomainError::AccountNotFound(account_number.to_string()))
}

pub fn validate_account_ownership(
    account: &Account,
    caller_client_id: Uuid,
    operation: GuardedOperation,
) -> Result<(), DomainError> {
    if !account.is_owned_by(caller_client_id) {
        return Err(DomainError::forbidden(operation.forbidden_phrase()));
    }
    Ok(())
}

/// An exact match of balance and amount is sufficient.
pub fn validate_sufficient_balance(account: &Account, amount: Decimal) -> Result<(), DomainError> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::InvalidAmount(
            "Transaction amount must be greater than zero.".to_string(),
        ));
    }

    let balance = account.current_balance.value();
    if balance < amount {
        return Err(DomainError::insufficient_funds(balance, amount));
    }
    Ok(())
}
