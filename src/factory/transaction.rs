//! Transaction Factory
//!
//! Builds the immutable ledger entries for the four movement kinds.
//! No persistence and no balance arithmetic happen here: the caller
//! hands in the already computed balance-after value.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Amount, Balance, DomainError, Transaction, TransactionKind};

/// Build a transaction record stamped with the current UTC time.
pub fn build_transaction(
    account_id: Uuid,
    kind: TransactionKind,
    amount: Amount,
    balance_after: Balance,
) -> Result<Transaction, DomainError> {
    if account_id.is_nil() {
        return Err(DomainError::invalid_request("Account id cannot be empty."));
    }

    let now = Utc::now();
    Ok(Transaction {
        id: Uuid::new_v4(),
        account_id,
        kind,
        amount,
        balance_after,
        date: now,
        created_at: now,
        modified_at: None,
    })
}

pub fn deposit(account_id: Uuid, amount: Amount, balance_after: Balance) -> Result<Transaction, DomainError> {
    build_transaction(account_id, TransactionKind::Deposit, amount, balance_after)
}

pub fn withdrawal(account_id: Uuid, amount: Amount, balance_after: Balance) -> Result<Transaction, DomainError> {
    build_transaction(account_id, TransactionKind::Withdrawal, amount, balance_after)
}

pub fn transfer_out(account_id: Uuid, amount: Amount, balance_after: Balance) -> Result<Transaction, DomainError> {
    build_transaction(account_id, TransactionKind::TransferOut, amount, balance_after)
}

pub fn transfer_in(account_id: Uuid, amount: Amount, balance_after: Balance) -> Result<Transaction, DomainError> {
    build_transaction(account_id, TransactionKind::TransferIn, amount, balance_after)
}
