//! Ledger Store
//!
//! Transactional storage for clients, accounts and transactions.
//! Every orchestrator works inside one unit of work (`LedgerTx`): all of its
//! writes become durable on `commit`, none of them do on `rollback` or drop.

mod error;
mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Account, Client, Transaction};

pub use error::StoreError;
pub use memory::{MemoryLedgerStore, MemoryTx};
pub use postgres::{PgLedgerStore, PgLedgerTx};

/// Factory for units of work
#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    type Tx: LedgerTx;

    /// Open a new unit of work
    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}

/// One atomic unit of work against the ledger
#[async_trait]
pub trait LedgerTx: Send {
    // ---------------------------------------------------------------------
    // Clients
    // ---------------------------------------------------------------------

    async fn find_client(&mut self, client_id: Uuid) -> Result<Option<Client>, StoreError>;

    async fn client_exists(&mut self, client_id: Uuid) -> Result<bool, StoreError>;

    /// Case-insensitive lookup on the normalized tax id
    async fn tax_id_exists(&mut self, tax_id: &str) -> Result<bool, StoreError>;

    async fn insert_client(&mut self, client: &Client) -> Result<(), StoreError>;

    // ---------------------------------------------------------------------
    // Accounts
    // ---------------------------------------------------------------------

    async fn find_account_by_number(&mut self, account_number: &str) -> Result<Option<Account>, StoreError>;

    /// A client's accounts, oldest first
    async fn accounts_for_client(&mut self, client_id: Uuid) -> Result<Vec<Account>, StoreError>;

    /// One page of all accounts ordered by account number
    async fn list_accounts(&mut self, offset: i64, limit: i64) -> Result<Vec<Account>, StoreError>;

    async fn count_accounts(&mut self) -> Result<i64, StoreError>;

    /// Serialize account number issuance until this unit ends
    async fn lock_account_numbers(&mut self) -> Result<(), StoreError>;

    /// Every account number currently issued
    async fn account_numbers(&mut self) -> Result<Vec<String>, StoreError>;

    async fn insert_account(&mut self, account: &Account) -> Result<(), StoreError>;

    /// Write the account's balance if its stored version still equals
    /// `account.version`; returns the account with the bumped version.
    ///
    /// Fails with `StoreError::VersionConflict` otherwise.
    async fn update_account(&mut self, account: &Account) -> Result<Account, StoreError>;

    // ---------------------------------------------------------------------
    // Transactions
    // ---------------------------------------------------------------------

    async fn insert_transaction(&mut self, transaction: &Transaction) -> Result<(), StoreError>;

    /// One page of an account's transactions, newest first
    async fn transactions_for_account(
        &mut self,
        account_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Transaction>, StoreError>;

    async fn count_transactions(&mut self, account_id: Uuid) -> Result<i64, StoreError>;

    /// Full history of an account, newest first
    async fn all_transactions(&mut self, account_id: Uuid) -> Result<Vec<Transaction>, StoreError>;

    // ---------------------------------------------------------------------
    // Unit boundary
    // ---------------------------------------------------------------------

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}
