//! In-memory ledger store
//!
//! Used when no database is configured, and by the handler tests.
//! A unit of work holds the store lock for its whole lifetime and works on
//! a private copy of the state, which replaces the shared state on commit.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::{Account, Client, Transaction};

use super::{LedgerStore, LedgerTx, StoreError};

#[derive(Debug, Clone, Default)]
struct LedgerState {
    clients: HashMap<Uuid, Client>,
    accounts: HashMap<Uuid, Account>,
    /// Insertion order
    transactions: Vec<Transaction>,
}

/// Ledger store kept in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    state: Arc<Mutex<LedgerState>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(MemoryTx { guard, working })
    }
}

/// Unit of work over the in-memory state
pub struct MemoryTx {
    guard: OwnedMutexGuard<LedgerState>,
    working: LedgerState,
}

fn page<T>(items: Vec<T>, offset: i64, limit: i64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);
    items.into_iter().skip(offset).take(limit).collect()
}

impl MemoryTx {
    fn history(&self, account_id: Uuid) -> Vec<Transaction> {
        let mut history: Vec<Transaction> = self
            .working
            .transactions
            .iter()
            .rev()
            .filter(|tx| tx.account_id == account_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.date.cmp(&a.date));
        history
    }
}

#[async_trait]
impl LedgerTx for MemoryTx {
    async fn find_client(&mut self, client_id: Uuid) -> Result<Option<Client>, StoreError> {
        Ok(self.working.clients.get(&client_id).cloned())
    }

    async fn client_exists(&mut self, client_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.working.clients.contains_key(&client_id))
    }

    async fn tax_id_exists(&mut self, tax_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .working
            .clients
            .values()
            .any(|client| client.tax_id.eq_ignore_ascii_case(tax_id)))
    }

    async fn insert_client(&mut self, client: &Client) -> Result<(), StoreError> {
        if self.tax_id_exists(&client.tax_id).await? {
            return Err(StoreError::UniqueViolation("clients_tax_id_key".to_string()));
        }
        self.working.clients.insert(client.id, client.clone());
        Ok(())
    }

    async fn find_account_by_number(&mut self, account_number: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .working
            .accounts
            .values()
            .find(|account| account.account_number == account_number)
            .cloned())
    }

    async fn accounts_for_client(&mut self, client_id: Uuid) -> Result<Vec<Account>, StoreError> {
        let mut accounts: Vec<Account> = self
            .working
            .accounts
            .values()
            .filter(|account| account.client_id == client_id)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.account_number.cmp(&b.account_number))
        });
        Ok(accounts)
    }

    async fn list_accounts(&mut self, offset: i64, limit: i64) -> Result<Vec<Account>, StoreError> {
        let mut accounts: Vec<Account> = self.working.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.account_number.cmp(&b.account_number));
        Ok(page(accounts, offset, limit))
    }

    async fn count_accounts(&mut self) -> Result<i64, StoreError> {
        Ok(self.working.accounts.len() as i64)
    }

    async fn lock_account_numbers(&mut self) -> Result<(), StoreError> {
        // The unit already holds the store lock
        Ok(())
    }

    async fn account_numbers(&mut self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .working
            .accounts
            .values()
            .map(|account| account.account_number.clone())
            .collect())
    }

    async fn insert_account(&mut self, account: &Account) -> Result<(), StoreError> {
        if self.find_account_by_number(&account.account_number).await?.is_some() {
            return Err(StoreError::UniqueViolation("accounts_account_number_key".to_string()));
        }
        self.working.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn update_account(&mut self, account: &Account) -> Result<Account, StoreError> {
        let stored = self
            .working
            .accounts
            .get_mut(&account.id)
            .filter(|stored| stored.version == account.version)
            .ok_or(StoreError::VersionConflict {
                account_id: account.id,
                expected: account.version,
            })?;

        stored.current_balance = account.current_balance;
        stored.modified_at = account.modified_at;
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn insert_transaction(&mut self, transaction: &Transaction) -> Result<(), StoreError> {
        if !self.working.accounts.contains_key(&transaction.account_id) {
            return Err(StoreError::InvalidData(format!(
                "transaction {} references unknown account {}",
                transaction.id, transaction.account_id
            )));
        }
        self.working.transactions.push(transaction.clone());
        Ok(())
    }

    async fn transactions_for_account(
        &mut self,
        account_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Transaction>, StoreError> {
        Ok(page(self.history(account_id), offset, limit))
    }

    async fn count_transactions(&mut self, account_id: Uuid) -> Result<i64, StoreError> {
        Ok(self
            .working
            .transactions
            .iter()
            .filter(|tx| tx.account_id == account_id)
            .count() as i64)
    }

    async fn all_transactions(&mut self, account_id: Uuid) -> Result<Vec<Transaction>, StoreError> {
        Ok(self.history(account_id))
    }

    async fn commit(self) -> Result<(), StoreError> {
        let MemoryTx { mut guard, working } = self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}
