//! Ledger query service
//!
//! Every read opens its own unit of work so a page and its total count come
//! from the same snapshot.

use crate::domain::{DomainError, OperationContext};
use crate::error::AppError;
use crate::handlers::{AccountView, TransactionView};
use crate::store::{LedgerStore, LedgerTx};
use crate::validation::request::{page_offset, validate_account_number};
use crate::validation::{validate_account_exists, validate_authenticated, validate_pagination};

use super::views::{AccountBalanceView, AccountSummary, ClientAccountsSummary, Paged};

pub struct LedgerQueries<S> {
    store: S,
}

impl<S: LedgerStore> LedgerQueries<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Balance of any account by number
    pub async fn account_balance(&self, account_number: &str) -> Result<AccountBalanceView, AppError> {
        let account_number = validate_account_number(account_number)?;

        let mut tx = self.store.begin().await?;
        let account = validate_account_exists(tx.find_account_by_number(account_number).await?, account_number)?;
        tx.commit().await?;

        Ok(AccountBalanceView::from(&account))
    }

    /// Balance of the caller's first account
    pub async fn my_account_balance(&self, context: &OperationContext) -> Result<AccountBalanceView, AppError> {
        let client_id = validate_authenticated(context)?;

        let mut tx = self.store.begin().await?;
        let accounts = tx.accounts_for_client(client_id).await?;
        tx.commit().await?;

        let account = accounts.first().ok_or(DomainError::NoAccountForClient)?;
        Ok(AccountBalanceView::from(account))
    }

    pub async fn account_details(&self, account_number: &str) -> Result<AccountView, AppError> {
        let account_number = validate_account_number(account_number)?;

        let mut tx = self.store.begin().await?;
        let account = validate_account_exists(tx.find_account_by_number(account_number).await?, account_number)?;
        tx.commit().await?;

        Ok(AccountView::from(&account))
    }

    /// All accounts ordered by account number
    pub async fn list_accounts(
        &self,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Result<Paged<AccountView>, AppError> {
        let (page, page_size) = validate_pagination(page, page_size)?;
        let offset = page_offset(page, page_size)?;

        let mut tx = self.store.begin().await?;
        let total_count = tx.count_accounts().await?;
        let accounts = tx.list_accounts(offset, page_size).await?;
        tx.commit().await?;

        let data = accounts.iter().map(AccountView::from).collect();
        Ok(Paged::new(data, total_count, page, page_size))
    }

    /// Movement history of one account, newest first
    pub async fn account_movements(
        &self,
        account_number: &str,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Result<Paged<TransactionView>, AppError> {
        let account_number = validate_account_number(account_number)?;
        let (page, page_size) = validate_pagination(page, page_size)?;
        let offset = page_offset(page, page_size)?;

        let mut tx = self.store.begin().await?;
        let account = validate_account_exists(tx.find_account_by_number(account_number).await?, account_number)?;
        let total_count = tx.count_transactions(account.id).await?;
        let transactions = tx.transactions_for_account(account.id, offset, page_size).await?;
        tx.commit().await?;

        let data = transactions
            .iter()
            .map(|t| TransactionView::new(t, &account.account_number))
            .collect();
        Ok(Paged::new(data, total_count, page, page_size))
    }

    /// Every account of the caller with per-kind transaction totals
    pub async fn client_summary(&self, context: &OperationContext) -> Result<ClientAccountsSummary, AppError> {
        let client_id = validate_authenticated(context)?;

        let mut tx = self.store.begin().await?;
        let client = tx
            .find_client(client_id)
            .await?
            .ok_or_else(|| DomainError::ClientNotFound(client_id.to_string()))?;

        let mut summaries = Vec::new();
        for account in tx.accounts_for_client(client_id).await? {
            let history = tx.all_transactions(account.id).await?;
            summaries.push(AccountSummary::new(&account, &history));
        }
        tx.commit().await?;

        tracing::debug!(client_id = %client_id, accounts = summaries.len(), "Client summary built");
        Ok(ClientAccountsSummary::new(&client, summaries))
    }
}
