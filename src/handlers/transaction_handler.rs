//! Transaction Handler
//!
//! Deposit, withdrawal and transfer. Each operation validates, computes the
//! new balances, and commits balance updates plus ledger entries as one unit.

use uuid::Uuid;

use crate::domain::{Amount, DomainError, OperationContext};
use crate::error::AppError;
use crate::factory::transaction;
use crate::store::{LedgerStore, LedgerTx};
use crate::validation::{
    request, validate_account_exists, validate_account_ownership, validate_authenticated,
    validate_sufficient_balance, GuardedOperation,
};

use super::{retry_on_conflict, DepositCommand, TransactionView, TransferCommand, WithdrawCommand};

// =========================================================================
// TransactionHandler
// =========================================================================

/// Handler for money movements
pub struct TransactionHandler<S> {
    store: S,
}

impl<S: LedgerStore> TransactionHandler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Credit one of the caller's accounts
    pub async fn deposit(
        &self,
        command: DepositCommand,
        context: &OperationContext,
    ) -> Result<TransactionView, AppError> {
        let client_id = validate_authenticated(context)?;
        let amount = request::validate_deposit(&command)?;
        let account_number = command.account_number.trim();

        let view = retry_on_conflict("deposit", move || self.try_deposit(client_id, account_number, amount)).await?;

        tracing::info!(
            account_number = %view.account_number,
            amount = %amount,
            balance_after = %view.balance_after,
            correlation_id = ?context.correlation_id,
            "Deposit committed"
        );
        Ok(view)
    }

    /// Debit one of the caller's accounts
    pub async fn withdraw(
        &self,
        command: WithdrawCommand,
        context: &OperationContext,
    ) -> Result<TransactionView, AppError> {
        let client_id = validate_authenticated(context)?;
        let amount = request::validate_withdraw(&command)?;
        let account_number = command.account_number.trim();

        let view = retry_on_conflict("withdraw", move || self.try_withdraw(client_id, account_number, amount)).await?;

        tracing::info!(
            account_number = %view.account_number,
            amount = %amount,
            balance_after = %view.balance_after,
            correlation_id = ?context.correlation_id,
            "Withdrawal committed"
        );
        Ok(view)
    }

    /// Move money from a caller-owned account to any existing account.
    ///
    /// Returns the "Transfer Out" entry of the source account.
    pub async fn transfer(
        &self,
        command: TransferCommand,
        context: &OperationContext,
    ) -> Result<TransactionView, AppError> {
        let client_id = validate_authenticated(context)?;
        let amount = request::validate_transfer(&command)?;
        let from = command.from_account_number.trim();
        let to = command.to_account_number.trim();

        let view = retry_on_conflict("transfer", move || self.try_transfer(client_id, from, to, amount)).await?;

        tracing::info!(
            from_account = %from,
            to_account = %to,
            amount = %amount,
            correlation_id = ?context.correlation_id,
            "Transfer committed"
        );
        Ok(view)
    }

    async fn try_deposit(
        &self,
        client_id: Uuid,
        account_number: &str,
        amount: Amount,
    ) -> Result<TransactionView, AppError> {
        let mut tx = self.store.begin().await?;

        let account = validate_account_exists(tx.find_account_by_number(account_number).await?, account_number)?;
        validate_account_ownership(&account, client_id, GuardedOperation::Deposit)?;

        let new_balance = account.current_balance.credit(&amount).map_err(DomainError::from)?;
        let updated = tx.update_account(&account.with_balance(new_balance)).await?;

        let entry = transaction::deposit(updated.id, amount, updated.current_balance)?;
        tx.insert_transaction(&entry).await?;
        tx.commit().await?;

        Ok(TransactionView::new(&entry, &updated.account_number))
    }

    async fn try_withdraw(
        &self,
        client_id: Uuid,
        account_number: &str,
        amount: Amount,
    ) -> Result<TransactionView, AppError> {
        let mut tx = self.store.begin().await?;

        let account = validate_account_exists(tx.find_account_by_number(account_number).await?, account_number)?;
        validate_account_ownership(&account, client_id, GuardedOperation::Withdraw)?;
        validate_sufficient_balance(&account, amount.value())?;

        let new_balance = account.current_balance.debit(&amount).map_err(DomainError::from)?;
        let updated = tx.update_account(&account.with_balance(new_balance)).await?;

        let entry = transaction::withdrawal(updated.id, amount, updated.current_balance)?;
        tx.insert_transaction(&entry).await?;
        tx.commit().await?;

        Ok(TransactionView::new(&entry, &updated.account_number))
    }

    async fn try_transfer(
        &self,
        client_id: Uuid,
        from_number: &str,
        to_number: &str,
        amount: Amount,
    ) -> Result<TransactionView, AppError> {
        let mut tx = self.store.begin().await?;

        let from = validate_account_exists(tx.find_account_by_number(from_number).await?, from_number)?;
        validate_account_ownership(&from, client_id, GuardedOperation::Transfer)?;
        validate_sufficient_balance(&from, amount.value())?;

        // Any existing account can receive
        let to = validate_account_exists(tx.find_account_by_number(to_number).await?, to_number)?;

        let from_balance = from.current_balance.debit(&amount).map_err(DomainError::from)?;
        let to_balance = to.current_balance.credit(&amount).map_err(DomainError::from)?;

        let from = from.with_balance(from_balance);
        let to = to.with_balance(to_balance);

        // Row locks are always taken in id order
        let (from, to) = if from.id < to.id {
            let from = tx.update_account(&from).await?;
            let to = tx.update_account(&to).await?;
            (from, to)
        } else {
            let to = tx.update_account(&to).await?;
            let from = tx.update_account(&from).await?;
            (from, to)
        };

        let outgoing = transaction::transfer_out(from.id, amount, from.current_balance)?;
        let incoming = transaction::transfer_in(to.id, amount, to.current_balance)?;
        tx.insert_transaction(&outgoing).await?;
        tx.insert_transaction(&incoming).await?;
        tx.commit().await?;

        Ok(TransactionView::new(&outgoing, &from.account_number))
    }
}
