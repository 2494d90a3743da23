//! Account creation handler
//!
//! The same creation logic runs standalone (own unit of work) or inside the
//! onboarding unit of work passed in by the caller.

use crate::domain::{Account, OperationContext};
use crate::error::AppError;
use crate::factory::build_account;
use crate::numbering::generate_account_number;
use crate::store::{LedgerStore, LedgerTx};
use crate::validation::{
    validate_and_normalize_account_type, validate_authenticated, validate_client_exists,
    validate_no_duplicate_account_type,
};

use super::{AccountView, CreateAccountCommand};

// =========================================================================
// CreateAccountHandler
// =========================================================================

/// Handler for opening accounts
pub struct CreateAccountHandler<S> {
    store: S,
    valid_types: Vec<String>,
}

impl<S: LedgerStore> CreateAccountHandler<S> {
    pub fn new(store: S, valid_types: Vec<String>) -> Self {
        Self { store, valid_types }
    }

    /// Open an account in its own unit of work
    pub async fn execute(
        &self,
        command: CreateAccountCommand,
        context: &OperationContext,
    ) -> Result<AccountView, AppError> {
        let mut tx = self.store.begin().await?;

        match self.execute_in(&mut tx, &command).await {
            Ok(account) => {
                tx.commit().await?;
                tracing::info!(
                    client_id = %account.client_id,
                    account_number = %account.account_number,
                    account_type = %account.account_type,
                    correlation_id = ?context.correlation_id,
                    "Account created"
                );
                Ok(AccountView::from(&account))
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!("Rollback after failed account creation failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    /// Open an account of the requested type for the authenticated caller
    pub async fn execute_for_caller(
        &self,
        account_type: String,
        context: &OperationContext,
    ) -> Result<AccountView, AppError> {
        let client_id = validate_authenticated(context)?;
        self.execute(CreateAccountCommand::new(client_id, account_type), context)
            .await
    }

    /// Validate, number and insert the account inside the caller's unit of work.
    /// Nothing is committed here.
    pub async fn execute_in(
        &self,
        tx: &mut S::Tx,
        command: &CreateAccountCommand,
    ) -> Result<Account, AppError> {
        let account_type = validate_and_normalize_account_type(&command.account_type, &self.valid_types)?;
        validate_client_exists(tx, command.client_id).await?;
        validate_no_duplicate_account_type(tx, command.client_id, &account_type, &self.valid_types).await?;

        let account_number = generate_account_number(tx).await?;
        let account = build_account(command.client_id, account_number, account_type);
        tx.insert_account(&account).await?;

        tracing::debug!(
            client_id = %account.client_id,
            account_number = %account.account_number,
            "Account staged"
        );
        Ok(account)
    }
}
