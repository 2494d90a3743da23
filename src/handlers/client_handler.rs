//! Client onboarding handler
//!
//! Client creation and first-account creation share one unit of work:
//! either both records become durable or neither does.

use crate::domain::{DomainError, OperationContext};
use crate::error::AppError;
use crate::factory::build_client;
use crate::store::{LedgerStore, LedgerTx, StoreError};
use crate::validation::{
    hash_password, normalize_tax_id, require_account_type, validate_password,
    validate_tax_id_not_registered,
};

use super::{ClientView, CreateAccountCommand, CreateAccountHandler, CreateClientCommand};

// =========================================================================
// CreateClientHandler
// =========================================================================

/// Handler for client onboarding
pub struct CreateClientHandler<S> {
    store: S,
    accounts: CreateAccountHandler<S>,
}

impl<S: LedgerStore + Clone> CreateClientHandler<S> {
    pub fn new(store: S, valid_types: Vec<String>) -> Self {
        Self {
            accounts: CreateAccountHandler::new(store.clone(), valid_types),
            store,
        }
    }

    /// Execute the onboarding command
    pub async fn execute(
        &self,
        command: CreateClientCommand,
        context: &OperationContext,
    ) -> Result<ClientView, AppError> {
        let mut tx = self.store.begin().await?;

        match self.onboard(&mut tx, &command).await {
            Ok(view) => {
                tx.commit().await?;
                tracing::info!(
                    client_id = %view.id,
                    account_number = %view.account_number,
                    correlation_id = ?context.correlation_id,
                    "Client onboarded"
                );
                Ok(view)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!("Rollback after failed onboarding failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn onboard(&self, tx: &mut S::Tx, command: &CreateClientCommand) -> Result<ClientView, AppError> {
        let tax_id = normalize_tax_id(&command.tax_id)?;
        validate_tax_id_not_registered(tx, &tax_id).await?;
        let account_type = require_account_type(command.account_type.as_deref())?;

        validate_password(&command.password)?;
        let client = build_client(command, tax_id, hash_password(&command.password));

        tx.insert_client(&client).await.map_err(|e| match e {
            // Lost a race against another registration of the same tax id
            StoreError::UniqueViolation(_) => AppError::from(DomainError::DuplicateTaxId(client.tax_id.clone())),
            other => AppError::from(other),
        })?;

        let account = self
            .accounts
            .execute_in(tx, &CreateAccountCommand::new(client.id, account_type))
            .await?;

        Ok(ClientView::new(&client, account.account_number))
    }
}
