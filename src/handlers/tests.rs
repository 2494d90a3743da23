//! Orchestrator tests
//!
//! Run the handlers end to end against the in-memory ledger store.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::domain::{DomainError, OperationContext, TransactionKind};
    use crate::error::AppError;
    use crate::factory::build_account;
    use crate::handlers::{
        retry_on_conflict, ClientView, CreateAccountCommand, CreateAccountHandler, CreateClientCommand,
        CreateClientHandler, DepositCommand, TransactionHandler, TransferCommand, WithdrawCommand,
        MAX_ATTEMPTS,
    };
    use crate::store::{LedgerStore, LedgerTx, MemoryLedgerStore, StoreError};

    fn catalogue() -> Vec<String> {
        vec!["Savings".into(), "Checking".into(), "Business".into()]
    }

    fn client_command(tax_id: &str, account_type: &str) -> CreateClientCommand {
        CreateClientCommand::new(
            "Ana",
            "Lopez",
            tax_id,
            "Str0ng!Pwd",
            NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
        )
        .with_email("ana@example.com")
        .with_gender("F")
        .with_income(dec!(2500))
        .with_account_type(account_type)
    }

    async fn onboard(store: &MemoryLedgerStore, tax_id: &str) -> ClientView {
        CreateClientHandler::new(store.clone(), catalogue())
            .execute(client_command(tax_id, "Savings"), &OperationContext::new())
            .await
            .unwrap()
    }

    async fn balance_of(store: &MemoryLedgerStore, account_number: &str) -> Decimal {
        let mut tx = store.begin().await.unwrap();
        tx.find_account_by_number(account_number)
            .await
            .unwrap()
            .unwrap()
            .current_balance
            .value()
    }

    async fn history_len(store: &MemoryLedgerStore, account_number: &str) -> i64 {
        let mut tx = store.begin().await.unwrap();
        let account = tx.find_account_by_number(account_number).await.unwrap().unwrap();
        tx.count_transactions(account.id).await.unwrap()
    }

    /// Onboard a client and fund their Savings account
    async fn funded_client(store: &MemoryLedgerStore, tax_id: &str, balance: Decimal) -> (ClientView, OperationContext) {
        let client = onboard(store, tax_id).await;
        let context = OperationContext::for_client(client.id);
        if balance > Decimal::ZERO {
            TransactionHandler::new(store.clone())
                .deposit(DepositCommand::new(&client.account_number, balance), &context)
                .await
                .unwrap();
        }
        (client, context)
    }

    // =========================================================================
    // Client onboarding
    // =========================================================================

    #[tokio::test]
    async fn test_onboarding_issues_first_account_number() {
        let store = MemoryLedgerStore::new();

        let client = onboard(&store, "123-456-789").await;

        assert_eq!(client.account_number, "1000000");
        assert_eq!(client.name, "Ana");
        assert_eq!(client.email.as_deref(), Some("ana@example.com"));

        let mut tx = store.begin().await.unwrap();
        let stored = tx.find_client(client.id).await.unwrap().unwrap();
        assert_eq!(stored.tax_id, "123456789");
        assert_ne!(stored.password_hash, "Str0ng!Pwd");
        let accounts = tx.accounts_for_client(client.id).await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].account_type, "Savings");
        assert_eq!(accounts[0].current_balance.value(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_onboarding_rolls_back_client_when_account_fails() {
        let store = MemoryLedgerStore::new();
        let handler = CreateClientHandler::new(store.clone(), catalogue());

        let err = handler
            .execute(client_command("987654321", "Gold"), &OperationContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::InvalidAccountType { .. })));

        let mut tx = store.begin().await.unwrap();
        assert!(!tx.tax_id_exists("987654321").await.unwrap());
        assert_eq!(tx.count_accounts().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_tax_id_rejected_after_normalization() {
        let store = MemoryLedgerStore::new();
        onboard(&store, "123-456-789").await;

        let handler = CreateClientHandler::new(store.clone(), catalogue());
        for tax_id in ["123456789", "123 456-789"] {
            let err = handler
                .execute(client_command(tax_id, "Checking"), &OperationContext::new())
                .await
                .unwrap_err();
            match err {
                AppError::Domain(DomainError::DuplicateTaxId(id)) => assert_eq!(id, "123456789"),
                other => panic!("Expected DuplicateTaxId, got: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_onboarding_requires_account_type_and_strong_password() {
        let store = MemoryLedgerStore::new();
        let handler = CreateClientHandler::new(store.clone(), catalogue());

        let mut command = client_command("ABC12345", "Savings");
        command.account_type = None;
        let err = handler.execute(command, &OperationContext::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Account type is required when creating a client.");

        let mut command = client_command("ABC12345", "Savings");
        command.password = "weakpassword".into();
        let err = handler.execute(command, &OperationContext::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::WeakPassword(_))));

        let mut tx = store.begin().await.unwrap();
        assert!(!tx.tax_id_exists("ABC12345").await.unwrap());
    }

    // =========================================================================
    // Account creation
    // =========================================================================

    #[tokio::test]
    async fn test_account_numbers_are_sequential() {
        let store = MemoryLedgerStore::new();
        let first = onboard(&store, "11111111").await;
        let second = onboard(&store, "22222222").await;

        let handler = CreateAccountHandler::new(store.clone(), catalogue());
        let context = OperationContext::for_client(first.id);
        let checking = handler
            .execute_for_caller("checking".into(), &context)
            .await
            .unwrap();

        assert_eq!(first.account_number, "1000000");
        assert_eq!(second.account_number, "1000001");
        assert_eq!(checking.account_number, "1000002");
        assert_eq!(checking.account_type, "checking");
        assert_eq!(checking.current_balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_duplicate_account_type_is_case_insensitive() {
        let store = MemoryLedgerStore::new();
        let client = onboard(&store, "11111111").await;

        let err = CreateAccountHandler::new(store.clone(), catalogue())
            .execute(CreateAccountCommand::new(client.id, "savings"), &OperationContext::new())
            .await
            .unwrap_err();

        match err {
            AppError::Domain(DomainError::DuplicateAccountType { existing, allowed, .. }) => {
                assert_eq!(existing, vec!["Savings".to_string()]);
                assert_eq!(allowed, catalogue());
            }
            other => panic!("Expected DuplicateAccountType, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_account_creation_failures() {
        let store = MemoryLedgerStore::new();

        let err = CreateAccountHandler::new(store.clone(), Vec::new())
            .execute(CreateAccountCommand::new(Uuid::new_v4(), "Savings"), &OperationContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::NoAccountTypesConfigured)));

        let handler = CreateAccountHandler::new(store.clone(), catalogue());
        let err = handler
            .execute(CreateAccountCommand::new(Uuid::new_v4(), "Savings"), &OperationContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::ClientNotFound(_))));

        let err = handler
            .execute_for_caller("Savings".into(), &OperationContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_account_creation_fails_when_numbers_run_out() {
        let store = MemoryLedgerStore::new();
        let client = onboard(&store, "11111111").await;

        let mut tx = store.begin().await.unwrap();
        tx.insert_account(&build_account(client.id, "9999999".into(), "business".into()))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let err = CreateAccountHandler::new(store.clone(), catalogue())
            .execute(CreateAccountCommand::new(client.id, "Checking"), &OperationContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::AccountNumbersExhausted)));

        let mut tx = store.begin().await.unwrap();
        assert!(tx.find_account_by_number("10000000").await.unwrap().is_none());
    }

    // =========================================================================
    // Deposit / withdraw
    // =========================================================================

    #[tokio::test]
    async fn test_deposit_then_overdraw_scenario() {
        let store = MemoryLedgerStore::new();
        let (client, context) = funded_client(&store, "11111111", dec!(1000.00)).await;
        let handler = TransactionHandler::new(store.clone());

        let view = handler
            .deposit(DepositCommand::new(&client.account_number, dec!(500.00)), &context)
            .await
            .unwrap();
        assert_eq!(view.kind, TransactionKind::Deposit);
        assert_eq!(view.amount, dec!(500.00));
        assert_eq!(view.balance_after, dec!(1500.00));
        assert_eq!(view.account_number, client.account_number);
        assert_eq!(balance_of(&store, &client.account_number).await, dec!(1500.00));
        assert_eq!(history_len(&store, &client.account_number).await, 2);

        let err = handler
            .withdraw(WithdrawCommand::new(&client.account_number, dec!(2000.00)), &context)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Insufficient funds. Current balance: 1500.00, Requested amount: 2000.00"
        );
        assert_eq!(balance_of(&store, &client.account_number).await, dec!(1500.00));
        assert_eq!(history_len(&store, &client.account_number).await, 2);
    }

    #[tokio::test]
    async fn test_withdraw_full_balance() {
        let store = MemoryLedgerStore::new();
        let (client, context) = funded_client(&store, "11111111", dec!(250.75)).await;

        let view = TransactionHandler::new(store.clone())
            .withdraw(WithdrawCommand::new(&client.account_number, dec!(250.75)), &context)
            .await
            .unwrap();

        assert_eq!(view.kind, TransactionKind::Withdrawal);
        assert_eq!(view.balance_after, Decimal::ZERO);
        assert_eq!(balance_of(&store, &client.account_number).await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_movements_require_identity_and_ownership() {
        let store = MemoryLedgerStore::new();
        let (owner, _) = funded_client(&store, "11111111", dec!(100)).await;
        let (_, intruder) = funded_client(&store, "22222222", dec!(100)).await;
        let handler = TransactionHandler::new(store.clone());

        let err = handler
            .deposit(DepositCommand::new(&owner.account_number, dec!(10)), &OperationContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::Unauthenticated)));

        let err = handler
            .deposit(DepositCommand::new(&owner.account_number, dec!(10)), &intruder)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("You cannot deposit money to other accounts."));

        let err = handler
            .withdraw(WithdrawCommand::new(&owner.account_number, dec!(10)), &intruder)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::Forbidden { .. })));

        assert_eq!(balance_of(&store, &owner.account_number).await, dec!(100));
        assert_eq!(history_len(&store, &owner.account_number).await, 1);
    }

    #[tokio::test]
    async fn test_unknown_account_is_not_found() {
        let store = MemoryLedgerStore::new();
        let (_, context) = funded_client(&store, "11111111", Decimal::ZERO).await;

        let err = TransactionHandler::new(store.clone())
            .deposit(DepositCommand::new("7654321", dec!(10)), &context)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Account with number '7654321' not found.");
    }

    // =========================================================================
    // Transfer
    // =========================================================================

    #[tokio::test]
    async fn test_transfer_conserves_money() {
        let store = MemoryLedgerStore::new();
        let (sender, context) = funded_client(&store, "11111111", dec!(300)).await;
        let (receiver, _) = funded_client(&store, "22222222", dec!(50)).await;

        let view = TransactionHandler::new(store.clone())
            .transfer(
                TransferCommand::new(&sender.account_number, &receiver.account_number, dec!(120.50)),
                &context,
            )
            .await
            .unwrap();

        assert_eq!(view.kind, TransactionKind::TransferOut);
        assert_eq!(view.account_number, sender.account_number);
        assert_eq!(view.balance_after, dec!(179.50));

        let from_balance = balance_of(&store, &sender.account_number).await;
        let to_balance = balance_of(&store, &receiver.account_number).await;
        assert_eq!(from_balance, dec!(179.50));
        assert_eq!(to_balance, dec!(170.50));
        assert_eq!(from_balance + to_balance, dec!(350));

        let mut tx = store.begin().await.unwrap();
        let receiver_account = tx.find_account_by_number(&receiver.account_number).await.unwrap().unwrap();
        let latest = &tx.transactions_for_account(receiver_account.id, 0, 1).await.unwrap()[0];
        assert_eq!(latest.kind, TransactionKind::TransferIn);
        assert_eq!(latest.amount.value(), dec!(120.50));
        assert_eq!(latest.balance_after.value(), dec!(170.50));
    }

    #[tokio::test]
    async fn test_opposing_transfers_book_entries_on_their_own_accounts() {
        let store = MemoryLedgerStore::new();
        let (alice, alice_ctx) = funded_client(&store, "11111111", dec!(100)).await;
        let (bob, bob_ctx) = funded_client(&store, "22222222", dec!(100)).await;
        let handler = TransactionHandler::new(store.clone());

        // Account ids are random, so one of the two directions updates the receiver first
        let out = handler
            .transfer(TransferCommand::new(&alice.account_number, &bob.account_number, dec!(30)), &alice_ctx)
            .await
            .unwrap();
        assert_eq!(out.account_number, alice.account_number);
        assert_eq!(out.balance_after, dec!(70));

        let back = handler
            .transfer(TransferCommand::new(&bob.account_number, &alice.account_number, dec!(10)), &bob_ctx)
            .await
            .unwrap();
        assert_eq!(back.account_number, bob.account_number);
        assert_eq!(back.balance_after, dec!(120));

        assert_eq!(balance_of(&store, &alice.account_number).await, dec!(80));
        assert_eq!(balance_of(&store, &bob.account_number).await, dec!(120));

        let mut tx = store.begin().await.unwrap();
        for (number, kinds) in [
            (&alice.account_number, [TransactionKind::TransferIn, TransactionKind::TransferOut]),
            (&bob.account_number, [TransactionKind::TransferOut, TransactionKind::TransferIn]),
        ] {
            let account = tx.find_account_by_number(number).await.unwrap().unwrap();
            let latest: Vec<_> = tx
                .transactions_for_account(account.id, 0, 2)
                .await
                .unwrap()
                .into_iter()
                .map(|entry| entry.kind)
                .collect();
            assert_eq!(latest, kinds);
        }
    }

    #[tokio::test]
    async fn test_transfer_to_same_account_rejected_before_lookup() {
        let store = MemoryLedgerStore::new();
        let (_, context) = funded_client(&store, "11111111", dec!(100)).await;

        // The number does not exist: the same-account rule fires first
        let err = TransactionHandler::new(store.clone())
            .transfer(TransferCommand::new("9999999", "9999999", dec!(1)), &context)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Source and destination accounts cannot be the same.");
    }

    #[tokio::test]
    async fn test_transfer_insufficient_funds_changes_nothing() {
        let store = MemoryLedgerStore::new();
        let (sender, context) = funded_client(&store, "11111111", dec!(10)).await;
        let (receiver, _) = funded_client(&store, "22222222", Decimal::ZERO).await;

        let err = TransactionHandler::new(store.clone())
            .transfer(
                TransferCommand::new(&sender.account_number, &receiver.account_number, dec!(10.01)),
                &context,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::InsufficientFunds { .. })));

        assert_eq!(balance_of(&store, &sender.account_number).await, dec!(10));
        assert_eq!(balance_of(&store, &receiver.account_number).await, Decimal::ZERO);
        assert_eq!(history_len(&store, &receiver.account_number).await, 0);
    }

    #[tokio::test]
    async fn test_transfer_from_foreign_account_forbidden() {
        let store = MemoryLedgerStore::new();
        let (victim, _) = funded_client(&store, "11111111", dec!(100)).await;
        let (thief, context) = funded_client(&store, "22222222", dec!(100)).await;

        let err = TransactionHandler::new(store.clone())
            .transfer(
                TransferCommand::new(&victim.account_number, &thief.account_number, dec!(50)),
                &context,
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("transfer money from other accounts"));
        assert_eq!(balance_of(&store, &victim.account_number).await, dec!(100));
    }

    // =========================================================================
    // Optimistic concurrency retry
    // =========================================================================

    fn conflict() -> AppError {
        AppError::from(StoreError::VersionConflict {
            account_id: Uuid::new_v4(),
            expected: 0,
        })
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_conflict() {
        let attempts = AtomicU32::new(0);
        let counter = &attempts;

        let result = retry_on_conflict("test", move || async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(conflict())
            } else {
                Ok("done")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_deadlock() {
        let attempts = AtomicU32::new(0);
        let counter = &attempts;

        let result = retry_on_conflict("test", move || async move {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::from(StoreError::TransactionConflict("40P01".into())))
            } else {
                Ok("done")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_gives_up_with_version_conflict() {
        let attempts = AtomicU32::new(0);
        let counter = &attempts;

        let result: Result<(), AppError> = retry_on_conflict("test", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(conflict())
        })
        .await;

        assert!(matches!(result, Err(AppError::VersionConflict)));
        assert_eq!(attempts.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_business_errors_are_not_retried() {
        let attempts = AtomicU32::new(0);
        let counter = &attempts;

        let result: Result<(), AppError> = retry_on_conflict("test", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(DomainError::insufficient_funds(dec!(1), dec!(2)).into())
        })
        .await;

        assert!(matches!(result, Err(AppError::Domain(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
