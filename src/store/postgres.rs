//! PostgreSQL ledger store
//!
//! Each unit of work is one `sqlx` transaction. Dropping an uncommitted
//! unit rolls it back.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::domain::{Account, Amount, Balance, Client, Transaction, TransactionKind};

use super::{LedgerStore, LedgerTx, StoreError};

/// Advisory lock key serializing account number issuance
const ACCOUNT_NUMBER_LOCK: i64 = 0x4c45_4447_4552;

const ACCOUNT_COLUMNS: &str = "id, account_number, account_type, current_balance, client_id, version, created_at, modified_at";

const CLIENT_COLUMNS: &str = "id, name, last_name, tax_id, email, password_hash, password_salt, \
     date_of_birth, gender, income, created_at, modified_at";

const TRANSACTION_COLUMNS: &str = "id, account_id, type, amount, balance_after, date, created_at, modified_at";

type AccountRow = (
    Uuid,
    String,
    String,
    Decimal,
    Uuid,
    i64,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

type ClientRow = (
    Uuid,
    String,
    String,
    String,
    Option<String>,
    String,
    String,
    NaiveDate,
    String,
    Decimal,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

type TransactionRow = (
    Uuid,
    Uuid,
    String,
    Decimal,
    Decimal,
    DateTime<Utc>,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

fn account_from_row(row: AccountRow) -> Result<Account, StoreError> {
    let (id, account_number, account_type, balance, client_id, version, created_at, modified_at) = row;
    Ok(Account {
        id,
        account_number,
        account_type,
        current_balance: Balance::new(balance)
            .map_err(|e| StoreError::InvalidData(format!("account {}: {}", id, e)))?,
        client_id,
        version,
        created_at,
        modified_at,
    })
}

fn client_from_row(row: ClientRow) -> Client {
    let (
        id,
        name,
        last_name,
        tax_id,
        email,
        password_hash,
        password_salt,
        date_of_birth,
        gender,
        income,
        created_at,
        modified_at,
    ) = row;
    Client {
        id,
        name,
        last_name,
        tax_id,
        email,
        password_hash,
        password_salt,
        date_of_birth,
        gender,
        income,
        created_at,
        modified_at,
    }
}

fn transaction_from_row(row: TransactionRow) -> Result<Transaction, StoreError> {
    let (id, account_id, kind, amount, balance_after, date, created_at, modified_at) = row;
    let invalid = |e: String| StoreError::InvalidData(format!("transaction {}: {}", id, e));
    Ok(Transaction {
        id,
        account_id,
        kind: kind.parse::<TransactionKind>().map_err(|e| invalid(e.to_string()))?,
        amount: Amount::new(amount).map_err(|e| invalid(e.to_string()))?,
        balance_after: Balance::new(balance_after).map_err(|e| invalid(e.to_string()))?,
        date,
        created_at,
        modified_at,
    })
}

/// Ledger store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    type Tx = PgLedgerTx;

    async fn begin(&self) -> Result<PgLedgerTx, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(PgLedgerTx { tx })
    }
}

/// Unit of work over one database transaction
pub struct PgLedgerTx {
    tx: SqlxTransaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTx for PgLedgerTx {
    async fn find_client(&mut self, client_id: Uuid) -> Result<Option<Client>, StoreError> {
        let row: Option<ClientRow> =
            sqlx::query_as(&format!("SELECT {} FROM clients WHERE id = $1", CLIENT_COLUMNS))
                .bind(client_id)
                .fetch_optional(&mut *self.tx)
                .await?;

        Ok(row.map(client_from_row))
    }

    async fn client_exists(&mut self, client_id: Uuid) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
            .bind(client_id)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(exists)
    }

    async fn tax_id_exists(&mut self, tax_id: &str) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE lower(tax_id) = lower($1))")
                .bind(tax_id)
                .fetch_one(&mut *self.tx)
                .await?;
        Ok(exists)
    }

    async fn insert_client(&mut self, client: &Client) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO clients (
                id, name, last_name, tax_id, email, password_hash, password_salt,
                date_of_birth, gender, income, created_at, modified_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.last_name)
        .bind(&client.tax_id)
        .bind(&client.email)
        .bind(&client.password_hash)
        .bind(&client.password_salt)
        .bind(client.date_of_birth)
        .bind(&client.gender)
        .bind(client.income)
        .bind(client.created_at)
        .bind(client.modified_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn find_account_by_number(&mut self, account_number: &str) -> Result<Option<Account>, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {} FROM accounts WHERE account_number = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(account_number)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(account_from_row).transpose()
    }

    async fn accounts_for_client(&mut self, client_id: Uuid) -> Result<Vec<Account>, StoreError> {
        let rows: Vec<AccountRow> = sqlx::query_as(&format!(
            "SELECT {} FROM accounts WHERE client_id = $1 ORDER BY created_at, account_number",
            ACCOUNT_COLUMNS
        ))
        .bind(client_id)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(account_from_row).collect()
    }

    async fn list_accounts(&mut self, offset: i64, limit: i64) -> Result<Vec<Account>, StoreError> {
        let rows: Vec<AccountRow> = sqlx::query_as(&format!(
            "SELECT {} FROM accounts ORDER BY account_number OFFSET $1 LIMIT $2",
            ACCOUNT_COLUMNS
        ))
        .bind(offset)
        .bind(limit)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(account_from_row).collect()
    }

    async fn count_accounts(&mut self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(count)
    }

    async fn lock_account_numbers(&mut self) -> Result<(), StoreError> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ACCOUNT_NUMBER_LOCK)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn account_numbers(&mut self) -> Result<Vec<String>, StoreError> {
        let numbers: Vec<String> = sqlx::query_scalar("SELECT account_number FROM accounts")
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(numbers)
    }

    async fn insert_account(&mut self, account: &Account) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, account_number, account_type, current_balance, client_id,
                version, created_at, modified_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(account.id)
        .bind(&account.account_number)
        .bind(&account.account_type)
        .bind(account.current_balance.value())
        .bind(account.client_id)
        .bind(account.version)
        .bind(account.created_at)
        .bind(account.modified_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn update_account(&mut self, account: &Account) -> Result<Account, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            r#"
            UPDATE accounts
            SET current_balance = $3, modified_at = $4, version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(account.id)
        .bind(account.version)
        .bind(account.current_balance.value())
        .bind(account.modified_at)
        .fetch_optional(&mut *self.tx)
        .await?;

        match row {
            Some(row) => account_from_row(row),
            None => Err(StoreError::VersionConflict {
                account_id: account.id,
                expected: account.version,
            }),
        }
    }

    async fn insert_transaction(&mut self, transaction: &Transaction) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, account_id, type, amount, balance_after, date, created_at, modified_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(transaction.id)
        .bind(transaction.account_id)
        .bind(transaction.kind.label())
        .bind(transaction.amount.value())
        .bind(transaction.balance_after.value())
        .bind(transaction.date)
        .bind(transaction.created_at)
        .bind(transaction.modified_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn transactions_for_account(
        &mut self,
        account_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Transaction>, StoreError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM transactions WHERE account_id = $1 \
             ORDER BY date DESC, created_at DESC OFFSET $2 LIMIT $3",
            TRANSACTION_COLUMNS
        ))
        .bind(account_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(transaction_from_row).collect()
    }

    async fn count_transactions(&mut self, account_id: Uuid) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE account_id = $1")
            .bind(account_id)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(count)
    }

    async fn all_transactions(&mut self, account_id: Uuid) -> Result<Vec<Transaction>, StoreError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM transactions WHERE account_id = $1 ORDER BY date DESC, created_at DESC",
            TRANSACTION_COLUMNS
        ))
        .bind(account_id)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(transaction_from_row).collect()
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
