//! Ledger records
//!
//! Clients own accounts, accounts own an append-only list of transactions.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{Amount, Balance};

/// Bank client (identity, demographics and credentials)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub last_name: String,
    /// Normalized tax id (no spaces or dashes)
    pub tax_id: String,
    /// Login key, optional
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub password_salt: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub income: Decimal,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl Client {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.last_name)
    }
}

/// Monetary container owned by exactly one client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    /// 7-digit zero-padded decimal string, globally unique
    pub account_number: String,
    pub account_type: String,
    pub current_balance: Balance,
    pub client_id: Uuid,
    /// Optimistic concurrency token, bumped on every balance write
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn is_owned_by(&self, client_id: Uuid) -> bool {
        self.client_id == client_id
    }

    /// Copy of this account carrying a new balance, as it will look once written.
    pub fn with_balance(&self, balance: Balance) -> Account {
        Account {
            current_balance: balance,
            modified_at: Some(Utc::now()),
            ..self.clone()
        }
    }

    /// Last time the balance changed (creation time for untouched accounts)
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.modified_at.unwrap_or(self.created_at)
    }
}

/// The four kinds of balance-affecting events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "Deposit")]
    Deposit,
    #[serde(rename = "Withdrawal")]
    Withdrawal,
    #[serde(rename = "Transfer Out")]
    TransferOut,
    #[serde(rename = "Transfer In")]
    TransferIn,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 4] = [
        TransactionKind::Deposit,
        TransactionKind::Withdrawal,
        TransactionKind::TransferOut,
        TransactionKind::TransferIn,
    ];

    /// Stored and displayed label
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdrawal => "Withdrawal",
            TransactionKind::TransferOut => "Transfer Out",
            TransactionKind::TransferIn => "Transfer In",
        }
    }

    /// Whether this kind increases the account balance
    pub fn is_credit(&self) -> bool {
        matches!(self, TransactionKind::Deposit | TransactionKind::TransferIn)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error for labels that are not one of the four kinds
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown transaction type: {0}")]
pub struct UnknownTransactionKind(pub String);

impl FromStr for TransactionKind {
    type Err = UnknownTransactionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionKind::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTransactionKind(s.to_string()))
    }
}

/// Immutable ledger entry; never updated or deleted once committed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Amount,
    /// Account balance right after this entry was applied
    pub balance_after: Balance,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}
