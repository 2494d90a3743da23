//! Command definitions
//!
//! Commands represent intentions to change the ledger; results are the
//! views handed back to the presentation layer.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Account, Client, Transaction, TransactionKind};

// =========================================================================
// Money movement commands
// =========================================================================

/// Command to deposit money into one of the caller's accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositCommand {
    pub account_number: String,
    pub amount: Decimal,
}

impl DepositCommand {
    pub fn new(account_number: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_number: account_number.into(),
            amount,
        }
    }
}

/// Command to withdraw money from one of the caller's accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawCommand {
    pub account_number: String,
    pub amount: Decimal,
}

impl WithdrawCommand {
    pub fn new(account_number: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_number: account_number.into(),
            amount,
        }
    }
}

/// Command to move money from a caller-owned account to any account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferCommand {
    pub from_account_number: String,
    pub to_account_number: String,
    pub amount: Decimal,
}

impl TransferCommand {
    pub fn new(
        from_account_number: impl Into<String>,
        to_account_number: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            from_account_number: from_account_number.into(),
            to_account_number: to_account_number.into(),
            amount,
        }
    }
}

// =========================================================================
// Creation commands
// =========================================================================

/// Command to open an account of the given type for a client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountCommand {
    pub client_id: Uuid,
    pub account_type: String,
}

impl CreateAccountCommand {
    pub fn new(client_id: Uuid, account_type: impl Into<String>) -> Self {
        Self {
            client_id,
            account_type: account_type.into(),
        }
    }
}

/// Command to onboard a client together with their first account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientCommand {
    pub name: String,
    pub last_name: String,
    pub tax_id: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub income: Decimal,
    /// Mandatory at onboarding; optional only so the check can report it
    #[serde(default)]
    pub account_type: Option<String>,
}

impl CreateClientCommand {
    pub fn new(
        name: impl Into<String>,
        last_name: impl Into<String>,
        tax_id: impl Into<String>,
        password: impl Into<String>,
        date_of_birth: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            last_name: last_name.into(),
            tax_id: tax_id.into(),
            email: None,
            password: password.into(),
            date_of_birth,
            gender: String::new(),
            income: Decimal::ZERO,
            account_type: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = gender.into();
        self
    }

    pub fn with_income(mut self, income: Decimal) -> Self {
        self.income = income;
        self
    }

    pub fn with_account_type(mut self, account_type: impl Into<String>) -> Self {
        self.account_type = Some(account_type.into());
        self
    }
}

// =========================================================================
// Result views
// =========================================================================

/// Committed transaction, with the owning account number attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: Uuid,
    pub account_number: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub date: DateTime<Utc>,
}

impl TransactionView {
    pub fn new(transaction: &Transaction, account_number: impl Into<String>) -> Self {
        Self {
            id: transaction.id,
            account_number: account_number.into(),
            kind: transaction.kind,
            amount: transaction.amount.value(),
            balance_after: transaction.balance_after.value(),
            date: transaction.date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: Uuid,
    pub account_number: String,
    pub account_type: String,
    pub current_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            account_number: account.account_number.clone(),
            account_type: account.account_type.clone(),
            current_balance: account.current_balance.value(),
            created_at: account.created_at,
            modified_at: account.modified_at,
        }
    }
}

/// Onboarded client together with the number of their first account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientView {
    pub id: Uuid,
    pub name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub income: Decimal,
    pub account_number: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl ClientView {
    pub fn new(client: &Client, account_number: impl Into<String>) -> Self {
        Self {
            id: client.id,
            name: client.name.clone(),
            last_name: client.last_name.clone(),
            email: client.email.clone(),
            date_of_birth: client.date_of_birth,
            gender: client.gender.clone(),
            income: client.income,
            account_number: account_number.into(),
            created_at: client.created_at,
            modified_at: client.modified_at,
        }
    }
}
