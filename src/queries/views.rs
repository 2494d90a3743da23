//! Read models returned by the query service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Account, Client, Transaction, TransactionKind};

/// Balances are reported in a single currency
pub const DEFAULT_CURRENCY: &str = "USD";

// =========================================================================
// Balance
// =========================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalanceView {
    pub account_number: String,
    pub account_type: String,
    pub current_balance: Decimal,
    pub currency: String,
    pub last_updated: DateTime<Utc>,
}

impl From<&Account> for AccountBalanceView {
    fn from(account: &Account) -> Self {
        Self {
            account_number: account.account_number.clone(),
            account_type: account.account_type.clone(),
            current_balance: account.current_balance.value(),
            currency: DEFAULT_CURRENCY.to_string(),
            last_updated: account.last_updated(),
        }
    }
}

// =========================================================================
// Pagination
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_count: i64,
    pub count: i64,
    pub current_page: i64,
    pub total_pages: i64,
    pub page_size: i64,
}

impl Pagination {
    pub fn new(total_count: i64, count: usize, current_page: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total_count + page_size - 1) / page_size
        } else {
            0
        };

        Self {
            total_count,
            count: count as i64,
            current_page,
            total_pages,
            page_size,
        }
    }
}

/// One page of results plus its position in the full set
#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paged<T> {
    pub fn new(data: Vec<T>, total_count: i64, page: i64, page_size: i64) -> Self {
        let pagination = Pagination::new(total_count, data.len(), page, page_size);
        Self { data, pagination }
    }
}

// =========================================================================
// Client summary
// =========================================================================

/// Counts and sums per transaction kind for one account
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub total_deposits: i64,
    pub total_deposits_amount: Decimal,
    pub total_withdrawals: i64,
    pub total_withdrawals_amount: Decimal,
    pub total_transfers_out: i64,
    pub total_transfers_out_amount: Decimal,
    pub total_transfers_in: i64,
    pub total_transfers_in_amount: Decimal,
    pub net_amount: Decimal,
    pub current_balance: Decimal,
}

impl TransactionSummary {
    pub fn calculate(account: &Account, transactions: &[Transaction]) -> Self {
        let mut summary = Self {
            current_balance: account.current_balance.value(),
            ..Self::default()
        };

        for transaction in transactions {
            let amount = transaction.amount.value();
            match transaction.kind {
                TransactionKind::Deposit => {
                    summary.total_deposits += 1;
                    summary.total_deposits_amount += amount;
                }
                TransactionKind::Withdrawal => {
                    summary.total_withdrawals += 1;
                    summary.total_withdrawals_amount += amount;
                }
                TransactionKind::TransferOut => {
                    summary.total_transfers_out += 1;
                    summary.total_transfers_out_amount += amount;
                }
                TransactionKind::TransferIn => {
                    summary.total_transfers_in += 1;
                    summary.total_transfers_in_amount += amount;
                }
            }
        }

        summary.net_amount = (summary.total_deposits_amount + summary.total_transfers_in_amount)
            - (summary.total_withdrawals_amount + summary.total_transfers_out_amount);
        summary
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub account_number: String,
    pub account_type: String,
    pub current_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub transaction_summary: TransactionSummary,
    pub total_transactions: i64,
    pub last_transaction_date: Option<DateTime<Utc>>,
}

impl AccountSummary {
    pub fn new(account: &Account, transactions: &[Transaction]) -> Self {
        Self {
            account_number: account.account_number.clone(),
            account_type: account.account_type.clone(),
            current_balance: account.current_balance.value(),
            created_at: account.created_at,
            transaction_summary: TransactionSummary::calculate(account, transactions),
            total_transactions: transactions.len() as i64,
            last_transaction_date: transactions.iter().map(|t| t.date).max(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientAccountsSummary {
    pub client_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub accounts: Vec<AccountSummary>,
    pub total_accounts: i64,
    pub total_balance: Decimal,
}

impl ClientAccountsSummary {
    pub fn new(client: &Client, accounts: Vec<AccountSummary>) -> Self {
        let total_balance = accounts.iter().map(|a| a.current_balance).sum();
        Self {
            client_id: client.id,
            full_name: client.full_name(),
            email: client.email.clone(),
            total_accounts: accounts.len() as i64,
            total_balance,
            accounts,
        }
    }
}
