//! Queries module
//!
//! Read side of the ledger: balances, account listings, movement history
//! and per-client summaries. Reads never change state.

mod service;
mod views;

pub use service::LedgerQueries;
pub use views::{
    AccountBalanceView, AccountSummary, ClientAccountsSummary, Paged, Pagination, TransactionSummary,
    DEFAULT_CURRENCY,
};
