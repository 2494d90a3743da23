//! bank_ledger Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod factory;
pub mod handlers;
pub mod numbering;
pub mod queries;
pub mod store;
pub mod validation;

pub use config::Config;
pub use domain::{Account, Amount, AmountError, Balance, Client, DomainError, OperationContext, Transaction};
pub use error::{AppError, AppResult};
