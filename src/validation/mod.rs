//! Validation
//!
//! Fail-fast checks used by the orchestrators. The pure validators never
//! touch the store; the async ones only read through the caller's unit of work.

pub mod account;
pub mod account_creation;
pub mod client_creation;
pub mod password;
pub mod request;

pub use account::{
    validate_account_exists, validate_account_ownership, validate_sufficient_balance, GuardedOperation,
};
pub use account_creation::{
    validate_and_normalize_account_type, validate_client_exists, validate_no_duplicate_account_type,
};
pub use client_creation::{normalize_tax_id, require_account_type, validate_tax_id_not_registered};
pub use password::{hash_password, validate_password, verify_password, PasswordHash};
pub use request::{validate_authenticated, validate_pagination};
