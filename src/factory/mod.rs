//! Factories
//!
//! Build new domain records; nothing here touches the store.

pub mod account;
pub mod client;
pub mod transaction;

pub use account::build_account;
pub use client::build_client;
pub use transaction::build_transaction;
