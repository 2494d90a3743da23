//! Account factory

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Account, Balance};

/// New zero-balance account, not yet persisted (version 0).
pub fn build_account(client_id: Uuid, account_number: String, account_type: String) -> Account {
    Account {
        id: Uuid::new_v4(),
        account_number,
        account_type,
        current_balance: Balance::zero(),
        client_id,
        version: 0,
        created_at: Utc::now(),
        modified_at: None,
    }
}
