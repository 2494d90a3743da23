//! Client factory

use chrono::Utc;
use uuid::Uuid;

use crate::domain::Client;
use crate::handlers::CreateClientCommand;
use crate::validation::password::PasswordHash;

/// Build a client record from an onboarding command.
///
/// `tax_id` must already be normalized and `credentials` already hashed.
pub fn build_client(command: &CreateClientCommand, tax_id: String, credentials: PasswordHash) -> Client {
    let email = command
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_string);

    Client {
        id: Uuid::new_v4(),
        name: command.name.trim().to_string(),
        last_name: command.last_name.trim().to_string(),
        tax_id,
        email,
        password_hash: credentials.hash,
        password_salt: credentials.salt,
        date_of_birth: command.date_of_birth,
        gender: command.gender.trim().to_string(),
        income: command.income,
        created_at: Utc::now(),
        modified_at: None,
    }
}
