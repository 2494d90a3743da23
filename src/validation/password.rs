//! Password policy and salted hashing

use rand::RngCore;
use sha2::{Digest, Sha512};

use crate::domain::DomainError;

const MIN_PASSWORD_LENGTH: usize = 8;
const SALT_LENGTH: usize = 32;
const SPECIAL_CHARACTERS: &str = r"@!#$%&*-+()=|¬/\,;.:-_{}[]´¡?¿'";

/// Hex encoded hash and salt, as stored on the client record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub hash: String,
    pub salt: String,
}

pub fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::WeakPassword(
            "Password must be at least 8 characters long".to_string(),
        ));
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(DomainError::WeakPassword(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(DomainError::WeakPassword(
            "Password must contain at least one number".to_string(),
        ));
    }
    if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        return Err(DomainError::WeakPassword(
            "Password must contain at least one special character".to_string(),
        ));
    }
    Ok(())
}

fn digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha512::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

/// Equality whose running time depends only on the length of the inputs
fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    left.len() == right.len() && left.iter().zip(right).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

/// Hash with a fresh random salt
pub fn hash_password(password: &str) -> PasswordHash {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);

    PasswordHash {
        hash: hex::encode(digest(&salt, password)),
        salt: hex::encode(salt),
    }
}

/// Check a password against a stored hash and salt. A malformed hash or salt never verifies.
pub fn verify_password(password: &str, hash: &str, salt: &str) -> bool {
    match (hex::decode(hash), hex::decode(salt)) {
        (Ok(expected), Ok(salt)) => constant_time_eq(&digest(&salt, password), &expected),
        _ => false,
    }
}
