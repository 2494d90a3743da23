//! Account Number Generator
//!
//! Account numbers are 7-digit decimal strings issued sequentially from
//! "1000000". Only well-formed numbers take part in computing the next one.

use crate::domain::DomainError;
use crate::error::AppError;
use crate::store::LedgerTx;

pub const ACCOUNT_NUMBER_LENGTH: usize = 7;

/// Highest value below the first issued number
const NUMBER_FLOOR: u64 = 999_999;

/// Last number that still fits in seven digits
const NUMBER_CEILING: u64 = 9_999_999;

fn is_well_formed(number: &str) -> bool {
    number.len() == ACCOUNT_NUMBER_LENGTH && number.bytes().all(|b| b.is_ascii_digit())
}

/// Next number after the highest well-formed one in `existing`, or `None`
/// once "9999999" has been issued.
pub fn next_account_number<'a>(existing: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let last = existing
        .into_iter()
        .filter(|number| is_well_formed(number))
        .filter_map(|number| number.parse::<u64>().ok())
        .max()
        .unwrap_or(NUMBER_FLOOR);

    let next = last.max(NUMBER_FLOOR) + 1;
    if next > NUMBER_CEILING {
        return None;
    }
    Some(format!("{:0width$}", next, width = ACCOUNT_NUMBER_LENGTH))
}

/// Issue the next account number inside the caller's unit of work.
///
/// Takes the store's issuance lock first, so two units can't read the same maximum.
pub async fn generate_account_number<T: LedgerTx>(tx: &mut T) -> Result<String, AppError> {
    tx.lock_account_numbers().await?;
    let numbers = tx.account_numbers().await?;

    next_account_number(numbers.iter().map(String::as_str)).ok_or_else(|| {
        tracing::error!("Account number space exhausted");
        AppError::from(DomainError::AccountNumbersExhausted)
    })
}
