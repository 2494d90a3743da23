//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use rust_decimal::Decimal;
use thiserror::Error;

use super::AmountError;

/// Business rule and validation failures
///
/// Every variant carries a numeric code (HTTP-equivalent) and a
/// caller-facing message. None of them are transient, so none are retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// No caller identity on the request
    #[error("User not authenticated.")]
    Unauthenticated,

    /// Caller does not own the account it tried to operate on
    #[error("You cannot {operation}. Use the transfer functionality to send money to other accounts.")]
    Forbidden { operation: String },

    #[error("Account with number '{0}' not found.")]
    AccountNotFound(String),

    #[error("No client found with the ID '{0}'.")]
    ClientNotFound(String),

    /// Authenticated caller has no account at all
    #[error("No account found for the current user.")]
    NoAccountForClient,

    /// Malformed request (empty fields, same-account transfer, bad paging)
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    InvalidAmount(String),

    #[error("Insufficient funds. Current balance: {balance}, Requested amount: {requested}")]
    InsufficientFunds { balance: Decimal, requested: Decimal },

    #[error("Invalid account type '{given}'. Allowed types are: {}", .allowed.join(", "))]
    InvalidAccountType { given: String, allowed: Vec<String> },

    /// The valid account type catalogue is empty
    #[error("No valid account types configured.")]
    NoAccountTypesConfigured,

    #[error(
        "You already have a '{account_type}' account. Each user can only have one account of each type. \
         Your current account types: {}. Allowed types are: {}",
        .existing.join(", "),
        .allowed.join(", ")
    )]
    DuplicateAccountType {
        account_type: String,
        existing: Vec<String>,
        allowed: Vec<String>,
    },

    /// Every 7-digit account number has been issued
    #[error("No account numbers are left to issue.")]
    AccountNumbersExhausted,

    #[error("{0}")]
    InvalidTaxId(String),

    #[error("A client with Tax ID '{0}' already exists.")]
    DuplicateTaxId(String),

    #[error("{0}")]
    WeakPassword(String),
}

impl DomainError {
    /// Ownership violation naming the attempted operation
    pub fn forbidden(operation: impl Into<String>) -> Self {
        Self::Forbidden {
            operation: operation.into(),
        }
    }

    pub fn insufficient_funds(balance: Decimal, requested: Decimal) -> Self {
        Self::InsufficientFunds { balance, requested }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// HTTP-equivalent status code
    pub fn code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Forbidden { .. } => 403,
            Self::AccountNotFound(_) | Self::ClientNotFound(_) | Self::NoAccountForClient => 404,
            Self::NoAccountTypesConfigured | Self::AccountNumbersExhausted => 500,
            Self::InvalidRequest(_)
            | Self::InvalidAmount(_)
            | Self::InsufficientFunds { .. }
            | Self::InvalidAccountType { .. }
            | Self::DuplicateAccountType { .. }
            | Self::InvalidTaxId(_)
            | Self::DuplicateTaxId(_)
            | Self::WeakPassword(_) => 400,
        }
    }

    /// Machine readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden { .. } => "forbidden",
            Self::AccountNotFound(_) => "account_not_found",
            Self::ClientNotFound(_) => "client_not_found",
            Self::NoAccountForClient => "no_account_for_client",
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::InvalidAccountType { .. } => "invalid_account_type",
            Self::NoAccountTypesConfigured => "no_account_types_configured",
            Self::DuplicateAccountType { .. } => "duplicate_account_type",
            Self::AccountNumbersExhausted => "account_numbers_exhausted",
            Self::InvalidTaxId(_) => "invalid_tax_id",
            Self::DuplicateTaxId(_) => "duplicate_tax_id",
            Self::WeakPassword(_) => "weak_password",
        }
    }
}

impl From<AmountError> for DomainError {
    fn from(err: AmountError) -> Self {
        Self::InvalidAmount(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_funds_message() {
        let err = DomainError::insufficient_funds(dec!(1500.00), dec!(2000.00));

        assert_eq!(err.code(), 400);
        assert_eq!(
            err.to_string(),
            "Insufficient funds. Current balance: 1500.00, Requested amount: 2000.00"
        );
    }

    #[test]
    fn test_forbidden_names_operation() {
        let err = DomainError::forbidden("withdraw money from other accounts");

        assert_eq!(err.code(), 403);
        assert!(err.to_string().contains("withdraw money from other accounts"));
        assert!(err.to_string().contains("transfer functionality"));
    }

    #[test]
    fn test_codes() {
        assert_eq!(DomainError::Unauthenticated.code(), 401);
        assert_eq!(DomainError::AccountNotFound("1000000".into()).code(), 404);
        assert_eq!(DomainError::NoAccountTypesConfigured.code(), 500);
        assert_eq!(DomainError::AccountNumbersExhausted.code(), 500);
    }

    #[test]
    fn test_account_type_messages_list_catalogue() {
        let allowed = vec!["Savings".to_string(), "Checking".to_string()];
        let err = DomainError::InvalidAccountType {
            given: "Gold".into(),
            allowed: allowed.clone(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid account type 'Gold'. Allowed types are: Savings, Checking"
        );

        let err = DomainError::DuplicateAccountType {
            account_type: "savings".into(),
            existing: vec!["Savings".into()],
            allowed,
        };
        let message = err.to_string();
        assert!(message.contains("Your current account types: Savings."));
        assert!(message.ends_with("Allowed types are: Savings, Checking"));
    }

    #[test]
    fn test_amount_error_becomes_invalid_amount() {
        let err: DomainError = AmountError::Overflow.into();
        assert_eq!(err.error_code(), "invalid_amount");
    }
}
