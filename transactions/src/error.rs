use tessera_authority::AuthorityError;
use tessera_types::{AssetSymbol, NameError, Timestamp};
use thiserror::Error;

/// A malformed operation, detected without looking at ledger state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Name(#[from] NameError),

    #[error(transparent)]
    Authority(#[from] AuthorityError),

    #[error("{field} must be denominated in {expected}")]
    WrongSymbol {
        field: &'static str,
        expected: AssetSymbol,
    },

    #[error("{0} must be positive")]
    NotPositive(&'static str),

    #[error("{0} must not be negative")]
    Negative(&'static str),

    #[error("{field} exceeds {max} bytes")]
    TooLong { field: &'static str, max: usize },

    #[error("{0} is not valid JSON")]
    InvalidJson(&'static str),

    #[error("{0}")]
    Constraint(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("transaction has no operations")]
    Empty,

    #[error("transaction expired at {expiration}, head time is {now}")]
    Expired { expiration: Timestamp, now: Timestamp },

    #[error("operation {index} is invalid: {source}")]
    InvalidOperation {
        index: usize,
        #[source]
        source: ValidationError,
    },

    #[error(transparent)]
    Authority(#[from] AuthorityError),

    #[error("serialization error: {0}")]
    Serialization(String),
}
