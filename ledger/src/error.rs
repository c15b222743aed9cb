use tessera_authority::AuthorityError;
use tessera_store::StoreError;
use tessera_transactions::{TransactionError, ValidationError};
use tessera_types::{AccountName, Asset, AssetError, Timestamp};
use thiserror::Error;

/// Every failure that aborts a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid operation: {0}")]
    Validation(#[from] ValidationError),

    #[error("invalid transaction: {0}")]
    Transaction(#[from] TransactionError),

    #[error("authority check failed: {0}")]
    Authority(#[from] AuthorityError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("asset arithmetic failed: {0}")]
    Asset(#[from] AssetError),

    #[error("account {0} does not exist")]
    UnknownAccount(AccountName),

    #[error("account {account} has {available}, needs {required}")]
    InsufficientFunds {
        account: AccountName,
        required: Asset,
        available: Asset,
    },

    #[error("{what} is not allowed before {allowed_at}")]
    TooSoon {
        what: &'static str,
        allowed_at: Timestamp,
    },

    #[error("{0}")]
    IllegalState(String),

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("transaction {index} of block {block} failed: {source}")]
    BlockTransaction {
        block: u64,
        index: usize,
        #[source]
        source: Box<LedgerError>,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    pub fn illegal(msg: impl Into<String>) -> Self {
        Self::IllegalState(msg.into())
    }

    pub fn limit(msg: impl Into<String>) -> Self {
        Self::LimitExceeded(msg.into())
    }

    pub fn denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }
}
