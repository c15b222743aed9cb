use tessera_types::AccountName;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorityError {
    #[error("missing posting authority of {0}")]
    MissingPosting(AccountName),

    #[error("missing active authority of {0}")]
    MissingActive(AccountName),

    #[error("missing owner authority of {0}")]
    MissingOwner(AccountName),

    #[error("missing authority")]
    MissingOther,

    #[error("posting authority cannot be combined with active or owner authority")]
    MixedPosting,

    #[error("unnecessary signature(s) detected")]
    IrrelevantSignature,

    #[error("duplicate signature detected")]
    DuplicateSignature,

    #[error("signature does not verify")]
    InvalidSignature,

    #[error("invalid account {0} in authority")]
    InvalidAccount(AccountName),
}
