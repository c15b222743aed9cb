use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("malformed public key")]
    InvalidPublicKey,

    #[error("signature does not verify")]
    InvalidSignature,
}
