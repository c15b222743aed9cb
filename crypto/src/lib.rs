//! Cryptographic primitives for the tessera ledger core.
//!
//! - **Ed25519** for signing and signature verification
//! - **Blake2b** for transaction digests

pub mod error;
pub mod hash;
pub mod keys;
pub mod sign;

pub use error::CryptoError;
pub use hash::{blake2b_256, blake2b_256_multi, transaction_digest};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use sign::{sign_message, verify_signature, verify_strict};
