//! Ed25519 message signing and verification.

use crate::error::CryptoError;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use tessera_types::{PrivateKey, PublicKey, Signature};

/// Sign a message with a private key, returning the signature.
pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    let sig = signing_key.sign(message);
    Signature(sig.to_bytes())
}

/// Verify a signature, rejecting non-canonical encodings.
pub fn verify_strict(
    message: &[u8],
    signature: &Signature,
    public_key: &PublicKey,
) -> Result<(), CryptoError> {
    let verifying_key =
        VerifyingKey::from_bytes(&public_key.0).map_err(|_| CryptoError::InvalidPublicKey)?;
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key
        .verify_strict(message, &dalek_sig)
        .map_err(|_| CryptoError::InvalidSignature)
}

/// Verify a signature against a message and public key.
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    verify_strict(message, signature, public_key).is_ok()
}
