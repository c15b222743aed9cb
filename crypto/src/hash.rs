//! Blake2b hashing for transaction digests.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use tessera_types::{ChainId, TxDigest};

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// The digest signed by a transaction's authorities: the chain id followed
/// by the canonical encoding of the unsigned transaction.
pub fn transaction_digest(chain_id: &ChainId, tx_bytes: &[u8]) -> TxDigest {
    TxDigest::new(blake2b_256_multi(&[chain_id.as_bytes(), tx_bytes]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blake2b_deterministic() {
        let h1 = blake2b_256(b"hello tessera");
        let h2 = blake2b_256(b"hello tessera");
        assert_eq!(h1, h2);
    }

    #[test]
    fn blake2b_different_inputs() {
        let h1 = blake2b_256(b"hello");
        let h2 = blake2b_256(b"world");
        assert_ne!(h1, h2);
    }

    #[test]
    fn blake2b_multi_equivalent() {
        let single = blake2b_256(b"helloworld");
        let multi = blake2b_256_multi(&[b"hello", b"world"]);
        assert_eq!(single, multi);
    }

    #[test]
    fn digest_depends_on_chain_id() {
        let a = transaction_digest(&ChainId::new([1u8; 32]), b"tx");
        let b = transaction_digest(&ChainId::new([2u8; 32]), b"tx");
        assert_ne!(a, b);
        assert_ne!(a, TxDigest::ZERO);
    }
}
