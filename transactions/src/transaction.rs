//! Transactions: an ordered list of operations applied all-or-nothing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tessera_authority::{AuthorityError, RequiredAuthorities};
use tessera_crypto::{sign_message, transaction_digest, verify_strict};
use tessera_types::{ChainId, KeyPair, PublicKey, Signature, Timestamp, TxDigest};

use crate::error::TransactionError;
use crate::Operation;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The transaction is rejected once head block time passes this.
    pub expiration: Timestamp,
    pub operations: Vec<Operation>,
}

impl Transaction {
    pub fn new(expiration: Timestamp, operations: Vec<Operation>) -> Self {
        Self {
            expiration,
            operations,
        }
    }

    /// Validate every operation; the first failure names its index.
    pub fn validate(&self) -> Result<(), TransactionError> {
        if self.operations.is_empty() {
            return Err(TransactionError::Empty);
        }
        for (index, op) in self.operations.iter().enumerate() {
            op.validate()
                .map_err(|source| TransactionError::InvalidOperation { index, source })?;
        }
        Ok(())
    }

    /// Union of the authorities demanded by all operations.
    pub fn required_authorities(&self) -> RequiredAuthorities {
        let mut required = RequiredAuthorities::default();
        for op in &self.operations {
            op.required_authorities(&mut required);
        }
        required
    }

    /// Canonical encoding of the unsigned transaction.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        bincode::serialize(self).map_err(|e| TransactionError::Serialization(e.to_string()))
    }

    pub fn digest(&self, chain_id: &ChainId) -> Result<TxDigest, TransactionError> {
        Ok(transaction_digest(chain_id, &self.to_bytes()?))
    }
}

/// A signature together with the key that claims to have produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySignature {
    pub key: PublicKey,
    pub signature: Signature,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signatures: Vec<KeySignature>,
}

impl SignedTransaction {
    pub fn new(transaction: Transaction) -> Self {
        Self {
            transaction,
            signatures: Vec::new(),
        }
    }

    /// Append a signature over the transaction digest.
    pub fn sign(&mut self, keypair: &KeyPair, chain_id: &ChainId) -> Result<(), TransactionError> {
        let digest = self.transaction.digest(chain_id)?;
        self.signatures.push(KeySignature {
            key: keypair.public,
            signature: sign_message(digest.as_bytes(), &keypair.private),
        });
        Ok(())
    }

    /// The set of keys with a valid signature over the digest.
    ///
    /// Fails if any signature does not verify or if a key signed twice.
    pub fn signature_keys(
        &self,
        chain_id: &ChainId,
    ) -> Result<BTreeSet<PublicKey>, TransactionError> {
        let digest = self.transaction.digest(chain_id)?;
        let mut keys = BTreeSet::new();
        for entry in &self.signatures {
            verify_strict(digest.as_bytes(), &entry.signature, &entry.key)
                .map_err(|_| AuthorityError::InvalidSignature)?;
            if !keys.insert(entry.key) {
                return Err(AuthorityError::DuplicateSignature.into());
            }
        }
        Ok(keys)
    }
}
