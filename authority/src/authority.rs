//! Weighted threshold authorities.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tessera_types::{AccountName, PublicKey};

use crate::error::AuthorityError;

/// The three permission tiers of an account, weakest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AuthorityLevel {
    Posting,
    Active,
    Owner,
}

impl fmt::Display for AuthorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Posting => "posting",
            Self::Active => "active",
            Self::Owner => "owner",
        })
    }
}

/// A weighted threshold over keys and nested accounts.
///
/// The authority is satisfied once the weights of signing keys plus the
/// weights of satisfied nested accounts reach `weight_threshold`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    pub weight_threshold: u32,
    pub account_auths: BTreeMap<AccountName, u16>,
    pub key_auths: BTreeMap<PublicKey, u16>,
}

impl Authority {
    pub fn new(weight_threshold: u32) -> Self {
        Self {
            weight_threshold,
            ..Self::default()
        }
    }

    /// Single-key authority with threshold 1.
    pub fn from_key(key: PublicKey) -> Self {
        Self::new(1).with_key(key, 1)
    }

    pub fn with_key(mut self, key: PublicKey, weight: u16) -> Self {
        self.key_auths.insert(key, weight);
        self
    }

    pub fn with_account(mut self, account: impl Into<AccountName>, weight: u16) -> Self {
        self.account_auths.insert(account.into(), weight);
        self
    }

    pub fn num_auths(&self) -> usize {
        self.account_auths.len() + self.key_auths.len()
    }

    pub fn total_weight(&self) -> u64 {
        self.account_auths
            .values()
            .chain(self.key_auths.values())
            .map(|w| u64::from(*w))
            .sum()
    }

    /// True when no combination of signatures can ever reach the threshold.
    pub fn is_impossible(&self) -> bool {
        self.total_weight() < u64::from(self.weight_threshold)
    }

    /// Nested account names referenced by this authority.
    pub fn accounts(&self) -> impl Iterator<Item = &AccountName> {
        self.account_auths.keys()
    }

    /// Every nested account name must be well formed.
    pub fn validate(&self) -> Result<(), AuthorityError> {
        for name in self.account_auths.keys() {
            if !name.is_valid() {
                return Err(AuthorityError::InvalidAccount(name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impossible_when_weights_fall_short() {
        let auth = Authority::new(3)
            .with_key(PublicKey([1u8; 32]), 1)
            .with_account("alice", 1);
        assert!(auth.is_impossible());
        assert!(!auth.clone().with_account("bob", 1).is_impossible());
    }

    #[test]
    fn zero_threshold_is_never_impossible() {
        assert!(!Authority::new(0).is_impossible());
    }

    #[test]
    fn validate_rejects_bad_nested_names() {
        let auth = Authority::new(1).with_account("X", 1);
        assert_eq!(
            auth.validate(),
            Err(AuthorityError::InvalidAccount(AccountName::new("X")))
        );
        assert!(Authority::new(1).with_account("alice", 1).validate().is_ok());
    }

    #[test]
    fn levels_are_ordered_weakest_first() {
        assert!(AuthorityLevel::Posting < AuthorityLevel::Active);
        assert!(AuthorityLevel::Active < AuthorityLevel::Owner);
        assert_eq!(AuthorityLevel::Owner.to_string(), "owner");
    }
}
