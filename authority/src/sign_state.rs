//! Incremental evaluation of authorities against a fixed set of signing keys.
//!
//! A `SignState` remembers which keys were consumed and which accounts have
//! already been shown to approve, so checking several authorities against
//! the same signatures costs each nested account only once.

use std::collections::{BTreeMap, BTreeSet};
use tessera_types::{AccountName, PublicKey};
use tracing::trace;

use crate::authority::{Authority, AuthorityLevel};
use crate::verify::AuthorityResolver;

pub struct SignState<'a, R: AuthorityResolver + ?Sized> {
    resolver: &'a R,
    /// Tier resolved for nested account authorities.
    nested_level: AuthorityLevel,
    /// Signing keys and whether each has contributed to some authority.
    provided: BTreeMap<PublicKey, bool>,
    /// Keys that may be used but whose absence is not an error.
    available: BTreeSet<PublicKey>,
    approved_by: BTreeSet<AccountName>,
    max_recursion: u32,
}

impl<'a, R: AuthorityResolver + ?Sized> SignState<'a, R> {
    pub fn new(
        keys: &BTreeSet<PublicKey>,
        resolver: &'a R,
        nested_level: AuthorityLevel,
        max_recursion: u32,
    ) -> Self {
        Self {
            resolver,
            nested_level,
            provided: keys.iter().map(|k| (*k, false)).collect(),
            available: BTreeSet::new(),
            approved_by: BTreeSet::new(),
            max_recursion,
        }
    }

    /// Extra keys that may satisfy authorities without having signed.
    pub fn with_available_keys(mut self, keys: BTreeSet<PublicKey>) -> Self {
        self.available = keys;
        self
    }

    /// Mark an account as approving regardless of signatures.
    pub fn approve(&mut self, account: AccountName) {
        self.approved_by.insert(account);
    }

    pub fn is_approved(&self, account: &AccountName) -> bool {
        self.approved_by.contains(account)
    }

    fn signed_by(&mut self, key: &PublicKey) -> bool {
        if let Some(used) = self.provided.get_mut(key) {
            *used = true;
            return true;
        }
        if self.available.contains(key) {
            self.provided.insert(*key, true);
            return true;
        }
        false
    }

    /// Check `account` through its authority at the nested tier.
    pub fn check_account(&mut self, account: &AccountName) -> bool {
        if self.approved_by.contains(account) {
            return true;
        }
        match self.resolver.authority(account, self.nested_level) {
            Some(auth) => self.check_authority(&auth),
            None => false,
        }
    }

    /// Check a top level authority.
    pub fn check_authority(&mut self, auth: &Authority) -> bool {
        self.check_authority_at(auth, 0)
    }

    /// Greedy accumulation: keys first, then nested accounts, returning as
    /// soon as the threshold is met. Nested accounts past `max_recursion`
    /// are skipped and never count.
    pub fn check_authority_at(&mut self, auth: &Authority, depth: u32) -> bool {
        let threshold = u64::from(auth.weight_threshold);
        let mut total: u64 = 0;

        for (key, weight) in &auth.key_auths {
            if self.signed_by(key) {
                total += u64::from(*weight);
                if total >= threshold {
                    return true;
                }
            }
        }

        for (account, weight) in &auth.account_auths {
            if self.approved_by.contains(account) {
                total += u64::from(*weight);
                if total >= threshold {
                    return true;
                }
                continue;
            }
            if depth == self.max_recursion {
                trace!(%account, depth, "authority recursion limit reached");
                continue;
            }
            let Some(nested) = self.resolver.authority(account, self.nested_level) else {
                continue;
            };
            if self.check_authority_at(&nested, depth + 1) {
                self.approved_by.insert(account.clone());
                total += u64::from(*weight);
                if total >= threshold {
                    return true;
                }
            }
        }

        total >= threshold
    }

    /// Drop keys that never contributed; returns true if any were dropped.
    pub fn remove_unused_signatures(&mut self) -> bool {
        let before = self.provided.len();
        self.provided.retain(|_, used| *used);
        self.provided.len() != before
    }

    /// Keys that have contributed so far.
    pub fn used_keys(&self) -> impl Iterator<Item = &PublicKey> {
        self.provided
            .iter()
            .filter_map(|(key, used)| used.then_some(key))
    }
}
