//! Transaction-wide authority verification.

use std::collections::BTreeSet;
use tessera_types::{AccountName, PublicKey};
use tracing::debug;

use crate::authority::{Authority, AuthorityLevel};
use crate::error::AuthorityError;
use crate::sign_state::SignState;

/// Looks up an account's authority at a given tier.
///
/// Returns `None` for unknown accounts, which never satisfy anything.
pub trait AuthorityResolver {
    fn authority(&self, account: &AccountName, level: AuthorityLevel) -> Option<Authority>;
}

impl<F> AuthorityResolver for F
where
    F: Fn(&AccountName, AuthorityLevel) -> Option<Authority>,
{
    fn authority(&self, account: &AccountName, level: AuthorityLevel) -> Option<Authority> {
        self(account, level)
    }
}

/// The union of authorities demanded by every operation of a transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequiredAuthorities {
    pub owner: BTreeSet<AccountName>,
    pub active: BTreeSet<AccountName>,
    pub posting: BTreeSet<AccountName>,
    /// Raw authorities that must be satisfied as given, not via an account.
    pub other: Vec<Authority>,
}

impl RequiredAuthorities {
    pub fn require(&mut self, level: AuthorityLevel, account: AccountName) {
        match level {
            AuthorityLevel::Owner => self.owner.insert(account),
            AuthorityLevel::Active => self.active.insert(account),
            AuthorityLevel::Posting => self.posting.insert(account),
        };
    }

    pub fn require_other(&mut self, authority: Authority) {
        self.other.push(authority);
    }

    pub fn is_empty(&self) -> bool {
        self.owner.is_empty()
            && self.active.is_empty()
            && self.posting.is_empty()
            && self.other.is_empty()
    }
}

/// Check that `keys` satisfy every required authority and that each key
/// contributed to at least one of them.
///
/// Posting requirements are checked alone: a transaction needing posting
/// authority may not also need active or owner authority. A posting
/// requirement accepts the posting, active or owner authority of the
/// account; an active requirement accepts active or owner; an owner
/// requirement accepts only owner.
pub fn verify_authority<R: AuthorityResolver + ?Sized>(
    required: &RequiredAuthorities,
    keys: &BTreeSet<PublicKey>,
    resolver: &R,
    max_recursion: u32,
) -> Result<(), AuthorityError> {
    if !required.posting.is_empty() {
        if !required.owner.is_empty() || !required.active.is_empty() {
            return Err(AuthorityError::MixedPosting);
        }
        let mut state = SignState::new(keys, resolver, AuthorityLevel::Posting, max_recursion);
        for account in &required.posting {
            let satisfied = state.check_account(account)
                || check_tier(&mut state, resolver, account, AuthorityLevel::Active)
                || check_tier(&mut state, resolver, account, AuthorityLevel::Owner);
            if !satisfied {
                debug!(%account, "missing posting authority");
                return Err(AuthorityError::MissingPosting(account.clone()));
            }
        }
        if state.remove_unused_signatures() {
            return Err(AuthorityError::IrrelevantSignature);
        }
        return Ok(());
    }

    let mut state = SignState::new(keys, resolver, AuthorityLevel::Active, max_recursion);

    for auth in &required.other {
        if !state.check_authority(auth) {
            debug!("missing raw authority");
            return Err(AuthorityError::MissingOther);
        }
    }

    for account in &required.active {
        let satisfied = state.check_account(account)
            || check_tier(&mut state, resolver, account, AuthorityLevel::Owner);
        if !satisfied {
            debug!(%account, "missing active authority");
            return Err(AuthorityError::MissingActive(account.clone()));
        }
    }

    for account in &required.owner {
        if !check_tier(&mut state, resolver, account, AuthorityLevel::Owner) {
            debug!(%account, "missing owner authority");
            return Err(AuthorityError::MissingOwner(account.clone()));
        }
    }

    if state.remove_unused_signatures() {
        return Err(AuthorityError::IrrelevantSignature);
    }
    Ok(())
}

fn check_tier<R: AuthorityResolver + ?Sized>(
    state: &mut SignState<'_, R>,
    resolver: &R,
    account: &AccountName,
    level: AuthorityLevel,
) -> bool {
    match resolver.authority(account, level) {
        Some(auth) => state.check_authority(&auth),
        None => false,
    }
}
