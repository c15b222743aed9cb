//! Account authorities and the owner authority history kept for recovery.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use tessera_authority::{Authority, AuthorityLevel};
use tessera_types::{AccountName, Timestamp};

/// The three authority tiers of one account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAuthority {
    pub account: AccountName,
    pub owner: Authority,
    pub active: Authority,
    pub posting: Authority,
    pub last_owner_update: Timestamp,
}

impl AccountAuthority {
    pub fn level(&self, level: AuthorityLevel) -> &Authority {
        match level {
            AuthorityLevel::Owner => &self.owner,
            AuthorityLevel::Active => &self.active,
            AuthorityLevel::Posting => &self.posting,
        }
    }
}

/// A replaced owner authority, usable as proof in `recover_account` until
/// the recovery period after `last_valid_time` has passed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerAuthorityHistory {
    pub id: u64,
    pub account: AccountName,
    pub previous_owner_authority: Authority,
    pub last_valid_time: Timestamp,
}

pub trait AccountAuthorityService {
    fn find_account_authority(
        &self,
        account: &AccountName,
    ) -> Result<Option<AccountAuthority>, StoreError>;

    fn create_account_authority(&mut self, record: AccountAuthority) -> Result<(), StoreError>;

    fn put_account_authority(&mut self, record: &AccountAuthority) -> Result<(), StoreError>;

    fn get_account_authority(&self, account: &AccountName) -> Result<AccountAuthority, StoreError> {
        self.find_account_authority(account)?
            .ok_or_else(|| StoreError::not_found("account authority", account))
    }
}

pub trait OwnerHistoryService {
    /// Insert a history entry, assigning and returning its id.
    fn create_owner_history(&mut self, record: OwnerAuthorityHistory) -> Result<u64, StoreError>;

    /// History of `account`, newest first.
    fn owner_history(&self, account: &AccountName) -> Result<Vec<OwnerAuthorityHistory>, StoreError>;

    /// Entries whose `last_valid_time` is strictly before `cutoff`, oldest first.
    fn owner_history_before(
        &self,
        cutoff: Timestamp,
    ) -> Result<Vec<OwnerAuthorityHistory>, StoreError>;

    fn remove_owner_history(&mut self, id: u64) -> Result<(), StoreError>;
}
