//! Time-delayed requests: account recovery, recovery account changes and
//! declining voting rights.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use tessera_authority::Authority;
use tessera_types::{AccountName, Timestamp};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecoveryRequest {
    pub account_to_recover: AccountName,
    pub new_owner_authority: Authority,
    pub expires: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecoveryAccountRequest {
    pub account_to_recover: AccountName,
    pub recovery_account: AccountName,
    pub effective_on: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclineVotingRightsRequest {
    pub account: AccountName,
    pub effective_date: Timestamp,
}

/// All three request kinds are keyed by account; at most one of each kind
/// is pending per account.
pub trait RecoveryService {
    fn find_recovery_request(
        &self,
        account: &AccountName,
    ) -> Result<Option<AccountRecoveryRequest>, StoreError>;
    /// Insert or replace the pending recovery request of the account.
    fn put_recovery_request(&mut self, request: &AccountRecoveryRequest) -> Result<(), StoreError>;
    fn remove_recovery_request(&mut self, account: &AccountName) -> Result<(), StoreError>;
    /// Requests with `expires <= now`, ordered by expiry.
    fn expired_recovery_requests(
        &self,
        now: Timestamp,
    ) -> Result<Vec<AccountRecoveryRequest>, StoreError>;

    fn find_change_recovery_request(
        &self,
        account: &AccountName,
    ) -> Result<Option<ChangeRecoveryAccountRequest>, StoreError>;
    fn put_change_recovery_request(
        &mut self,
        request: &ChangeRecoveryAccountRequest,
    ) -> Result<(), StoreError>;
    fn remove_change_recovery_request(&mut self, account: &AccountName) -> Result<(), StoreError>;
    /// Requests with `effective_on <= now`, ordered by effective time.
    fn due_change_recovery_requests(
        &self,
        now: Timestamp,
    ) -> Result<Vec<ChangeRecoveryAccountRequest>, StoreError>;

    fn find_decline_voting_request(
        &self,
        account: &AccountName,
    ) -> Result<Option<DeclineVotingRightsRequest>, StoreError>;
    fn create_decline_voting_request(
        &mut self,
        request: DeclineVotingRightsRequest,
    ) -> Result<(), StoreError>;
    fn remove_decline_voting_request(&mut self, account: &AccountName) -> Result<(), StoreError>;
    /// Requests with `effective_date <= now`, ordered by effective date.
    fn due_decline_voting_requests(
        &self,
        now: Timestamp,
    ) -> Result<Vec<DeclineVotingRightsRequest>, StoreError>;
}
