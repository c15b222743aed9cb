//! Vesting delegations, their expirations and power-down routes.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use tessera_types::{AccountName, Asset, Timestamp};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingDelegation {
    pub delegator: AccountName,
    pub delegatee: AccountName,
    pub vesting_shares: Asset,
    /// The delegator may not reduce the delegation before this.
    pub min_delegation_time: Timestamp,
}

/// Shares removed from a delegation, still counted as delegated by the
/// delegator until `expiration`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingDelegationExpiration {
    pub id: u64,
    pub delegator: AccountName,
    pub vesting_shares: Asset,
    pub expiration: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawVestingRoute {
    pub from_account: AccountName,
    pub to_account: AccountName,
    pub percent: u16,
    /// Deposit as vesting shares instead of liquid SCR.
    pub auto_vest: bool,
}

pub trait DelegationService {
    fn find_delegation(
        &self,
        delegator: &AccountName,
        delegatee: &AccountName,
    ) -> Result<Option<VestingDelegation>, StoreError>;

    /// Insert or replace the delegation keyed by `(delegator, delegatee)`.
    fn put_delegation(&mut self, delegation: &VestingDelegation) -> Result<(), StoreError>;

    fn remove_delegation(
        &mut self,
        delegator: &AccountName,
        delegatee: &AccountName,
    ) -> Result<(), StoreError>;

    /// Insert an expiration, assigning and returning its id.
    fn create_delegation_expiration(
        &mut self,
        expiration: VestingDelegationExpiration,
    ) -> Result<u64, StoreError>;

    /// Expirations at or before `now`, ordered by expiration then id.
    fn due_delegation_expirations(
        &self,
        now: Timestamp,
    ) -> Result<Vec<VestingDelegationExpiration>, StoreError>;

    fn delegation_expirations_of(
        &self,
        delegator: &AccountName,
    ) -> Result<Vec<VestingDelegationExpiration>, StoreError>;

    fn remove_delegation_expiration(&mut self, id: u64) -> Result<(), StoreError>;
}

pub trait WithdrawRouteService {
    fn find_withdraw_route(
        &self,
        from: &AccountName,
        to: &AccountName,
    ) -> Result<Option<WithdrawVestingRoute>, StoreError>;

    /// Insert or replace the route keyed by `(from, to)`.
    fn put_withdraw_route(&mut self, route: &WithdrawVestingRoute) -> Result<(), StoreError>;

    fn remove_withdraw_route(&mut self, from: &AccountName, to: &AccountName)
        -> Result<(), StoreError>;

    /// Routes out of `from`, ordered by destination.
    fn withdraw_routes_from(&self, from: &AccountName)
        -> Result<Vec<WithdrawVestingRoute>, StoreError>;

    /// Sum of the route percentages out of `from`.
    fn total_route_percent(&self, from: &AccountName) -> Result<u32, StoreError> {
        Ok(self
            .withdraw_routes_from(from)?
            .iter()
            .map(|r| u32::from(r.percent))
            .sum())
    }
}
