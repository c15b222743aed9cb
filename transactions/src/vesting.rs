//! Power-down schedules, withdrawal routes and stake delegation.

use serde::{Deserialize, Serialize};
use tessera_authority::{AuthorityLevel, RequiredAuthorities};
use tessera_types::{AccountName, Asset, AssetSymbol};

use crate::error::ValidationError;
use crate::validation::{
    ensure, require_non_negative, require_percent, require_symbol, validate_account_name,
};

/// Start, replace or (with zero shares) cancel a power-down.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawVestingOp {
    pub account: AccountName,
    pub vesting_shares: Asset,
}

impl WithdrawVestingOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.account)?;
        require_symbol("vesting_shares", &self.vesting_shares, AssetSymbol::Sp)?;
        require_non_negative("vesting_shares", &self.vesting_shares)
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Active, self.account.clone());
    }
}

/// Route a percentage of each power-down payment to another account,
/// either liquid or re-staked. A zero percent removes the route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetWithdrawVestingRouteOp {
    pub from_account: AccountName,
    pub to_account: AccountName,
    pub percent: u16,
    pub auto_vest: bool,
}

impl SetWithdrawVestingRouteOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.from_account)?;
        validate_account_name(&self.to_account)?;
        require_percent("percent", self.percent)
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Active, self.from_account.clone());
    }
}

/// Set the amount of stake delegated from `delegator` to `delegatee`.
/// The amount is absolute: zero revokes the delegation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateVestingSharesOp {
    pub delegator: AccountName,
    pub delegatee: AccountName,
    pub vesting_shares: Asset,
}

impl DelegateVestingSharesOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.delegator)?;
        validate_account_name(&self.delegatee)?;
        ensure(
            self.delegator != self.delegatee,
            "you cannot delegate stake to yourself",
        )?;
        require_symbol("vesting_shares", &self.vesting_shares, AssetSymbol::Sp)?;
        require_non_negative("vesting_shares", &self.vesting_shares)
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Active, self.delegator.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn withdraw_requires_stake_symbol() {
        let mut op = WithdrawVestingOp {
            account: "alice".into(),
            vesting_shares: Asset::scr(10),
        };
        assert!(op.validate().is_err());
        op.vesting_shares = Asset::sp(0);
        assert!(op.validate().is_ok());
        op.vesting_shares = Asset::sp(-1);
        assert!(op.validate().is_err());
    }

    #[test]
    fn self_delegation_rejected() {
        let op = DelegateVestingSharesOp {
            delegator: "alice".into(),
            delegatee: "alice".into(),
            vesting_shares: Asset::sp(10),
        };
        assert!(op.validate().is_err());
    }

    #[test]
    fn route_percent_bounded() {
        let op = SetWithdrawVestingRouteOp {
            from_account: "alice".into(),
            to_account: "bob".into(),
            percent: 10_001,
            auto_vest: false,
        };
        assert!(op.validate().is_err());
    }
}
