//! Liquid transfers and staking.

use serde::{Deserialize, Serialize};
use tessera_authority::{AuthorityLevel, RequiredAuthorities};
use tessera_types::{AccountName, Asset, AssetSymbol};

use crate::error::ValidationError;
use crate::validation::{
    require_max_len, require_positive, require_symbol, validate_account_name,
    validate_optional_account_name, MAX_MEMO_SIZE,
};

/// Move liquid SCR between accounts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOp {
    pub from: AccountName,
    pub to: AccountName,
    pub amount: Asset,
    pub memo: String,
}

impl TransferOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.from)?;
        validate_account_name(&self.to)?;
        require_symbol("amount", &self.amount, AssetSymbol::Scr)?;
        require_positive("amount", &self.amount)?;
        require_max_len("memo", &self.memo, MAX_MEMO_SIZE)
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Active, self.from.clone());
    }
}

/// Convert liquid SCR into stake at the current share price. An empty `to`
/// stakes into `from`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferToVestingOp {
    pub from: AccountName,
    pub to: AccountName,
    pub amount: Asset,
}

impl TransferToVestingOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.from)?;
        validate_optional_account_name(&self.to)?;
        require_symbol("amount", &self.amount, AssetSymbol::Scr)?;
        require_positive("amount", &self.amount)
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Active, self.from.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_rejects_stake_and_zero() {
        let mut op = TransferOp {
            from: "alice".into(),
            to: "bob".into(),
            amount: Asset::sp(1),
            memo: String::new(),
        };
        assert!(op.validate().is_err());
        op.amount = Asset::scr(0);
        assert_eq!(op.validate(), Err(ValidationError::NotPositive("amount")));
        op.amount = Asset::scr(1);
        assert!(op.validate().is_ok());
        op.memo = "x".repeat(MAX_MEMO_SIZE + 1);
        assert!(op.validate().is_err());
    }

    #[test]
    fn vesting_to_may_be_empty() {
        let op = TransferToVestingOp {
            from: "alice".into(),
            to: AccountName::none(),
            amount: Asset::scr(5),
        };
        assert!(op.validate().is_ok());
    }
}
