//! Content budgets funding the reward pool.

use serde::{Deserialize, Serialize};
use tessera_authority::{AuthorityLevel, RequiredAuthorities};
use tessera_types::{AccountName, Asset, AssetSymbol, Permlink, Timestamp};

use crate::error::ValidationError;
use crate::validation::{require_positive, require_symbol, validate_account_name, validate_permlink};

/// Lock `balance` from `owner` and release it into the reward pool in equal
/// per-block portions until `deadline`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBudgetOp {
    pub owner: AccountName,
    pub content_permlink: Permlink,
    pub balance: Asset,
    pub deadline: Timestamp,
}

impl CreateBudgetOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.owner)?;
        validate_permlink(&self.content_permlink)?;
        require_symbol("balance", &self.balance, AssetSymbol::Scr)?;
        require_positive("balance", &self.balance)
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Active, self.owner.clone());
    }
}
