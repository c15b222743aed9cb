//! Account creation and update.

use serde::{Deserialize, Serialize};
use tessera_authority::{Authority, AuthorityLevel, RequiredAuthorities};
use tessera_types::{AccountName, Asset, AssetSymbol, PublicKey};

use crate::error::ValidationError;
use crate::validation::{
    require_non_negative, require_symbol, validate_account_name, validate_json,
};

/// Create an account funded by `creator`.
///
/// The fee is converted to stake and credited to the new account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCreateOp {
    pub fee: Asset,
    pub creator: AccountName,
    pub new_account_name: AccountName,
    pub owner: Authority,
    pub active: Authority,
    pub posting: Authority,
    pub memo_key: PublicKey,
    pub json_metadata: String,
}

impl AccountCreateOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.creator)?;
        validate_account_name(&self.new_account_name)?;
        require_symbol("fee", &self.fee, AssetSymbol::Scr)?;
        require_non_negative("fee", &self.fee)?;
        validate_authorities(&self.owner, &self.active, &self.posting)?;
        validate_json("json_metadata", &self.json_metadata)
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Active, self.creator.clone());
    }
}

/// Create an account whose initial stake is partly delegated by the creator
/// instead of paid in full.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCreateWithDelegationOp {
    pub fee: Asset,
    pub delegation: Asset,
    pub creator: AccountName,
    pub new_account_name: AccountName,
    pub owner: Authority,
    pub active: Authority,
    pub posting: Authority,
    pub memo_key: PublicKey,
    pub json_metadata: String,
}

impl AccountCreateWithDelegationOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.creator)?;
        validate_account_name(&self.new_account_name)?;
        require_symbol("fee", &self.fee, AssetSymbol::Scr)?;
        require_non_negative("fee", &self.fee)?;
        require_symbol("delegation", &self.delegation, AssetSymbol::Sp)?;
        require_non_negative("delegation", &self.delegation)?;
        validate_authorities(&self.owner, &self.active, &self.posting)?;
        validate_json("json_metadata", &self.json_metadata)
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Active, self.creator.clone());
    }
}

/// Replace any of an account's authorities, its memo key or metadata.
///
/// Changing the owner authority requires the owner tier; everything else
/// requires active.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdateOp {
    pub account: AccountName,
    pub owner: Option<Authority>,
    pub active: Option<Authority>,
    pub posting: Option<Authority>,
    /// Left unchanged when null.
    pub memo_key: PublicKey,
    pub json_metadata: String,
}

impl AccountUpdateOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.account)?;
        for auth in [&self.owner, &self.active, &self.posting].into_iter().flatten() {
            auth.validate()?;
        }
        validate_json("json_metadata", &self.json_metadata)
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        let level = if self.owner.is_some() {
            AuthorityLevel::Owner
        } else {
            AuthorityLevel::Active
        };
        required.require(level, self.account.clone());
    }
}

fn validate_authorities(
    owner: &Authority,
    active: &Authority,
    posting: &Authority,
) -> Result<(), ValidationError> {
    owner.validate()?;
    active.validate()?;
    posting.validate()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_op() -> AccountCreateOp {
        let key = PublicKey([3u8; 32]);
        AccountCreateOp {
            fee: Asset::scr(100),
            creator: "initminer".into(),
            new_account_name: "alice".into(),
            owner: Authority::from_key(key),
            active: Authority::from_key(key),
            posting: Authority::from_key(key),
            memo_key: key,
            json_metadata: String::new(),
        }
    }

    #[test]
    fn valid_create_passes() {
        assert!(create_op().validate().is_ok());
    }

    #[test]
    fn create_rejects_bad_fields() {
        let mut op = create_op();
        op.new_account_name = "A".into();
        assert!(op.validate().is_err());

        let mut op = create_op();
        op.fee = Asset::sp(100);
        assert!(op.validate().is_err());

        let mut op = create_op();
        op.fee = Asset::scr(-1);
        assert_eq!(op.validate(), Err(ValidationError::Negative("fee")));

        let mut op = create_op();
        op.owner = Authority::new(1).with_account("B", 1);
        assert!(op.validate().is_err());

        let mut op = create_op();
        op.json_metadata = "{".into();
        assert!(op.validate().is_err());
    }

    #[test]
    fn update_requires_owner_only_when_owner_changes() {
        let key = PublicKey([3u8; 32]);
        let mut op = AccountUpdateOp {
            account: "alice".into(),
            owner: None,
            active: Some(Authority::from_key(key)),
            posting: None,
            memo_key: PublicKey::NULL,
            json_metadata: String::new(),
        };
        let mut required = RequiredAuthorities::default();
        op.required_authorities(&mut required);
        assert!(required.active.contains(&AccountName::new("alice")));
        assert!(required.owner.is_empty());

        op.owner = Some(Authority::from_key(key));
        let mut required = RequiredAuthorities::default();
        op.required_authorities(&mut required);
        assert!(required.owner.contains(&AccountName::new("alice")));
        assert!(required.active.is_empty());
    }
}
