//! Witness registration, approval voting and voting proxies.

use serde::{Deserialize, Serialize};
use tessera_authority::{AuthorityLevel, RequiredAuthorities};
use tessera_types::{AccountName, Asset, AssetSymbol, PublicKey};

use crate::error::ValidationError;
use crate::validation::{
    ensure, require_max_len, require_non_negative, require_symbol, validate_account_name,
    validate_optional_account_name, MAX_WITNESS_URL_LENGTH, MIN_BLOCK_SIZE_LIMIT,
};

/// Chain parameters a witness proposes; the median across witnesses is used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainProperties {
    pub account_creation_fee: Asset,
    pub maximum_block_size: u32,
}

impl ChainProperties {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_symbol(
            "account_creation_fee",
            &self.account_creation_fee,
            AssetSymbol::Scr,
        )?;
        require_non_negative("account_creation_fee", &self.account_creation_fee)?;
        ensure(
            self.maximum_block_size >= MIN_BLOCK_SIZE_LIMIT,
            format!("maximum_block_size smaller than minimum {MIN_BLOCK_SIZE_LIMIT}"),
        )
    }
}

impl Default for ChainProperties {
    fn default() -> Self {
        Self {
            account_creation_fee: Asset::scr(100),
            maximum_block_size: MIN_BLOCK_SIZE_LIMIT * 2,
        }
    }
}

/// Register a witness or update its url, signing key and proposed properties.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessUpdateOp {
    pub owner: AccountName,
    pub url: String,
    pub block_signing_key: PublicKey,
    pub props: ChainProperties,
}

impl WitnessUpdateOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.owner)?;
        ensure(!self.url.is_empty(), "url cannot be empty")?;
        require_max_len("url", &self.url, MAX_WITNESS_URL_LENGTH)?;
        self.props.validate()
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Active, self.owner.clone());
    }
}

/// Approve or revoke approval of a witness.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountWitnessVoteOp {
    pub account: AccountName,
    pub witness: AccountName,
    pub approve: bool,
}

impl AccountWitnessVoteOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.account)?;
        validate_account_name(&self.witness)
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Active, self.account.clone());
    }
}

/// Let `proxy` cast this account's witness votes. An empty proxy clears it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountWitnessProxyOp {
    pub account: AccountName,
    pub proxy: AccountName,
}

impl AccountWitnessProxyOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.account)?;
        validate_optional_account_name(&self.proxy)?;
        ensure(self.proxy != self.account, "cannot proxy to self")
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Active, self.account.clone());
    }
}
