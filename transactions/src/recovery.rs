//! Account recovery and declining voting rights.

use serde::{Deserialize, Serialize};
use tessera_authority::{Authority, AuthorityLevel, RequiredAuthorities};
use tessera_types::AccountName;

use crate::error::ValidationError;
use crate::validation::{ensure, validate_account_name};

/// The recovery account proposes a new owner authority for an account whose
/// owner key was compromised. A zero threshold cancels the request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestAccountRecoveryOp {
    pub recovery_account: AccountName,
    pub account_to_recover: AccountName,
    pub new_owner_authority: Authority,
}

impl RequestAccountRecoveryOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.recovery_account)?;
        validate_account_name(&self.account_to_recover)?;
        self.new_owner_authority.validate()?;
        Ok(())
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Active, self.recovery_account.clone());
    }
}

/// The account owner proves control of a recent owner authority and of the
/// newly requested one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverAccountOp {
    pub account_to_recover: AccountName,
    pub new_owner_authority: Authority,
    pub recent_owner_authority: Authority,
}

impl RecoverAccountOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.account_to_recover)?;
        ensure(
            self.new_owner_authority != self.recent_owner_authority,
            "cannot set new owner authority to the recent owner authority",
        )?;
        ensure(
            !self.new_owner_authority.is_impossible(),
            "new owner authority cannot be impossible",
        )?;
        ensure(
            !self.recent_owner_authority.is_impossible(),
            "recent owner authority cannot be impossible",
        )?;
        ensure(
            self.new_owner_authority.weight_threshold > 0,
            "new owner authority cannot be trivial",
        )?;
        self.new_owner_authority.validate()?;
        self.recent_owner_authority.validate()?;
        Ok(())
    }

    /// Both authorities must sign as given; no account tier is involved.
    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require_other(self.new_owner_authority.clone());
        required.require_other(self.recent_owner_authority.clone());
    }
}

/// Change the account allowed to initiate recovery. Takes effect after a delay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecoveryAccountOp {
    pub account_to_recover: AccountName,
    pub new_recovery_account: AccountName,
}

impl ChangeRecoveryAccountOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.account_to_recover)?;
        validate_account_name(&self.new_recovery_account)
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Owner, self.account_to_recover.clone());
    }
}

/// Request (or cancel a request) to permanently give up voting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclineVotingRightsOp {
    pub account: AccountName,
    pub decline: bool,
}

impl DeclineVotingRightsOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.account)
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Owner, self.account.clone());
    }
}
