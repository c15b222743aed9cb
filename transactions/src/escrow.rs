//! Three-party escrow: transfer, approval, dispute and release.

use serde::{Deserialize, Serialize};
use tessera_authority::{AuthorityLevel, RequiredAuthorities};
use tessera_types::{AccountName, Asset, AssetSymbol, Timestamp};

use crate::error::ValidationError;
use crate::validation::{
    ensure, require_non_negative, require_positive, require_symbol, validate_account_name,
    validate_json,
};

/// Lock `scr_amount` plus the agent's `fee` from `from` until both `to` and
/// `agent` ratify before `ratification_deadline`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowTransferOp {
    pub from: AccountName,
    pub to: AccountName,
    pub agent: AccountName,
    pub escrow_id: u32,
    pub scr_amount: Asset,
    pub fee: Asset,
    pub ratification_deadline: Timestamp,
    pub escrow_expiration: Timestamp,
    pub json_meta: String,
}

impl EscrowTransferOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_parties(&self.from, &self.to, &self.agent)?;
        require_symbol("fee", &self.fee, AssetSymbol::Scr)?;
        require_non_negative("fee", &self.fee)?;
        require_symbol("scr_amount", &self.scr_amount, AssetSymbol::Scr)?;
        require_non_negative("scr_amount", &self.scr_amount)?;
        ensure(
            self.scr_amount.is_positive(),
            "escrow must transfer a non-zero amount",
        )?;
        ensure(
            self.from != self.agent && self.to != self.agent,
            "agent must be a third party",
        )?;
        ensure(
            self.ratification_deadline < self.escrow_expiration,
            "ratification deadline must be before escrow expiration",
        )?;
        validate_json("json_meta", &self.json_meta)
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Active, self.from.clone());
    }
}

/// `to` or `agent` ratifies (or rejects) a pending escrow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowApproveOp {
    pub from: AccountName,
    pub to: AccountName,
    pub agent: AccountName,
    pub who: AccountName,
    pub escrow_id: u32,
    pub approve: bool,
}

impl EscrowApproveOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_parties(&self.from, &self.to, &self.agent)?;
        validate_account_name(&self.who)?;
        ensure(
            self.who == self.to || self.who == self.agent,
            "to or agent must approve escrow",
        )
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Active, self.who.clone());
    }
}

/// `from` or `to` hands a ratified escrow to the agent for resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowDisputeOp {
    pub from: AccountName,
    pub to: AccountName,
    pub agent: AccountName,
    pub who: AccountName,
    pub escrow_id: u32,
}

impl EscrowDisputeOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_parties(&self.from, &self.to, &self.agent)?;
        validate_account_name(&self.who)?;
        ensure(
            self.who == self.from || self.who == self.to,
            "who must be from or to",
        )
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Active, self.who.clone());
    }
}

/// Pay part of an escrow's balance to `receiver`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowReleaseOp {
    pub from: AccountName,
    pub to: AccountName,
    pub agent: AccountName,
    pub who: AccountName,
    pub receiver: AccountName,
    pub escrow_id: u32,
    pub scr_amount: Asset,
}

impl EscrowReleaseOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_parties(&self.from, &self.to, &self.agent)?;
        validate_account_name(&self.who)?;
        validate_account_name(&self.receiver)?;
        ensure(
            self.who == self.from || self.who == self.to || self.who == self.agent,
            "who must be from or to or agent",
        )?;
        ensure(
            self.receiver == self.from || self.receiver == self.to,
            "receiver must be from or to",
        )?;
        require_symbol("scr_amount", &self.scr_amount, AssetSymbol::Scr)?;
        require_positive("scr_amount", &self.scr_amount)
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Active, self.who.clone());
    }
}

fn validate_parties(
    from: &AccountName,
    to: &AccountName,
    agent: &AccountName,
) -> Result<(), ValidationError> {
    validate_account_name(from)?;
    validate_account_name(to)?;
    validate_account_name(agent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer() -> EscrowTransferOp {
        EscrowTransferOp {
            from: "alice".into(),
            to: "bob".into(),
            agent: "sam".into(),
            escrow_id: 0,
            scr_amount: Asset::scr(1_000),
            fee: Asset::scr(100),
            ratification_deadline: Timestamp::new(100),
            escrow_expiration: Timestamp::new(200),
            json_meta: String::new(),
        }
    }

    #[test]
    fn transfer_validation() {
        assert!(transfer().validate().is_ok());

        let mut op = transfer();
        op.agent = "alice".into();
        assert!(op.validate().is_err());

        let mut op = transfer();
        op.ratification_deadline = op.escrow_expiration;
        assert!(op.validate().is_err());

        let mut op = transfer();
        op.scr_amount = Asset::scr(0);
        assert!(op.validate().is_err());

        let mut op = transfer();
        op.fee = Asset::sp(1);
        assert!(op.validate().is_err());
    }

    #[test]
    fn approve_and_dispute_parties() {
        let approve = EscrowApproveOp {
            from: "alice".into(),
            to: "bob".into(),
            agent: "sam".into(),
            who: "alice".into(),
            escrow_id: 0,
            approve: true,
        };
        assert!(approve.validate().is_err());

        let dispute = EscrowDisputeOp {
            from: "alice".into(),
            to: "bob".into(),
            agent: "sam".into(),
            who: "sam".into(),
            escrow_id: 0,
        };
        assert!(dispute.validate().is_err());
    }

    #[test]
    fn release_receiver_must_be_a_party() {
        let op = EscrowReleaseOp {
            from: "alice".into(),
            to: "bob".into(),
            agent: "sam".into(),
            who: "sam".into(),
            receiver: "sam".into(),
            escrow_id: 0,
            scr_amount: Asset::scr(1),
        };
        assert!(op.validate().is_err());
    }
}
