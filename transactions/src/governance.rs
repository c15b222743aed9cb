//! Committee proposals.

use serde::{Deserialize, Serialize};
use std::fmt;
use tessera_authority::{AuthorityLevel, RequiredAuthorities};
use tessera_types::AccountName;

use crate::error::ValidationError;
use crate::validation::{ensure, validate_account_name, MAX_QUORUM_PERCENT, MIN_QUORUM_PERCENT};

/// What a proposal does once it reaches quorum.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalAction {
    Invite(AccountName),
    Dropout(AccountName),
    ChangeInviteQuorum(u64),
    ChangeDropoutQuorum(u64),
    ChangeQuorum(u64),
}

impl ProposalAction {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Invite(member) | Self::Dropout(member) => validate_account_name(member),
            Self::ChangeInviteQuorum(q) | Self::ChangeDropoutQuorum(q) | Self::ChangeQuorum(q) => {
                ensure(
                    (MIN_QUORUM_PERCENT..=MAX_QUORUM_PERCENT).contains(q),
                    format!(
                        "quorum {q}% outside {MIN_QUORUM_PERCENT}%..={MAX_QUORUM_PERCENT}%"
                    ),
                )
            }
        }
    }
}

impl fmt::Display for ProposalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invite(member) => write!(f, "invite {member}"),
            Self::Dropout(member) => write!(f, "dropout {member}"),
            Self::ChangeInviteQuorum(q) => write!(f, "change invite quorum to {q}%"),
            Self::ChangeDropoutQuorum(q) => write!(f, "change dropout quorum to {q}%"),
            Self::ChangeQuorum(q) => write!(f, "change quorum to {q}%"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalCreateOp {
    pub creator: AccountName,
    pub action: ProposalAction,
    pub lifetime_secs: u64,
}

impl ProposalCreateOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.creator)?;
        self.action.validate()
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Active, self.creator.clone());
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalVoteOp {
    pub voting_account: AccountName,
    pub proposal_id: u64,
}

impl ProposalVoteOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.voting_account)
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Active, self.voting_account.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quorum_bounds() {
        assert!(ProposalAction::ChangeQuorum(60).validate().is_ok());
        assert!(ProposalAction::ChangeQuorum(49).validate().is_err());
        assert!(ProposalAction::ChangeInviteQuorum(101).validate().is_err());
        assert!(ProposalAction::Invite("A".into()).validate().is_err());
    }
}
