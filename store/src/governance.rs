//! Committee membership and proposals.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tessera_transactions::ProposalAction;
use tessera_types::{AccountName, Timestamp};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committee {
    pub members: BTreeSet<AccountName>,
}

impl Committee {
    pub fn is_member(&self, account: &AccountName) -> bool {
        self.members.contains(account)
    }

    pub fn members_count(&self) -> u64 {
        self.members.len() as u64
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: u64,
    pub creator: AccountName,
    pub action: ProposalAction,
    pub expiration: Timestamp,
    /// Quorum in whole percent, captured at creation.
    pub quorum_percent: u64,
    pub voted_accounts: BTreeSet<AccountName>,
}

impl Proposal {
    pub fn votes(&self) -> u64 {
        self.voted_accounts.len() as u64
    }
}

pub trait CommitteeService {
    fn committee(&self) -> Result<Committee, StoreError>;

    fn put_committee(&mut self, committee: &Committee) -> Result<(), StoreError>;
}

pub trait ProposalService {
    /// Insert a proposal, assigning and returning its id.
    fn create_proposal(&mut self, proposal: Proposal) -> Result<u64, StoreError>;

    fn find_proposal(&self, id: u64) -> Result<Option<Proposal>, StoreError>;

    fn put_proposal(&mut self, proposal: &Proposal) -> Result<(), StoreError>;

    fn remove_proposal(&mut self, id: u64) -> Result<(), StoreError>;

    /// Proposals with `expiration <= now`, ordered by expiration then id.
    fn expired_proposals(&self, now: Timestamp) -> Result<Vec<Proposal>, StoreError>;

    fn get_proposal(&self, id: u64) -> Result<Proposal, StoreError> {
        self.find_proposal(id)?
            .ok_or_else(|| StoreError::not_found("proposal", id))
    }
}
