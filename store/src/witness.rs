//! Witnesses and witness approval votes.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use tessera_transactions::ChainProperties;
use tessera_types::{AccountName, PublicKey, Timestamp};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    pub owner: AccountName,
    pub created: Timestamp,
    pub url: String,
    /// Null when the witness has shut down.
    pub signing_key: PublicKey,
    pub props: ChainProperties,
    /// Sum of the vote weights of every approving account.
    pub votes: i64,
}

/// Existence alone means `account` approves `witness`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WitnessVote {
    pub witness: AccountName,
    pub account: AccountName,
}

pub trait WitnessService {
    fn find_witness(&self, owner: &AccountName) -> Result<Option<Witness>, StoreError>;

    fn create_witness(&mut self, witness: Witness) -> Result<(), StoreError>;

    fn put_witness(&mut self, witness: &Witness) -> Result<(), StoreError>;

    /// Witnesses ordered by votes, highest first, ties by owner.
    fn witnesses_by_vote(&self) -> Result<Vec<Witness>, StoreError>;

    fn witness_vote_exists(
        &self,
        witness: &AccountName,
        account: &AccountName,
    ) -> Result<bool, StoreError>;

    fn create_witness_vote(&mut self, vote: WitnessVote) -> Result<(), StoreError>;

    fn remove_witness_vote(
        &mut self,
        witness: &AccountName,
        account: &AccountName,
    ) -> Result<(), StoreError>;

    /// Every approval cast by `account`, ordered by witness.
    fn witness_votes_by_account(&self, account: &AccountName)
        -> Result<Vec<WitnessVote>, StoreError>;

    fn get_witness(&self, owner: &AccountName) -> Result<Witness, StoreError> {
        self.find_witness(owner)?
            .ok_or_else(|| StoreError::not_found("witness", owner))
    }
}
