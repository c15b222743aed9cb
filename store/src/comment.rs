//! Comments, their votes and the comment service.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use tessera_transactions::BeneficiaryRoute;
use tessera_types::{AccountName, Asset, Permlink, Timestamp};

/// A root post or a reply, keyed by `(author, permlink)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: AccountName,
    pub permlink: Permlink,
    /// Empty for root posts.
    pub parent_author: AccountName,
    pub parent_permlink: Permlink,
    pub root_author: AccountName,
    pub root_permlink: Permlink,
    pub category: Permlink,

    pub title: String,
    pub body: String,
    pub json_metadata: String,

    pub created: Timestamp,
    pub last_update: Timestamp,
    pub active: Timestamp,
    /// Payout deadline. [`Timestamp::MAX`] once paid out.
    pub cashout_time: Timestamp,
    pub last_payout: Timestamp,

    pub depth: u16,
    pub children: u32,

    pub net_rshares: i64,
    pub abs_rshares: i64,
    pub vote_rshares: i64,
    pub children_abs_rshares: i64,
    pub total_vote_weight: u64,
    pub net_votes: i32,

    pub author_rewards: i64,
    pub total_payout_value: Asset,
    pub curator_payout_value: Asset,
    pub beneficiary_payout_value: Asset,

    pub beneficiaries: Vec<BeneficiaryRoute>,
}

impl Comment {
    pub fn is_root(&self) -> bool {
        self.parent_author.is_empty()
    }

    pub fn is_paid_out(&self) -> bool {
        self.cashout_time.is_max()
    }
}

/// One voter's influence on one comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentVote {
    pub author: AccountName,
    pub permlink: Permlink,
    pub voter: AccountName,
    /// Curation weight. Zero for changed votes.
    pub weight: u64,
    pub rshares: i64,
    pub vote_percent: i16,
    pub last_update: Timestamp,
    pub num_changes: u8,
}

pub trait CommentService {
    fn find_comment(
        &self,
        author: &AccountName,
        permlink: &Permlink,
    ) -> Result<Option<Comment>, StoreError>;

    fn create_comment(&mut self, comment: Comment) -> Result<(), StoreError>;

    fn put_comment(&mut self, comment: &Comment) -> Result<(), StoreError>;

    fn remove_comment(&mut self, author: &AccountName, permlink: &Permlink)
        -> Result<(), StoreError>;

    /// Comments with `cashout_time <= now`, ordered by cashout time then key.
    fn comments_due_for_cashout(&self, now: Timestamp) -> Result<Vec<Comment>, StoreError>;

    fn find_comment_vote(
        &self,
        author: &AccountName,
        permlink: &Permlink,
        voter: &AccountName,
    ) -> Result<Option<CommentVote>, StoreError>;

    /// Insert or replace the vote keyed by `(author, permlink, voter)`.
    fn put_comment_vote(&mut self, vote: &CommentVote) -> Result<(), StoreError>;

    fn remove_comment_vote(
        &mut self,
        author: &AccountName,
        permlink: &Permlink,
        voter: &AccountName,
    ) -> Result<(), StoreError>;

    /// Votes on a comment, ordered by voter.
    fn comment_votes(
        &self,
        author: &AccountName,
        permlink: &Permlink,
    ) -> Result<Vec<CommentVote>, StoreError>;

    fn get_comment(&self, author: &AccountName, permlink: &Permlink) -> Result<Comment, StoreError> {
        self.find_comment(author, permlink)?
            .ok_or_else(|| StoreError::not_found("comment", format!("{author}/{permlink}")))
    }

    fn comment_exists(&self, author: &AccountName, permlink: &Permlink) -> Result<bool, StoreError> {
        Ok(self.find_comment(author, permlink)?.is_some())
    }
}
