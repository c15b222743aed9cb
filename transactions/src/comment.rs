//! Posting, voting and payout options for content.

use serde::{Deserialize, Serialize};
use tessera_authority::{AuthorityLevel, RequiredAuthorities};
use tessera_types::{AccountName, Permlink, PERCENT_100};

use crate::error::ValidationError;
use crate::validation::{
    ensure, require_max_len, require_percent, validate_account_name, validate_json,
    validate_optional_account_name, validate_permlink, MAX_BENEFICIARIES, MAX_TITLE_LENGTH,
};

/// Create or edit a post (empty `parent_author`) or a reply.
///
/// For root posts `parent_permlink` is the category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentOp {
    pub parent_author: AccountName,
    pub parent_permlink: Permlink,
    pub author: AccountName,
    pub permlink: Permlink,
    pub title: String,
    pub body: String,
    pub json_metadata: String,
}

impl CommentOp {
    pub fn is_root(&self) -> bool {
        self.parent_author.is_empty()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.author)?;
        validate_optional_account_name(&self.parent_author)?;
        validate_permlink(&self.permlink)?;
        validate_permlink(&self.parent_permlink)?;
        require_max_len("title", &self.title, MAX_TITLE_LENGTH)?;
        ensure(!self.body.is_empty(), "body is empty")?;
        validate_json("json_metadata", &self.json_metadata)
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Posting, self.author.clone());
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteCommentOp {
    pub author: AccountName,
    pub permlink: Permlink,
}

impl DeleteCommentOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.author)?;
        validate_permlink(&self.permlink)
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Posting, self.author.clone());
    }
}

/// A share of the author's payout routed to another account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeneficiaryRoute {
    pub account: AccountName,
    pub weight: u16,
}

/// Set payout options on a comment. Beneficiaries may be set only once,
/// and only before the first vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentOptionsOp {
    pub author: AccountName,
    pub permlink: Permlink,
    pub beneficiaries: Vec<BeneficiaryRoute>,
}

impl CommentOptionsOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.author)?;
        validate_permlink(&self.permlink)?;
        validate_beneficiaries(&self.beneficiaries)
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Posting, self.author.clone());
    }
}

/// At most [`MAX_BENEFICIARIES`] routes, strictly ascending by account,
/// with weights summing to no more than 100%.
pub fn validate_beneficiaries(routes: &[BeneficiaryRoute]) -> Result<(), ValidationError> {
    ensure(!routes.is_empty(), "must specify at least one beneficiary")?;
    ensure(
        routes.len() <= MAX_BENEFICIARIES,
        format!("cannot specify more than {MAX_BENEFICIARIES} beneficiaries"),
    )?;
    let mut sum: u32 = 0;
    for route in routes {
        validate_account_name(&route.account)?;
        require_percent("beneficiary weight", route.weight)?;
        sum += u32::from(route.weight);
    }
    ensure(
        sum <= u32::from(PERCENT_100),
        "beneficiary weights exceed 100%",
    )?;
    ensure(
        routes.windows(2).all(|w| w[0].account < w[1].account),
        "beneficiaries must be sorted by account and unique",
    )
}

/// Vote on a comment. `weight` is in hundredths of a percent; negative
/// weights flag, zero removes a previous vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOp {
    pub voter: AccountName,
    pub author: AccountName,
    pub permlink: Permlink,
    pub weight: i16,
}

impl VoteOp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_account_name(&self.voter)?;
        validate_account_name(&self.author)?;
        validate_permlink(&self.permlink)?;
        ensure(
            self.weight.unsigned_abs() <= PERCENT_100,
            "weight is not a valid percentage",
        )
    }

    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        required.require(AuthorityLevel::Posting, self.voter.clone());
    }
}
