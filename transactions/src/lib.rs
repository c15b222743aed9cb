//! Every ledger operation and its stateless validation.
//!
//! Operations are a closed set: [`Operation`] has one variant per kind and
//! every dispatch over it is an exhaustive match.
//!
//! - **Accounts**: create, create with delegation, update
//! - **Content**: comment, delete comment, comment options, vote
//! - **Transfers**: transfer, transfer to vesting
//! - **Vesting**: withdraw, withdraw routes, delegation
//! - **Witnesses**: update, vote, proxy
//! - **Escrow**: transfer, approve, dispute, release
//! - **Recovery**: request, recover, change recovery account, decline voting rights
//! - **Committee**: proposal create and vote
//! - **Budgets**: create budget

pub mod account;
pub mod budget;
pub mod comment;
pub mod error;
pub mod escrow;
pub mod governance;
pub mod recovery;
pub mod transaction;
pub mod transfer;
pub mod validation;
pub mod vesting;
pub mod virtual_ops;
pub mod witness;

use serde::{Deserialize, Serialize};
use tessera_authority::RequiredAuthorities;

pub use account::{AccountCreateOp, AccountCreateWithDelegationOp, AccountUpdateOp};
pub use budget::CreateBudgetOp;
pub use comment::{BeneficiaryRoute, CommentOp, CommentOptionsOp, DeleteCommentOp, VoteOp};
pub use error::{TransactionError, ValidationError};
pub use escrow::{EscrowApproveOp, EscrowDisputeOp, EscrowReleaseOp, EscrowTransferOp};
pub use governance::{ProposalAction, ProposalCreateOp, ProposalVoteOp};
pub use recovery::{
    ChangeRecoveryAccountOp, DeclineVotingRightsOp, RecoverAccountOp, RequestAccountRecoveryOp,
};
pub use transaction::{KeySignature, SignedTransaction, Transaction};
pub use transfer::{TransferOp, TransferToVestingOp};
pub use vesting::{DelegateVestingSharesOp, SetWithdrawVestingRouteOp, WithdrawVestingOp};
pub use virtual_ops::VirtualOperation;
pub use witness::{AccountWitnessProxyOp, AccountWitnessVoteOp, ChainProperties, WitnessUpdateOp};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    AccountCreate(AccountCreateOp),
    AccountCreateWithDelegation(AccountCreateWithDelegationOp),
    AccountUpdate(AccountUpdateOp),
    Comment(CommentOp),
    DeleteComment(DeleteCommentOp),
    CommentOptions(CommentOptionsOp),
    Vote(VoteOp),
    Transfer(TransferOp),
    TransferToVesting(TransferToVestingOp),
    WithdrawVesting(WithdrawVestingOp),
    SetWithdrawVestingRoute(SetWithdrawVestingRouteOp),
    DelegateVestingShares(DelegateVestingSharesOp),
    WitnessUpdate(WitnessUpdateOp),
    AccountWitnessVote(AccountWitnessVoteOp),
    AccountWitnessProxy(AccountWitnessProxyOp),
    EscrowTransfer(EscrowTransferOp),
    EscrowApprove(EscrowApproveOp),
    EscrowDispute(EscrowDisputeOp),
    EscrowRelease(EscrowReleaseOp),
    DeclineVotingRights(DeclineVotingRightsOp),
    RequestAccountRecovery(RequestAccountRecoveryOp),
    RecoverAccount(RecoverAccountOp),
    ChangeRecoveryAccount(ChangeRecoveryAccountOp),
    ProposalCreate(ProposalCreateOp),
    ProposalVote(ProposalVoteOp),
    CreateBudget(CreateBudgetOp),
}

impl Operation {
    /// Stateless field checks. Must pass before the operation is evaluated.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::AccountCreate(op) => op.validate(),
            Self::AccountCreateWithDelegation(op) => op.validate(),
            Self::AccountUpdate(op) => op.validate(),
            Self::Comment(op) => op.validate(),
            Self::DeleteComment(op) => op.validate(),
            Self::CommentOptions(op) => op.validate(),
            Self::Vote(op) => op.validate(),
            Self::Transfer(op) => op.validate(),
            Self::TransferToVesting(op) => op.validate(),
            Self::WithdrawVesting(op) => op.validate(),
            Self::SetWithdrawVestingRoute(op) => op.validate(),
            Self::DelegateVestingShares(op) => op.validate(),
            Self::WitnessUpdate(op) => op.validate(),
            Self::AccountWitnessVote(op) => op.validate(),
            Self::AccountWitnessProxy(op) => op.validate(),
            Self::EscrowTransfer(op) => op.validate(),
            Self::EscrowApprove(op) => op.validate(),
            Self::EscrowDispute(op) => op.validate(),
            Self::EscrowRelease(op) => op.validate(),
            Self::DeclineVotingRights(op) => op.validate(),
            Self::RequestAccountRecovery(op) => op.validate(),
            Self::RecoverAccount(op) => op.validate(),
            Self::ChangeRecoveryAccount(op) => op.validate(),
            Self::ProposalCreate(op) => op.validate(),
            Self::ProposalVote(op) => op.validate(),
            Self::CreateBudget(op) => op.validate(),
        }
    }

    /// Add the authorities this operation needs to `required`.
    pub fn required_authorities(&self, required: &mut RequiredAuthorities) {
        match self {
            Self::AccountCreate(op) => op.required_authorities(required),
            Self::AccountCreateWithDelegation(op) => op.required_authorities(required),
            Self::AccountUpdate(op) => op.required_authorities(required),
            Self::Comment(op) => op.required_authorities(required),
            Self::DeleteComment(op) => op.required_authorities(required),
            Self::CommentOptions(op) => op.required_authorities(required),
            Self::Vote(op) => op.required_authorities(required),
            Self::Transfer(op) => op.required_authorities(required),
            Self::TransferToVesting(op) => op.required_authorities(required),
            Self::WithdrawVesting(op) => op.required_authorities(required),
            Self::SetWithdrawVestingRoute(op) => op.required_authorities(required),
            Self::DelegateVestingShares(op) => op.required_authorities(required),
            Self::WitnessUpdate(op) => op.required_authorities(required),
            Self::AccountWitnessVote(op) => op.required_authorities(required),
            Self::AccountWitnessProxy(op) => op.required_authorities(required),
            Self::EscrowTransfer(op) => op.required_authorities(required),
            Self::EscrowApprove(op) => op.required_authorities(required),
            Self::EscrowDispute(op) => op.required_authorities(required),
            Self::EscrowRelease(op) => op.required_authorities(required),
            Self::DeclineVotingRights(op) => op.required_authorities(required),
            Self::RequestAccountRecovery(op) => op.required_authorities(required),
            Self::RecoverAccount(op) => op.required_authorities(required),
            Self::ChangeRecoveryAccount(op) => op.required_authorities(required),
            Self::ProposalCreate(op) => op.required_authorities(required),
            Self::ProposalVote(op) => op.required_authorities(required),
            Self::CreateBudget(op) => op.required_authorities(required),
        }
    }

    /// Snake-case operation name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AccountCreate(_) => "account_create",
            Self::AccountCreateWithDelegation(_) => "account_create_with_delegation",
            Self::AccountUpdate(_) => "account_update",
            Self::Comment(_) => "comment",
            Self::DeleteComment(_) => "delete_comment",
            Self::CommentOptions(_) => "comment_options",
            Self::Vote(_) => "vote",
            Self::Transfer(_) => "transfer",
            Self::TransferToVesting(_) => "transfer_to_vesting",
            Self::WithdrawVesting(_) => "withdraw_vesting",
            Self::SetWithdrawVestingRoute(_) => "set_withdraw_vesting_route",
            Self::DelegateVestingShares(_) => "delegate_vesting_shares",
            Self::WitnessUpdate(_) => "witness_update",
            Self::AccountWitnessVote(_) => "account_witness_vote",
            Self::AccountWitnessProxy(_) => "account_witness_proxy",
            Self::EscrowTransfer(_) => "escrow_transfer",
            Self::EscrowApprove(_) => "escrow_approve",
            Self::EscrowDispute(_) => "escrow_dispute",
            Self::EscrowRelease(_) => "escrow_release",
            Self::DeclineVotingRights(_) => "decline_voting_rights",
            Self::RequestAccountRecovery(_) => "request_account_recovery",
            Self::RecoverAccount(_) => "recover_account",
            Self::ChangeRecoveryAccount(_) => "change_recovery_account",
            Self::ProposalCreate(_) => "proposal_create",
            Self::ProposalVote(_) => "proposal_vote",
            Self::CreateBudget(_) => "create_budget",
        }
    }
}
