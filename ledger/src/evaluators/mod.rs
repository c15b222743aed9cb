//! One evaluator per operation kind.
//!
//! Every evaluator reads and writes the world state only through the
//! service traits behind [`ChainState`]. An evaluator that returns an error
//! may have left partial writes behind; the processor rolls them back with
//! the transaction's undo session.

pub mod account;
pub mod budget;
pub mod comment;
pub mod delegation;
pub mod escrow;
pub mod proposal;
pub mod recovery;
pub mod transfer;
pub mod vesting;
pub mod vote;
pub mod witness;

use tessera_store::ChainState;
use tessera_transactions::Operation;

use crate::context::ApplyContext;
use crate::LedgerError;

/// Apply one already validated operation to the world state.
pub fn apply_operation<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &Operation,
) -> Result<(), LedgerError> {
    tracing::trace!(op = op.name(), "applying operation");
    match op {
        Operation::AccountCreate(op) => account::account_create(ctx, op),
        Operation::AccountCreateWithDelegation(op) => {
            account::account_create_with_delegation(ctx, op)
        }
        Operation::AccountUpdate(op) => account::account_update(ctx, op),
        Operation::Comment(op) => comment::comment(ctx, op),
        Operation::DeleteComment(op) => comment::delete_comment(ctx, op),
        Operation::CommentOptions(op) => comment::comment_options(ctx, op),
        Operation::Vote(op) => vote::vote(ctx, op),
        Operation::Transfer(op) => transfer::transfer(ctx, op),
        Operation::TransferToVesting(op) => transfer::transfer_to_vesting(ctx, op),
        Operation::WithdrawVesting(op) => vesting::withdraw_vesting(ctx, op),
        Operation::SetWithdrawVestingRoute(op) => vesting::set_withdraw_vesting_route(ctx, op),
        Operation::DelegateVestingShares(op) => delegation::delegate_vesting_shares(ctx, op),
        Operation::WitnessUpdate(op) => witness::witness_update(ctx, op),
        Operation::AccountWitnessVote(op) => witness::account_witness_vote(ctx, op),
        Operation::AccountWitnessProxy(op) => witness::account_witness_proxy(ctx, op),
        Operation::EscrowTransfer(op) => escrow::escrow_transfer(ctx, op),
        Operation::EscrowApprove(op) => escrow::escrow_approve(ctx, op),
        Operation::EscrowDispute(op) => escrow::escrow_dispute(ctx, op),
        Operation::EscrowRelease(op) => escrow::escrow_release(ctx, op),
        Operation::DeclineVotingRights(op) => recovery::decline_voting_rights(ctx, op),
        Operation::RequestAccountRecovery(op) => recovery::request_account_recovery(ctx, op),
        Operation::RecoverAccount(op) => recovery::recover_account(ctx, op),
        Operation::ChangeRecoveryAccount(op) => recovery::change_recovery_account(ctx, op),
        Operation::ProposalCreate(op) => proposal::proposal_create(ctx, op),
        Operation::ProposalVote(op) => proposal::proposal_vote(ctx, op),
        Operation::CreateBudget(op) => budget::create_budget(ctx, op),
    }
}
