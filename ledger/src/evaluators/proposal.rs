//! Committee governance: proposals and the votes that execute them.

use std::collections::BTreeSet;

use tessera_store::{ChainState, Committee, Proposal};
use tessera_transactions::{ProposalAction, ProposalCreateOp, ProposalVoteOp, VirtualOperation};

use crate::context::ApplyContext;
use crate::LedgerError;

pub fn proposal_create<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &ProposalCreateOp,
) -> Result<(), LedgerError> {
    let min = ctx.params.proposal_lifetime_min_secs;
    let max = ctx.params.proposal_lifetime_max_secs;
    if !(min..=max).contains(&op.lifetime_secs) {
        return Err(LedgerError::illegal(format!(
            "proposal lifetime {}s is not in range of {min}..={max} seconds",
            op.lifetime_secs
        )));
    }
    if !ctx.state.committee()?.is_member(&op.creator) {
        return Err(LedgerError::denied(format!(
            "account {} is not in the committee",
            op.creator
        )));
    }
    ctx.require_account(&op.creator)?;

    let props = ctx.properties()?;
    let quorum_percent = match op.action {
        ProposalAction::Invite(_) => props.invite_quorum,
        ProposalAction::Dropout(_) => props.dropout_quorum,
        ProposalAction::ChangeInviteQuorum(_)
        | ProposalAction::ChangeDropoutQuorum(_)
        | ProposalAction::ChangeQuorum(_) => props.change_quorum,
    };

    let id = ctx.state.create_proposal(Proposal {
        id: 0,
        creator: op.creator.clone(),
        action: op.action.clone(),
        expiration: ctx.now().plus(op.lifetime_secs),
        quorum_percent,
        voted_accounts: BTreeSet::new(),
    })?;

    tracing::debug!(
        id,
        creator = %op.creator,
        action = %op.action,
        quorum_percent,
        "proposal created"
    );
    Ok(())
}

/// Count one committee vote; once the quorum is reached the action runs
/// and the proposal is removed.
pub fn proposal_vote<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &ProposalVoteOp,
) -> Result<(), LedgerError> {
    let mut committee = ctx.state.committee()?;
    if !committee.is_member(&op.voting_account) {
        return Err(LedgerError::denied(format!(
            "account {} is not in the committee",
            op.voting_account
        )));
    }

    let mut proposal = ctx
        .state
        .find_proposal(op.proposal_id)?
        .ok_or_else(|| {
            LedgerError::illegal(format!("there is no proposal {}", op.proposal_id))
        })?;
    if proposal.expiration <= ctx.now() {
        return Err(LedgerError::illegal(format!(
            "proposal {} has expired",
            proposal.id
        )));
    }
    if !proposal.voted_accounts.insert(op.voting_account.clone()) {
        return Err(LedgerError::illegal(format!(
            "account {} already voted for proposal {}",
            op.voting_account, proposal.id
        )));
    }

    if !quorum_reached(&proposal, &committee) {
        ctx.state.put_proposal(&proposal)?;
        tracing::debug!(id = proposal.id, votes = proposal.votes(), "proposal vote counted");
        return Ok(());
    }

    execute(ctx, &mut committee, &proposal.action)?;
    ctx.state.remove_proposal(proposal.id)?;
    ctx.push_vop(VirtualOperation::ProposalExecuted {
        id: proposal.id,
        action: proposal.action.clone(),
    });
    tracing::debug!(id = proposal.id, action = %proposal.action, "proposal executed");
    Ok(())
}

/// `votes >= members * quorum / 100`, rounded up.
fn quorum_reached(proposal: &Proposal, committee: &Committee) -> bool {
    u128::from(proposal.votes()) * 100
        >= u128::from(committee.members_count()) * u128::from(proposal.quorum_percent)
}

fn execute<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    committee: &mut Committee,
    action: &ProposalAction,
) -> Result<(), LedgerError> {
    match action {
        ProposalAction::Invite(member) => {
            ctx.require_account(member)?;
            if committee.members.len() >= ctx.params.max_committee_members {
                return Err(LedgerError::limit(format!(
                    "committee already has the maximum of {} members",
                    ctx.params.max_committee_members
                )));
            }
            if !committee.members.insert(member.clone()) {
                return Err(LedgerError::illegal(format!(
                    "account {member} is already in the committee"
                )));
            }
            ctx.state.put_committee(committee)?;
        }
        ProposalAction::Dropout(member) => {
            if !committee.is_member(member) {
                return Err(LedgerError::illegal(format!(
                    "account {member} is not in the committee"
                )));
            }
            if committee.members.len() == 1 {
                return Err(LedgerError::illegal(
                    "the last committee member cannot be removed",
                ));
            }
            committee.members.remove(member);
            ctx.state.put_committee(committee)?;
        }
        ProposalAction::ChangeInviteQuorum(q) => {
            ctx.state
                .update_dynamic_global_properties(|p| p.invite_quorum = *q)?;
        }
        ProposalAction::ChangeDropoutQuorum(q) => {
            ctx.state
                .update_dynamic_global_properties(|p| p.dropout_quorum = *q)?;
        }
        ProposalAction::ChangeQuorum(q) => {
            ctx.state
                .update_dynamic_global_properties(|p| p.change_quorum = *q)?;
        }
    }
    Ok(())
}
