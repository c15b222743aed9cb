use std::collections::BTreeSet;

use tessera_store::{ChainState, Witness, WitnessVote};
use tessera_transactions::{
    AccountWitnessProxyOp, AccountWitnessVoteOp, VirtualOperation, WitnessUpdateOp,
};
use tessera_types::{AccountName, AssetError};

use crate::context::ApplyContext;
use crate::witness_votes::{
    adjust_proxied_witness_votes_by, adjust_witness_vote, clear_witness_votes, negate,
    vote_delta_of,
};
use crate::LedgerError;

/// Register a witness, or update its url, signing key and proposed
/// properties. A null signing key takes the witness out of production.
pub fn witness_update<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &WitnessUpdateOp,
) -> Result<(), LedgerError> {
    ctx.require_account(&op.owner)?;

    match ctx.state.find_witness(&op.owner)? {
        Some(mut witness) => {
            witness.url = op.url.clone();
            witness.signing_key = op.block_signing_key;
            witness.props = op.props.clone();
            ctx.state.put_witness(&witness)?;
            tracing::debug!(owner = %op.owner, "witness updated");
        }
        None => {
            ctx.state.create_witness(Witness {
                owner: op.owner.clone(),
                created: ctx.now(),
                url: op.url.clone(),
                signing_key: op.block_signing_key,
                props: op.props.clone(),
                votes: 0,
            })?;
            tracing::debug!(owner = %op.owner, "witness registered");
        }
    }

    if op.block_signing_key.is_null() {
        ctx.push_vop(VirtualOperation::ShutdownWitness {
            owner: op.owner.clone(),
        });
    }
    Ok(())
}

pub fn account_witness_vote<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &AccountWitnessVoteOp,
) -> Result<(), LedgerError> {
    let mut voter = ctx.account(&op.account)?;
    if voter.has_proxy() {
        return Err(LedgerError::illegal(
            "a proxy is currently set, clear the proxy before voting for a witness",
        ));
    }
    if op.approve && !voter.can_vote {
        return Err(LedgerError::denied(format!(
            "account {} has declined its voting rights",
            op.account
        )));
    }
    ctx.state.get_witness(&op.witness)?;

    let weight = voter.witness_vote_weight()?;
    let exists = ctx.state.witness_vote_exists(&op.witness, &op.account)?;

    match (exists, op.approve) {
        (false, true) => {
            if u32::from(voter.witnesses_voted_for) >= ctx.params.max_account_witness_votes {
                return Err(LedgerError::limit(format!(
                    "account has voted for the maximum of {} witnesses",
                    ctx.params.max_account_witness_votes
                )));
            }
            ctx.state.create_witness_vote(WitnessVote {
                witness: op.witness.clone(),
                account: op.account.clone(),
            })?;
            adjust_witness_vote(ctx.state, &op.witness, weight)?;
            voter.witnesses_voted_for += 1;
        }
        (false, false) => {
            return Err(LedgerError::illegal("vote does not exist"));
        }
        (true, true) => {
            return Err(LedgerError::illegal(
                "vote currently exists, the witness can only be unapproved",
            ));
        }
        (true, false) => {
            let delta = weight.checked_neg().ok_or(AssetError::Overflow)?;
            adjust_witness_vote(ctx.state, &op.witness, delta)?;
            ctx.state.remove_witness_vote(&op.witness, &op.account)?;
            voter.witnesses_voted_for = voter.witnesses_voted_for.saturating_sub(1);
        }
    }
    ctx.state.put_account(&voter)?;

    tracing::debug!(
        account = %op.account,
        witness = %op.witness,
        approve = op.approve,
        weight,
        "witness vote"
    );
    Ok(())
}

/// Set or clear the account whose witness votes stand in for this
/// account's. The account's whole per-level stake moves from the old
/// chain to the new one.
pub fn account_witness_proxy<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &AccountWitnessProxyOp,
) -> Result<(), LedgerError> {
    let account = ctx.account(&op.account)?;
    if account.proxy == op.proxy {
        return Err(LedgerError::illegal("proxy must change"));
    }
    if !account.can_vote {
        return Err(LedgerError::denied(format!(
            "account {} has declined its voting rights",
            op.account
        )));
    }
    if !op.proxy.is_empty() {
        check_proxy_chain(ctx, &op.account, &op.proxy)?;
    }

    let delta = vote_delta_of(&account);
    adjust_proxied_witness_votes_by(ctx.state, &account, &negate(&delta)?)?;

    if op.proxy.is_empty() {
        ctx.state
            .update_account(&op.account, |a| a.proxy = AccountName::none())?;
    } else {
        clear_witness_votes(ctx.state, &op.account)?;
        let account = ctx
            .state
            .update_account(&op.account, |a| a.proxy = op.proxy.clone())?;
        adjust_proxied_witness_votes_by(ctx.state, &account, &delta)?;
    }

    tracing::debug!(account = %op.account, proxy = %op.proxy, "witness proxy set");
    Ok(())
}

/// Reject a proxy that would close a loop or make the chain longer than
/// `max_proxy_recursion_depth`.
fn check_proxy_chain<S: ChainState>(
    ctx: &ApplyContext<'_, S>,
    account: &AccountName,
    proxy: &AccountName,
) -> Result<(), LedgerError> {
    let mut chain: BTreeSet<AccountName> = [account.clone(), proxy.clone()].into();
    let mut current = ctx.account(proxy)?;
    while current.has_proxy() {
        let next = ctx.account(&current.proxy)?;
        if !chain.insert(next.name.clone()) {
            return Err(LedgerError::illegal("this proxy would create a proxy loop"));
        }
        if chain.len() > ctx.params.max_proxy_recursion_depth {
            return Err(LedgerError::limit("proxy chain is too long"));
        }
        current = next;
    }
    Ok(())
}
