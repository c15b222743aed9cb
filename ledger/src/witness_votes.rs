//! Witness vote tallies and proxy propagation.
//!
//! An account without a proxy votes its own stake plus everything proxied
//! to it. An account with a proxy votes nothing itself: its stake is
//! recorded in the proxy's `proxied_vsf_votes[depth]` and keeps flowing up
//! the chain, at most [`PROXY_VOTE_DEPTH`] hops.

use tessera_store::{Account, ChainState, PROXY_VOTE_DEPTH};
use tessera_types::{AccountName, AssetError};

use crate::LedgerError;

/// Per-level stake of an account: own vesting shares first, then each
/// level of proxied stake.
pub type VoteDelta = [i64; PROXY_VOTE_DEPTH + 1];

/// The stake an account moves when it sets or clears a proxy.
pub fn vote_delta_of(account: &Account) -> VoteDelta {
    let mut delta = [0i64; PROXY_VOTE_DEPTH + 1];
    delta[0] = account.vesting_shares.amount;
    delta[1..].copy_from_slice(&account.proxied_vsf_votes);
    delta
}

pub fn negate(delta: &VoteDelta) -> Result<VoteDelta, LedgerError> {
    let mut out = [0i64; PROXY_VOTE_DEPTH + 1];
    for (o, d) in out.iter_mut().zip(delta) {
        *o = d.checked_neg().ok_or(AssetError::Overflow)?;
    }
    Ok(out)
}

pub fn adjust_witness_vote<S: ChainState>(
    state: &mut S,
    witness: &AccountName,
    delta: i64,
) -> Result<(), LedgerError> {
    let mut record = state.get_witness(witness)?;
    record.votes = record
        .votes
        .checked_add(delta)
        .ok_or(AssetError::Overflow)?;
    state.put_witness(&record)?;
    Ok(())
}

/// Apply `delta` to every witness `account` currently approves.
pub fn adjust_witness_votes<S: ChainState>(
    state: &mut S,
    account: &Account,
    delta: i64,
) -> Result<(), LedgerError> {
    if delta == 0 {
        return Ok(());
    }
    for vote in state.witness_votes_by_account(&account.name)? {
        adjust_witness_vote(state, &vote.witness, delta)?;
    }
    Ok(())
}

/// Propagate a change of `account`'s own stake.
pub fn adjust_proxied_witness_votes<S: ChainState>(
    state: &mut S,
    account: &Account,
    delta: i64,
) -> Result<(), LedgerError> {
    propagate_scalar(state, account, delta, 0)
}

fn propagate_scalar<S: ChainState>(
    state: &mut S,
    account: &Account,
    delta: i64,
    depth: usize,
) -> Result<(), LedgerError> {
    if !account.has_proxy() {
        return adjust_witness_votes(state, account, delta);
    }
    if depth >= PROXY_VOTE_DEPTH {
        return Ok(());
    }
    let mut proxy = state.get_account(&account.proxy)?;
    proxy.proxied_vsf_votes[depth] = proxy.proxied_vsf_votes[depth]
        .checked_add(delta)
        .ok_or(AssetError::Overflow)?;
    state.put_account(&proxy)?;
    propagate_scalar(state, &proxy, delta, depth + 1)
}

/// Propagate a change of `account`'s whole per-level stake, as happens
/// when its proxy is set or cleared.
pub fn adjust_proxied_witness_votes_by<S: ChainState>(
    state: &mut S,
    account: &Account,
    delta: &VoteDelta,
) -> Result<(), LedgerError> {
    propagate_levels(state, account, delta, 0)
}

fn propagate_levels<S: ChainState>(
    state: &mut S,
    account: &Account,
    delta: &VoteDelta,
    depth: usize,
) -> Result<(), LedgerError> {
    if !account.has_proxy() {
        let total = delta[..=PROXY_VOTE_DEPTH - depth]
            .iter()
            .try_fold(0i64, |acc, d| acc.checked_add(*d))
            .ok_or(AssetError::Overflow)?;
        return adjust_witness_votes(state, account, total);
    }
    if depth >= PROXY_VOTE_DEPTH {
        return Ok(());
    }
    let mut proxy = state.get_account(&account.proxy)?;
    // Levels that would land beyond the last slot fall off the chain.
    for i in (0..PROXY_VOTE_DEPTH - depth).rev() {
        let slot = &mut proxy.proxied_vsf_votes[i + depth];
        *slot = slot.checked_add(delta[i]).ok_or(AssetError::Overflow)?;
    }
    state.put_account(&proxy)?;
    propagate_levels(state, &proxy, delta, depth + 1)
}

/// Drop every witness approval of `account` without touching the tallies.
pub fn clear_witness_votes<S: ChainState>(
    state: &mut S,
    account: &AccountName,
) -> Result<(), LedgerError> {
    for vote in state.witness_votes_by_account(account)? {
        state.remove_witness_vote(&vote.witness, &vote.account)?;
    }
    state.update_account(account, |a| a.witnesses_voted_for = 0)?;
    Ok(())
}
