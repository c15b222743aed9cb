//! Pending-request operations: recovery, recovery-account changes and
//! declining voting rights.
//!
//! Each request is created here and either cancelled by its owner or
//! resolved by maintenance once its date is reached. The resolution
//! routines live here as well so both paths share them.

use tessera_store::{
    AccountRecoveryRequest, ChainState, ChangeRecoveryAccountRequest, DeclineVotingRightsRequest,
};
use tessera_transactions::{
    ChangeRecoveryAccountOp, DeclineVotingRightsOp, RecoverAccountOp, RequestAccountRecoveryOp,
};
use tessera_types::AccountName;

use crate::context::ApplyContext;
use crate::evaluators::account::{require_authority_accounts, update_owner_authority};
use crate::witness_votes::{
    adjust_proxied_witness_votes_by, clear_witness_votes, negate, vote_delta_of,
};
use crate::LedgerError;

pub fn request_account_recovery<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &RequestAccountRecoveryOp,
) -> Result<(), LedgerError> {
    let account = ctx.account(&op.account_to_recover)?;
    ctx.require_account(&op.recovery_account)?;

    if account.recovery_account.is_empty() {
        // Accounts without a recovery partner are served by the top witness.
        let top = ctx.state.witnesses_by_vote()?.into_iter().next();
        if top.map(|w| w.owner) != Some(op.recovery_account.clone()) {
            return Err(LedgerError::denied(
                "only the top witness can recover an account with no recovery account",
            ));
        }
    } else if account.recovery_account != op.recovery_account {
        return Err(LedgerError::denied(format!(
            "cannot recover an account that does not have you as its recovery partner ({})",
            account.recovery_account
        )));
    }

    let now = ctx.now();
    let authority = &op.new_owner_authority;
    let pending = ctx.state.find_recovery_request(&op.account_to_recover)?;

    match pending {
        None => {
            if authority.weight_threshold == 0 {
                return Err(LedgerError::illegal(
                    "cannot cancel a recovery request that does not exist",
                ));
            }
            if authority.is_impossible() {
                return Err(LedgerError::illegal("new owner authority cannot be impossible"));
            }
            require_authority_accounts(ctx, [authority])?;
            ctx.state.put_recovery_request(&AccountRecoveryRequest {
                account_to_recover: op.account_to_recover.clone(),
                new_owner_authority: authority.clone(),
                expires: now.plus(ctx.params.account_recovery_request_expiration_secs),
            })?;
            tracing::debug!(
                account = %op.account_to_recover,
                by = %op.recovery_account,
                "recovery requested"
            );
        }
        Some(_) if authority.weight_threshold == 0 => {
            ctx.state.remove_recovery_request(&op.account_to_recover)?;
            tracing::debug!(account = %op.account_to_recover, "recovery request cancelled");
        }
        Some(mut request) => {
            if authority.is_impossible() {
                return Err(LedgerError::illegal("new owner authority cannot be impossible"));
            }
            require_authority_accounts(ctx, [authority])?;
            request.new_owner_authority = authority.clone();
            request.expires = now.plus(ctx.params.account_recovery_request_expiration_secs);
            ctx.state.put_recovery_request(&request)?;
            tracing::debug!(account = %op.account_to_recover, "recovery request updated");
        }
    }
    Ok(())
}

/// Replace a lost owner authority with the one the recovery partner
/// requested, proven by an owner authority the account held recently.
pub fn recover_account<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &RecoverAccountOp,
) -> Result<(), LedgerError> {
    let now = ctx.now();
    let account = ctx.account(&op.account_to_recover)?;

    let allowed_at = account
        .last_account_recovery
        .plus(ctx.params.owner_update_limit_secs);
    if now <= allowed_at {
        return Err(LedgerError::TooSoon {
            what: "account recovery",
            allowed_at,
        });
    }

    let request = ctx
        .state
        .find_recovery_request(&op.account_to_recover)?
        .ok_or_else(|| {
            LedgerError::illegal("there are no active recovery requests for this account")
        })?;
    if request.new_owner_authority != op.new_owner_authority {
        return Err(LedgerError::illegal(
            "new owner authority does not match the recovery request",
        ));
    }

    let recent = ctx
        .state
        .owner_history(&op.account_to_recover)?
        .into_iter()
        .any(|h| h.previous_owner_authority == op.recent_owner_authority);
    if !recent {
        return Err(LedgerError::illegal(
            "recent owner authority not found in the owner history",
        ));
    }

    ctx.state.remove_recovery_request(&op.account_to_recover)?;
    update_owner_authority(
        ctx.state,
        &op.account_to_recover,
        op.new_owner_authority.clone(),
        now,
    )?;
    ctx.state
        .update_account(&op.account_to_recover, |a| a.last_account_recovery = now)?;

    tracing::debug!(account = %op.account_to_recover, "account recovered");
    Ok(())
}

pub fn change_recovery_account<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &ChangeRecoveryAccountOp,
) -> Result<(), LedgerError> {
    ctx.require_account(&op.new_recovery_account)?;
    let account = ctx.account(&op.account_to_recover)?;
    let now = ctx.now();

    match ctx
        .state
        .find_change_recovery_request(&op.account_to_recover)?
    {
        None => {
            ctx.state
                .put_change_recovery_request(&ChangeRecoveryAccountRequest {
                    account_to_recover: op.account_to_recover.clone(),
                    recovery_account: op.new_recovery_account.clone(),
                    effective_on: now.plus(ctx.params.change_recovery_account_delay_secs),
                })?;
        }
        Some(mut request) if account.recovery_account != op.new_recovery_account => {
            request.recovery_account = op.new_recovery_account.clone();
            request.effective_on = now.plus(ctx.params.change_recovery_account_delay_secs);
            ctx.state.put_change_recovery_request(&request)?;
        }
        // Changing back to the current partner cancels the pending change.
        Some(_) => {
            ctx.state
                .remove_change_recovery_request(&op.account_to_recover)?;
        }
    }

    tracing::debug!(
        account = %op.account_to_recover,
        recovery_account = %op.new_recovery_account,
        "recovery account change requested"
    );
    Ok(())
}

pub fn decline_voting_rights<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &DeclineVotingRightsOp,
) -> Result<(), LedgerError> {
    let account = ctx.account(&op.account)?;
    if !account.can_vote {
        return Err(LedgerError::illegal("voting rights were already declined"));
    }
    let pending = ctx.state.find_decline_voting_request(&op.account)?;

    match (pending, op.decline) {
        (None, true) => {
            ctx.state
                .create_decline_voting_request(DeclineVotingRightsRequest {
                    account: op.account.clone(),
                    effective_date: ctx
                        .now()
                        .plus(ctx.params.decline_voting_rights_delay_secs),
                })?;
            tracing::debug!(account = %op.account, "decline voting rights requested");
        }
        (Some(_), true) => {
            return Err(LedgerError::illegal(
                "there is already a pending decline voting rights request",
            ));
        }
        (Some(_), false) => {
            ctx.state.remove_decline_voting_request(&op.account)?;
            tracing::debug!(account = %op.account, "decline voting rights cancelled");
        }
        (None, false) => {
            return Err(LedgerError::illegal(
                "there is no pending decline voting rights request to cancel",
            ));
        }
    }
    Ok(())
}

/// Make a pending change of recovery account take effect.
pub(crate) fn apply_recovery_account_change<S: ChainState>(
    state: &mut S,
    request: &ChangeRecoveryAccountRequest,
) -> Result<(), LedgerError> {
    if state.account_exists(&request.account_to_recover)? {
        state.update_account(&request.account_to_recover, |a| {
            a.recovery_account = request.recovery_account.clone()
        })?;
    }
    state.remove_change_recovery_request(&request.account_to_recover)?;
    Ok(())
}

/// Strip `account` of its voting rights: its stake leaves every witness
/// tally it reached, its approvals and proxy are dropped and it can never
/// vote again.
pub(crate) fn finalize_decline_voting_rights<S: ChainState>(
    state: &mut S,
    account: &AccountName,
) -> Result<(), LedgerError> {
    let mut record = state.get_account(account)?;
    let delta = negate(&vote_delta_of(&record))?;
    adjust_proxied_witness_votes_by(state, &record, &delta)?;
    clear_witness_votes(state, account)?;

    record = state.get_account(account)?;
    record.proxy = AccountName::none();
    record.can_vote = false;
    state.put_account(&record)?;
    state.remove_decline_voting_request(account)?;
    Ok(())
}
