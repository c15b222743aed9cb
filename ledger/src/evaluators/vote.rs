//! Content voting.
//!
//! A vote spends voting power and turns it into rshares on the comment:
//!
//! ```text
//! power     = min(voting_power + elapsed × 100% / regeneration, 100%)
//! used      = ceil(power × |weight| / 100% / reserve)
//! rshares   = effective_vesting_shares × used / 100%
//! ```
//!
//! where `reserve` is the number of full-power votes a day's regeneration
//! pays for, times the regeneration days. A changed vote replaces its
//! previous rshares on the comment; it never adds to them.

use tessera_store::{ChainState, Comment, CommentVote};
use tessera_transactions::VoteOp;
use tessera_types::time::SECONDS_PER_DAY;
use tessera_types::{AssetError, PERCENT_100};

use crate::context::ApplyContext;
use crate::LedgerError;

pub fn vote<S: ChainState>(ctx: &mut ApplyContext<'_, S>, op: &VoteOp) -> Result<(), LedgerError> {
    let now = ctx.now();
    let params = ctx.params;
    let props = ctx.properties()?;
    let mut comment = ctx.state.get_comment(&op.author, &op.permlink)?;
    let mut voter = ctx.account(&op.voter)?;

    if !voter.can_vote {
        return Err(LedgerError::denied(format!(
            "voter {} has declined their voting rights",
            op.voter
        )));
    }
    if comment.is_paid_out() {
        return Err(LedgerError::illegal("cannot vote on a comment after its payout"));
    }

    let allowed_at = voter.last_vote_time.plus(params.min_vote_interval_secs);
    if now < allowed_at {
        return Err(LedgerError::TooSoon {
            what: "vote",
            allowed_at,
        });
    }

    let current_power = current_voting_power(
        voter.voting_power,
        voter.last_vote_time.elapsed_since(now),
        params.vote_regeneration_secs,
    );
    if current_power == 0 {
        return Err(LedgerError::illegal(
            "account currently does not have voting power",
        ));
    }

    let abs_weight = u64::from(op.weight.unsigned_abs());
    let reserve = u64::from(props.vote_power_reserve_rate) * params.vote_regeneration_secs
        / SECONDS_PER_DAY;
    let used_power = (u64::from(current_power) * abs_weight / u64::from(PERCENT_100))
        .div_ceil(reserve.max(1));
    if used_power > u64::from(current_power) {
        return Err(LedgerError::illegal(
            "account does not have enough power to vote",
        ));
    }

    let effective = voter.effective_vesting_shares()?.amount.max(0);
    let abs_rshares = i64::try_from(
        u128::from(effective.unsigned_abs()) * u128::from(used_power) / u128::from(PERCENT_100),
    )
    .map_err(|_| AssetError::Overflow)?;
    if op.weight != 0 && abs_rshares <= params.vote_dust_threshold {
        return Err(LedgerError::illegal(
            "voting weight is too small, accumulate more voting power or stake",
        ));
    }
    let rshares = if op.weight < 0 { -abs_rshares } else { abs_rshares };

    let lockout_start = comment.cashout_time.minus(params.upvote_lockout_secs);
    let existing = ctx
        .state
        .find_comment_vote(&op.author, &op.permlink, &op.voter)?;

    let (vote, previous_rshares) = match existing {
        None => {
            if op.weight == 0 {
                return Err(LedgerError::illegal("vote weight cannot be 0"));
            }
            if rshares > 0 && now >= lockout_start {
                return Err(upvote_locked());
            }
            let weight = u64::try_from(rshares).unwrap_or(0);
            apply_rshares(&mut comment, 0, rshares)?;
            comment.total_vote_weight = comment.total_vote_weight.saturating_add(weight);
            let vote = CommentVote {
                author: op.author.clone(),
                permlink: op.permlink.clone(),
                voter: op.voter.clone(),
                weight,
                rshares,
                vote_percent: op.weight,
                last_update: now,
                num_changes: 0,
            };
            (vote, 0)
        }
        Some(mut vote) => {
            if vote.num_changes >= params.max_vote_changes {
                return Err(LedgerError::limit(format!(
                    "voter has used the maximum of {} vote changes on this comment",
                    params.max_vote_changes
                )));
            }
            if vote.vote_percent == op.weight {
                return Err(LedgerError::illegal(
                    "you have already voted in a similar way",
                ));
            }
            if rshares > vote.rshares && now >= lockout_start {
                return Err(upvote_locked());
            }
            let previous = vote.rshares;
            apply_rshares(&mut comment, previous, rshares)?;
            // A changed vote forfeits its curation weight.
            comment.total_vote_weight = comment.total_vote_weight.saturating_sub(vote.weight);
            vote.weight = 0;
            vote.rshares = rshares;
            vote.vote_percent = op.weight;
            vote.last_update = now;
            vote.num_changes += 1;
            (vote, previous)
        }
    };

    ctx.state.put_comment(&comment)?;
    update_root_abs_rshares(ctx, &comment, previous_rshares.abs(), abs_rshares)?;
    ctx.state.put_comment_vote(&vote)?;

    voter.voting_power = current_power - used_power as u16;
    voter.last_vote_time = now;
    ctx.state.put_account(&voter)?;

    tracing::debug!(
        voter = %op.voter,
        author = %op.author,
        permlink = %op.permlink,
        weight = op.weight,
        rshares,
        "vote"
    );
    Ok(())
}

fn upvote_locked() -> LedgerError {
    LedgerError::illegal(
        "cannot increase the rshares of a comment within the lockout before its payout",
    )
}

/// Voting power after `elapsed` seconds of linear regeneration.
pub fn current_voting_power(stored: u16, elapsed: u64, regeneration_secs: u64) -> u16 {
    let regenerated = elapsed.saturating_mul(u64::from(PERCENT_100)) / regeneration_secs.max(1);
    let power = u64::from(stored).saturating_add(regenerated);
    power.min(u64::from(PERCENT_100)) as u16
}

/// Replace `old` rshares on `comment` with `new`.
fn apply_rshares(comment: &mut Comment, old: i64, new: i64) -> Result<(), LedgerError> {
    let overflow = || LedgerError::from(AssetError::Overflow);
    comment.net_rshares = comment
        .net_rshares
        .checked_sub(old)
        .and_then(|v| v.checked_add(new))
        .ok_or_else(overflow)?;
    comment.abs_rshares = comment
        .abs_rshares
        .checked_sub(old.abs())
        .and_then(|v| v.checked_add(new.abs()))
        .ok_or_else(overflow)?;
    comment.vote_rshares = comment
        .vote_rshares
        .checked_sub(old.max(0))
        .and_then(|v| v.checked_add(new.max(0)))
        .ok_or_else(overflow)?;
    comment.net_votes = comment.net_votes - old.signum() as i32 + new.signum() as i32;
    Ok(())
}

fn update_root_abs_rshares<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    comment: &Comment,
    old_abs: i64,
    new_abs: i64,
) -> Result<(), LedgerError> {
    let mut root = if comment.is_root() {
        comment.clone()
    } else {
        ctx.state
            .get_comment(&comment.root_author, &comment.root_permlink)?
    };
    root.children_abs_rshares = root
        .children_abs_rshares
        .checked_sub(old_abs)
        .and_then(|v| v.checked_add(new_abs))
        .ok_or(AssetError::Overflow)?;
    ctx.state.put_comment(&root)?;
    Ok(())
}
