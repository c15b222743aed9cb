//! The per-block maintenance sweep.
//!
//! Runs once at the start of every block, before its transactions, and
//! resolves everything that became due by the block time: reward flow,
//! budgets, power-downs, comment payouts and the pending-request records
//! evaluators leave behind. Each step scans a deadline-ordered index and
//! applies the same mutation an evaluator would.

use tessera_store::{Account, ChainState, Comment};
use tessera_transactions::VirtualOperation;
use tessera_types::{
    AccountName, Asset, AssetError, AssetSymbol, ChainParams, Price, Timestamp, PERCENT_100,
};
use tessera_utils::format_duration;

use crate::context::ApplyContext;
use crate::evaluators::{escrow, recovery};
use crate::stake::create_vesting;
use crate::witness_votes::adjust_proxied_witness_votes;
use crate::LedgerError;

/// Advance the head to `block_number` at `timestamp` and run every due
/// transition. Returns the virtual operations in the order they happened.
pub fn run_maintenance<S: ChainState>(
    state: &mut S,
    params: &ChainParams,
    block_number: u64,
    timestamp: Timestamp,
) -> Result<Vec<VirtualOperation>, LedgerError> {
    state.update_dynamic_global_properties(|p| {
        p.head_block_number = block_number;
        p.time = timestamp;
    })?;

    let mut ctx = ApplyContext::new(state, params)?;
    drain_reward_pool(&mut ctx)?;
    allocate_budgets(&mut ctx)?;
    process_vesting_withdrawals(&mut ctx)?;
    process_comment_cashouts(&mut ctx)?;
    refund_unratified_escrows(&mut ctx)?;
    release_delegation_expirations(&mut ctx)?;
    clear_expired_recovery(&mut ctx)?;
    apply_recovery_account_changes(&mut ctx)?;
    apply_declined_voting_rights(&mut ctx)?;
    remove_expired_proposals(&mut ctx)?;

    let vops = ctx.into_virtual_ops();
    tracing::trace!(block = block_number, vops = vops.len(), "maintenance done");
    Ok(vops)
}

fn drain_reward_pool<S: ChainState>(ctx: &mut ApplyContext<'_, S>) -> Result<(), LedgerError> {
    let mut pool = ctx.state.reward_pool()?;
    let amount = if pool.balance.covers(&pool.current_per_block_reward) {
        pool.current_per_block_reward
    } else {
        pool.balance
    };
    if !amount.is_positive() {
        return Ok(());
    }
    pool.balance = pool.balance.checked_sub(amount)?;
    ctx.state.put_reward_pool(&pool)?;

    let mut fund = ctx.state.reward_fund()?;
    fund.reward_balance = fund.reward_balance.checked_add(amount)?;
    ctx.state.put_reward_fund(&fund)?;
    tracing::trace!(%amount, "reward pool drained into fund");
    Ok(())
}

/// Move one block's allocation of every budget into the reward pool and
/// close the budgets that are exhausted or past their deadline.
fn allocate_budgets<S: ChainState>(ctx: &mut ApplyContext<'_, S>) -> Result<(), LedgerError> {
    let now = ctx.now();
    for mut budget in ctx.state.budgets()? {
        if budget.deadline > now {
            let allocation = if budget.balance.covers(&budget.per_block) {
                budget.per_block
            } else {
                budget.balance
            };
            budget.balance = budget.balance.checked_sub(allocation)?;
            let mut pool = ctx.state.reward_pool()?;
            pool.balance = pool.balance.checked_add(allocation)?;
            ctx.state.put_reward_pool(&pool)?;

            if budget.balance.is_positive() {
                ctx.state.put_budget(&budget)?;
                continue;
            }
        }

        let refund = budget.balance;
        if refund.is_positive() {
            let mut owner = ctx.account(&budget.owner)?;
            owner.balance = owner.balance.checked_add(refund)?;
            ctx.state.put_account(&owner)?;
            let mut props = ctx.properties()?;
            props.accounts_current_supply = props.accounts_current_supply.checked_add(refund)?;
            ctx.state.put_dynamic_global_properties(&props)?;
        }
        ctx.state.remove_budget(budget.id)?;
        ctx.push_vop(VirtualOperation::BudgetClosed {
            owner: budget.owner.clone(),
            id: budget.id,
            refund,
        });
        tracing::debug!(id = budget.id, owner = %budget.owner, %refund, "budget closed");
    }
    Ok(())
}

fn process_vesting_withdrawals<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
) -> Result<(), LedgerError> {
    let now = ctx.now();
    for account in ctx.state.accounts_due_for_withdrawal(now)? {
        withdraw_interval(ctx, &account.name)?;
    }
    Ok(())
}

/// Pay one interval of `name`'s power-down: routed shares first, the rest
/// to the account itself as SCR.
fn withdraw_interval<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    name: &AccountName,
) -> Result<(), LedgerError> {
    let from = ctx.account(name)?;
    let rate = from.vesting_withdraw_rate.amount;
    let remaining = from.to_withdraw.saturating_sub(from.withdrawn);
    let withdrawable = from
        .vesting_shares
        .checked_sub(from.delegated_vesting_shares)?
        .amount;

    // The remainder of the floor-divided rate goes out with the last interval.
    let leftover = from
        .to_withdraw
        .saturating_sub(rate.saturating_mul(i64::from(ctx.params.vesting_withdraw_intervals)))
        .max(0);
    let scheduled = if remaining <= rate.saturating_add(leftover) {
        remaining
    } else {
        rate
    };
    let to_withdraw = scheduled.min(withdrawable);
    if to_withdraw <= 0 {
        stop_withdrawal(ctx, name)?;
        return Ok(());
    }

    let price = ctx.properties()?.share_price();
    let mut routed = 0i64;
    for route in ctx.state.withdraw_routes_from(name)? {
        let shares = share_of(to_withdraw, u128::from(route.percent), u128::from(PERCENT_100))?;
        if shares == 0 {
            continue;
        }
        routed = routed.checked_add(shares).ok_or(AssetError::Overflow)?;
        let shares = Asset::sp(shares);

        let deposited = if route.auto_vest {
            let mut to = ctx.account(&route.to_account)?;
            to.vesting_shares = to.vesting_shares.checked_add(shares)?;
            ctx.state.put_account(&to)?;
            adjust_proxied_witness_votes(ctx.state, &to, shares.amount)?;
            shares
        } else {
            let scr = unstake(ctx, &price, shares)?;
            let mut to = ctx.account(&route.to_account)?;
            to.balance = to.balance.checked_add(scr)?;
            ctx.state.put_account(&to)?;
            scr
        };
        ctx.push_vop(VirtualOperation::FillVestingWithdraw {
            from: name.clone(),
            to: route.to_account.clone(),
            withdrawn: shares,
            deposited,
        });
    }

    let own = Asset::sp(to_withdraw - routed);
    let own_scr = unstake(ctx, &price, own)?;

    let mut from = ctx.account(name)?;
    from.balance = from.balance.checked_add(own_scr)?;
    from.vesting_shares = from.vesting_shares.checked_sub(Asset::sp(to_withdraw))?;
    from.withdrawn = from.withdrawn.checked_add(to_withdraw).ok_or(AssetError::Overflow)?;
    let finished = from.withdrawn >= from.to_withdraw || from.vesting_shares.is_zero();
    if finished {
        reset_withdrawal(&mut from);
    } else {
        from.next_vesting_withdrawal = from
            .next_vesting_withdrawal
            .plus(ctx.params.vesting_withdraw_interval_secs);
    }
    ctx.state.put_account(&from)?;
    adjust_proxied_witness_votes(ctx.state, &from, -to_withdraw)?;

    if own.is_positive() {
        ctx.push_vop(VirtualOperation::FillVestingWithdraw {
            from: name.clone(),
            to: name.clone(),
            withdrawn: own,
            deposited: own_scr,
        });
    }
    tracing::debug!(
        account = %name,
        withdrawn = to_withdraw,
        finished,
        next_in = %format_duration(if finished {
            u64::MAX
        } else {
            ctx.now().elapsed_since(from.next_vesting_withdrawal)
        }),
        "vesting withdrawal filled"
    );
    Ok(())
}

fn stop_withdrawal<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    name: &AccountName,
) -> Result<(), LedgerError> {
    let mut account = ctx.account(name)?;
    reset_withdrawal(&mut account);
    ctx.state.put_account(&account)?;
    tracing::debug!(account = %name, "power down stopped, nothing left to withdraw");
    Ok(())
}

fn reset_withdrawal(account: &mut Account) {
    account.vesting_withdraw_rate = Asset::sp(0);
    account.next_vesting_withdrawal = Timestamp::MAX;
    account.to_withdraw = 0;
    account.withdrawn = 0;
}

/// Turn `shares` back into SCR at `price`, taking both out of the vesting
/// totals.
fn unstake<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    price: &Price,
    shares: Asset,
) -> Result<Asset, LedgerError> {
    if shares.is_zero() {
        return Ok(Asset::scr(0));
    }
    let scr = price.convert_to(shares, AssetSymbol::Scr)?;
    let mut props = ctx.properties()?;
    props.total_vesting_fund = props.total_vesting_fund.checked_sub(scr)?;
    props.total_vesting_shares = props.total_vesting_shares.checked_sub(shares)?;
    ctx.state.put_dynamic_global_properties(&props)?;
    Ok(scr)
}

/// `amount * part / whole`, rounded down. Zero when there is nothing to
/// share.
fn share_of(amount: i64, part: u128, whole: u128) -> Result<i64, AssetError> {
    if amount <= 0 || whole == 0 {
        return Ok(0);
    }
    let amount = u128::try_from(amount).map_err(|_| AssetError::Overflow)?;
    let scaled = amount.checked_mul(part).ok_or(AssetError::Overflow)? / whole;
    i64::try_from(scaled).map_err(|_| AssetError::Overflow)
}

fn process_comment_cashouts<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
) -> Result<(), LedgerError> {
    let now = ctx.now();
    let due = ctx.state.comments_due_for_cashout(now)?;
    if due.is_empty() {
        return Ok(());
    }

    let mut fund = ctx.state.reward_fund()?;
    let decay = ctx.params.recent_rshares_decay_secs.max(1);
    let elapsed = fund.last_update.elapsed_since(now).min(decay);
    fund.recent_claims = fund
        .recent_claims
        .checked_mul(u128::from(decay - elapsed))
        .ok_or(AssetError::Overflow)?
        / u128::from(decay);
    fund.last_update = now;
    for comment in &due {
        if comment.net_rshares > 0 {
            fund.recent_claims = fund
                .recent_claims
                .checked_add(comment.net_rshares.unsigned_abs().into())
                .ok_or(AssetError::Overflow)?;
        }
    }

    let available = fund.reward_balance;
    let mut paid = Asset::scr(0);
    for comment in due {
        let reward = if comment.net_rshares > 0 {
            Asset::scr(share_of(
                available.amount,
                comment.net_rshares.unsigned_abs().into(),
                fund.recent_claims,
            )?)
        } else {
            Asset::scr(0)
        };
        pay_comment(ctx, comment, reward)?;
        paid = paid.checked_add(reward)?;
    }

    fund.reward_balance = fund.reward_balance.checked_sub(paid)?;
    ctx.state.put_reward_fund(&fund)?;
    let mut props = ctx.properties()?;
    props.accounts_current_supply = props.accounts_current_supply.checked_add(paid)?;
    ctx.state.put_dynamic_global_properties(&props)?;
    Ok(())
}

/// Share `reward` between curators, beneficiaries and the author, then
/// close the comment for payout.
fn pay_comment<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    mut comment: Comment,
    reward: Asset,
) -> Result<(), LedgerError> {
    if reward.is_positive() {
        let curation_max = Asset::scr(share_of(
            reward.amount,
            u128::from(ctx.params.curation_reward_percent),
            u128::from(PERCENT_100),
        )?);
        let curation_paid = pay_curators(ctx, &comment, curation_max)?;

        // Unclaimed curation returns to the author.
        let mut author_tokens = reward.checked_sub(curation_paid)?;
        let mut beneficiaries_paid = Asset::scr(0);
        for route in &comment.beneficiaries {
            let amount = Asset::scr(share_of(
                author_tokens.amount,
                u128::from(route.weight),
                u128::from(PERCENT_100),
            )?);
            if !amount.is_positive() {
                continue;
            }
            let shares = create_vesting(ctx.state, &route.account, amount)?;
            beneficiaries_paid = beneficiaries_paid.checked_add(amount)?;
            ctx.push_vop(VirtualOperation::CommentBenefactorReward {
                benefactor: route.account.clone(),
                author: comment.author.clone(),
                permlink: comment.permlink.clone(),
                reward: shares,
            });
        }
        author_tokens = author_tokens.checked_sub(beneficiaries_paid)?;

        let scr_payout = author_tokens.div_floor(2)?;
        let vesting_part = author_tokens.checked_sub(scr_payout)?;
        let mut author = ctx.account(&comment.author)?;
        author.balance = author.balance.checked_add(scr_payout)?;
        author.posting_rewards = author
            .posting_rewards
            .checked_add(author_tokens.amount)
            .ok_or(AssetError::Overflow)?;
        ctx.state.put_account(&author)?;
        let sp_payout = if vesting_part.is_positive() {
            create_vesting(ctx.state, &comment.author, vesting_part)?
        } else {
            Asset::sp(0)
        };

        comment.author_rewards = comment
            .author_rewards
            .checked_add(author_tokens.amount)
            .ok_or(AssetError::Overflow)?;
        comment.total_payout_value = comment.total_payout_value.checked_add(author_tokens)?;
        comment.curator_payout_value = comment.curator_payout_value.checked_add(curation_paid)?;
        comment.beneficiary_payout_value = comment
            .beneficiary_payout_value
            .checked_add(beneficiaries_paid)?;

        ctx.push_vop(VirtualOperation::AuthorReward {
            author: comment.author.clone(),
            permlink: comment.permlink.clone(),
            scr_payout,
            sp_payout,
        });
        ctx.push_vop(VirtualOperation::CommentPayout {
            author: comment.author.clone(),
            permlink: comment.permlink.clone(),
            payout: reward,
        });
        tracing::debug!(
            author = %comment.author,
            permlink = %comment.permlink,
            %reward,
            curation = %curation_paid,
            "comment paid out"
        );
    }

    comment.cashout_time = Timestamp::MAX;
    comment.last_payout = ctx.now();
    comment.net_rshares = 0;
    comment.abs_rshares = 0;
    comment.vote_rshares = 0;
    comment.children_abs_rshares = 0;
    comment.total_vote_weight = 0;
    ctx.state.put_comment(&comment)?;
    Ok(())
}

/// Pay each voter its weight's share of `curation_max` as stake. Returns
/// the SCR actually paid.
fn pay_curators<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    comment: &Comment,
    curation_max: Asset,
) -> Result<Asset, LedgerError> {
    let mut paid = Asset::scr(0);
    if comment.total_vote_weight == 0 || !curation_max.is_positive() {
        return Ok(paid);
    }
    for vote in ctx.state.comment_votes(&comment.author, &comment.permlink)? {
        let claim = Asset::scr(share_of(
            curation_max.amount,
            u128::from(vote.weight),
            u128::from(comment.total_vote_weight),
        )?);
        if !claim.is_positive() {
            continue;
        }
        let shares = create_vesting(ctx.state, &vote.voter, claim)?;
        let mut curator = ctx.account(&vote.voter)?;
        curator.curation_rewards = curator
            .curation_rewards
            .checked_add(claim.amount)
            .ok_or(AssetError::Overflow)?;
        ctx.state.put_account(&curator)?;
        paid = paid.checked_add(claim)?;
        ctx.push_vop(VirtualOperation::CurationReward {
            curator: vote.voter.clone(),
            reward: shares,
            comment_author: comment.author.clone(),
            comment_permlink: comment.permlink.clone(),
        });
    }
    Ok(paid)
}

fn refund_unratified_escrows<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
) -> Result<(), LedgerError> {
    let now = ctx.now();
    for pending in ctx.state.unratified_escrows_before(now)? {
        let amount = escrow::refund(ctx, &pending)?;
        ctx.push_vop(VirtualOperation::EscrowAutoRefund {
            from: pending.from.clone(),
            escrow_id: pending.escrow_id,
            amount,
        });
        tracing::debug!(
            from = %pending.from,
            escrow_id = pending.escrow_id,
            %amount,
            "unratified escrow refunded"
        );
    }
    Ok(())
}

fn release_delegation_expirations<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
) -> Result<(), LedgerError> {
    let now = ctx.now();
    for expiration in ctx.state.due_delegation_expirations(now)? {
        let mut delegator = ctx.account(&expiration.delegator)?;
        delegator.delegated_vesting_shares = delegator
            .delegated_vesting_shares
            .checked_sub(expiration.vesting_shares)?;
        ctx.state.put_account(&delegator)?;
        ctx.state.remove_delegation_expiration(expiration.id)?;
        ctx.push_vop(VirtualOperation::ReturnVestingDelegation {
            account: expiration.delegator.clone(),
            vesting_shares: expiration.vesting_shares,
        });
        tracing::debug!(
            delegator = %expiration.delegator,
            shares = %expiration.vesting_shares,
            "delegation returned"
        );
    }
    Ok(())
}

fn clear_expired_recovery<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
) -> Result<(), LedgerError> {
    let now = ctx.now();
    for request in ctx.state.expired_recovery_requests(now)? {
        ctx.state.remove_recovery_request(&request.account_to_recover)?;
        tracing::debug!(account = %request.account_to_recover, "recovery request expired");
    }
    let cutoff = now.minus(ctx.params.owner_auth_recovery_period_secs);
    for record in ctx.state.owner_history_before(cutoff)? {
        ctx.state.remove_owner_history(record.id)?;
    }
    Ok(())
}

fn apply_recovery_account_changes<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
) -> Result<(), LedgerError> {
    let now = ctx.now();
    for request in ctx.state.due_change_recovery_requests(now)? {
        recovery::apply_recovery_account_change(ctx.state, &request)?;
        tracing::debug!(
            account = %request.account_to_recover,
            recovery_account = %request.recovery_account,
            "recovery account changed"
        );
    }
    Ok(())
}

fn apply_declined_voting_rights<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
) -> Result<(), LedgerError> {
    let now = ctx.now();
    for request in ctx.state.due_decline_voting_requests(now)? {
        recovery::finalize_decline_voting_rights(ctx.state, &request.account)?;
        tracing::debug!(account = %request.account, "voting rights declined");
    }
    Ok(())
}

fn remove_expired_proposals<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
) -> Result<(), LedgerError> {
    let now = ctx.now();
    for proposal in ctx.state.expired_proposals(now)? {
        ctx.state.remove_proposal(proposal.id)?;
        tracing::debug!(id = proposal.id, action = %proposal.action, "proposal expired");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{account, advance, apply, fund, make_chain, now, vest};
    use tessera_nullables::NullStore;
    use tessera_store::{
        AccountService, BudgetService, CommentService, DelegationService, EscrowService,
        GlobalPropertyService, RecoveryService, RewardFund, RewardPool,
    };
    use tessera_transactions::{
        ChangeRecoveryAccountOp, CommentOp, CreateBudgetOp, DeclineVotingRightsOp,
        DelegateVestingSharesOp, EscrowTransferOp, Operation, SetWithdrawVestingRouteOp, VoteOp,
        WithdrawVestingOp,
    };
    use tessera_types::Permlink;

    fn tick(store: &mut NullStore, params: &ChainParams, secs: u64) -> Vec<VirtualOperation> {
        advance(store, secs);
        let props = store.dynamic_global_properties().unwrap();
        run_maintenance(store, params, props.head_block_number + 1, props.time).unwrap()
    }

    /// Put `scr` into the reward fund as newly minted supply.
    fn seed_reward_fund(store: &mut NullStore, scr: i64) {
        let mut fund = store.reward_fund().unwrap();
        fund.reward_balance = fund.reward_balance.checked_add(Asset::scr(scr)).unwrap();
        store.put_reward_fund(&fund).unwrap();
        store
            .update_dynamic_global_properties(|p| {
                p.total_supply = p.total_supply.checked_add(Asset::scr(scr)).unwrap()
            })
            .unwrap();
    }

    fn assert_supply_balanced(store: &NullStore) {
        let props = store.dynamic_global_properties().unwrap();
        let budgets: i64 = store.budgets().unwrap().iter().map(|b| b.balance.amount).sum();
        let pool = store.reward_pool().unwrap().balance.amount;
        let fund = store.reward_fund().unwrap().reward_balance.amount;
        assert_eq!(
            props.total_supply.amount,
            props.accounts_current_supply.amount + budgets + pool + fund
        );
    }

    #[test]
    fn head_block_advances() {
        let (mut store, params) = make_chain(&[]);
        let at = now(&store).plus(3);
        run_maintenance(&mut store, &params, 7, at).unwrap();
        let props = store.dynamic_global_properties().unwrap();
        assert_eq!(props.head_block_number, 7);
        assert_eq!(props.time, at);
    }

    #[test]
    fn pool_drains_per_block_into_fund() {
        let (mut store, params) = make_chain(&[]);
        store
            .put_reward_pool(&RewardPool {
                balance: Asset::scr(250),
                current_per_block_reward: Asset::scr(100),
            })
            .unwrap();
        tick(&mut store, &params, 3);
        tick(&mut store, &params, 3);
        tick(&mut store, &params, 3);
        assert_eq!(store.reward_pool().unwrap().balance, Asset::scr(0));
        assert_eq!(store.reward_fund().unwrap().reward_balance, Asset::scr(250));
    }

    #[test]
    fn budget_feeds_pool_then_closes() {
        let (mut store, params) = make_chain(&["alice"]);
        fund(&mut store, "alice", 1_000);
        // Three blocks worth of allocation.
        let deadline = now(&store).plus(9);
        apply(
            &mut store,
            &params,
            Operation::CreateBudget(CreateBudgetOp {
                owner: AccountName::new("alice"),
                content_permlink: Permlink::new("campaign"),
                balance: Asset::scr(1_000),
                deadline,
            }),
        )
        .unwrap();

        tick(&mut store, &params, 3);
        assert_eq!(store.reward_pool().unwrap().balance, Asset::scr(333));
        assert_supply_balanced(&store);
        tick(&mut store, &params, 3);
        assert_supply_balanced(&store);

        // The deadline block refunds what is left.
        let vops = tick(&mut store, &params, 3);
        assert!(store.budgets().unwrap().is_empty());
        assert!(vops.iter().any(|v| matches!(
            v,
            VirtualOperation::BudgetClosed { refund, .. } if refund.is_positive()
        )));
        assert_supply_balanced(&store);
        let alice = account(&store, "alice");
        let pool = store.reward_pool().unwrap().balance;
        let fund = store.reward_fund().unwrap().reward_balance;
        assert_eq!(alice.balance.amount + pool.amount + fund.amount, 1_000);
    }

    fn withdraw(store: &mut NullStore, params: &ChainParams, sp: i64) {
        apply(
            store,
            params,
            Operation::WithdrawVesting(WithdrawVestingOp {
                account: AccountName::new("alice"),
                vesting_shares: Asset::sp(sp),
            }),
        )
        .unwrap();
    }

    #[test]
    fn power_down_pays_every_interval_and_the_remainder_last() {
        let (mut store, params) = make_chain(&["alice"]);
        let shares = vest(&mut store, "alice", 10_000).amount;
        withdraw(&mut store, &params, shares / 2);
        let rate = account(&store, "alice").vesting_withdraw_rate.amount;

        let interval = params.vesting_withdraw_interval_secs;
        tick(&mut store, &params, interval);
        let alice = account(&store, "alice");
        assert_eq!(alice.withdrawn, rate);
        assert_eq!(alice.vesting_shares.amount, shares - rate);
        assert!(alice.balance.is_positive());

        for _ in 1..params.vesting_withdraw_intervals {
            tick(&mut store, &params, interval);
        }
        let alice = account(&store, "alice");
        assert_eq!(alice.vesting_shares.amount, shares - shares / 2);
        assert!(alice.next_vesting_withdrawal.is_max());
        assert_eq!(alice.vesting_withdraw_rate, Asset::sp(0));
        assert_supply_balanced(&store);

        // Nothing further happens once the schedule is done.
        let vops = tick(&mut store, &params, interval);
        assert!(vops.is_empty());
    }

    #[test]
    fn power_down_ends_after_the_scheduled_intervals() {
        let (mut store, params) = make_chain(&["alice"]);
        vest(&mut store, "alice", 10_000);
        // 31 over 13 intervals: a rate of 2 and a remainder of 5.
        withdraw(&mut store, &params, 31);
        assert_eq!(account(&store, "alice").vesting_withdraw_rate, Asset::sp(2));

        let mut payments = Vec::new();
        let mut paid = 0;
        for _ in 0..params.vesting_withdraw_intervals {
            tick(&mut store, &params, params.vesting_withdraw_interval_secs);
            let alice = account(&store, "alice");
            let total = if alice.next_vesting_withdrawal.is_max() {
                31
            } else {
                alice.withdrawn
            };
            payments.push(total - paid);
            paid = total;
        }
        let mut expected = vec![2; 12];
        expected.push(7);
        assert_eq!(payments, expected);

        let alice = account(&store, "alice");
        assert!(alice.next_vesting_withdrawal.is_max());
        assert_eq!(alice.to_withdraw, 0);
        assert_supply_balanced(&store);
    }

    #[test]
    fn routes_split_each_withdrawal() {
        let (mut store, params) = make_chain(&["alice", "bob", "sam"]);
        let shares = vest(&mut store, "alice", 13_000).amount;
        for (to, auto_vest) in [("bob", true), ("sam", false)] {
            apply(
                &mut store,
                &params,
                Operation::SetWithdrawVestingRoute(SetWithdrawVestingRouteOp {
                    from_account: AccountName::new("alice"),
                    to_account: AccountName::new(to),
                    percent: 2_500,
                    auto_vest,
                }),
            )
            .unwrap();
        }
        withdraw(&mut store, &params, shares);
        let rate = account(&store, "alice").vesting_withdraw_rate.amount;

        let vops = tick(&mut store, &params, params.vesting_withdraw_interval_secs);
        assert_eq!(vops.len(), 3);
        assert_eq!(account(&store, "bob").vesting_shares, Asset::sp(rate / 4));
        assert!(account(&store, "sam").balance.is_positive());
        assert!(account(&store, "alice").balance.is_positive());
        assert_eq!(account(&store, "alice").vesting_shares.amount, shares - rate);
    }

    #[test]
    fn delegated_shares_stop_a_power_down() {
        let (mut store, params) = make_chain(&["alice"]);
        let shares = vest(&mut store, "alice", 10_000).amount;
        withdraw(&mut store, &params, shares);
        store
            .update_account(&AccountName::new("alice"), |a| {
                a.delegated_vesting_shares = a.vesting_shares
            })
            .unwrap();
        tick(&mut store, &params, params.vesting_withdraw_interval_secs);
        let alice = account(&store, "alice");
        assert_eq!(alice.vesting_shares.amount, shares);
        assert!(alice.next_vesting_withdrawal.is_max());
    }

    fn post_and_vote(store: &mut NullStore, params: &ChainParams) {
        apply(
            store,
            params,
            Operation::Comment(CommentOp {
                parent_author: AccountName::none(),
                parent_permlink: Permlink::new("test"),
                author: AccountName::new("alice"),
                permlink: Permlink::new("lorem"),
                title: "lorem".to_string(),
                body: "ipsum".to_string(),
                json_metadata: String::new(),
            }),
        )
        .unwrap();
        advance(store, 10);
        apply(
            store,
            params,
            Operation::Vote(VoteOp {
                voter: AccountName::new("sam"),
                author: AccountName::new("alice"),
                permlink: Permlink::new("lorem"),
                weight: 10_000,
            }),
        )
        .unwrap();
    }

    #[test]
    fn cashout_splits_reward_between_curator_and_author() {
        let (mut store, params) = make_chain(&["alice", "sam"]);
        vest(&mut store, "sam", 100_000_000);
        seed_reward_fund(&mut store, 10_000);
        post_and_vote(&mut store, &params);
        let sam_shares = account(&store, "sam").vesting_shares;

        let vops = tick(&mut store, &params, params.cashout_window_secs);

        // A lone comment claims the whole fund: 25% curation, the rest
        // half liquid and half staked.
        let alice = account(&store, "alice");
        assert_eq!(alice.balance, Asset::scr(3_750));
        assert_eq!(alice.posting_rewards, 7_500);
        assert!(alice.vesting_shares.is_positive());
        let sam = account(&store, "sam");
        assert_eq!(sam.curation_rewards, 2_500);
        assert!(sam.vesting_shares.amount > sam_shares.amount);

        assert_eq!(store.reward_fund().unwrap().reward_balance, Asset::scr(0));
        let lorem = store
            .get_comment(&AccountName::new("alice"), &Permlink::new("lorem"))
            .unwrap();
        assert!(lorem.is_paid_out());
        assert_eq!(lorem.net_rshares, 0);
        assert_eq!(lorem.author_rewards, 7_500);

        assert!(vops.contains(&VirtualOperation::CommentPayout {
            author: AccountName::new("alice"),
            permlink: Permlink::new("lorem"),
            payout: Asset::scr(10_000),
        }));
        assert!(vops.iter().any(|v| matches!(
            v,
            VirtualOperation::CurationReward { curator, .. } if curator.as_str() == "sam"
        )));
        assert_supply_balanced(&store);
    }

    #[test]
    fn unvoted_comment_closes_without_payout() {
        let (mut store, params) = make_chain(&["alice", "sam"]);
        seed_reward_fund(&mut store, 10_000);
        apply(
            &mut store,
            &params,
            Operation::Comment(CommentOp {
                parent_author: AccountName::none(),
                parent_permlink: Permlink::new("test"),
                author: AccountName::new("alice"),
                permlink: Permlink::new("quiet"),
                title: String::new(),
                body: "nobody reads this".to_string(),
                json_metadata: String::new(),
            }),
        )
        .unwrap();
        let vops = tick(&mut store, &params, params.cashout_window_secs);
        assert!(vops.is_empty());
        assert_eq!(store.reward_fund().unwrap().reward_balance, Asset::scr(10_000));
        let quiet = store
            .get_comment(&AccountName::new("alice"), &Permlink::new("quiet"))
            .unwrap();
        assert!(quiet.is_paid_out());
    }

    #[test]
    fn unratified_escrow_is_refunded() {
        let (mut store, params) = make_chain(&["alice", "bob", "sam"]);
        fund(&mut store, "alice", 10_000);
        let deadline = now(&store).plus(100);
        apply(
            &mut store,
            &params,
            Operation::EscrowTransfer(EscrowTransferOp {
                from: AccountName::new("alice"),
                to: AccountName::new("bob"),
                agent: AccountName::new("sam"),
                escrow_id: 7,
                scr_amount: Asset::scr(1_000),
                fee: Asset::scr(100),
                ratification_deadline: deadline,
                escrow_expiration: deadline.plus(100),
                json_meta: String::new(),
            }),
        )
        .unwrap();
        assert_eq!(account(&store, "alice").balance, Asset::scr(8_900));

        assert!(tick(&mut store, &params, 99).is_empty());
        let vops = tick(&mut store, &params, 1);
        assert_eq!(
            vops,
            vec![VirtualOperation::EscrowAutoRefund {
                from: AccountName::new("alice"),
                escrow_id: 7,
                amount: Asset::scr(1_100),
            }]
        );
        assert_eq!(account(&store, "alice").balance, Asset::scr(10_000));
        assert!(store
            .find_escrow(&AccountName::new("alice"), 7)
            .unwrap()
            .is_none());
    }

    #[test]
    fn reduced_delegation_returns_after_lock() {
        let (mut store, params) = make_chain(&["alice", "bob"]);
        vest(&mut store, "alice", 50_000);
        for sp in [10_000_000, 0] {
            apply(
                &mut store,
                &params,
                Operation::DelegateVestingShares(DelegateVestingSharesOp {
                    delegator: AccountName::new("alice"),
                    delegatee: AccountName::new("bob"),
                    vesting_shares: Asset::sp(sp),
                }),
            )
            .unwrap();
        }
        assert_eq!(account(&store, "bob").received_vesting_shares, Asset::sp(0));
        assert_eq!(
            account(&store, "alice").delegated_vesting_shares,
            Asset::sp(10_000_000)
        );

        let vops = tick(&mut store, &params, params.cashout_window_secs);
        assert_eq!(
            vops,
            vec![VirtualOperation::ReturnVestingDelegation {
                account: AccountName::new("alice"),
                vesting_shares: Asset::sp(10_000_000),
            }]
        );
        assert_eq!(account(&store, "alice").delegated_vesting_shares, Asset::sp(0));
        assert!(store
            .delegation_expirations_of(&AccountName::new("alice"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn pending_requests_resolve_when_due() {
        let (mut store, params) = make_chain(&["alice", "bob"]);
        apply(
            &mut store,
            &params,
            Operation::ChangeRecoveryAccount(ChangeRecoveryAccountOp {
                account_to_recover: AccountName::new("alice"),
                new_recovery_account: AccountName::new("bob"),
            }),
        )
        .unwrap();
        apply(
            &mut store,
            &params,
            Operation::DeclineVotingRights(DeclineVotingRightsOp {
                account: AccountName::new("alice"),
                decline: true,
            }),
        )
        .unwrap();

        tick(&mut store, &params, params.decline_voting_rights_delay_secs);
        assert!(!account(&store, "alice").can_vote);

        tick(&mut store, &params, params.change_recovery_account_delay_secs);
        assert_eq!(account(&store, "alice").recovery_account, AccountName::new("bob"));
        let alice = AccountName::new("alice");
        assert!(store.find_change_recovery_request(&alice).unwrap().is_none());
        assert!(store.find_decline_voting_request(&alice).unwrap().is_none());
    }

    #[test]
    fn recent_claims_decay_linearly() {
        let (mut store, params) = make_chain(&["alice", "sam"]);
        vest(&mut store, "sam", 100_000_000);
        let start = now(&store);
        store
            .put_reward_fund(&RewardFund {
                reward_balance: Asset::scr(0),
                recent_claims: 1_000_000,
                last_update: start,
            })
            .unwrap();
        post_and_vote(&mut store, &params);
        let rshares = store
            .get_comment(&AccountName::new("alice"), &Permlink::new("lorem"))
            .unwrap()
            .net_rshares as u128;

        let wait = params.cashout_window_secs - 10;
        tick(&mut store, &params, wait);
        let elapsed = u128::from(params.cashout_window_secs);
        let decay = u128::from(params.recent_rshares_decay_secs);
        let expected = 1_000_000 * (decay - elapsed) / decay + rshares;
        assert_eq!(store.reward_fund().unwrap().recent_claims, expected);
    }
}
