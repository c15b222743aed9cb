use tessera_store::{ChainState, WithdrawVestingRoute};
use tessera_transactions::{SetWithdrawVestingRouteOp, WithdrawVestingOp};
use tessera_types::{Asset, Timestamp, PERCENT_100};

use crate::context::ApplyContext;
use crate::LedgerError;

/// Start, replace or cancel a power-down.
///
/// The rate is `shares / intervals`; the remainder is paid with the last
/// withdrawal. Zero shares cancels the schedule.
pub fn withdraw_vesting<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &WithdrawVestingOp,
) -> Result<(), LedgerError> {
    let mut account = ctx.account(&op.account)?;

    let withdrawable = account
        .vesting_shares
        .checked_sub(account.delegated_vesting_shares)?;
    if !withdrawable.covers(&op.vesting_shares) {
        return Err(LedgerError::InsufficientFunds {
            account: op.account.clone(),
            required: op.vesting_shares,
            available: withdrawable,
        });
    }

    if op.vesting_shares.is_zero() {
        if account.vesting_withdraw_rate.is_zero() && account.to_withdraw == 0 {
            return Err(LedgerError::illegal(
                "this operation would not change the vesting withdraw rate",
            ));
        }
        account.vesting_withdraw_rate = Asset::sp(0);
        account.next_vesting_withdrawal = Timestamp::MAX;
        account.to_withdraw = 0;
        account.withdrawn = 0;
        ctx.state.put_account(&account)?;
        tracing::debug!(account = %op.account, "power down cancelled");
        return Ok(());
    }

    let intervals = i64::from(ctx.params.vesting_withdraw_intervals);
    let mut rate = op.vesting_shares.div_floor(intervals)?;
    if rate.is_zero() {
        rate = Asset::sp(1);
    }
    if account.vesting_withdraw_rate == rate && account.to_withdraw == op.vesting_shares.amount {
        return Err(LedgerError::illegal(
            "this operation would not change the vesting withdraw rate",
        ));
    }

    account.vesting_withdraw_rate = rate;
    account.next_vesting_withdrawal = ctx
        .now()
        .plus(ctx.params.vesting_withdraw_interval_secs);
    account.to_withdraw = op.vesting_shares.amount;
    account.withdrawn = 0;
    ctx.state.put_account(&account)?;

    tracing::debug!(
        account = %op.account,
        total = %op.vesting_shares,
        %rate,
        "power down scheduled"
    );
    Ok(())
}

pub fn set_withdraw_vesting_route<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &SetWithdrawVestingRouteOp,
) -> Result<(), LedgerError> {
    let mut from = ctx.account(&op.from_account)?;
    ctx.require_account(&op.to_account)?;

    match ctx
        .state
        .find_withdraw_route(&op.from_account, &op.to_account)?
    {
        None => {
            if op.percent == 0 {
                return Err(LedgerError::illegal("cannot create a 0% destination"));
            }
            if u32::from(from.withdraw_routes) >= ctx.params.max_withdraw_routes {
                return Err(LedgerError::limit(format!(
                    "account already has the maximum of {} withdraw routes",
                    ctx.params.max_withdraw_routes
                )));
            }
            ctx.state.put_withdraw_route(&WithdrawVestingRoute {
                from_account: op.from_account.clone(),
                to_account: op.to_account.clone(),
                percent: op.percent,
                auto_vest: op.auto_vest,
            })?;
            from.withdraw_routes += 1;
            ctx.state.put_account(&from)?;
        }
        Some(_) if op.percent == 0 => {
            ctx.state
                .remove_withdraw_route(&op.from_account, &op.to_account)?;
            from.withdraw_routes = from.withdraw_routes.saturating_sub(1);
            ctx.state.put_account(&from)?;
        }
        Some(mut route) => {
            route.percent = op.percent;
            route.auto_vest = op.auto_vest;
            ctx.state.put_withdraw_route(&route)?;
        }
    }

    let total = ctx.state.total_route_percent(&op.from_account)?;
    if total > u32::from(PERCENT_100) {
        return Err(LedgerError::limit(format!(
            "withdraw routes total {total} exceeds 100%"
        )));
    }

    tracing::debug!(
        from = %op.from_account,
        to = %op.to_account,
        percent = op.percent,
        auto_vest = op.auto_vest,
        "withdraw route set"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{account, apply, make_chain, now, vest};
    use tessera_nullables::NullStore;
    use tessera_store::{AccountService, WithdrawRouteService};
    use tessera_transactions::Operation;
    use tessera_types::{AccountName, ChainParams};

    fn setup() -> (NullStore, ChainParams) {
        let (mut store, params) = make_chain(&["alice", "bob", "sam"]);
        // 10.000 SCR buys 10.000000 SP at the initial price.
        vest(&mut store, "alice", 10_000);
        (store, params)
    }

    fn withdraw(sp: i64) -> Operation {
        Operation::WithdrawVesting(WithdrawVestingOp {
            account: AccountName::new("alice"),
            vesting_shares: Asset::sp(sp),
        })
    }

    fn route(to: &str, percent: u16, auto_vest: bool) -> Operation {
        Operation::SetWithdrawVestingRoute(SetWithdrawVestingRouteOp {
            from_account: AccountName::new("alice"),
            to_account: AccountName::new(to),
            percent,
            auto_vest,
        })
    }

    #[test]
    fn half_power_down_sets_rate() {
        let (mut store, params) = setup();
        let total = account(&store, "alice").vesting_shares.amount;
        apply(&mut store, &params, withdraw(total / 2)).unwrap();

        let alice = account(&store, "alice");
        let intervals = i64::from(params.vesting_withdraw_intervals);
        assert_eq!(alice.vesting_withdraw_rate, Asset::sp(total / (intervals * 2)));
        assert_eq!(alice.to_withdraw, total / 2);
        assert_eq!(alice.withdrawn, 0);
        assert_eq!(
            alice.next_vesting_withdrawal,
            now(&store).plus(params.vesting_withdraw_interval_secs)
        );
    }

    #[test]
    fn zero_cancels_schedule() {
        let (mut store, params) = setup();
        apply(&mut store, &params, withdraw(5_000_000)).unwrap();
        apply(&mut store, &params, withdraw(0)).unwrap();

        let alice = account(&store, "alice");
        assert!(alice.next_vesting_withdrawal.is_max());
        assert_eq!(alice.vesting_withdraw_rate, Asset::sp(0));
        assert_eq!(alice.to_withdraw, 0);

        let err = apply(&mut store, &params, withdraw(0)).unwrap_err();
        assert!(matches!(err, LedgerError::IllegalState(_)));
    }

    #[test]
    fn tiny_withdrawal_rate_rounds_up_to_one() {
        let (mut store, params) = setup();
        apply(&mut store, &params, withdraw(5)).unwrap();
        assert_eq!(account(&store, "alice").vesting_withdraw_rate, Asset::sp(1));
    }

    #[test]
    fn delegated_shares_cannot_be_withdrawn() {
        let (mut store, params) = setup();
        store
            .update_account(&AccountName::new("alice"), |a| {
                a.delegated_vesting_shares = Asset::sp(6_000_000)
            })
            .unwrap();
        let err = apply(&mut store, &params, withdraw(5_000_000)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        apply(&mut store, &params, withdraw(4_000_000)).unwrap();
    }

    #[test]
    fn routes_are_created_updated_and_removed() {
        let (mut store, params) = setup();
        let alice = AccountName::new("alice");
        let bob = AccountName::new("bob");

        apply(&mut store, &params, route("bob", 5_000, false)).unwrap();
        assert_eq!(account(&store, "alice").withdraw_routes, 1);

        apply(&mut store, &params, route("bob", 3_000, true)).unwrap();
        let stored = store.find_withdraw_route(&alice, &bob).unwrap().unwrap();
        assert_eq!(stored.percent, 3_000);
        assert!(stored.auto_vest);
        assert_eq!(account(&store, "alice").withdraw_routes, 1);

        apply(&mut store, &params, route("bob", 0, false)).unwrap();
        assert!(store.find_withdraw_route(&alice, &bob).unwrap().is_none());
        assert_eq!(account(&store, "alice").withdraw_routes, 0);
    }

    #[test]
    fn zero_percent_route_cannot_be_created() {
        let (mut store, params) = setup();
        let err = apply(&mut store, &params, route("bob", 0, false)).unwrap_err();
        assert!(matches!(err, LedgerError::IllegalState(_)));
    }

    #[test]
    fn routes_cannot_exceed_100_percent() {
        let (mut store, params) = setup();
        apply(&mut store, &params, route("bob", 6_000, false)).unwrap();
        let err = apply(&mut store, &params, route("sam", 5_000, false)).unwrap_err();
        assert!(matches!(err, LedgerError::LimitExceeded(_)));
    }

    #[test]
    fn route_count_is_limited() {
        let (mut store, mut params) = setup();
        params.max_withdraw_routes = 1;
        apply(&mut store, &params, route("bob", 1_000, false)).unwrap();
        let err = apply(&mut store, &params, route("sam", 1_000, false)).unwrap_err();
        assert!(matches!(err, LedgerError::LimitExceeded(_)));
    }
}
