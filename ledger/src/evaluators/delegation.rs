use tessera_store::{ChainState, VestingDelegation, VestingDelegationExpiration};
use tessera_transactions::DelegateVestingSharesOp;
use tessera_types::{AccountName, Asset, AssetSymbol};

use crate::context::ApplyContext;
use crate::LedgerError;

/// Create, grow, shrink or remove a delegation of stake.
///
/// Growth is credited at once. A reduction leaves the delegatee at once,
/// but stays counted in the delegator's `delegated_vesting_shares` until
/// the expiration record created here is released by maintenance.
pub fn delegate_vesting_shares<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &DelegateVestingSharesOp,
) -> Result<(), LedgerError> {
    let now = ctx.now();
    let props = ctx.properties()?;
    let mut delegator = ctx.account(&op.delegator)?;
    let mut delegatee = ctx.account(&op.delegatee)?;

    let available = delegator.available_vesting_shares()?;
    let min_update = props
        .share_price()
        .convert_to(props.account_creation_fee(), AssetSymbol::Sp)?;
    let min_delegation = min_update.checked_mul(ctx.params.min_delegation_fee_multiplier)?;

    let existing = ctx.state.find_delegation(&op.delegator, &op.delegatee)?;

    match existing {
        None => {
            if !op.vesting_shares.covers(&min_delegation) {
                return Err(LedgerError::illegal(format!(
                    "account must delegate a minimum of {min_delegation}"
                )));
            }
            require_available(&op.delegator, available, op.vesting_shares)?;

            ctx.state.put_delegation(&VestingDelegation {
                delegator: op.delegator.clone(),
                delegatee: op.delegatee.clone(),
                vesting_shares: op.vesting_shares,
                min_delegation_time: now,
            })?;
            delegator.delegated_vesting_shares = delegator
                .delegated_vesting_shares
                .checked_add(op.vesting_shares)?;
            delegatee.received_vesting_shares = delegatee
                .received_vesting_shares
                .checked_add(op.vesting_shares)?;
        }
        Some(mut delegation) if op.vesting_shares.amount >= delegation.vesting_shares.amount => {
            let delta = op.vesting_shares.checked_sub(delegation.vesting_shares)?;
            if !delta.covers(&min_update) {
                return Err(LedgerError::illegal(format!(
                    "delegation must change by at least {min_update}"
                )));
            }
            require_available(&op.delegator, available, delta)?;

            delegation.vesting_shares = op.vesting_shares;
            ctx.state.put_delegation(&delegation)?;
            delegator.delegated_vesting_shares =
                delegator.delegated_vesting_shares.checked_add(delta)?;
            delegatee.received_vesting_shares =
                delegatee.received_vesting_shares.checked_add(delta)?;
        }
        Some(mut delegation) => {
            let delta = delegation.vesting_shares.checked_sub(op.vesting_shares)?;
            if !delta.covers(&min_update) {
                return Err(LedgerError::illegal(format!(
                    "delegation must change by at least {min_update}"
                )));
            }
            if !op.vesting_shares.is_zero() && !op.vesting_shares.covers(&min_delegation) {
                return Err(LedgerError::illegal(format!(
                    "delegation cannot be reduced below {min_delegation}"
                )));
            }

            let expiration = now
                .plus(ctx.params.cashout_window_secs)
                .max(delegation.min_delegation_time);
            ctx.state
                .create_delegation_expiration(VestingDelegationExpiration {
                    id: 0,
                    delegator: op.delegator.clone(),
                    vesting_shares: delta,
                    expiration,
                })?;
            delegatee.received_vesting_shares =
                delegatee.received_vesting_shares.checked_sub(delta)?;

            if op.vesting_shares.is_zero() {
                ctx.state
                    .remove_delegation(&op.delegator, &op.delegatee)?;
            } else {
                delegation.vesting_shares = op.vesting_shares;
                ctx.state.put_delegation(&delegation)?;
            }
        }
    }

    ctx.state.put_account(&delegator)?;
    ctx.state.put_account(&delegatee)?;

    tracing::debug!(
        delegator = %op.delegator,
        delegatee = %op.delegatee,
        shares = %op.vesting_shares,
        "delegation set"
    );
    Ok(())
}

fn require_available(
    account: &AccountName,
    available: Asset,
    required: Asset,
) -> Result<(), LedgerError> {
    if !available.covers(&required) {
        return Err(LedgerError::InsufficientFunds {
            account: account.clone(),
            required,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{account, apply, make_chain, now, vest};
    use tessera_nullables::NullStore;
    use tessera_store::DelegationService;
    use tessera_transactions::{Operation, WithdrawVestingOp};
    use tessera_types::{AccountName, ChainParams};

    fn setup() -> (NullStore, ChainParams) {
        let (mut store, params) = make_chain(&["alice", "bob"]);
        vest(&mut store, "alice", 50_000);
        (store, params)
    }

    fn delegate(sp: i64) -> Operation {
        Operation::DelegateVestingShares(DelegateVestingSharesOp {
            delegator: AccountName::new("alice"),
            delegatee: AccountName::new("bob"),
            vesting_shares: Asset::sp(sp),
        })
    }

    #[test]
    fn new_delegation_is_immediate() {
        let (mut store, params) = setup();
        apply(&mut store, &params, delegate(10_000_000)).unwrap();

        assert_eq!(account(&store, "alice").delegated_vesting_shares, Asset::sp(10_000_000));
        assert_eq!(account(&store, "bob").received_vesting_shares, Asset::sp(10_000_000));
        let delegation = store
            .find_delegation(&AccountName::new("alice"), &AccountName::new("bob"))
            .unwrap()
            .unwrap();
        assert_eq!(delegation.min_delegation_time, now(&store));
    }

    #[test]
    fn removal_leaves_receiver_at_once_and_delegator_later() {
        let (mut store, params) = setup();
        apply(&mut store, &params, delegate(10_000_000)).unwrap();
        apply(&mut store, &params, delegate(0)).unwrap();

        assert_eq!(account(&store, "bob").received_vesting_shares, Asset::sp(0));
        assert_eq!(account(&store, "alice").delegated_vesting_shares, Asset::sp(10_000_000));
        assert!(store
            .find_delegation(&AccountName::new("alice"), &AccountName::new("bob"))
            .unwrap()
            .is_none());

        let pending = store
            .delegation_expirations_of(&AccountName::new("alice"))
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].vesting_shares, Asset::sp(10_000_000));
        assert_eq!(pending[0].expiration, now(&store).plus(params.cashout_window_secs));
    }

    #[test]
    fn increase_needs_available_stake() {
        let (mut store, params) = setup();
        apply(&mut store, &params, delegate(40_000_000)).unwrap();
        let err = apply(&mut store, &params, delegate(60_000_000)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        apply(&mut store, &params, delegate(50_000_000)).unwrap();
    }

    #[test]
    fn minimum_delegation_enforced() {
        let (mut store, params) = setup();
        // The default median fee is 0.100 SCR, so the floor is 1.000000 SP.
        let err = apply(&mut store, &params, delegate(999_999)).unwrap_err();
        assert!(matches!(err, LedgerError::IllegalState(_)));
        apply(&mut store, &params, delegate(1_000_000)).unwrap();

        let err = apply(&mut store, &params, delegate(1_050_000)).unwrap_err();
        assert!(matches!(err, LedgerError::IllegalState(_)));
        let err = apply(&mut store, &params, delegate(500_000)).unwrap_err();
        assert!(matches!(err, LedgerError::IllegalState(_)));
    }

    #[test]
    fn shares_being_withdrawn_cannot_be_delegated() {
        let (mut store, params) = setup();
        apply(
            &mut store,
            &params,
            Operation::WithdrawVesting(WithdrawVestingOp {
                account: AccountName::new("alice"),
                vesting_shares: Asset::sp(45_000_000),
            }),
        )
        .unwrap();
        let err = apply(&mut store, &params, delegate(10_000_000)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
    }

    #[test]
    fn delegated_never_exceeds_vesting() {
        let (mut store, params) = setup();
        apply(&mut store, &params, delegate(50_000_000)).unwrap();
        let _ = apply(&mut store, &params, delegate(50_000_001));
        let alice = account(&store, "alice");
        assert!(alice.delegated_vesting_shares.amount <= alice.vesting_shares.amount);
    }
}
