//! Moving liquid SCR into stake.

use tessera_store::ChainState;
use tessera_types::{AccountName, Asset, AssetSymbol};

use crate::witness_votes::adjust_proxied_witness_votes;
use crate::LedgerError;

/// Convert `amount` SCR into SP at the current share price and credit the
/// shares to `account`.
///
/// The SCR must already have left its source balance. Conversion rounds
/// down, so the fund never pays out more than it holds. Returns the shares
/// created.
pub fn create_vesting<S: ChainState>(
    state: &mut S,
    account: &AccountName,
    amount: Asset,
) -> Result<Asset, LedgerError> {
    let mut props = state.dynamic_global_properties()?;
    let shares = props.share_price().convert_to(amount, AssetSymbol::Sp)?;

    let mut owner = state.get_account(account)?;
    owner.vesting_shares = owner.vesting_shares.checked_add(shares)?;
    state.put_account(&owner)?;

    props.total_vesting_fund = props.total_vesting_fund.checked_add(amount)?;
    props.total_vesting_shares = props.total_vesting_shares.checked_add(shares)?;
    state.put_dynamic_global_properties(&props)?;

    adjust_proxied_witness_votes(state, &owner, shares.amount)?;

    tracing::trace!(%account, %amount, %shares, "vested");
    Ok(shares)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::make_chain;
    use tessera_store::{AccountService, GlobalPropertyService};

    #[test]
    fn first_vesting_uses_initial_price() {
        let (mut store, _) = make_chain(&["alice"]);
        let alice = AccountName::new("alice");
        let shares = create_vesting(&mut store, &alice, Asset::scr(1_000)).unwrap();
        assert_eq!(shares, Asset::sp(1_000_000));

        let props = store.dynamic_global_properties().unwrap();
        assert_eq!(props.total_vesting_fund, Asset::scr(1_000));
        assert_eq!(props.total_vesting_shares, Asset::sp(1_000_000));
        assert_eq!(
            store.get_account(&alice).unwrap().vesting_shares,
            Asset::sp(1_000_000)
        );
    }

    #[test]
    fn later_vesting_follows_the_fund_ratio() {
        let (mut store, _) = make_chain(&["alice"]);
        store
            .update_dynamic_global_properties(|p| {
                p.total_vesting_fund = Asset::scr(2_000);
                p.total_vesting_shares = Asset::sp(1_000_000);
            })
            .unwrap();
        let alice = AccountName::new("alice");
        // 1 SCR buys half as many shares once the fund has doubled.
        let shares = create_vesting(&mut store, &alice, Asset::scr(1_000)).unwrap();
        assert_eq!(shares, Asset::sp(500_000));
    }

    #[test]
    fn rejects_stake_symbol() {
        let (mut store, _) = make_chain(&["alice"]);
        let result = create_vesting(&mut store, &AccountName::new("alice"), Asset::sp(5));
        assert!(matches!(result, Err(LedgerError::Asset(_))));
    }
}
