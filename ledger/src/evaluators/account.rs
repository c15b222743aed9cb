use tessera_authority::Authority;
use tessera_store::{
    Account, AccountAuthority, ChainState, OwnerAuthorityHistory, VestingDelegation,
};
use tessera_transactions::{AccountCreateOp, AccountCreateWithDelegationOp, AccountUpdateOp};
use tessera_types::{AccountName, Asset, AssetSymbol, PublicKey, Timestamp};

use crate::context::ApplyContext;
use crate::stake::create_vesting;
use crate::LedgerError;

pub fn account_create<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &AccountCreateOp,
) -> Result<(), LedgerError> {
    let props = ctx.properties()?;
    let mut creator = ctx.account(&op.creator)?;

    if !creator.balance.covers(&op.fee) {
        return Err(LedgerError::InsufficientFunds {
            account: op.creator.clone(),
            required: op.fee,
            available: creator.balance,
        });
    }

    let minimum_fee = props
        .account_creation_fee()
        .checked_mul(ctx.params.create_account_with_scr_modifier)?;
    if !op.fee.covers(&minimum_fee) {
        return Err(LedgerError::illegal(format!(
            "insufficient fee: {minimum_fee} required, {} provided",
            op.fee
        )));
    }

    require_authority_accounts(ctx, [&op.owner, &op.active, &op.posting])?;

    creator.balance = creator.balance.checked_sub(op.fee)?;
    ctx.state.put_account(&creator)?;

    create_account_records(
        ctx,
        &op.creator,
        &op.new_account_name,
        [&op.owner, &op.active, &op.posting],
        op.memo_key,
        &op.json_metadata,
        Asset::sp(0),
    )?;

    if op.fee.is_positive() {
        create_vesting(ctx.state, &op.new_account_name, op.fee)?;
    }

    tracing::debug!(
        creator = %op.creator,
        account = %op.new_account_name,
        fee = %op.fee,
        "account created"
    );
    Ok(())
}

pub fn account_create_with_delegation<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &AccountCreateWithDelegationOp,
) -> Result<(), LedgerError> {
    let props = ctx.properties()?;
    let mut creator = ctx.account(&op.creator)?;

    if !creator.balance.covers(&op.fee) {
        return Err(LedgerError::InsufficientFunds {
            account: op.creator.clone(),
            required: op.fee,
            available: creator.balance,
        });
    }

    let available = creator.available_vesting_shares()?;
    if !available.covers(&op.delegation) {
        return Err(LedgerError::InsufficientFunds {
            account: op.creator.clone(),
            required: op.delegation,
            available,
        });
    }

    let price = props.share_price();
    let ratio = ctx.params.create_account_delegation_ratio;
    let median_fee = props.account_creation_fee();
    let target = price.convert_to(
        median_fee
            .checked_mul(ctx.params.create_account_with_scr_modifier)?
            .checked_mul(ratio)?,
        AssetSymbol::Sp,
    )?;
    let provided = price
        .convert_to(op.fee.checked_mul(ratio)?, AssetSymbol::Sp)?
        .checked_add(op.delegation)?;
    if !provided.covers(&target) {
        return Err(LedgerError::illegal(format!(
            "insufficient delegation: {target} required, {provided} provided"
        )));
    }
    if !op.fee.covers(&median_fee) {
        return Err(LedgerError::illegal(format!(
            "insufficient fee: {median_fee} required, {} provided",
            op.fee
        )));
    }

    require_authority_accounts(ctx, [&op.owner, &op.active, &op.posting])?;

    creator.balance = creator.balance.checked_sub(op.fee)?;
    creator.delegated_vesting_shares = creator.delegated_vesting_shares.checked_add(op.delegation)?;
    ctx.state.put_account(&creator)?;

    create_account_records(
        ctx,
        &op.creator,
        &op.new_account_name,
        [&op.owner, &op.active, &op.posting],
        op.memo_key,
        &op.json_metadata,
        op.delegation,
    )?;

    if op.delegation.is_positive() {
        let min_delegation_time = ctx.now().plus(ctx.params.create_account_delegation_secs);
        ctx.state.put_delegation(&VestingDelegation {
            delegator: op.creator.clone(),
            delegatee: op.new_account_name.clone(),
            vesting_shares: op.delegation,
            min_delegation_time,
        })?;
    }

    if op.fee.is_positive() {
        create_vesting(ctx.state, &op.new_account_name, op.fee)?;
    }

    tracing::debug!(
        creator = %op.creator,
        account = %op.new_account_name,
        fee = %op.fee,
        delegation = %op.delegation,
        "account created with delegation"
    );
    Ok(())
}

pub fn account_update<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &AccountUpdateOp,
) -> Result<(), LedgerError> {
    let now = ctx.now();
    ctx.require_account(&op.account)?;
    let auth = ctx.state.get_account_authority(&op.account)?;

    if let Some(owner) = &op.owner {
        let allowed_at = auth.last_owner_update.plus(ctx.params.owner_update_limit_secs);
        if now <= allowed_at {
            return Err(LedgerError::TooSoon {
                what: "owner authority update",
                allowed_at,
            });
        }
        require_authority_accounts(ctx, [owner])?;
    }
    require_authority_accounts(ctx, op.active.iter().chain(op.posting.iter()))?;

    if let Some(owner) = &op.owner {
        update_owner_authority(ctx.state, &op.account, owner.clone(), now)?;
    }

    let mut account = ctx.account(&op.account)?;
    if !op.memo_key.is_null() {
        account.memo_key = op.memo_key;
    }
    if !op.json_metadata.is_empty() {
        account.json_metadata = op.json_metadata.clone();
    }
    account.last_account_update = now;
    ctx.state.put_account(&account)?;

    if op.active.is_some() || op.posting.is_some() {
        let mut auth = ctx.state.get_account_authority(&op.account)?;
        if let Some(active) = &op.active {
            auth.active = active.clone();
        }
        if let Some(posting) = &op.posting {
            auth.posting = posting.clone();
        }
        ctx.state.put_account_authority(&auth)?;
    }

    tracing::debug!(account = %op.account, owner_changed = op.owner.is_some(), "account updated");
    Ok(())
}

/// Replace the owner authority of `account`, keeping the old one in the
/// recovery history.
pub(crate) fn update_owner_authority<S: ChainState>(
    state: &mut S,
    account: &AccountName,
    owner: Authority,
    now: Timestamp,
) -> Result<(), LedgerError> {
    let mut auth = state.get_account_authority(account)?;
    state.create_owner_history(OwnerAuthorityHistory {
        id: 0,
        account: account.clone(),
        previous_owner_authority: auth.owner.clone(),
        last_valid_time: now,
    })?;
    auth.owner = owner;
    auth.last_owner_update = now;
    state.put_account_authority(&auth)?;
    state.update_account(account, |a| a.last_owner_update = now)?;
    Ok(())
}

/// Every account named inside the given authorities must exist.
pub(crate) fn require_authority_accounts<'x, S: ChainState>(
    ctx: &ApplyContext<'_, S>,
    authorities: impl IntoIterator<Item = &'x Authority>,
) -> Result<(), LedgerError> {
    for authority in authorities {
        for name in authority.accounts() {
            ctx.require_account(name)?;
        }
    }
    Ok(())
}

fn create_account_records<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    creator: &AccountName,
    name: &AccountName,
    [owner, active, posting]: [&Authority; 3],
    memo_key: PublicKey,
    json_metadata: &str,
    received: Asset,
) -> Result<(), LedgerError> {
    let now = ctx.now();
    let mut account = Account::new(
        name.clone(),
        now,
        creator.clone(),
        memo_key,
        json_metadata.to_string(),
    );
    account.received_vesting_shares = received;
    ctx.state.create_account(account)?;
    ctx.state.create_account_authority(AccountAuthority {
        account: name.clone(),
        owner: owner.clone(),
        active: active.clone(),
        posting: posting.clone(),
        last_owner_update: Timestamp::EPOCH,
    })?;
    Ok(())
}
