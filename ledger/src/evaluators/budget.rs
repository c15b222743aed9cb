use tessera_store::{Budget, ChainState};
use tessera_transactions::CreateBudgetOp;
use tessera_types::{Asset, AssetError};

use crate::context::ApplyContext;
use crate::LedgerError;

/// Lock SCR from the owner into a budget that feeds the reward pool a
/// fixed amount every block until its deadline.
pub fn create_budget<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &CreateBudgetOp,
) -> Result<(), LedgerError> {
    let now = ctx.now();
    let mut owner = ctx.account(&op.owner)?;

    if !owner.balance.covers(&op.balance) {
        return Err(LedgerError::InsufficientFunds {
            account: op.owner.clone(),
            required: op.balance,
            available: owner.balance,
        });
    }
    if op.deadline <= now {
        return Err(LedgerError::illegal(format!(
            "budget deadline {} must be in the future",
            op.deadline
        )));
    }
    let owned = ctx.state.budgets_of(&op.owner)?.len();
    if owned >= ctx.params.max_budgets_per_owner {
        return Err(LedgerError::limit(format!(
            "account already owns the maximum of {} budgets",
            ctx.params.max_budgets_per_owner
        )));
    }

    let per_block = per_block_allocation(
        op.balance,
        now.elapsed_since(op.deadline),
        ctx.params.block_interval_secs,
    )?;

    owner.balance = owner.balance.checked_sub(op.balance)?;
    ctx.state.put_account(&owner)?;
    let mut props = ctx.properties()?;
    props.accounts_current_supply = props.accounts_current_supply.checked_sub(op.balance)?;
    ctx.state.put_dynamic_global_properties(&props)?;

    let id = ctx.state.create_budget(Budget {
        id: 0,
        owner: op.owner.clone(),
        content_permlink: op.content_permlink.clone(),
        created: now,
        deadline: op.deadline,
        balance: op.balance,
        per_block,
    })?;

    tracing::debug!(id, owner = %op.owner, balance = %op.balance, %per_block, "budget created");
    Ok(())
}

/// Spread `balance` evenly over the blocks left until the deadline, never
/// less than one unit per block.
pub fn per_block_allocation(
    balance: Asset,
    secs_left: u64,
    block_interval_secs: u64,
) -> Result<Asset, LedgerError> {
    let blocks = (secs_left / block_interval_secs.max(1)).max(1);
    let blocks = i64::try_from(blocks).map_err(|_| AssetError::Overflow)?;
    let per_block = balance.div_floor(blocks)?;
    if per_block.is_zero() {
        return Ok(Asset::new(1, balance.symbol));
    }
    Ok(per_block)
}
