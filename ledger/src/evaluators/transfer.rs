use tessera_store::ChainState;
use tessera_transactions::{TransferOp, TransferToVestingOp};

use crate::context::ApplyContext;
use crate::stake::create_vesting;
use crate::LedgerError;

pub fn transfer<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &TransferOp,
) -> Result<(), LedgerError> {
    let mut from = ctx.account(&op.from)?;
    let mut to = ctx.account(&op.to)?;

    if !from.balance.covers(&op.amount) {
        return Err(LedgerError::InsufficientFunds {
            account: op.from.clone(),
            required: op.amount,
            available: from.balance,
        });
    }

    from.balance = from.balance.checked_sub(op.amount)?;
    ctx.state.put_account(&from)?;
    // A transfer to self credits the already debited record.
    if op.from == op.to {
        to = from;
    }
    to.balance = to.balance.checked_add(op.amount)?;
    ctx.state.put_account(&to)?;

    tracing::debug!(from = %op.from, to = %op.to, amount = %op.amount, "transfer");
    Ok(())
}

/// Stake liquid SCR, for the sender or for another account.
pub fn transfer_to_vesting<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &TransferToVestingOp,
) -> Result<(), LedgerError> {
    let mut from = ctx.account(&op.from)?;
    let to = if op.to.is_empty() {
        op.from.clone()
    } else {
        op.to.clone()
    };
    ctx.require_account(&to)?;

    if !from.balance.covers(&op.amount) {
        return Err(LedgerError::InsufficientFunds {
            account: op.from.clone(),
            required: op.amount,
            available: from.balance,
        });
    }

    from.balance = from.balance.checked_sub(op.amount)?;
    ctx.state.put_account(&from)?;
    let shares = create_vesting(ctx.state, &to, op.amount)?;

    tracing::debug!(from = %op.from, %to, amount = %op.amount, %shares, "transfer to vesting");
    Ok(())
}
