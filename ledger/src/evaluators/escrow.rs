//! Three-party escrow.
//!
//! An escrow starts pending. It is ratified once `to` and `agent` both
//! approve before the ratification deadline; the agent's fee is paid at
//! that moment. Either party rejecting, or the deadline passing, refunds
//! `from`. A ratified escrow may be disputed by `from` or `to` before it
//! expires, after which only the agent can release funds.

use tessera_store::{ChainState, Escrow};
use tessera_transactions::{EscrowApproveOp, EscrowDisputeOp, EscrowReleaseOp, EscrowTransferOp};
use tessera_types::{AccountName, Asset};

use crate::context::ApplyContext;
use crate::LedgerError;

pub fn escrow_transfer<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &EscrowTransferOp,
) -> Result<(), LedgerError> {
    let now = ctx.now();
    let mut from = ctx.account(&op.from)?;
    ctx.require_account(&op.to)?;
    ctx.require_account(&op.agent)?;

    if op.ratification_deadline <= now {
        return Err(LedgerError::illegal(
            "the escrow ratification deadline must be in the future",
        ));
    }
    if op.escrow_expiration <= now {
        return Err(LedgerError::illegal("the escrow expiration must be in the future"));
    }

    let spent = op.scr_amount.checked_add(op.fee)?;
    if !from.balance.covers(&spent) {
        return Err(LedgerError::InsufficientFunds {
            account: op.from.clone(),
            required: spent,
            available: from.balance,
        });
    }

    ctx.state.create_escrow(Escrow {
        escrow_id: op.escrow_id,
        from: op.from.clone(),
        to: op.to.clone(),
        agent: op.agent.clone(),
        ratification_deadline: op.ratification_deadline,
        escrow_expiration: op.escrow_expiration,
        scr_balance: op.scr_amount,
        pending_fee: op.fee,
        to_approved: false,
        agent_approved: false,
        disputed: false,
    })?;
    from.balance = from.balance.checked_sub(spent)?;
    ctx.state.put_account(&from)?;

    tracing::debug!(
        from = %op.from,
        to = %op.to,
        agent = %op.agent,
        escrow_id = op.escrow_id,
        amount = %op.scr_amount,
        fee = %op.fee,
        "escrow created"
    );
    Ok(())
}

pub fn escrow_approve<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &EscrowApproveOp,
) -> Result<(), LedgerError> {
    let mut escrow = ctx.state.get_escrow(&op.from, op.escrow_id)?;
    check_parties(&escrow, &op.to, &op.agent)?;

    if escrow.ratification_deadline < ctx.now() {
        return Err(LedgerError::illegal(
            "the escrow ratification deadline has passed, the escrow can no longer be ratified",
        ));
    }

    if op.who == escrow.to {
        if escrow.to_approved {
            return Err(LedgerError::illegal("account 'to' has already approved the escrow"));
        }
        escrow.to_approved = op.approve;
    } else if op.who == escrow.agent {
        if escrow.agent_approved {
            return Err(LedgerError::illegal(
                "account 'agent' has already approved the escrow",
            ));
        }
        escrow.agent_approved = op.approve;
    } else {
        return Err(LedgerError::denied(format!(
            "{} is neither 'to' nor 'agent' of the escrow",
            op.who
        )));
    }

    if !op.approve {
        refund(ctx, &escrow)?;
        tracing::debug!(from = %op.from, escrow_id = op.escrow_id, who = %op.who, "escrow rejected");
        return Ok(());
    }

    if escrow.is_approved() {
        let mut agent = ctx.account(&escrow.agent)?;
        agent.balance = agent.balance.checked_add(escrow.pending_fee)?;
        ctx.state.put_account(&agent)?;
        escrow.pending_fee.amount = 0;
        tracing::debug!(from = %op.from, escrow_id = op.escrow_id, "escrow ratified");
    }
    ctx.state.put_escrow(&escrow)?;
    Ok(())
}

pub fn escrow_dispute<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &EscrowDisputeOp,
) -> Result<(), LedgerError> {
    let mut escrow = ctx.state.get_escrow(&op.from, op.escrow_id)?;
    check_parties(&escrow, &op.to, &op.agent)?;

    if ctx.now() >= escrow.escrow_expiration {
        return Err(LedgerError::illegal(
            "disputes must be raised before the escrow expires",
        ));
    }
    if !escrow.is_approved() {
        return Err(LedgerError::illegal(
            "escrow must be approved by all parties before a dispute can be raised",
        ));
    }
    if escrow.disputed {
        return Err(LedgerError::illegal("escrow is already under dispute"));
    }

    escrow.disputed = true;
    ctx.state.put_escrow(&escrow)?;
    tracing::debug!(from = %op.from, escrow_id = op.escrow_id, who = %op.who, "escrow disputed");
    Ok(())
}

/// Pay part or all of the escrowed SCR to `receiver`.
///
/// | state                    | who may release | to whom        |
/// |--------------------------|-----------------|----------------|
/// | disputed                 | agent           | from or to     |
/// | not disputed, running    | from / to       | the other one  |
/// | not disputed, expired    | from or to      | from or to     |
pub fn escrow_release<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    op: &EscrowReleaseOp,
) -> Result<(), LedgerError> {
    let mut escrow = ctx.state.get_escrow(&op.from, op.escrow_id)?;
    check_parties(&escrow, &op.to, &op.agent)?;

    if !escrow.scr_balance.covers(&op.scr_amount) {
        return Err(LedgerError::illegal(format!(
            "release amount {} exceeds escrow balance {}",
            op.scr_amount, escrow.scr_balance
        )));
    }
    if !escrow.is_approved() {
        return Err(LedgerError::illegal(
            "funds cannot be released prior to escrow approval",
        ));
    }

    let expired = escrow.escrow_expiration <= ctx.now();
    check_release_permission(&escrow, &op.who, &op.receiver, expired)?;

    let mut receiver = ctx.account(&op.receiver)?;
    receiver.balance = receiver.balance.checked_add(op.scr_amount)?;
    ctx.state.put_account(&receiver)?;

    escrow.scr_balance = escrow.scr_balance.checked_sub(op.scr_amount)?;
    if escrow.scr_balance.is_zero() && escrow.pending_fee.is_zero() {
        ctx.state.remove_escrow(&escrow.from, escrow.escrow_id)?;
    } else {
        ctx.state.put_escrow(&escrow)?;
    }

    tracing::debug!(
        from = %op.from,
        escrow_id = op.escrow_id,
        who = %op.who,
        receiver = %op.receiver,
        amount = %op.scr_amount,
        "escrow released"
    );
    Ok(())
}

fn check_release_permission(
    escrow: &Escrow,
    who: &AccountName,
    receiver: &AccountName,
    expired: bool,
) -> Result<(), LedgerError> {
    if *receiver != escrow.from && *receiver != escrow.to {
        return Err(LedgerError::denied("funds can only be released to 'from' or 'to'"));
    }
    if escrow.disputed {
        if *who != escrow.agent {
            return Err(LedgerError::denied(
                "only 'agent' can release funds in a disputed escrow",
            ));
        }
        return Ok(());
    }
    if *who != escrow.from && *who != escrow.to {
        return Err(LedgerError::denied(
            "only 'from' and 'to' can release funds from a non-disputed escrow",
        ));
    }
    if !expired {
        if *who == escrow.from && *receiver != escrow.to {
            return Err(LedgerError::denied("only 'from' can release funds to 'to'"));
        }
        if *who == escrow.to && *receiver != escrow.from {
            return Err(LedgerError::denied("only 'to' can release funds to 'from'"));
        }
    }
    Ok(())
}

fn check_parties(escrow: &Escrow, to: &AccountName, agent: &AccountName) -> Result<(), LedgerError> {
    if escrow.to != *to {
        return Err(LedgerError::illegal(format!(
            "operation 'to' ({to}) does not match escrow 'to' ({})",
            escrow.to
        )));
    }
    if escrow.agent != *agent {
        return Err(LedgerError::illegal(format!(
            "operation 'agent' ({agent}) does not match escrow 'agent' ({})",
            escrow.agent
        )));
    }
    Ok(())
}

/// Return everything still held by `escrow` to its sender and drop it.
pub(crate) fn refund<S: ChainState>(
    ctx: &mut ApplyContext<'_, S>,
    escrow: &Escrow,
) -> Result<Asset, LedgerError> {
    let amount = escrow.scr_balance.checked_add(escrow.pending_fee)?;
    let mut from = ctx.account(&escrow.from)?;
    from.balance = from.balance.checked_add(amount)?;
    ctx.state.put_account(&from)?;
    ctx.state.remove_escrow(&escrow.from, escrow.escrow_id)?;
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{account, advance, apply, fund, make_chain, now};
    use tessera_nullables::NullStore;
    use tessera_store::EscrowService;
    use tessera_transactions::Operation;
    use tessera_types::{Asset, ChainParams};

    fn setup() -> (NullStore, ChainParams) {
        let (mut store, params) = make_chain(&["alice", "bob", "sam", "dave"]);
        fund(&mut store, "alice", 10_000);
        (store, params)
    }

    fn transfer_op(store: &NullStore) -> Operation {
        let t = now(store);
        Operation::EscrowTransfer(EscrowTransferOp {
            from: AccountName::new("alice"),
            to: AccountName::new("bob"),
            agent: AccountName::new("sam"),
            escrow_id: 0,
            scr_amount: Asset::scr(1_000),
            fee: Asset::scr(100),
            ratification_deadline: t.plus(100),
            escrow_expiration: t.plus(200),
            json_meta: String::new(),
        })
    }

    fn approve(who: &str, approve: bool) -> Operation {
        Operation::EscrowApprove(EscrowApproveOp {
            from: AccountName::new("alice"),
            to: AccountName::new("bob"),
            agent: AccountName::new("sam"),
            who: AccountName::new(who),
            escrow_id: 0,
            approve,
        })
    }

    fn dispute(who: &str) -> Operation {
        Operation::EscrowDispute(EscrowDisputeOp {
            from: AccountName::new("alice"),
            to: AccountName::new("bob"),
            agent: AccountName::new("sam"),
            who: AccountName::new(who),
            escrow_id: 0,
        })
    }

    fn release(who: &str, receiver: &str, scr: i64) -> Operation {
        Operation::EscrowRelease(EscrowReleaseOp {
            from: AccountName::new("alice"),
            to: AccountName::new("bob"),
            agent: AccountName::new("sam"),
            who: AccountName::new(who),
            receiver: AccountName::new(receiver),
            escrow_id: 0,
            scr_amount: Asset::scr(scr),
        })
    }

    fn escrow(store: &NullStore) -> Option<Escrow> {
        store.find_escrow(&AccountName::new("alice"), 0).unwrap()
    }

    fn ratified() -> (NullStore, ChainParams) {
        let (mut store, params) = setup();
        let op = transfer_op(&store);
        apply(&mut store, &params, op).unwrap();
        apply(&mut store, &params, approve("bob", true)).unwrap();
        apply(&mut store, &params, approve("sam", true)).unwrap();
        (store, params)
    }

    #[test]
    fn transfer_locks_amount_and_fee() {
        let (mut store, params) = setup();
        let op = transfer_op(&store);
        apply(&mut store, &params, op).unwrap();

        assert_eq!(account(&store, "alice").balance, Asset::scr(8_900));
        let e = escrow(&store).unwrap();
        assert_eq!(e.scr_balance, Asset::scr(1_000));
        assert_eq!(e.pending_fee, Asset::scr(100));
        assert!(!e.to_approved && !e.agent_approved && !e.disputed);
    }

    #[test]
    fn duplicate_escrow_id_fails() {
        let (mut store, params) = setup();
        let op = transfer_op(&store);
        apply(&mut store, &params, op.clone()).unwrap();
        let err = apply(&mut store, &params, op).unwrap_err();
        assert!(matches!(err, LedgerError::Store(_)));
    }

    #[test]
    fn both_approvals_pay_the_agent_once() {
        let (store, _) = ratified();
        let e = escrow(&store).unwrap();
        assert!(e.is_approved());
        assert_eq!(e.pending_fee, Asset::scr(0));
        assert_eq!(account(&store, "sam").balance, Asset::scr(100));
    }

    #[test]
    fn double_approval_fails() {
        let (mut store, params) = setup();
        let op = transfer_op(&store);
        apply(&mut store, &params, op).unwrap();
        apply(&mut store, &params, approve("bob", true)).unwrap();
        let err = apply(&mut store, &params, approve("bob", true)).unwrap_err();
        assert!(matches!(err, LedgerError::IllegalState(_)));
    }

    #[test]
    fn rejection_refunds_sender() {
        let (mut store, params) = setup();
        let op = transfer_op(&store);
        apply(&mut store, &params, op).unwrap();
        apply(&mut store, &params, approve("sam", false)).unwrap();

        assert!(escrow(&store).is_none());
        assert_eq!(account(&store, "alice").balance, Asset::scr(10_000));
    }

    #[test]
    fn approval_after_deadline_fails() {
        let (mut store, params) = setup();
        let op = transfer_op(&store);
        apply(&mut store, &params, op).unwrap();
        advance(&mut store, 101);
        let err = apply(&mut store, &params, approve("bob", true)).unwrap_err();
        assert!(matches!(err, LedgerError::IllegalState(_)));
    }

    #[test]
    fn dispute_needs_ratification_and_happens_once() {
        let (mut store, params) = setup();
        let op = transfer_op(&store);
        apply(&mut store, &params, op).unwrap();
        let err = apply(&mut store, &params, dispute("alice")).unwrap_err();
        assert!(matches!(err, LedgerError::IllegalState(_)));

        apply(&mut store, &params, approve("bob", true)).unwrap();
        apply(&mut store, &params, approve("sam", true)).unwrap();
        apply(&mut store, &params, dispute("bob")).unwrap();
        assert!(escrow(&store).unwrap().disputed);

        let err = apply(&mut store, &params, dispute("alice")).unwrap_err();
        assert!(matches!(err, LedgerError::IllegalState(_)));
    }

    #[test]
    fn dispute_after_expiration_fails() {
        let (mut store, params) = ratified();
        advance(&mut store, 200);
        let err = apply(&mut store, &params, dispute("alice")).unwrap_err();
        assert!(matches!(err, LedgerError::IllegalState(_)));
    }

    #[test]
    fn release_before_ratification_fails() {
        let (mut store, params) = setup();
        let op = transfer_op(&store);
        apply(&mut store, &params, op).unwrap();
        let err = apply(&mut store, &params, release("alice", "bob", 100)).unwrap_err();
        assert!(matches!(err, LedgerError::IllegalState(_)));
    }

    #[test]
    fn running_escrow_pays_the_other_party() {
        let (mut store, params) = ratified();
        let err = apply(&mut store, &params, release("alice", "alice", 100)).unwrap_err();
        assert!(matches!(err, LedgerError::PermissionDenied(_)));
        let err = apply(&mut store, &params, release("sam", "bob", 100)).unwrap_err();
        assert!(matches!(err, LedgerError::PermissionDenied(_)));

        apply(&mut store, &params, release("alice", "bob", 400)).unwrap();
        apply(&mut store, &params, release("bob", "alice", 100)).unwrap();
        assert_eq!(account(&store, "bob").balance, Asset::scr(400));
        assert_eq!(escrow(&store).unwrap().scr_balance, Asset::scr(500));
    }

    #[test]
    fn expired_escrow_pays_either_party() {
        let (mut store, params) = ratified();
        advance(&mut store, 200);
        apply(&mut store, &params, release("alice", "alice", 300)).unwrap();
        apply(&mut store, &params, release("bob", "bob", 700)).unwrap();
        assert!(escrow(&store).is_none());
        assert_eq!(account(&store, "alice").balance, Asset::scr(9_200));
        assert_eq!(account(&store, "bob").balance, Asset::scr(700));
    }

    #[test]
    fn disputed_escrow_is_released_by_agent_only() {
        let (mut store, params) = ratified();
        apply(&mut store, &params, dispute("alice")).unwrap();
        let err = apply(&mut store, &params, release("alice", "bob", 100)).unwrap_err();
        assert!(matches!(err, LedgerError::PermissionDenied(_)));

        apply(&mut store, &params, release("sam", "alice", 1_000)).unwrap();
        assert!(escrow(&store).is_none());
    }

    #[test]
    fn release_cannot_exceed_balance() {
        let (mut store, params) = ratified();
        let err = apply(&mut store, &params, release("alice", "bob", 1_001)).unwrap_err();
        assert!(matches!(err, LedgerError::IllegalState(_)));
    }

    #[test]
    fn refund_returns_amount_and_fee() {
        let (mut store, params) = setup();
        let op = transfer_op(&store);
        apply(&mut store, &params, op).unwrap();
        let e = escrow(&store).unwrap();

        let mut ctx = ApplyContext::new(&mut store, &params).unwrap();
        let refunded = refund(&mut ctx, &e).unwrap();
        assert_eq!(refunded, Asset::scr(1_100));
        assert_eq!(account(&store, "alice").balance, Asset::scr(10_000));
        assert!(escrow(&store).is_none());
    }
}
