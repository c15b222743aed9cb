//! Transaction and block application.
//!
//! A transaction is checked statelessly, then its signatures against the
//! authorities its operations require, and finally its operations are
//! evaluated inside an undo session: either every operation lands or none
//! does. A block wraps maintenance and all of its transactions in one more
//! session, so a single bad transaction rejects the whole block.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use tessera_authority::{verify_authority, Authority, AuthorityLevel};
use tessera_store::ChainState;
use tessera_transactions::{
    Operation, SignedTransaction, Transaction, TransactionError, VirtualOperation,
};
use tessera_types::{AccountName, ChainId, Timestamp};

use crate::context::ApplyContext;
use crate::evaluators::apply_operation;
use crate::maintenance::run_maintenance;
use crate::{LedgerConfig, LedgerError};

/// Hooks called while operations are applied.
///
/// Virtual operations are delivered only once the transaction or block
/// that produced them is committed.
pub trait ApplyObserver {
    fn pre_apply_operation(&mut self, _op: &Operation) {}

    fn post_apply_operation(&mut self, _op: &Operation) {}

    fn on_virtual_operation(&mut self, _vop: &VirtualOperation) {}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub number: u64,
    pub timestamp: Timestamp,
    pub transactions: Vec<SignedTransaction>,
}

pub struct Processor {
    config: LedgerConfig,
    chain_id: ChainId,
    observers: Vec<Box<dyn ApplyObserver>>,
}

impl Processor {
    pub fn new(config: LedgerConfig) -> Self {
        let chain_id = config.network.chain_id();
        Self {
            config,
            chain_id,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn ApplyObserver>) {
        self.observers.push(observer);
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    /// Apply one signed transaction at the current head time.
    pub fn push_transaction<S: ChainState>(
        &mut self,
        state: &mut S,
        tx: &SignedTransaction,
    ) -> Result<Vec<VirtualOperation>, LedgerError> {
        let mut vops = self.apply_transaction(state, tx)?;
        if !self.config.enable_virtual_op_log {
            vops.clear();
        }
        self.publish(&vops);
        Ok(vops)
    }

    /// Run maintenance for `block`, then apply its transactions in order.
    ///
    /// Returns the virtual operations of the block: maintenance first,
    /// then each transaction's.
    pub fn apply_block<S: ChainState>(
        &mut self,
        state: &mut S,
        block: &Block,
    ) -> Result<Vec<VirtualOperation>, LedgerError> {
        state.start_undo_session();
        match self.apply_block_contents(state, block) {
            Ok(vops) => {
                state.commit_session()?;
                self.publish(&vops);
                tracing::info!(
                    block = block.number,
                    transactions = block.transactions.len(),
                    vops = vops.len(),
                    "block applied"
                );
                Ok(vops)
            }
            Err(e) => {
                state.undo_session()?;
                tracing::warn!(block = block.number, error = %e, "block rejected");
                Err(e)
            }
        }
    }

    fn apply_block_contents<S: ChainState>(
        &mut self,
        state: &mut S,
        block: &Block,
    ) -> Result<Vec<VirtualOperation>, LedgerError> {
        let mut vops = run_maintenance(state, &self.config.params, block.number, block.timestamp)?;
        for (index, tx) in block.transactions.iter().enumerate() {
            let applied =
                self.apply_transaction(state, tx)
                    .map_err(|source| LedgerError::BlockTransaction {
                        block: block.number,
                        index,
                        source: Box::new(source),
                    })?;
            vops.extend(applied);
        }
        if !self.config.enable_virtual_op_log {
            vops.clear();
        }
        Ok(vops)
    }

    fn apply_transaction<S: ChainState>(
        &mut self,
        state: &mut S,
        tx: &SignedTransaction,
    ) -> Result<Vec<VirtualOperation>, LedgerError> {
        let now = state.head_block_time()?;
        if now > tx.transaction.expiration {
            return Err(TransactionError::Expired {
                expiration: tx.transaction.expiration,
                now,
            }
            .into());
        }
        tx.transaction.validate()?;
        if !self.config.skip_signature_check {
            self.verify_signatures(state, tx)?;
        }

        state.start_undo_session();
        match self.apply_operations(state, &tx.transaction) {
            Ok(vops) => {
                state.commit_session()?;
                tracing::debug!(
                    operations = tx.transaction.operations.len(),
                    "transaction applied"
                );
                Ok(vops)
            }
            Err(e) => {
                state.undo_session()?;
                tracing::debug!(error = %e, "transaction rejected");
                Err(e)
            }
        }
    }

    fn verify_signatures<S: ChainState>(
        &self,
        state: &S,
        tx: &SignedTransaction,
    ) -> Result<(), LedgerError> {
        let keys = tx.signature_keys(&self.chain_id).map_err(|e| match e {
            TransactionError::Authority(inner) => LedgerError::Authority(inner),
            other => LedgerError::Transaction(other),
        })?;
        let required = tx.transaction.required_authorities();
        // A failed lookup is a store failure, not an unknown account.
        let store_error = RefCell::new(None);
        let resolver = |account: &AccountName, level: AuthorityLevel| -> Option<Authority> {
            match state.find_account_authority(account) {
                Ok(record) => record.map(|record| record.level(level).clone()),
                Err(e) => {
                    store_error.borrow_mut().get_or_insert(e);
                    None
                }
            }
        };
        let verdict = verify_authority(&required, &keys, &resolver, self.config.max_sig_check_depth);
        if let Some(e) = store_error.into_inner() {
            return Err(e.into());
        }
        verdict?;
        Ok(())
    }

    fn apply_operations<S: ChainState>(
        &mut self,
        state: &mut S,
        transaction: &Transaction,
    ) -> Result<Vec<VirtualOperation>, LedgerError> {
        let params = &self.config.params;
        let mut ctx = ApplyContext::new(state, params)?;
        for op in &transaction.operations {
            for observer in &mut self.observers {
                observer.pre_apply_operation(op);
            }
            apply_operation(&mut ctx, op)?;
            for observer in &mut self.observers {
                observer.post_apply_operation(op);
            }
        }
        Ok(ctx.into_virtual_ops())
    }

    fn publish(&mut self, vops: &[VirtualOperation]) {
        if !self.config.enable_virtual_op_log {
            return;
        }
        for vop in vops {
            for observer in &mut self.observers {
                observer.on_virtual_operation(vop);
            }
        }
    }
}
