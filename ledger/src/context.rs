//! The world-state handle threaded through every evaluator call.

use tessera_store::{Account, ChainState, DynamicGlobalProperties};
use tessera_transactions::VirtualOperation;
use tessera_types::{AccountName, ChainParams, Timestamp};

use crate::LedgerError;

/// Mutable access to the ledger plus the head time and the virtual
/// operations emitted so far.
///
/// `now` is read once from the dynamic global properties when the context
/// is built, so every operation of a transaction observes the same time.
pub struct ApplyContext<'a, S: ChainState> {
    pub state: &'a mut S,
    pub params: &'a ChainParams,
    now: Timestamp,
    vops: Vec<VirtualOperation>,
}

impl<'a, S: ChainState> ApplyContext<'a, S> {
    pub fn new(state: &'a mut S, params: &'a ChainParams) -> Result<Self, LedgerError> {
        let now = state.head_block_time()?;
        Ok(Self {
            state,
            params,
            now,
            vops: Vec::new(),
        })
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn push_vop(&mut self, vop: VirtualOperation) {
        tracing::trace!(vop = vop.name(), "virtual operation");
        self.vops.push(vop);
    }

    pub fn virtual_ops(&self) -> &[VirtualOperation] {
        &self.vops
    }

    pub fn into_virtual_ops(self) -> Vec<VirtualOperation> {
        self.vops
    }

    /// Load an account, failing with [`LedgerError::UnknownAccount`].
    pub fn account(&self, name: &AccountName) -> Result<Account, LedgerError> {
        self.state
            .find_account(name)?
            .ok_or_else(|| LedgerError::UnknownAccount(name.clone()))
    }

    pub fn require_account(&self, name: &AccountName) -> Result<(), LedgerError> {
        if !self.state.account_exists(name)? {
            return Err(LedgerError::UnknownAccount(name.clone()));
        }
        Ok(())
    }

    pub fn properties(&self) -> Result<DynamicGlobalProperties, LedgerError> {
        Ok(self.state.dynamic_global_properties()?)
    }
}
