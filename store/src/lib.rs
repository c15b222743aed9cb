//! Entity records and the service traits the evaluators consume.
//!
//! Every storage backend implements these traits; the evaluators depend
//! only on them. Each service guarantees:
//! - `get_*` fails with [`StoreError::NotFound`] when the key is absent;
//! - `create_*` fails with [`StoreError::Duplicate`] when the key exists;
//! - `put_*` and `update_*` are visible to the next read;
//! - every mutation can be reverted through [`UndoDatabase`].

pub mod account;
pub mod authority;
pub mod budget;
pub mod comment;
pub mod error;
pub mod escrow;
pub mod global;
pub mod governance;
pub mod recovery;
pub mod undo;
pub mod vesting;
pub mod witness;

pub use account::{Account, AccountService, PROXY_VOTE_DEPTH};
pub use authority::{
    AccountAuthority, AccountAuthorityService, OwnerAuthorityHistory, OwnerHistoryService,
};
pub use budget::{Budget, BudgetService};
pub use comment::{Comment, CommentService, CommentVote};
pub use error::StoreError;
pub use escrow::{Escrow, EscrowService};
pub use global::{DynamicGlobalProperties, GlobalPropertyService, RewardFund, RewardPool};
pub use governance::{Committee, CommitteeService, Proposal, ProposalService};
pub use recovery::{
    AccountRecoveryRequest, ChangeRecoveryAccountRequest, DeclineVotingRightsRequest,
    RecoveryService,
};
pub use undo::UndoDatabase;
pub use vesting::{
    DelegationService, VestingDelegation, VestingDelegationExpiration, WithdrawRouteService,
    WithdrawVestingRoute,
};
pub use witness::{Witness, WitnessService, WitnessVote};

/// Every service the evaluators need, behind one bound.
pub trait ChainState:
    AccountService
    + AccountAuthorityService
    + OwnerHistoryService
    + RecoveryService
    + CommentService
    + WitnessService
    + EscrowService
    + DelegationService
    + WithdrawRouteService
    + CommitteeService
    + ProposalService
    + BudgetService
    + GlobalPropertyService
    + UndoDatabase
{
}

impl<T> ChainState for T where
    T: AccountService
        + AccountAuthorityService
        + OwnerHistoryService
        + RecoveryService
        + CommentService
        + WitnessService
        + EscrowService
        + DelegationService
        + WithdrawRouteService
        + CommitteeService
        + ProposalService
        + BudgetService
        + GlobalPropertyService
        + UndoDatabase
{
}
