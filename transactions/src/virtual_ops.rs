//! Informational events emitted while applying operations and maintenance.
//!
//! Virtual operations never authorize anything and are never read back by
//! the ledger; they exist for indexers and wallets.

use serde::{Deserialize, Serialize};
use tessera_types::{AccountName, Asset, Permlink};

use crate::governance::ProposalAction;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VirtualOperation {
    /// One power-down payment: `withdrawn` shares left `from`, `deposited`
    /// arrived at `to` (as SCR, or as SP for auto-vest routes).
    FillVestingWithdraw {
        from: AccountName,
        to: AccountName,
        withdrawn: Asset,
        deposited: Asset,
    },
    AuthorReward {
        author: AccountName,
        permlink: Permlink,
        scr_payout: Asset,
        sp_payout: Asset,
    },
    CurationReward {
        curator: AccountName,
        reward: Asset,
        comment_author: AccountName,
        comment_permlink: Permlink,
    },
    CommentBenefactorReward {
        benefactor: AccountName,
        author: AccountName,
        permlink: Permlink,
        reward: Asset,
    },
    /// Total value paid out for a comment.
    CommentPayout {
        author: AccountName,
        permlink: Permlink,
        payout: Asset,
    },
    /// An escrow that was not ratified in time returned to its sender.
    EscrowAutoRefund {
        from: AccountName,
        escrow_id: u32,
        amount: Asset,
    },
    /// Delegated stake whose lock ended is available to the delegator again.
    ReturnVestingDelegation {
        account: AccountName,
        vesting_shares: Asset,
    },
    ShutdownWitness {
        owner: AccountName,
    },
    BudgetClosed {
        owner: AccountName,
        id: u64,
        refund: Asset,
    },
    ProposalExecuted {
        id: u64,
        action: ProposalAction,
    },
}

impl VirtualOperation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FillVestingWithdraw { .. } => "fill_vesting_withdraw",
            Self::AuthorReward { .. } => "author_reward",
            Self::CurationReward { .. } => "curation_reward",
            Self::CommentBenefactorReward { .. } => "comment_benefactor_reward",
            Self::CommentPayout { .. } => "comment_payout",
            Self::EscrowAutoRefund { .. } => "escrow_auto_refund",
            Self::ReturnVestingDelegation { .. } => "return_vesting_delegation",
            Self::ShutdownWitness { .. } => "shutdown_witness",
            Self::BudgetClosed { .. } => "budget_closed",
            Self::ProposalExecuted { .. } => "proposal_executed",
        }
    }
}
