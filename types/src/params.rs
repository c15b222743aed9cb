//! Chain parameters: every interval, limit and ratio the evaluators enforce.
//!
//! Percentages are expressed in hundredths of a percent, so [`PERCENT_100`]
//! is 10 000.

use crate::network::NetworkId;
use crate::time::{SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};
use serde::{Deserialize, Serialize};

pub const PERCENT_100: u16 = 10_000;
pub const PERCENT_1: u16 = PERCENT_100 / 100;

/// Protocol constants shared by every node on a network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    // ── Blocks ───────────────────────────────────────────────────────────
    pub block_interval_secs: u64,

    // ── Content ──────────────────────────────────────────────────────────
    /// Time between a comment's creation and its payout.
    pub cashout_window_secs: u64,

    /// Window before cashout in which votes may no longer add rshares.
    pub upvote_lockout_secs: u64,

    pub min_root_comment_interval_secs: u64,
    pub min_reply_interval_secs: u64,
    pub max_comment_depth: u16,

    // ── Voting ───────────────────────────────────────────────────────────
    /// Time for voting power to regenerate from 0% to 100%.
    pub vote_regeneration_secs: u64,
    pub min_vote_interval_secs: u64,
    pub max_vote_changes: u8,
    /// Smallest absolute rshares a non-zero vote must carry.
    pub vote_dust_threshold: i64,

    /// Linear decay period of the reward fund's recent claims.
    pub recent_rshares_decay_secs: u64,

    /// Share of each payout reserved for curators.
    pub curation_reward_percent: u16,

    // ── Accounts & recovery ──────────────────────────────────────────────
    /// Minimum time between two owner authority changes.
    pub owner_update_limit_secs: u64,

    /// How long a replaced owner authority stays usable for recovery.
    pub owner_auth_recovery_period_secs: u64,

    pub account_recovery_request_expiration_secs: u64,

    /// Delay before a change of recovery account takes effect.
    pub change_recovery_account_delay_secs: u64,

    /// Delay before declining voting rights takes effect.
    pub decline_voting_rights_delay_secs: u64,

    pub create_account_with_scr_modifier: i64,
    pub create_account_delegation_ratio: i64,
    pub create_account_delegation_secs: u64,

    // ── Vesting ──────────────────────────────────────────────────────────
    pub vesting_withdraw_intervals: u32,
    pub vesting_withdraw_interval_secs: u64,
    pub max_withdraw_routes: u32,

    /// Minimum new delegation, as a multiple of the account creation fee.
    pub min_delegation_fee_multiplier: i64,

    // ── Witnesses ────────────────────────────────────────────────────────
    pub max_account_witness_votes: u32,
    pub max_proxy_recursion_depth: usize,

    // ── Committee ────────────────────────────────────────────────────────
    pub proposal_lifetime_min_secs: u64,
    pub proposal_lifetime_max_secs: u64,
    pub committee_quorum_percent: u64,
    pub max_committee_members: usize,

    // ── Budgets ──────────────────────────────────────────────────────────
    pub max_budgets_per_owner: usize,
}

impl ChainParams {
    /// Parameters of the production network.
    pub fn live() -> Self {
        Self {
            block_interval_secs: 3,

            cashout_window_secs: 7 * SECONDS_PER_DAY,
            upvote_lockout_secs: 12 * SECONDS_PER_HOUR,
            min_root_comment_interval_secs: 5 * SECONDS_PER_MINUTE,
            min_reply_interval_secs: 20,
            max_comment_depth: 0xffff,

            vote_regeneration_secs: 5 * SECONDS_PER_DAY,
            min_vote_interval_secs: 3,
            max_vote_changes: 5,
            vote_dust_threshold: 50_000_000,
            recent_rshares_decay_secs: 15 * SECONDS_PER_DAY,
            curation_reward_percent: 25 * PERCENT_1,

            owner_update_limit_secs: 60 * SECONDS_PER_MINUTE,
            owner_auth_recovery_period_secs: 30 * SECONDS_PER_DAY,
            account_recovery_request_expiration_secs: SECONDS_PER_DAY,
            change_recovery_account_delay_secs: 30 * SECONDS_PER_DAY,
            decline_voting_rights_delay_secs: 30 * SECONDS_PER_DAY,
            create_account_with_scr_modifier: 30,
            create_account_delegation_ratio: 5,
            create_account_delegation_secs: 30 * SECONDS_PER_DAY,

            vesting_withdraw_intervals: 13,
            vesting_withdraw_interval_secs: 7 * SECONDS_PER_DAY,
            max_withdraw_routes: 10,
            min_delegation_fee_multiplier: 10,

            max_account_witness_votes: 30,
            max_proxy_recursion_depth: 4,

            proposal_lifetime_min_secs: SECONDS_PER_DAY,
            proposal_lifetime_max_secs: 10 * SECONDS_PER_DAY,
            committee_quorum_percent: 60,
            max_committee_members: 30,

            max_budgets_per_owner: 5,
        }
    }

    /// Parameters of the test network: payouts and lockouts are shortened.
    pub fn test() -> Self {
        Self {
            cashout_window_secs: SECONDS_PER_HOUR,
            upvote_lockout_secs: 5 * SECONDS_PER_MINUTE,
            ..Self::live()
        }
    }

    pub fn for_network(network: NetworkId) -> Self {
        match network {
            NetworkId::Live => Self::live(),
            NetworkId::Test => Self::test(),
        }
    }
}

/// Default is the live network configuration.
impl Default for ChainParams {
    fn default() -> Self {
        Self::live()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_shortens_payout_windows() {
        let live = ChainParams::live();
        let test = ChainParams::test();
        assert!(test.cashout_window_secs < live.cashout_window_secs);
        assert!(test.upvote_lockout_secs < test.cashout_window_secs);
        assert_eq!(test.vesting_withdraw_intervals, live.vesting_withdraw_intervals);
    }

    #[test]
    fn for_network_selects_parameters() {
        assert_eq!(ChainParams::for_network(NetworkId::Test), ChainParams::test());
        assert_eq!(ChainParams::default(), ChainParams::live());
    }
}
