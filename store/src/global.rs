//! Chain-wide singletons: dynamic global properties and the reward pool/fund.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use tessera_transactions::ChainProperties;
use tessera_types::{Asset, Price, Timestamp};

/// Global state mutated every block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicGlobalProperties {
    pub head_block_number: u64,
    pub time: Timestamp,

    pub total_supply: Asset,
    /// SCR held by accounts and escrows, liquid or backing vesting shares.
    pub accounts_current_supply: Asset,
    /// SCR backing every vesting share.
    pub total_vesting_fund: Asset,
    pub total_vesting_shares: Asset,

    /// Median of the witness chain property proposals.
    pub median_chain_props: ChainProperties,
    /// Days of full-power voting worth of reserve, used in vote cost.
    pub vote_power_reserve_rate: u32,

    /// Committee quorums, in whole percent.
    pub invite_quorum: u64,
    pub dropout_quorum: u64,
    pub change_quorum: u64,
}

impl DynamicGlobalProperties {
    pub fn new(time: Timestamp, total_supply: Asset, quorum_percent: u64) -> Self {
        Self {
            head_block_number: 0,
            time,
            total_supply,
            accounts_current_supply: Asset::scr(0),
            total_vesting_fund: Asset::scr(0),
            total_vesting_shares: Asset::sp(0),
            median_chain_props: ChainProperties::default(),
            vote_power_reserve_rate: 40,
            invite_quorum: quorum_percent,
            dropout_quorum: quorum_percent,
            change_quorum: quorum_percent,
        }
    }

    /// Price of one vesting share in SCR, floor-rounded on conversion.
    pub fn share_price(&self) -> Price {
        Price::share_price(self.total_vesting_shares, self.total_vesting_fund)
    }

    pub fn account_creation_fee(&self) -> Asset {
        self.median_chain_props.account_creation_fee
    }
}

/// SCR waiting to be moved into the reward fund.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPool {
    pub balance: Asset,
    pub current_per_block_reward: Asset,
}

/// SCR available to content payouts and the decaying claim total it is
/// shared over.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardFund {
    pub reward_balance: Asset,
    pub recent_claims: u128,
    pub last_update: Timestamp,
}

pub trait GlobalPropertyService {
    fn dynamic_global_properties(&self) -> Result<DynamicGlobalProperties, StoreError>;
    fn put_dynamic_global_properties(
        &mut self,
        props: &DynamicGlobalProperties,
    ) -> Result<(), StoreError>;

    fn reward_pool(&self) -> Result<RewardPool, StoreError>;
    fn put_reward_pool(&mut self, pool: &RewardPool) -> Result<(), StoreError>;

    fn reward_fund(&self) -> Result<RewardFund, StoreError>;
    fn put_reward_fund(&mut self, fund: &RewardFund) -> Result<(), StoreError>;

    fn head_block_time(&self) -> Result<Timestamp, StoreError> {
        Ok(self.dynamic_global_properties()?.time)
    }

    fn update_dynamic_global_properties<F>(
        &mut self,
        f: F,
    ) -> Result<DynamicGlobalProperties, StoreError>
    where
        F: FnOnce(&mut DynamicGlobalProperties),
        Self: Sized,
    {
        let mut props = self.dynamic_global_properties()?;
        f(&mut props);
        self.put_dynamic_global_properties(&props)?;
        Ok(props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_totals_use_initial_price() {
        let props = DynamicGlobalProperties::new(Timestamp::EPOCH, Asset::scr(1_000), 60);
        assert_eq!(props.share_price(), Price::initial_share_price());
        assert_eq!(props.invite_quorum, 60);
    }

    #[test]
    fn share_price_tracks_totals() {
        let mut props = DynamicGlobalProperties::new(Timestamp::EPOCH, Asset::scr(1_000), 60);
        props.total_vesting_fund = Asset::scr(2_000);
        props.total_vesting_shares = Asset::sp(4_000_000);
        let shares = props.share_price().convert(Asset::scr(10)).unwrap();
        assert_eq!(shares, Asset::sp(20_000));
    }
}
