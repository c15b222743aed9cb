//! Account records and the account service.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use tessera_types::{AccountName, Asset, AssetError, PublicKey, Timestamp, PERCENT_100};

/// Number of proxy hops tracked in [`Account::proxied_vsf_votes`].
pub const PROXY_VOTE_DEPTH: usize = 4;

/// Per-account balances, stake and voting state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: AccountName,
    pub memo_key: PublicKey,
    pub json_metadata: String,
    pub created: Timestamp,
    /// Account allowed to initiate recovery. Empty means nobody.
    pub recovery_account: AccountName,
    pub last_account_recovery: Timestamp,
    pub last_account_update: Timestamp,
    pub last_owner_update: Timestamp,

    /// Liquid SCR.
    pub balance: Asset,
    /// Vesting shares, in SP.
    pub vesting_shares: Asset,
    pub delegated_vesting_shares: Asset,
    pub received_vesting_shares: Asset,

    /// Shares released per withdrawal interval. Zero when not powering down.
    pub vesting_withdraw_rate: Asset,
    pub next_vesting_withdrawal: Timestamp,
    pub withdrawn: i64,
    pub to_withdraw: i64,
    pub withdraw_routes: u16,

    pub voting_power: u16,
    pub last_vote_time: Timestamp,
    pub can_vote: bool,

    pub post_count: u32,
    pub last_post: Timestamp,
    pub last_root_post: Timestamp,
    pub posting_rewards: i64,
    pub curation_rewards: i64,

    /// Witness voting proxy. Empty when the account votes for itself.
    pub proxy: AccountName,
    /// Stake proxied to this account, indexed by hop distance.
    pub proxied_vsf_votes: [i64; PROXY_VOTE_DEPTH],
    pub witnesses_voted_for: u16,
}

impl Account {
    pub fn new(
        name: AccountName,
        created: Timestamp,
        recovery_account: AccountName,
        memo_key: PublicKey,
        json_metadata: String,
    ) -> Self {
        Self {
            name,
            memo_key,
            json_metadata,
            created,
            recovery_account,
            last_account_recovery: Timestamp::EPOCH,
            last_account_update: created,
            last_owner_update: Timestamp::EPOCH,
            balance: Asset::scr(0),
            vesting_shares: Asset::sp(0),
            delegated_vesting_shares: Asset::sp(0),
            received_vesting_shares: Asset::sp(0),
            vesting_withdraw_rate: Asset::sp(0),
            next_vesting_withdrawal: Timestamp::MAX,
            withdrawn: 0,
            to_withdraw: 0,
            withdraw_routes: 0,
            voting_power: PERCENT_100,
            last_vote_time: created,
            can_vote: true,
            post_count: 0,
            last_post: Timestamp::EPOCH,
            last_root_post: Timestamp::EPOCH,
            posting_rewards: 0,
            curation_rewards: 0,
            proxy: AccountName::none(),
            proxied_vsf_votes: [0; PROXY_VOTE_DEPTH],
            witnesses_voted_for: 0,
        }
    }

    pub fn has_proxy(&self) -> bool {
        !self.proxy.is_empty()
    }

    /// `vesting − delegated + received`: the stake that votes on content.
    pub fn effective_vesting_shares(&self) -> Result<Asset, AssetError> {
        self.vesting_shares
            .checked_sub(self.delegated_vesting_shares)?
            .checked_add(self.received_vesting_shares)
    }

    /// Own shares not delegated and not scheduled for power-down.
    pub fn available_vesting_shares(&self) -> Result<Asset, AssetError> {
        let scheduled = self
            .to_withdraw
            .checked_sub(self.withdrawn)
            .ok_or(AssetError::Overflow)?;
        self.vesting_shares
            .checked_sub(self.delegated_vesting_shares)?
            .checked_sub(Asset::sp(scheduled))
    }

    pub fn proxied_vsf_votes_total(&self) -> Result<i64, AssetError> {
        self.proxied_vsf_votes
            .iter()
            .try_fold(0i64, |acc, v| acc.checked_add(*v))
            .ok_or(AssetError::Overflow)
    }

    /// Weight this account contributes to each witness it approves.
    pub fn witness_vote_weight(&self) -> Result<i64, AssetError> {
        self.proxied_vsf_votes_total()?
            .checked_add(self.vesting_shares.amount)
            .ok_or(AssetError::Overflow)
    }
}

pub trait AccountService {
    fn find_account(&self, name: &AccountName) -> Result<Option<Account>, StoreError>;

    /// Insert a new account. Fails with `Duplicate` if the name is taken.
    fn create_account(&mut self, account: Account) -> Result<(), StoreError>;

    /// Overwrite an existing account. Fails with `NotFound` if absent.
    fn put_account(&mut self, account: &Account) -> Result<(), StoreError>;

    /// Accounts whose next vesting withdrawal is due at or before `now`,
    /// ordered by withdrawal time then name.
    fn accounts_due_for_withdrawal(&self, now: Timestamp) -> Result<Vec<Account>, StoreError>;

    fn account_count(&self) -> Result<u64, StoreError>;

    fn get_account(&self, name: &AccountName) -> Result<Account, StoreError> {
        self.find_account(name)?
            .ok_or_else(|| StoreError::not_found("account", name))
    }

    fn account_exists(&self, name: &AccountName) -> Result<bool, StoreError> {
        Ok(self.find_account(name)?.is_some())
    }

    /// Apply `f` to the stored account and write it back.
    fn update_account<F>(&mut self, name: &AccountName, f: F) -> Result<Account, StoreError>
    where
        F: FnOnce(&mut Account),
        Self: Sized,
    {
        let mut account = self.get_account(name)?;
        f(&mut account);
        self.put_account(&account)?;
        Ok(account)
    }
}
