//! Genesis state: the initial supply, the first witness and the committee.
//!
//! The genesis account (the "initminer") receives whatever supply is not
//! explicitly allocated elsewhere, produces blocks as the only witness and
//! forms the committee on its own. Additional accounts may be seeded with
//! liquid balances. Part of the initminer allocation can be vested, and part
//! of the supply can be placed in the reward pool to fund early payouts.

use serde::{Deserialize, Serialize};

use tessera_authority::Authority;
use tessera_store::{
    Account, AccountAuthority, ChainState, Committee, DynamicGlobalProperties, RewardPool,
    Witness,
};
use tessera_transactions::ChainProperties;
use tessera_types::{
    AccountName, Asset, AssetSymbol, ChainParams, NetworkId, PublicKey, Timestamp,
};

use crate::stake::create_vesting;
use crate::LedgerError;

/// An account created at genesis with a liquid balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAccount {
    pub name: AccountName,
    pub public_key: PublicKey,
    pub balance: Asset,
}

/// Configuration for the initial ledger state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Which network this genesis is for.
    pub network: NetworkId,
    /// Head time of the genesis state.
    pub genesis_time: Timestamp,
    pub initminer: AccountName,
    /// Owner, active, posting, memo and block signing key of the initminer.
    pub initminer_key: PublicKey,
    /// Every SCR that exists at genesis.
    pub initial_supply: Asset,
    /// Part of the initminer allocation staked as vesting shares.
    pub initminer_vesting: Asset,
    /// Part of the supply seeded into the reward pool.
    pub reward_pool: Asset,
    /// Amount the pool moves into the reward fund every block.
    pub reward_per_block: Asset,
    pub accounts: Vec<GenesisAccount>,
}

impl GenesisConfig {
    /// A genesis where the initminer holds the whole supply.
    pub fn new(
        network: NetworkId,
        genesis_time: Timestamp,
        initminer: AccountName,
        initminer_key: PublicKey,
        initial_supply: Asset,
    ) -> Self {
        Self {
            network,
            genesis_time,
            initminer,
            initminer_key,
            initial_supply,
            initminer_vesting: Asset::scr(0),
            reward_pool: Asset::scr(0),
            reward_per_block: Asset::scr(0),
            accounts: Vec::new(),
        }
    }

    /// The liquid SCR left to the initminer once every other allocation is
    /// taken out of the initial supply.
    pub fn initminer_balance(&self) -> Result<Asset, LedgerError> {
        let mut remaining = self
            .initial_supply
            .checked_sub(self.reward_pool)?
            .checked_sub(self.initminer_vesting)?;
        for account in &self.accounts {
            remaining = remaining.checked_sub(account.balance)?;
        }
        if remaining.is_negative() {
            return Err(LedgerError::Config(format!(
                "genesis allocations exceed the initial supply of {}",
                self.initial_supply
            )));
        }
        Ok(remaining)
    }

    fn validate(&self) -> Result<(), LedgerError> {
        let amounts = [
            ("initial_supply", self.initial_supply),
            ("initminer_vesting", self.initminer_vesting),
            ("reward_pool", self.reward_pool),
            ("reward_per_block", self.reward_per_block),
        ];
        for (field, amount) in amounts {
            if amount.is_negative() || amount.symbol != AssetSymbol::Scr {
                return Err(LedgerError::Config(format!(
                    "{field} must be a non-negative SCR amount, got {amount}"
                )));
            }
        }
        if self.initminer.is_empty() {
            return Err(LedgerError::Config("initminer name is empty".to_string()));
        }
        for account in &self.accounts {
            if account.balance.is_negative() {
                return Err(LedgerError::Config(format!(
                    "genesis account {} has a negative balance",
                    account.name
                )));
            }
            if account.name == self.initminer {
                return Err(LedgerError::Config(format!(
                    "{} is listed twice in genesis",
                    account.name
                )));
            }
        }
        Ok(())
    }
}

/// Populate an empty store with the genesis state described by `config`.
pub fn init_genesis<S: ChainState>(
    state: &mut S,
    config: &GenesisConfig,
) -> Result<(), LedgerError> {
    config.validate()?;
    if state.account_exists(&config.initminer)? {
        return Err(LedgerError::illegal("genesis state is already initialised"));
    }
    let initminer_balance = config.initminer_balance()?;
    let params = ChainParams::for_network(config.network);

    let mut props = DynamicGlobalProperties::new(
        config.genesis_time,
        config.initial_supply,
        params.committee_quorum_percent,
    );
    props.accounts_current_supply = config.initial_supply.checked_sub(config.reward_pool)?;
    state.put_dynamic_global_properties(&props)?;

    create_genesis_account(
        state,
        config.genesis_time,
        &config.initminer,
        config.initminer_key,
        initminer_balance,
    )?;
    for account in &config.accounts {
        create_genesis_account(
            state,
            config.genesis_time,
            &account.name,
            account.public_key,
            account.balance,
        )?;
    }
    if config.initminer_vesting.is_positive() {
        create_vesting(state, &config.initminer, config.initminer_vesting)?;
    }

    state.create_witness(Witness {
        owner: config.initminer.clone(),
        created: config.genesis_time,
        url: String::from("initminer"),
        signing_key: config.initminer_key,
        props: ChainProperties::default(),
        votes: 0,
    })?;
    state.put_committee(&Committee {
        members: [config.initminer.clone()].into_iter().collect(),
    })?;
    state.put_reward_pool(&RewardPool {
        balance: config.reward_pool,
        current_per_block_reward: config.reward_per_block,
    })?;

    tracing::info!(
        network = config.network.as_str(),
        initminer = %config.initminer,
        supply = %config.initial_supply,
        accounts = config.accounts.len() + 1,
        "genesis state initialised"
    );
    Ok(())
}

fn create_genesis_account<S: ChainState>(
    state: &mut S,
    created: Timestamp,
    name: &AccountName,
    key: PublicKey,
    balance: Asset,
) -> Result<(), LedgerError> {
    let mut account = Account::new(
        name.clone(),
        created,
        AccountName::none(),
        key,
        String::new(),
    );
    account.balance = balance;
    state.create_account(account)?;
    state.create_account_authority(AccountAuthority {
        account: name.clone(),
        owner: Authority::from_key(key),
        active: Authority::from_key(key),
        posting: Authority::from_key(key),
        last_owner_update: Timestamp::EPOCH,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::key_of;
    use tessera_nullables::NullStore;
    use tessera_store::{
        AccountAuthorityService, AccountService, CommitteeService, GlobalPropertyService,
        WitnessService,
    };

    fn config() -> GenesisConfig {
        GenesisConfig::new(
            NetworkId::Test,
            Timestamp::new(1_000),
            AccountName::new("initminer"),
            key_of("initminer"),
            Asset::scr(1_000_000),
        )
    }

    #[test]
    fn initminer_receives_the_whole_supply() {
        let mut store = NullStore::new();
        init_genesis(&mut store, &config()).unwrap();

        let initminer = store.get_account(&AccountName::new("initminer")).unwrap();
        assert_eq!(initminer.balance, Asset::scr(1_000_000));
        let props = store.dynamic_global_properties().unwrap();
        assert_eq!(props.total_supply, Asset::scr(1_000_000));
        assert_eq!(props.accounts_current_supply, Asset::scr(1_000_000));
        assert_eq!(props.time, Timestamp::new(1_000));
        assert_eq!(props.invite_quorum, 60);

        let authority = store
            .find_account_authority(&AccountName::new("initminer"))
            .unwrap()
            .unwrap();
        assert_eq!(authority.owner, Authority::from_key(key_of("initminer")));
        assert!(store
            .find_witness(&AccountName::new("initminer"))
            .unwrap()
            .is_some());
        assert!(store
            .committee()
            .unwrap()
            .is_member(&AccountName::new("initminer")));
    }

    #[test]
    fn allocations_are_carved_from_the_supply() {
        let mut config = config();
        config.initminer_vesting = Asset::scr(100_000);
        config.reward_pool = Asset::scr(50_000);
        config.reward_per_block = Asset::scr(10);
        config.accounts.push(GenesisAccount {
            name: AccountName::new("alice"),
            public_key: key_of("alice"),
            balance: Asset::scr(25_000),
        });
        let mut store = NullStore::new();
        init_genesis(&mut store, &config).unwrap();

        let initminer = store.get_account(&AccountName::new("initminer")).unwrap();
        assert_eq!(initminer.balance, Asset::scr(825_000));
        assert_eq!(initminer.vesting_shares, Asset::sp(100_000_000));
        assert_eq!(
            store.get_account(&AccountName::new("alice")).unwrap().balance,
            Asset::scr(25_000)
        );

        let props = store.dynamic_global_properties().unwrap();
        assert_eq!(props.accounts_current_supply, Asset::scr(950_000));
        assert_eq!(props.total_vesting_fund, Asset::scr(100_000));
        let pool = store.reward_pool().unwrap();
        assert_eq!(pool.balance, Asset::scr(50_000));
        assert_eq!(pool.current_per_block_reward, Asset::scr(10));
    }

    #[test]
    fn over_allocation_is_rejected() {
        let mut config = config();
        config.reward_pool = Asset::scr(1_000_001);
        let err = init_genesis(&mut NullStore::new(), &config).unwrap_err();
        assert!(matches!(err, LedgerError::Config(_)));
    }

    #[test]
    fn genesis_runs_once() {
        let mut store = NullStore::new();
        init_genesis(&mut store, &config()).unwrap();
        let err = init_genesis(&mut store, &config()).unwrap_err();
        assert!(matches!(err, LedgerError::IllegalState(_)));
    }
}
