//! Fixture builders for the unit tests.

use tessera_authority::Authority;
use tessera_crypto::{blake2b_256, keypair_from_seed};
use tessera_nullables::NullStore;
use tessera_store::{
    Account, AccountAuthority, AccountAuthorityService, AccountService, DynamicGlobalProperties,
    GlobalPropertyService, Witness, WitnessService,
};
use tessera_transactions::{ChainProperties, Operation, VirtualOperation};
use tessera_types::{AccountName, Asset, ChainParams, KeyPair, PublicKey, Timestamp};

use crate::{apply_operation, ApplyContext, LedgerError};

pub const GENESIS_TIME: u64 = 1_000_000;

pub fn keypair_of(name: &str) -> KeyPair {
    keypair_from_seed(&blake2b_256(name.as_bytes()))
}

pub fn key_of(name: &str) -> PublicKey {
    keypair_of(name).public
}

/// A store at [`GENESIS_TIME`] holding one empty account per name, with
/// test-network parameters.
pub fn make_chain(names: &[&str]) -> (NullStore, ChainParams) {
    let props =
        DynamicGlobalProperties::new(Timestamp::new(GENESIS_TIME), Asset::scr(0), 60);
    let mut store = NullStore::with_properties(props);
    for name in names {
        make_account(&mut store, name);
    }
    (store, ChainParams::test())
}

pub fn make_account(store: &mut NullStore, name: &str) {
    let now = store.head_block_time().unwrap();
    let key = key_of(name);
    let account_name = AccountName::new(name);
    store
        .create_account(Account::new(
            account_name.clone(),
            now,
            AccountName::none(),
            key,
            String::new(),
        ))
        .unwrap();
    store
        .create_account_authority(AccountAuthority {
            account: account_name,
            owner: Authority::from_key(key),
            active: Authority::from_key(key),
            posting: Authority::from_key(key),
            last_owner_update: Timestamp::EPOCH,
        })
        .unwrap();
}

/// Mint liquid SCR into `name`'s balance.
pub fn fund(store: &mut NullStore, name: &str, scr: i64) {
    store
        .update_account(&AccountName::new(name), |a| {
            a.balance = a.balance.checked_add(Asset::scr(scr)).unwrap()
        })
        .unwrap();
    store
        .update_dynamic_global_properties(|p| {
            p.total_supply = p.total_supply.checked_add(Asset::scr(scr)).unwrap();
            p.accounts_current_supply =
                p.accounts_current_supply.checked_add(Asset::scr(scr)).unwrap();
        })
        .unwrap();
}

/// Mint SCR and stake it for `name`; returns the shares created.
pub fn vest(store: &mut NullStore, name: &str, scr: i64) -> Asset {
    fund(store, name, scr);
    store
        .update_account(&AccountName::new(name), |a| {
            a.balance = a.balance.checked_sub(Asset::scr(scr)).unwrap()
        })
        .unwrap();
    crate::stake::create_vesting(store, &AccountName::new(name), Asset::scr(scr)).unwrap()
}

pub fn make_witness(store: &mut NullStore, name: &str) {
    let now = store.head_block_time().unwrap();
    store
        .create_witness(Witness {
            owner: AccountName::new(name),
            created: now,
            url: format!("https://{name}.example"),
            signing_key: key_of(name),
            props: ChainProperties::default(),
            votes: 0,
        })
        .unwrap();
}

pub fn advance(store: &mut NullStore, secs: u64) {
    store
        .update_dynamic_global_properties(|p| p.time = p.time.plus(secs))
        .unwrap();
}

pub fn now(store: &NullStore) -> Timestamp {
    store.head_block_time().unwrap()
}

pub fn account(store: &NullStore, name: &str) -> Account {
    store.get_account(&AccountName::new(name)).unwrap()
}

/// Evaluate one operation against `store` at its current head time.
pub fn apply(
    store: &mut NullStore,
    params: &ChainParams,
    op: Operation,
) -> Result<Vec<VirtualOperation>, LedgerError> {
    let mut ctx = ApplyContext::new(store, params)?;
    apply_operation(&mut ctx, &op)?;
    Ok(ctx.into_virtual_ops())
}
