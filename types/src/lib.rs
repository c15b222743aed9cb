//! Fundamental types for the tessera ledger core.
//!
//! This crate defines the value types shared across every other crate in the
//! workspace: symbol-tagged assets and prices, names, timestamps, keys,
//! digests and chain parameters.

pub mod asset;
pub mod hash;
pub mod keys;
pub mod name;
pub mod network;
pub mod params;
pub mod price;
pub mod time;

pub use asset::{Asset, AssetError, AssetSymbol};
pub use hash::{ChainId, TxDigest};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use name::{AccountName, NameError, Permlink};
pub use network::NetworkId;
pub use params::{ChainParams, PERCENT_1, PERCENT_100};
pub use price::Price;
pub use time::Timestamp;
