//! Ledger core: operation evaluators, the per-block maintenance sweep and
//! the transaction processor.
//!
//! A block is applied in two phases. First [`run_maintenance`] advances the
//! head time and performs the time-driven work: vesting withdrawals, comment
//! payouts, expirations and delayed requests. Then each signed transaction
//! is validated, its authorities checked against the signing keys, and its
//! operations evaluated inside an undo session so that a failing operation
//! leaves no trace.

pub mod config;
pub mod context;
pub mod error;
pub mod evaluators;
pub mod genesis;
pub mod maintenance;
pub mod processor;
pub mod stake;
pub mod witness_votes;

#[cfg(test)]
mod test_fixtures;

pub use config::LedgerConfig;
pub use context::ApplyContext;
pub use error::LedgerError;
pub use evaluators::apply_operation;
pub use genesis::{init_genesis, GenesisAccount, GenesisConfig};
pub use maintenance::run_maintenance;
pub use processor::{ApplyObserver, Block, Processor};
