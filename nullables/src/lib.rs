//! Nullable infrastructure for deterministic testing.
//!
//! [`NullStore`] implements every service trait of `tessera-store` over
//! ordered in-memory tables. It returns deterministic results, never touches
//! the filesystem, and supports nested undo sessions, so the evaluators can
//! be exercised end to end without a storage engine.

pub mod store;

pub use store::NullStore;
