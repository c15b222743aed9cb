//! Authorities and signature verification.
//!
//! An [`Authority`] is a weighted threshold over public keys and other
//! accounts. Every account carries three of them (owner, active, posting).
//! [`verify_authority`] decides whether the keys that signed a transaction
//! satisfy everything its operations require, and rejects signatures that
//! contribute nothing.

pub mod authority;
pub mod error;
pub mod sign_state;
pub mod verify;

pub use authority::{Authority, AuthorityLevel};
pub use error::AuthorityError;
pub use sign_state::SignState;
pub use verify::{verify_authority, AuthorityResolver, RequiredAuthorities};

/// Default nesting depth for account authorities.
pub const MAX_SIG_CHECK_DEPTH: u32 = 2;
