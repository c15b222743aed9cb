//! Field checks shared by the per-operation `validate()` implementations.
//!
//! Everything here is stateless. Checks that need ledger state (balances,
//! existence, timing) belong to the evaluators.

use crate::error::ValidationError;
use tessera_types::{AccountName, Asset, AssetSymbol, Permlink, PERCENT_100};

pub const MAX_MEMO_SIZE: usize = 2048;
pub const MAX_WITNESS_URL_LENGTH: usize = 2048;
pub const MAX_TITLE_LENGTH: usize = 256;
pub const MAX_BENEFICIARIES: usize = 8;
/// Smallest block size a witness may propose.
pub const MIN_BLOCK_SIZE_LIMIT: u32 = 65_536;
pub const MIN_QUORUM_PERCENT: u64 = 50;
pub const MAX_QUORUM_PERCENT: u64 = 100;

pub fn validate_account_name(name: &AccountName) -> Result<(), ValidationError> {
    AccountName::parse(name.as_str())?;
    Ok(())
}

/// Like [`validate_account_name`], but the empty sentinel is accepted.
pub fn validate_optional_account_name(name: &AccountName) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Ok(());
    }
    validate_account_name(name)
}

pub fn validate_permlink(permlink: &Permlink) -> Result<(), ValidationError> {
    permlink.validate()?;
    Ok(())
}

/// Metadata fields must be empty or parse as JSON.
pub fn validate_json(field: &'static str, json: &str) -> Result<(), ValidationError> {
    if json.is_empty() {
        return Ok(());
    }
    serde_json::from_str::<serde_json::Value>(json)
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidJson(field))
}

pub fn require_symbol(
    field: &'static str,
    asset: &Asset,
    expected: AssetSymbol,
) -> Result<(), ValidationError> {
    if asset.symbol != expected {
        return Err(ValidationError::WrongSymbol { field, expected });
    }
    Ok(())
}

pub fn require_positive(field: &'static str, asset: &Asset) -> Result<(), ValidationError> {
    if !asset.is_positive() {
        return Err(ValidationError::NotPositive(field));
    }
    Ok(())
}

pub fn require_non_negative(field: &'static str, asset: &Asset) -> Result<(), ValidationError> {
    if asset.is_negative() {
        return Err(ValidationError::Negative(field));
    }
    Ok(())
}

pub fn require_max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.len() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

pub fn require_percent(field: &'static str, percent: u16) -> Result<(), ValidationError> {
    if percent > PERCENT_100 {
        return Err(ValidationError::Constraint(format!(
            "{field} {percent} exceeds 100%"
        )));
    }
    Ok(())
}

/// Fail with `message` unless `condition` holds.
pub fn ensure(condition: bool, message: impl Into<String>) -> Result<(), ValidationError> {
    if !condition {
        return Err(ValidationError::Constraint(message.into()));
    }
    Ok(())
}
