//! Exchange ratio between two assets of different symbols.
//!
//! Conversions are consensus-critical: every node must produce the same
//! integer for the same input, so the math is done in `u128` and rounded
//! toward zero exactly once.

use crate::asset::{Asset, AssetError, AssetSymbol};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `base` is worth `quote`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub base: Asset,
    pub quote: Asset,
}

impl Price {
    /// Build a price; both sides must be positive and of different symbols.
    pub fn new(base: Asset, quote: Asset) -> Result<Self, AssetError> {
        if base.symbol == quote.symbol {
            return Err(AssetError::InvalidPrice(format!(
                "base and quote share symbol {}",
                base.symbol
            )));
        }
        if !base.is_positive() || !quote.is_positive() {
            return Err(AssetError::InvalidPrice(format!("{base} / {quote}")));
        }
        Ok(Self { base, quote })
    }

    /// The price used while no stake exists yet: 1.000 SCR buys 1.000000 SP.
    pub const fn initial_share_price() -> Self {
        Self {
            base: Asset::scr(1_000),
            quote: Asset::sp(1_000_000),
        }
    }

    /// Share price derived from the global totals, falling back to
    /// [`Price::initial_share_price`] while either side is empty.
    pub fn share_price(total_vesting_shares: Asset, total_vesting_fund: Asset) -> Self {
        if total_vesting_shares.amount <= 0 || total_vesting_fund.amount <= 0 {
            return Self::initial_share_price();
        }
        Self {
            base: total_vesting_shares,
            quote: total_vesting_fund,
        }
    }

    /// Convert `asset` into the other side of the price, rounding down.
    pub fn convert(&self, asset: Asset) -> Result<Asset, AssetError> {
        let (from, to) = if asset.symbol == self.base.symbol {
            (self.base, self.quote)
        } else if asset.symbol == self.quote.symbol {
            (self.quote, self.base)
        } else {
            return Err(AssetError::SymbolMismatch {
                left: asset.symbol,
                right: self.base.symbol,
            });
        };
        if from.amount <= 0 {
            return Err(AssetError::InvalidPrice(self.to_string()));
        }
        let negative = asset.amount < 0;
        let product = (asset.amount.unsigned_abs() as u128)
            .checked_mul(to.amount as u128)
            .ok_or(AssetError::Overflow)?;
        let result = product / from.amount as u128;
        let result = i64::try_from(result).map_err(|_| AssetError::Overflow)?;
        Ok(Asset::new(if negative { -result } else { result }, to.symbol))
    }

    /// Convert and check that the result carries `expected`.
    pub fn convert_to(&self, asset: Asset, expected: AssetSymbol) -> Result<Asset, AssetError> {
        let converted = self.convert(asset)?;
        if converted.symbol != expected {
            return Err(AssetError::SymbolMismatch {
                left: converted.symbol,
                right: expected,
            });
        }
        Ok(converted)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.base, self.quote)
    }
}
