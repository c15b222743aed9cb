//! Symbol-tagged fixed-point amounts for the liquid (SCR) and stake (SP) tokens.
//!
//! Amounts are stored as signed integers in the smallest unit of their symbol.
//! Arithmetic across symbols is rejected; the only bridge between SCR and SP
//! is an explicit [`Price`](crate::Price) conversion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced by asset arithmetic and parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("symbol mismatch: {left} vs {right}")]
    SymbolMismatch {
        left: AssetSymbol,
        right: AssetSymbol,
    },

    #[error("arithmetic overflow")]
    Overflow,

    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("cannot parse asset: {0}")]
    Parse(String),
}

/// The two tokens of the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssetSymbol {
    /// Liquid token.
    Scr,
    /// Stake token (vesting shares).
    Sp,
}

impl AssetSymbol {
    /// Number of decimal places.
    pub fn precision(&self) -> u8 {
        match self {
            Self::Scr => 3,
            Self::Sp => 6,
        }
    }

    /// `10^precision`, the number of raw units in one whole token.
    pub fn unit(&self) -> i64 {
        10i64.pow(self.precision() as u32)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scr => "SCR",
            Self::Sp => "SP",
        }
    }
}

impl fmt::Display for AssetSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An amount of a single token, in raw units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub amount: i64,
    pub symbol: AssetSymbol,
}

impl Asset {
    pub const fn new(amount: i64, symbol: AssetSymbol) -> Self {
        Self { amount, symbol }
    }

    pub const fn scr(amount: i64) -> Self {
        Self::new(amount, AssetSymbol::Scr)
    }

    pub const fn sp(amount: i64) -> Self {
        Self::new(amount, AssetSymbol::Sp)
    }

    pub const fn zero(symbol: AssetSymbol) -> Self {
        Self::new(0, symbol)
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    pub fn is_negative(&self) -> bool {
        self.amount < 0
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    fn same_symbol(&self, other: &Self) -> Result<(), AssetError> {
        if self.symbol != other.symbol {
            return Err(AssetError::SymbolMismatch {
                left: self.symbol,
                right: other.symbol,
            });
        }
        Ok(())
    }

    pub fn checked_add(self, other: Self) -> Result<Self, AssetError> {
        self.same_symbol(&other)?;
        self.amount
            .checked_add(other.amount)
            .map(|amount| Self::new(amount, self.symbol))
            .ok_or(AssetError::Overflow)
    }

    pub fn checked_sub(self, other: Self) -> Result<Self, AssetError> {
        self.same_symbol(&other)?;
        self.amount
            .checked_sub(other.amount)
            .map(|amount| Self::new(amount, self.symbol))
            .ok_or(AssetError::Overflow)
    }

    /// Multiply by a scalar, failing on overflow.
    pub fn checked_mul(self, factor: i64) -> Result<Self, AssetError> {
        self.amount
            .checked_mul(factor)
            .map(|amount| Self::new(amount, self.symbol))
            .ok_or(AssetError::Overflow)
    }

    /// Integer division toward zero.
    pub fn div_floor(self, divisor: i64) -> Result<Self, AssetError> {
        if divisor == 0 {
            return Err(AssetError::Overflow);
        }
        Ok(Self::new(self.amount / divisor, self.symbol))
    }

    /// Compare two amounts of the same symbol.
    pub fn try_cmp(&self, other: &Self) -> Result<std::cmp::Ordering, AssetError> {
        self.same_symbol(other)?;
        Ok(self.amount.cmp(&other.amount))
    }

    /// `self >= other`, with mismatched symbols never comparing as greater.
    pub fn covers(&self, other: &Self) -> bool {
        self.symbol == other.symbol && self.amount >= other.amount
    }
}

impl PartialOrd for Asset {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        if self.symbol != other.symbol {
            return None;
        }
        Some(self.amount.cmp(&other.amount))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.symbol.unit();
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        let whole = abs / unit as u64;
        let frac = abs % unit as u64;
        write!(
            f,
            "{sign}{whole}.{frac:0width$} {}",
            self.symbol,
            width = self.symbol.precision() as usize
        )
    }
}

impl FromStr for Asset {
    type Err = AssetError;

    /// Parses `"1.000 SCR"` or `"0.500000 SP"`. The fractional part must use
    /// exactly the symbol's precision.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (number, symbol) = s
            .trim()
            .split_once(' ')
            .ok_or_else(|| AssetError::Parse(s.to_string()))?;
        let symbol = match symbol {
            "SCR" => AssetSymbol::Scr,
            "SP" => AssetSymbol::Sp,
            other => return Err(AssetError::Parse(format!("unknown symbol {other}"))),
        };
        let (negative, digits) = match number.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, number),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if frac.len() != symbol.precision() as usize && !(frac.is_empty() && !digits.contains('.'))
        {
            return Err(AssetError::Parse(format!(
                "{symbol} requires {} decimal places",
                symbol.precision()
            )));
        }
        let whole: i64 = whole
            .parse()
            .map_err(|_| AssetError::Parse(s.to_string()))?;
        let frac: i64 = if frac.is_empty() {
            0
        } else {
            frac.parse().map_err(|_| AssetError::Parse(s.to_string()))?
        };
        let amount = whole
            .checked_mul(symbol.unit())
            .and_then(|w| w.checked_add(frac))
            .ok_or(AssetError::Overflow)?;
        Ok(Self::new(if negative { -amount } else { amount }, symbol))
    }
}
