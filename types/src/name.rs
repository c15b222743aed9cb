//! Account names and comment permlinks.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const MIN_ACCOUNT_NAME_LENGTH: usize = 3;
pub const MAX_ACCOUNT_NAME_LENGTH: usize = 16;
pub const MAX_PERMLINK_LENGTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("invalid account name: {0:?}")]
    InvalidAccountName(String),

    #[error("invalid permlink: {0:?}")]
    InvalidPermlink(String),
}

/// An account name.
///
/// The empty name is a sentinel: "no proxy" on an account and "root post"
/// as a comment parent. Use [`AccountName::is_valid`] before treating a name
/// as a real account.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountName(String);

impl AccountName {
    /// Build a name without validation. Operations validate names explicitly.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Parse and validate in one step.
    pub fn parse(raw: impl Into<String>) -> Result<Self, NameError> {
        let name = Self(raw.into());
        if !name.is_valid() {
            return Err(NameError::InvalidAccountName(name.0));
        }
        Ok(name)
    }

    /// The empty sentinel.
    pub fn none() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Dot-separated segments of at least three characters, each starting
    /// with a letter, ending with a letter or digit, and otherwise made of
    /// lowercase letters, digits and dashes.
    pub fn is_valid(&self) -> bool {
        let len = self.0.len();
        if !(MIN_ACCOUNT_NAME_LENGTH..=MAX_ACCOUNT_NAME_LENGTH).contains(&len) {
            return false;
        }
        self.0.split('.').all(valid_segment)
    }
}

fn valid_segment(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    if bytes.len() < MIN_ACCOUNT_NAME_LENGTH {
        return false;
    }
    let first = bytes[0];
    let last = bytes[bytes.len() - 1];
    if !first.is_ascii_lowercase() {
        return false;
    }
    if !(last.is_ascii_lowercase() || last.is_ascii_digit()) {
        return false;
    }
    bytes
        .iter()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AccountName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// The URL-safe slug identifying a comment under its author.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Permlink(String);

impl Permlink {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.0.len() <= MAX_PERMLINK_LENGTH
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    }

    pub fn validate(&self) -> Result<(), NameError> {
        if !self.is_valid() {
            return Err(NameError::InvalidPermlink(self.0.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for Permlink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Permlink {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
