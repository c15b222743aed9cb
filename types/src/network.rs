//! Network identifier.

use serde::{Deserialize, Serialize};

use crate::hash::ChainId;

/// Which chain a ledger instance evaluates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    /// The production network.
    Live,
    /// The public test network, with shortened payout and lockout windows.
    Test,
}

impl NetworkId {
    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Test => "test",
        }
    }

    /// Chain id mixed into transaction digests.
    pub fn chain_id(&self) -> ChainId {
        let mut bytes = [0u8; 32];
        let tag = self.as_str().as_bytes();
        bytes[..tag.len()].copy_from_slice(tag);
        bytes[31] = match self {
            Self::Live => 1,
            Self::Test => 2,
        };
        ChainId::new(bytes)
    }
}
