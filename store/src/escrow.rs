//! Three-party escrow records.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use tessera_types::{AccountName, Asset, Timestamp};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escrow {
    pub escrow_id: u32,
    pub from: AccountName,
    pub to: AccountName,
    pub agent: AccountName,
    pub ratification_deadline: Timestamp,
    pub escrow_expiration: Timestamp,
    pub scr_balance: Asset,
    /// Agent fee, held until both `to` and `agent` approve.
    pub pending_fee: Asset,
    pub to_approved: bool,
    pub agent_approved: bool,
    pub disputed: bool,
}

impl Escrow {
    pub fn is_approved(&self) -> bool {
        self.to_approved && self.agent_approved
    }
}

pub trait EscrowService {
    fn find_escrow(&self, from: &AccountName, escrow_id: u32) -> Result<Option<Escrow>, StoreError>;

    fn create_escrow(&mut self, escrow: Escrow) -> Result<(), StoreError>;

    fn put_escrow(&mut self, escrow: &Escrow) -> Result<(), StoreError>;

    fn remove_escrow(&mut self, from: &AccountName, escrow_id: u32) -> Result<(), StoreError>;

    /// Escrows not yet approved by both parties whose ratification deadline
    /// is at or before `now`, ordered by deadline.
    fn unratified_escrows_before(&self, now: Timestamp) -> Result<Vec<Escrow>, StoreError>;

    fn get_escrow(&self, from: &AccountName, escrow_id: u32) -> Result<Escrow, StoreError> {
        self.find_escrow(from, escrow_id)?
            .ok_or_else(|| StoreError::not_found("escrow", format!("{from}/{escrow_id}")))
    }
}
