//! Content budgets.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use tessera_types::{AccountName, Asset, Permlink, Timestamp};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: u64,
    pub owner: AccountName,
    pub content_permlink: Permlink,
    pub created: Timestamp,
    pub deadline: Timestamp,
    /// SCR still to be allocated.
    pub balance: Asset,
    pub per_block: Asset,
}

pub trait BudgetService {
    /// Insert a budget, assigning and returning its id.
    fn create_budget(&mut self, budget: Budget) -> Result<u64, StoreError>;

    fn find_budget(&self, id: u64) -> Result<Option<Budget>, StoreError>;

    fn put_budget(&mut self, budget: &Budget) -> Result<(), StoreError>;

    fn remove_budget(&mut self, id: u64) -> Result<(), StoreError>;

    /// Every budget, ordered by id.
    fn budgets(&self) -> Result<Vec<Budget>, StoreError>;

    fn budgets_of(&self, owner: &AccountName) -> Result<Vec<Budget>, StoreError>;
}
