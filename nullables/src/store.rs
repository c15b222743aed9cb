//! Nullable store: ordered in-memory tables with snapshot undo sessions.

use std::collections::BTreeMap;
use tessera_store::{
    Account, AccountAuthority, AccountAuthorityService, AccountRecoveryRequest, AccountService,
    Budget, BudgetService, ChangeRecoveryAccountRequest, Comment, CommentService, CommentVote,
    Committee, CommitteeService, DeclineVotingRightsRequest, DelegationService,
    DynamicGlobalProperties, Escrow, EscrowService, GlobalPropertyService, OwnerAuthorityHistory,
    OwnerHistoryService, Proposal, ProposalService, RecoveryService, RewardFund, RewardPool,
    StoreError, UndoDatabase, VestingDelegation, VestingDelegationExpiration, WithdrawRouteService,
    WithdrawVestingRoute, Witness, WitnessService, WitnessVote,
};
use tessera_types::{AccountName, Asset, Permlink, Timestamp};

type CommentKey = (AccountName, Permlink);
type VoteKey = (AccountName, Permlink, AccountName);
type PairKey = (AccountName, AccountName);

#[derive(Clone, Debug)]
struct Tables {
    accounts: BTreeMap<AccountName, Account>,
    authorities: BTreeMap<AccountName, AccountAuthority>,
    owner_history: BTreeMap<u64, OwnerAuthorityHistory>,
    recovery_requests: BTreeMap<AccountName, AccountRecoveryRequest>,
    change_recovery_requests: BTreeMap<AccountName, ChangeRecoveryAccountRequest>,
    decline_voting_requests: BTreeMap<AccountName, DeclineVotingRightsRequest>,
    comments: BTreeMap<CommentKey, Comment>,
    comment_votes: BTreeMap<VoteKey, CommentVote>,
    witnesses: BTreeMap<AccountName, Witness>,
    /// Keyed by (witness, account).
    witness_votes: BTreeMap<PairKey, WitnessVote>,
    escrows: BTreeMap<(AccountName, u32), Escrow>,
    delegations: BTreeMap<PairKey, VestingDelegation>,
    delegation_expirations: BTreeMap<u64, VestingDelegationExpiration>,
    withdraw_routes: BTreeMap<PairKey, WithdrawVestingRoute>,
    committee: Committee,
    proposals: BTreeMap<u64, Proposal>,
    budgets: BTreeMap<u64, Budget>,
    props: DynamicGlobalProperties,
    reward_pool: RewardPool,
    reward_fund: RewardFund,
    next_id: u64,
}

impl Tables {
    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// An in-memory implementation of every service trait.
///
/// Undo sessions snapshot the whole table set, which is fine for tests and
/// replay tooling but not for a production node.
#[derive(Clone, Debug)]
pub struct NullStore {
    tables: Tables,
    sessions: Vec<Tables>,
    /// When set, authority lookups fail with this corruption message.
    authority_fault: Option<String>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::with_properties(DynamicGlobalProperties::new(
            Timestamp::EPOCH,
            Asset::scr(0),
            60,
        ))
    }

    pub fn with_properties(props: DynamicGlobalProperties) -> Self {
        Self {
            tables: Tables {
                accounts: BTreeMap::new(),
                authorities: BTreeMap::new(),
                owner_history: BTreeMap::new(),
                recovery_requests: BTreeMap::new(),
                change_recovery_requests: BTreeMap::new(),
                decline_voting_requests: BTreeMap::new(),
                comments: BTreeMap::new(),
                comment_votes: BTreeMap::new(),
                witnesses: BTreeMap::new(),
                witness_votes: BTreeMap::new(),
                escrows: BTreeMap::new(),
                delegations: BTreeMap::new(),
                delegation_expirations: BTreeMap::new(),
                withdraw_routes: BTreeMap::new(),
                committee: Committee::default(),
                proposals: BTreeMap::new(),
                budgets: BTreeMap::new(),
                props,
                reward_pool: RewardPool {
                    balance: Asset::scr(0),
                    current_per_block_reward: Asset::scr(0),
                },
                reward_fund: RewardFund {
                    reward_balance: Asset::scr(0),
                    recent_claims: 0,
                    last_update: Timestamp::EPOCH,
                },
                next_id: 0,
            },
            sessions: Vec::new(),
            authority_fault: None,
        }
    }

    /// Make every later authority lookup fail with [`StoreError::Corruption`].
    pub fn fail_authority_reads(&mut self, reason: impl Into<String>) {
        self.authority_fault = Some(reason.into());
    }

    /// Every account, ordered by name.
    pub fn accounts(&self) -> Vec<Account> {
        self.tables.accounts.values().cloned().collect()
    }

    /// Every vesting delegation, ordered by (delegator, delegatee).
    pub fn delegations(&self) -> Vec<VestingDelegation> {
        self.tables.delegations.values().cloned().collect()
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

fn missing(entity: &'static str, key: impl ToString) -> StoreError {
    StoreError::not_found(entity, key)
}

impl AccountService for NullStore {
    fn find_account(&self, name: &AccountName) -> Result<Option<Account>, StoreError> {
        Ok(self.tables.accounts.get(name).cloned())
    }

    fn create_account(&mut self, account: Account) -> Result<(), StoreError> {
        if self.tables.accounts.contains_key(&account.name) {
            return Err(StoreError::duplicate("account", &account.name));
        }
        self.tables.accounts.insert(account.name.clone(), account);
        Ok(())
    }

    fn put_account(&mut self, account: &Account) -> Result<(), StoreError> {
        match self.tables.accounts.get_mut(&account.name) {
            Some(slot) => {
                *slot = account.clone();
                Ok(())
            }
            None => Err(missing("account", &account.name)),
        }
    }

    fn accounts_due_for_withdrawal(&self, now: Timestamp) -> Result<Vec<Account>, StoreError> {
        let mut due: Vec<Account> = self
            .tables
            .accounts
            .values()
            .filter(|a| a.next_vesting_withdrawal <= now)
            .cloned()
            .collect();
        due.sort_by(|a, b| {
            a.next_vesting_withdrawal
                .cmp(&b.next_vesting_withdrawal)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(due)
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        Ok(self.tables.accounts.len() as u64)
    }
}

impl AccountAuthorityService for NullStore {
    fn find_account_authority(
        &self,
        account: &AccountName,
    ) -> Result<Option<AccountAuthority>, StoreError> {
        if let Some(reason) = &self.authority_fault {
            return Err(StoreError::Corruption(reason.clone()));
        }
        Ok(self.tables.authorities.get(account).cloned())
    }

    fn create_account_authority(&mut self, record: AccountAuthority) -> Result<(), StoreError> {
        if self.tables.authorities.contains_key(&record.account) {
            return Err(StoreError::duplicate("account authority", &record.account));
        }
        self.tables.authorities.insert(record.account.clone(), record);
        Ok(())
    }

    fn put_account_authority(&mut self, record: &AccountAuthority) -> Result<(), StoreError> {
        match self.tables.authorities.get_mut(&record.account) {
            Some(slot) => {
                *slot = record.clone();
                Ok(())
            }
            None => Err(missing("account authority", &record.account)),
        }
    }
}

impl OwnerHistoryService for NullStore {
    fn create_owner_history(
        &mut self,
        mut record: OwnerAuthorityHistory,
    ) -> Result<u64, StoreError> {
        let id = self.tables.allocate_id();
        record.id = id;
        self.tables.owner_history.insert(id, record);
        Ok(id)
    }

    fn owner_history(
        &self,
        account: &AccountName,
    ) -> Result<Vec<OwnerAuthorityHistory>, StoreError> {
        let mut history: Vec<_> = self
            .tables
            .owner_history
            .values()
            .filter(|h| &h.account == account)
            .cloned()
            .collect();
        history.sort_by(|a, b| {
            b.last_valid_time
                .cmp(&a.last_valid_time)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(history)
    }

    fn owner_history_before(
        &self,
        cutoff: Timestamp,
    ) -> Result<Vec<OwnerAuthorityHistory>, StoreError> {
        let mut history: Vec<_> = self
            .tables
            .owner_history
            .values()
            .filter(|h| h.last_valid_time < cutoff)
            .cloned()
            .collect();
        history.sort_by(|a, b| {
            a.last_valid_time
                .cmp(&b.last_valid_time)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(history)
    }

    fn remove_owner_history(&mut self, id: u64) -> Result<(), StoreError> {
        self.tables
            .owner_history
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| missing("owner authority history", id))
    }
}

impl RecoveryService for NullStore {
    fn find_recovery_request(
        &self,
        account: &AccountName,
    ) -> Result<Option<AccountRecoveryRequest>, StoreError> {
        Ok(self.tables.recovery_requests.get(account).cloned())
    }

    fn put_recovery_request(&mut self, request: &AccountRecoveryRequest) -> Result<(), StoreError> {
        self.tables
            .recovery_requests
            .insert(request.account_to_recover.clone(), request.clone());
        Ok(())
    }

    fn remove_recovery_request(&mut self, account: &AccountName) -> Result<(), StoreError> {
        self.tables
            .recovery_requests
            .remove(account)
            .map(|_| ())
            .ok_or_else(|| missing("account recovery request", account))
    }

    fn expired_recovery_requests(
        &self,
        now: Timestamp,
    ) -> Result<Vec<AccountRecoveryRequest>, StoreError> {
        let mut expired: Vec<_> = self
            .tables
            .recovery_requests
            .values()
            .filter(|r| r.expires <= now)
            .cloned()
            .collect();
        expired.sort_by_key(|r| r.expires);
        Ok(expired)
    }

    fn find_change_recovery_request(
        &self,
        account: &AccountName,
    ) -> Result<Option<ChangeRecoveryAccountRequest>, StoreError> {
        Ok(self.tables.change_recovery_requests.get(account).cloned())
    }

    fn put_change_recovery_request(
        &mut self,
        request: &ChangeRecoveryAccountRequest,
    ) -> Result<(), StoreError> {
        self.tables
            .change_recovery_requests
            .insert(request.account_to_recover.clone(), request.clone());
        Ok(())
    }

    fn remove_change_recovery_request(&mut self, account: &AccountName) -> Result<(), StoreError> {
        self.tables
            .change_recovery_requests
            .remove(account)
            .map(|_| ())
            .ok_or_else(|| missing("change recovery account request", account))
    }

    fn due_change_recovery_requests(
        &self,
        now: Timestamp,
    ) -> Result<Vec<ChangeRecoveryAccountRequest>, StoreError> {
        let mut due: Vec<_> = self
            .tables
            .change_recovery_requests
            .values()
            .filter(|r| r.effective_on <= now)
            .cloned()
            .collect();
        due.sort_by_key(|r| r.effective_on);
        Ok(due)
    }

    fn find_decline_voting_request(
        &self,
        account: &AccountName,
    ) -> Result<Option<DeclineVotingRightsRequest>, StoreError> {
        Ok(self.tables.decline_voting_requests.get(account).cloned())
    }

    fn create_decline_voting_request(
        &mut self,
        request: DeclineVotingRightsRequest,
    ) -> Result<(), StoreError> {
        if self.tables.decline_voting_requests.contains_key(&request.account) {
            return Err(StoreError::duplicate(
                "decline voting rights request",
                &request.account,
            ));
        }
        self.tables
            .decline_voting_requests
            .insert(request.account.clone(), request);
        Ok(())
    }

    fn remove_decline_voting_request(&mut self, account: &AccountName) -> Result<(), StoreError> {
        self.tables
            .decline_voting_requests
            .remove(account)
            .map(|_| ())
            .ok_or_else(|| missing("decline voting rights request", account))
    }

    fn due_decline_voting_requests(
        &self,
        now: Timestamp,
    ) -> Result<Vec<DeclineVotingRightsRequest>, StoreError> {
        let mut due: Vec<_> = self
            .tables
            .decline_voting_requests
            .values()
            .filter(|r| r.effective_date <= now)
            .cloned()
            .collect();
        due.sort_by_key(|r| r.effective_date);
        Ok(due)
    }
}

impl CommentService for NullStore {
    fn find_comment(
        &self,
        author: &AccountName,
        permlink: &Permlink,
    ) -> Result<Option<Comment>, StoreError> {
        Ok(self
            .tables
            .comments
            .get(&(author.clone(), permlink.clone()))
            .cloned())
    }

    fn create_comment(&mut self, comment: Comment) -> Result<(), StoreError> {
        let key = (comment.author.clone(), comment.permlink.clone());
        if self.tables.comments.contains_key(&key) {
            return Err(StoreError::duplicate(
                "comment",
                format!("{}/{}", key.0, key.1),
            ));
        }
        self.tables.comments.insert(key, comment);
        Ok(())
    }

    fn put_comment(&mut self, comment: &Comment) -> Result<(), StoreError> {
        let key = (comment.author.clone(), comment.permlink.clone());
        match self.tables.comments.get_mut(&key) {
            Some(slot) => {
                *slot = comment.clone();
                Ok(())
            }
            None => Err(missing("comment", format!("{}/{}", key.0, key.1))),
        }
    }

    fn remove_comment(
        &mut self,
        author: &AccountName,
        permlink: &Permlink,
    ) -> Result<(), StoreError> {
        self.tables
            .comments
            .remove(&(author.clone(), permlink.clone()))
            .map(|_| ())
            .ok_or_else(|| missing("comment", format!("{author}/{permlink}")))
    }

    fn comments_due_for_cashout(&self, now: Timestamp) -> Result<Vec<Comment>, StoreError> {
        let mut due: Vec<_> = self
            .tables
            .comments
            .values()
            .filter(|c| c.cashout_time <= now)
            .cloned()
            .collect();
        due.sort_by(|a, b| {
            a.cashout_time
                .cmp(&b.cashout_time)
                .then_with(|| (&a.author, &a.permlink).cmp(&(&b.author, &b.permlink)))
        });
        Ok(due)
    }

    fn find_comment_vote(
        &self,
        author: &AccountName,
        permlink: &Permlink,
        voter: &AccountName,
    ) -> Result<Option<CommentVote>, StoreError> {
        Ok(self
            .tables
            .comment_votes
            .get(&(author.clone(), permlink.clone(), voter.clone()))
            .cloned())
    }

    fn put_comment_vote(&mut self, vote: &CommentVote) -> Result<(), StoreError> {
        self.tables.comment_votes.insert(
            (vote.author.clone(), vote.permlink.clone(), vote.voter.clone()),
            vote.clone(),
        );
        Ok(())
    }

    fn remove_comment_vote(
        &mut self,
        author: &AccountName,
        permlink: &Permlink,
        voter: &AccountName,
    ) -> Result<(), StoreError> {
        self.tables
            .comment_votes
            .remove(&(author.clone(), permlink.clone(), voter.clone()))
            .map(|_| ())
            .ok_or_else(|| missing("comment vote", format!("{voter} on {author}/{permlink}")))
    }

    fn comment_votes(
        &self,
        author: &AccountName,
        permlink: &Permlink,
    ) -> Result<Vec<CommentVote>, StoreError> {
        Ok(self
            .tables
            .comment_votes
            .values()
            .filter(|v| &v.author == author && &v.permlink == permlink)
            .cloned()
            .collect())
    }
}

impl WitnessService for NullStore {
    fn find_witness(&self, owner: &AccountName) -> Result<Option<Witness>, StoreError> {
        Ok(self.tables.witnesses.get(owner).cloned())
    }

    fn create_witness(&mut self, witness: Witness) -> Result<(), StoreError> {
        if self.tables.witnesses.contains_key(&witness.owner) {
            return Err(StoreError::duplicate("witness", &witness.owner));
        }
        self.tables.witnesses.insert(witness.owner.clone(), witness);
        Ok(())
    }

    fn put_witness(&mut self, witness: &Witness) -> Result<(), StoreError> {
        match self.tables.witnesses.get_mut(&witness.owner) {
            Some(slot) => {
                *slot = witness.clone();
                Ok(())
            }
            None => Err(missing("witness", &witness.owner)),
        }
    }

    fn witnesses_by_vote(&self) -> Result<Vec<Witness>, StoreError> {
        let mut witnesses: Vec<_> = self.tables.witnesses.values().cloned().collect();
        witnesses.sort_by(|a, b| b.votes.cmp(&a.votes).then_with(|| a.owner.cmp(&b.owner)));
        Ok(witnesses)
    }

    fn witness_vote_exists(
        &self,
        witness: &AccountName,
        account: &AccountName,
    ) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .witness_votes
            .contains_key(&(witness.clone(), account.clone())))
    }

    fn create_witness_vote(&mut self, vote: WitnessVote) -> Result<(), StoreError> {
        let key = (vote.witness.clone(), vote.account.clone());
        if self.tables.witness_votes.contains_key(&key) {
            return Err(StoreError::duplicate(
                "witness vote",
                format!("{} for {}", key.1, key.0),
            ));
        }
        self.tables.witness_votes.insert(key, vote);
        Ok(())
    }

    fn remove_witness_vote(
        &mut self,
        witness: &AccountName,
        account: &AccountName,
    ) -> Result<(), StoreError> {
        self.tables
            .witness_votes
            .remove(&(witness.clone(), account.clone()))
            .map(|_| ())
            .ok_or_else(|| missing("witness vote", format!("{account} for {witness}")))
    }

    fn witness_votes_by_account(
        &self,
        account: &AccountName,
    ) -> Result<Vec<WitnessVote>, StoreError> {
        Ok(self
            .tables
            .witness_votes
            .values()
            .filter(|v| &v.account == account)
            .cloned()
            .collect())
    }
}

impl EscrowService for NullStore {
    fn find_escrow(
        &self,
        from: &AccountName,
        escrow_id: u32,
    ) -> Result<Option<Escrow>, StoreError> {
        Ok(self.tables.escrows.get(&(from.clone(), escrow_id)).cloned())
    }

    fn create_escrow(&mut self, escrow: Escrow) -> Result<(), StoreError> {
        let key = (escrow.from.clone(), escrow.escrow_id);
        if self.tables.escrows.contains_key(&key) {
            return Err(StoreError::duplicate(
                "escrow",
                format!("{}/{}", key.0, key.1),
            ));
        }
        self.tables.escrows.insert(key, escrow);
        Ok(())
    }

    fn put_escrow(&mut self, escrow: &Escrow) -> Result<(), StoreError> {
        let key = (escrow.from.clone(), escrow.escrow_id);
        match self.tables.escrows.get_mut(&key) {
            Some(slot) => {
                *slot = escrow.clone();
                Ok(())
            }
            None => Err(missing("escrow", format!("{}/{}", key.0, key.1))),
        }
    }

    fn remove_escrow(&mut self, from: &AccountName, escrow_id: u32) -> Result<(), StoreError> {
        self.tables
            .escrows
            .remove(&(from.clone(), escrow_id))
            .map(|_| ())
            .ok_or_else(|| missing("escrow", format!("{from}/{escrow_id}")))
    }

    fn unratified_escrows_before(&self, now: Timestamp) -> Result<Vec<Escrow>, StoreError> {
        let mut due: Vec<_> = self
            .tables
            .escrows
            .values()
            .filter(|e| !e.is_approved() && e.ratification_deadline <= now)
            .cloned()
            .collect();
        due.sort_by_key(|e| e.ratification_deadline);
        Ok(due)
    }
}

impl DelegationService for NullStore {
    fn find_delegation(
        &self,
        delegator: &AccountName,
        delegatee: &AccountName,
    ) -> Result<Option<VestingDelegation>, StoreError> {
        Ok(self
            .tables
            .delegations
            .get(&(delegator.clone(), delegatee.clone()))
            .cloned())
    }

    fn put_delegation(&mut self, delegation: &VestingDelegation) -> Result<(), StoreError> {
        self.tables.delegations.insert(
            (delegation.delegator.clone(), delegation.delegatee.clone()),
            delegation.clone(),
        );
        Ok(())
    }

    fn remove_delegation(
        &mut self,
        delegator: &AccountName,
        delegatee: &AccountName,
    ) -> Result<(), StoreError> {
        self.tables
            .delegations
            .remove(&(delegator.clone(), delegatee.clone()))
            .map(|_| ())
            .ok_or_else(|| missing("vesting delegation", format!("{delegator} to {delegatee}")))
    }

    fn create_delegation_expiration(
        &mut self,
        mut expiration: VestingDelegationExpiration,
    ) -> Result<u64, StoreError> {
        let id = self.tables.allocate_id();
        expiration.id = id;
        self.tables.delegation_expirations.insert(id, expiration);
        Ok(id)
    }

    fn due_delegation_expirations(
        &self,
        now: Timestamp,
    ) -> Result<Vec<VestingDelegationExpiration>, StoreError> {
        let mut due: Vec<_> = self
            .tables
            .delegation_expirations
            .values()
            .filter(|e| e.expiration <= now)
            .cloned()
            .collect();
        due.sort_by(|a, b| a.expiration.cmp(&b.expiration).then_with(|| a.id.cmp(&b.id)));
        Ok(due)
    }

    fn delegation_expirations_of(
        &self,
        delegator: &AccountName,
    ) -> Result<Vec<VestingDelegationExpiration>, StoreError> {
        Ok(self
            .tables
            .delegation_expirations
            .values()
            .filter(|e| &e.delegator == delegator)
            .cloned()
            .collect())
    }

    fn remove_delegation_expiration(&mut self, id: u64) -> Result<(), StoreError> {
        self.tables
            .delegation_expirations
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| missing("vesting delegation expiration", id))
    }
}

impl WithdrawRouteService for NullStore {
    fn find_withdraw_route(
        &self,
        from: &AccountName,
        to: &AccountName,
    ) -> Result<Option<WithdrawVestingRoute>, StoreError> {
        Ok(self
            .tables
            .withdraw_routes
            .get(&(from.clone(), to.clone()))
            .cloned())
    }

    fn put_withdraw_route(&mut self, route: &WithdrawVestingRoute) -> Result<(), StoreError> {
        self.tables.withdraw_routes.insert(
            (route.from_account.clone(), route.to_account.clone()),
            route.clone(),
        );
        Ok(())
    }

    fn remove_withdraw_route(
        &mut self,
        from: &AccountName,
        to: &AccountName,
    ) -> Result<(), StoreError> {
        self.tables
            .withdraw_routes
            .remove(&(from.clone(), to.clone()))
            .map(|_| ())
            .ok_or_else(|| missing("withdraw vesting route", format!("{from} to {to}")))
    }

    fn withdraw_routes_from(
        &self,
        from: &AccountName,
    ) -> Result<Vec<WithdrawVestingRoute>, StoreError> {
        Ok(self
            .tables
            .withdraw_routes
            .values()
            .filter(|r| &r.from_account == from)
            .cloned()
            .collect())
    }
}

impl CommitteeService for NullStore {
    fn committee(&self) -> Result<Committee, StoreError> {
        Ok(self.tables.committee.clone())
    }

    fn put_committee(&mut self, committee: &Committee) -> Result<(), StoreError> {
        self.tables.committee = committee.clone();
        Ok(())
    }
}

impl ProposalService for NullStore {
    fn create_proposal(&mut self, mut proposal: Proposal) -> Result<u64, StoreError> {
        let id = self.tables.allocate_id();
        proposal.id = id;
        self.tables.proposals.insert(id, proposal);
        Ok(id)
    }

    fn find_proposal(&self, id: u64) -> Result<Option<Proposal>, StoreError> {
        Ok(self.tables.proposals.get(&id).cloned())
    }

    fn put_proposal(&mut self, proposal: &Proposal) -> Result<(), StoreError> {
        match self.tables.proposals.get_mut(&proposal.id) {
            Some(slot) => {
                *slot = proposal.clone();
                Ok(())
            }
            None => Err(missing("proposal", proposal.id)),
        }
    }

    fn remove_proposal(&mut self, id: u64) -> Result<(), StoreError> {
        self.tables
            .proposals
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| missing("proposal", id))
    }

    fn expired_proposals(&self, now: Timestamp) -> Result<Vec<Proposal>, StoreError> {
        let mut expired: Vec<_> = self
            .tables
            .proposals
            .values()
            .filter(|p| p.expiration <= now)
            .cloned()
            .collect();
        expired.sort_by(|a, b| a.expiration.cmp(&b.expiration).then_with(|| a.id.cmp(&b.id)));
        Ok(expired)
    }
}

impl BudgetService for NullStore {
    fn create_budget(&mut self, mut budget: Budget) -> Result<u64, StoreError> {
        let id = self.tables.allocate_id();
        budget.id = id;
        self.tables.budgets.insert(id, budget);
        Ok(id)
    }

    fn find_budget(&self, id: u64) -> Result<Option<Budget>, StoreError> {
        Ok(self.tables.budgets.get(&id).cloned())
    }

    fn put_budget(&mut self, budget: &Budget) -> Result<(), StoreError> {
        match self.tables.budgets.get_mut(&budget.id) {
            Some(slot) => {
                *slot = budget.clone();
                Ok(())
            }
            None => Err(missing("budget", budget.id)),
        }
    }

    fn remove_budget(&mut self, id: u64) -> Result<(), StoreError> {
        self.tables
            .budgets
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| missing("budget", id))
    }

    fn budgets(&self) -> Result<Vec<Budget>, StoreError> {
        Ok(self.tables.budgets.values().cloned().collect())
    }

    fn budgets_of(&self, owner: &AccountName) -> Result<Vec<Budget>, StoreError> {
        Ok(self
            .tables
            .budgets
            .values()
            .filter(|b| &b.owner == owner)
            .cloned()
            .collect())
    }
}

impl GlobalPropertyService for NullStore {
    fn dynamic_global_properties(&self) -> Result<DynamicGlobalProperties, StoreError> {
        Ok(self.tables.props.clone())
    }

    fn put_dynamic_global_properties(
        &mut self,
        props: &DynamicGlobalProperties,
    ) -> Result<(), StoreError> {
        self.tables.props = props.clone();
        Ok(())
    }

    fn reward_pool(&self) -> Result<RewardPool, StoreError> {
        Ok(self.tables.reward_pool.clone())
    }

    fn put_reward_pool(&mut self, pool: &RewardPool) -> Result<(), StoreError> {
        self.tables.reward_pool = pool.clone();
        Ok(())
    }

    fn reward_fund(&self) -> Result<RewardFund, StoreError> {
        Ok(self.tables.reward_fund.clone())
    }

    fn put_reward_fund(&mut self, fund: &RewardFund) -> Result<(), StoreError> {
        self.tables.reward_fund = fund.clone();
        Ok(())
    }
}

impl UndoDatabase for NullStore {
    fn start_undo_session(&mut self) {
        self.sessions.push(self.tables.clone());
    }

    fn commit_session(&mut self) -> Result<(), StoreError> {
        self.sessions
            .pop()
            .map(|_| ())
            .ok_or(StoreError::NoUndoSession)
    }

    fn undo_session(&mut self) -> Result<(), StoreError> {
        let snapshot = self.sessions.pop().ok_or(StoreError::NoUndoSession)?;
        self.tables = snapshot;
        Ok(())
    }

    fn session_depth(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_types::PublicKey;

    fn account(name: &str) -> Account {
        Account::new(
            name.into(),
            Timestamp::EPOCH,
            AccountName::none(),
            PublicKey::NULL,
            String::new(),
        )
    }

    #[test]
    fn test_create_rejects_duplicates() {
        let mut store = NullStore::new();
        store.create_account(account("alice")).unwrap();
        assert!(matches!(
            store.create_account(account("alice")),
            Err(StoreError::Duplicate { .. })
        ));
        assert_eq!(store.account_count().unwrap(), 1);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = NullStore::new();
        let err = store.get_account(&"bob".into()).unwrap_err();
        assert!(err.is_not_found());
        assert!(!store.account_exists(&"bob".into()).unwrap());
    }

    #[test]
    fn test_put_requires_existing_record() {
        let mut store = NullStore::new();
        assert!(store.put_account(&account("alice")).is_err());
    }

    #[test]
    fn test_update_is_visible_immediately() {
        let mut store = NullStore::new();
        store.create_account(account("alice")).unwrap();
        store
            .update_account(&"alice".into(), |a| a.balance = Asset::scr(5))
            .unwrap();
        assert_eq!(store.get_account(&"alice".into()).unwrap().balance, Asset::scr(5));
    }

    #[test]
    fn test_undo_reverts_session() {
        let mut store = NullStore::new();
        store.create_account(account("alice")).unwrap();

        store.start_undo_session();
        store.create_account(account("bob")).unwrap();
        store
            .update_account(&"alice".into(), |a| a.balance = Asset::scr(7))
            .unwrap();
        store.undo_session().unwrap();

        assert!(!store.account_exists(&"bob".into()).unwrap());
        assert_eq!(store.get_account(&"alice".into()).unwrap().balance, Asset::scr(0));
        assert_eq!(store.session_depth(), 0);
    }

    #[test]
    fn test_nested_sessions() {
        let mut store = NullStore::new();
        store.start_undo_session();
        store.create_account(account("alice")).unwrap();
        store.start_undo_session();
        store.create_account(account("bob")).unwrap();
        store.commit_session().unwrap();
        assert_eq!(store.session_depth(), 1);
        store.undo_session().unwrap();
        assert_eq!(store.account_count().unwrap(), 0);
        assert_eq!(store.undo_session(), Err(StoreError::NoUndoSession));
    }

    #[test]
    fn test_withdrawals_ordered_by_time() {
        let mut store = NullStore::new();
        for (name, at) in [("carol", 5), ("alice", 9), ("bob", 5), ("dave", 20)] {
            let mut a = account(name);
            a.next_vesting_withdrawal = Timestamp::new(at);
            store.create_account(a).unwrap();
        }
        let due: Vec<String> = store
            .accounts_due_for_withdrawal(Timestamp::new(10))
            .unwrap()
            .into_iter()
            .map(|a| a.name.to_string())
            .collect();
        assert_eq!(due, vec!["bob", "carol", "alice"]);
    }

    #[test]
    fn test_owner_history_newest_first() {
        let mut store = NullStore::new();
        for t in [10, 30, 20] {
            store
                .create_owner_history(OwnerAuthorityHistory {
                    id: 0,
                    account: "alice".into(),
                    previous_owner_authority: tessera_authority::Authority::new(1),
                    last_valid_time: Timestamp::new(t),
                })
                .unwrap();
        }
        let times: Vec<u64> = store
            .owner_history(&"alice".into())
            .unwrap()
            .iter()
            .map(|h| h.last_valid_time.as_secs())
            .collect();
        assert_eq!(times, vec![30, 20, 10]);
        assert_eq!(store.owner_history_before(Timestamp::new(25)).unwrap().len(), 2);
    }

    #[test]
    fn test_route_total_percent() {
        let mut store = NullStore::new();
        for (to, percent) in [("bob", 2_000), ("carol", 3_000)] {
            store
                .put_withdraw_route(&WithdrawVestingRoute {
                    from_account: "alice".into(),
                    to_account: to.into(),
                    percent,
                    auto_vest: false,
                })
                .unwrap();
        }
        assert_eq!(store.total_route_percent(&"alice".into()).unwrap(), 5_000);
        store
            .remove_withdraw_route(&"alice".into(), &"bob".into())
            .unwrap();
        assert_eq!(store.total_route_percent(&"alice".into()).unwrap(), 3_000);
    }
}
