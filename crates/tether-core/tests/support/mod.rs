//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use tether_core::config::parse_tether_toml_str;
use tether_core::gateway::{AccountKey, AccountState, Gateway, TxResult};
use tether_core::signer::{Signer, SignerProvider};
use tether_core::state::{Account, ProjectState};
use tether_core::transaction::Transaction;
use tether_core::types::{Address, BlockRef, TxId};

/// Gateway call as seen by [`MockGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    LatestBlock,
    Account(Address),
    Submit(String),
    AwaitResult(TxId),
}

/// In-memory ledger that records every call.
///
/// Accepted transactions are applied to the account state once their result
/// is awaited, so later units observe earlier ones.
#[derive(Default)]
pub struct MockGateway {
    accounts: RefCell<BTreeMap<Address, AccountState>>,
    calls: RefCell<Vec<Call>>,
    submitted: RefCell<Vec<Transaction>>,
    pending: RefCell<HashMap<TxId, Transaction>>,
    rejected: BTreeMap<String, String>,
    failing_submissions: BTreeSet<String>,
    lost_results: BTreeSet<String>,
    unreachable_accounts: BTreeSet<Address>,
    next_id: Cell<u64>,
    height: Cell<u64>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an on-chain account with key 0 at sequence number 0.
    pub fn with_account(self, address: &str) -> Self {
        self.with_account_keys(address, &[0])
    }

    pub fn with_account_keys(self, address: &str, key_indices: &[u32]) -> Self {
        let address: Address = address.parse().unwrap();
        let mut state = AccountState::new(address);
        state.keys = key_indices
            .iter()
            .map(|&index| AccountKey {
                index,
                sequence_number: 0,
            })
            .collect();
        self.accounts.borrow_mut().insert(address, state);
        self
    }

    /// Place contract code on an account, as if deployed earlier.
    pub fn with_contract(self, address: &str, name: &str, code: &str) -> Self {
        let address: Address = address.parse().unwrap();
        self.accounts
            .borrow_mut()
            .entry(address)
            .or_insert_with(|| AccountState::new(address))
            .contracts
            .insert(name.to_string(), code.as_bytes().to_vec());
        self
    }

    /// Settle transactions for contract `name` with an execution error.
    pub fn rejecting(mut self, name: &str, message: &str) -> Self {
        self.rejected.insert(name.to_string(), message.to_string());
        self
    }

    pub fn failing_submission(mut self, name: &str) -> Self {
        self.failing_submissions.insert(name.to_string());
        self
    }

    /// Return no result for transactions deploying `name`.
    pub fn losing_result(mut self, name: &str) -> Self {
        self.lost_results.insert(name.to_string());
        self
    }

    pub fn unreachable_account(mut self, address: &str) -> Self {
        self.unreachable_accounts.insert(address.parse().unwrap());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn submitted(&self) -> Vec<Transaction> {
        self.submitted.borrow().clone()
    }

    pub fn submissions(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Submit(_)))
            .count()
    }

    pub fn contract_code(&self, address: &str, name: &str) -> Option<String> {
        let address: Address = address.parse().unwrap();
        self.accounts
            .borrow()
            .get(&address)
            .and_then(|state| state.contracts.get(name).cloned())
            .map(|code| String::from_utf8(code).unwrap())
    }

    pub fn sequence_number(&self, address: &str, key_index: u32) -> u64 {
        let address: Address = address.parse().unwrap();
        self.accounts.borrow()[&address]
            .key(key_index)
            .unwrap()
            .sequence_number
    }

    fn apply(&self, transaction: &Transaction) {
        let (name, code) = contract_of(transaction);
        let mut accounts = self.accounts.borrow_mut();
        let proposer = &transaction.proposal_key;
        if let Some(state) = accounts.get_mut(&proposer.address)
            && let Some(key) = state.keys.iter_mut().find(|k| k.index == proposer.key_index)
        {
            key.sequence_number += 1;
        }
        let target = transaction.authorizers[0];
        accounts
            .entry(target)
            .or_insert_with(|| AccountState::new(target))
            .contracts
            .insert(name, code.into_bytes());
    }
}

/// Contract name and decoded code carried by a deployment transaction.
pub fn contract_of(transaction: &Transaction) -> (String, String) {
    let name = transaction.arguments[0].value.as_str().unwrap().to_string();
    let code_hex = transaction.arguments[1].value.as_str().unwrap();
    let code = String::from_utf8(hex::decode(code_hex).unwrap()).unwrap();
    (name, code)
}

pub fn is_update(transaction: &Transaction) -> bool {
    transaction.script.contains("update__experimental")
}

impl Gateway for MockGateway {
    fn latest_block(&self) -> anyhow::Result<BlockRef> {
        self.calls.borrow_mut().push(Call::LatestBlock);
        self.height.set(self.height.get() + 1);
        Ok(BlockRef {
            id: format!("block-{}", self.height.get()),
            height: self.height.get(),
        })
    }

    fn account(&self, address: Address) -> anyhow::Result<AccountState> {
        self.calls.borrow_mut().push(Call::Account(address));
        if self.unreachable_accounts.contains(&address) {
            anyhow::bail!("connection refused");
        }
        self.accounts
            .borrow()
            .get(&address)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("account {} not found", address))
    }

    fn submit(&self, transaction: &Transaction) -> anyhow::Result<TxId> {
        let (name, _) = contract_of(transaction);
        self.calls.borrow_mut().push(Call::Submit(name.clone()));
        if self.failing_submissions.contains(&name) {
            anyhow::bail!("HTTP 503");
        }
        self.next_id.set(self.next_id.get() + 1);
        let id = TxId(format!("tx{:04}", self.next_id.get()));
        self.submitted.borrow_mut().push(transaction.clone());
        self.pending
            .borrow_mut()
            .insert(id.clone(), transaction.clone());
        Ok(id)
    }

    fn await_result(&self, id: &TxId) -> anyhow::Result<Option<TxResult>> {
        self.calls.borrow_mut().push(Call::AwaitResult(id.clone()));
        let Some(transaction) = self.pending.borrow_mut().remove(id) else {
            return Ok(None);
        };
        let (name, _) = contract_of(&transaction);
        if self.lost_results.contains(&name) {
            return Ok(None);
        }
        if let Some(message) = self.rejected.get(&name) {
            return Ok(Some(TxResult::rejected(message.clone())));
        }
        self.apply(&transaction);
        Ok(Some(TxResult::success()))
    }
}

/// Signer producing `address || message length` so tests can tell signers apart.
pub struct FixedSigner(Address);

impl Signer for FixedSigner {
    fn sign(&self, message: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut signature = self.0.as_bytes().to_vec();
        signature.extend_from_slice(&(message.len() as u64).to_be_bytes());
        Ok(signature)
    }
}

/// Provides a [`FixedSigner`] for every account except the ones marked missing.
#[derive(Default)]
pub struct FixedSigners {
    missing: BTreeSet<String>,
    requests: RefCell<Vec<(String, u32)>>,
}

impl FixedSigners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without(mut self, account: &str) -> Self {
        self.missing.insert(account.to_string());
        self
    }

    pub fn requests(&self) -> Vec<(String, u32)> {
        self.requests.borrow().clone()
    }
}

impl SignerProvider for FixedSigners {
    fn signer_for(&self, account: &Account, key_index: u32) -> anyhow::Result<Box<dyn Signer>> {
        self.requests
            .borrow_mut()
            .push((account.name.clone(), key_index));
        if self.missing.contains(&account.name) {
            anyhow::bail!("no key available for '{}'", account.name);
        }
        Ok(Box::new(FixedSigner(account.address)))
    }
}

/// Project state from inline TOML, validated like a merged configuration.
pub fn project(toml: &str) -> ProjectState {
    let config = parse_tether_toml_str(toml).unwrap();
    config.validate().unwrap();
    ProjectState::new("/project", config)
}

pub fn address(hex: &str) -> Address {
    hex.parse().unwrap()
}
