//! Network access used by the deployment executor.

pub mod rest;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use rest::RestGateway;

use crate::transaction::Transaction;
use crate::types::{Address, BlockRef, TxId};

/// One key registered on an on-chain account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountKey {
    pub index: u32,
    pub sequence_number: u64,
}

/// On-chain state of an account as seen by the executor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountState {
    pub address: Address,
    pub keys: Vec<AccountKey>,
    /// Deployed contract code by contract name
    pub contracts: BTreeMap<String, Vec<u8>>,
}

impl AccountState {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    pub fn key(&self, index: u32) -> Option<&AccountKey> {
        self.keys.iter().find(|k| k.index == index)
    }

    pub fn contract(&self, name: &str) -> Option<&[u8]> {
        self.contracts.get(name).map(Vec::as_slice)
    }
}

/// Final result of a settled transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxResult {
    /// Execution error reported by the chain
    pub error: Option<String>,
}

impl TxResult {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.error.is_some()
    }
}

/// Access to a ledger network.
///
/// Errors are transport failures. A chain-level rejection is a successful
/// call returning a [`TxResult`] with an error.
pub trait Gateway {
    fn latest_block(&self) -> anyhow::Result<BlockRef>;

    fn account(&self, address: Address) -> anyhow::Result<AccountState>;

    fn submit(&self, transaction: &Transaction) -> anyhow::Result<TxId>;

    /// Wait until `id` settles. `None` when the network has no result for it.
    fn await_result(&self, id: &TxId) -> anyhow::Result<Option<TxResult>>;
}
