//! Per-contract outcomes and the aggregate report of a run.

use std::fmt;

use chrono::{DateTime, Utc};

use super::UnitFailure;
use crate::types::{Address, TxId};

/// Progress of one contract through the commit protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UnitStage {
    Pending,
    BlockFetched,
    AccountFetched,
    Skipped,
    Built,
    Signed,
    Submitted,
    Settled,
    Failed,
}

impl fmt::Display for UnitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitStage::Pending => "pending",
            UnitStage::BlockFetched => "block-fetched",
            UnitStage::AccountFetched => "account-fetched",
            UnitStage::Skipped => "skipped",
            UnitStage::Built => "built",
            UnitStage::Signed => "signed",
            UnitStage::Submitted => "submitted",
            UnitStage::Settled => "settled",
            UnitStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum UnitStatus {
    Deployed,
    Updated,
    SkippedNoDiff,
    Failed(UnitFailure),
}

impl UnitStatus {
    pub fn label(&self) -> &'static str {
        match self {
            UnitStatus::Deployed => "deployed",
            UnitStatus::Updated => "updated",
            UnitStatus::SkippedNoDiff => "skipped",
            UnitStatus::Failed(_) => "failed",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, UnitStatus::Failed(_))
    }
}

/// Result of deploying one contract. Never changes once recorded.
#[derive(Debug)]
pub struct UnitOutcome {
    pub contract: String,
    pub account: String,
    pub address: Address,
    pub status: UnitStatus,
    /// Final stage: `Settled`, `Skipped` or `Failed`
    pub stage: UnitStage,
    /// Last stage completed before a failure
    pub failed_after: Option<UnitStage>,
    pub tx_id: Option<TxId>,
}

impl UnitOutcome {
    pub fn failure(&self) -> Option<&UnitFailure> {
        match &self.status {
            UnitStatus::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// One-line description naming the contract and what happened to it.
    pub fn describe(&self) -> String {
        match &self.status {
            UnitStatus::Deployed => format!("{} -> {} (deployed)", self.contract, self.address),
            UnitStatus::Updated => format!("{} -> {} (updated)", self.contract, self.address),
            UnitStatus::SkippedNoDiff => {
                format!("{} -> {} (no changes, skipped)", self.contract, self.address)
            }
            UnitStatus::Failed(failure) => format!(
                "{} -> {} failed: {}",
                self.contract, self.address, failure
            ),
        }
    }
}

/// Overall result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every contract was deployed or updated
    FullySucceeded,
    /// Nothing failed but some contracts were unchanged
    SucceededWithSkips,
    /// At least one contract failed
    CompletedWithFailures,
}

/// Ordered outcomes of one deployment run.
#[derive(Debug)]
pub struct DeploymentReport {
    pub network: String,
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<UnitOutcome>,
}

impl DeploymentReport {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            started_at: Utc::now(),
            outcomes: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn count(&self, predicate: impl Fn(&UnitStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.status)).count()
    }

    pub fn deployed(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Deployed))
    }

    /// Number of update transactions that settled.
    pub fn updates(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Updated))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::SkippedNoDiff))
    }

    pub fn failed(&self) -> usize {
        self.count(UnitStatus::is_failed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &UnitOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_failed())
    }

    pub fn status(&self) -> RunStatus {
        if self.failed() > 0 {
            RunStatus::CompletedWithFailures
        } else if self.skipped() > 0 {
            RunStatus::SucceededWithSkips
        } else {
            RunStatus::FullySucceeded
        }
    }

    /// True when no contract ended in a failed state.
    pub fn is_success(&self) -> bool {
        self.status() != RunStatus::CompletedWithFailures
    }

    pub fn outcome(&self, contract: &str) -> Option<&UnitOutcome> {
        self.outcomes.iter().find(|o| o.contract == contract)
    }
}
