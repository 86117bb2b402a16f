//! Tether Core Library
//!
//! Deploys interdependent contracts to ledger accounts: resolves imports
//! between them, orders them by dependency and commits each one through a
//! network gateway, reporting a per-contract outcome.

pub mod commands;
pub mod config;
pub mod contracts;
pub mod deploy;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod signer;
pub mod state;
pub mod transaction;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ConfigScope, ConfigStore, TetherConfig};
    pub use crate::state::{Account, ProjectState};

    // Planning
    pub use crate::contracts::{
        AliasTable, ContractUnit, DependencyGraph, DeploymentPlan, DeploymentSet, SourceLoader,
    };
    pub use crate::error::DeployError;
    pub use crate::guard::{StandardContractPrompt, StandardContractRegistry};

    // Execution
    pub use crate::deploy::{
        Deployer, DeploymentReport, RunOptions, RunStatus, UnitFailure, UnitOutcome, UnitStatus,
    };
    pub use crate::gateway::{AccountState, Gateway, TxResult};
    pub use crate::signer::{Signer, SignerProvider};
    pub use crate::transaction::{SigningRole, Transaction, TransactionTemplates};

    // Shared types
    pub use crate::types::{Address, Argument, BlockRef, TxId};
}
