//! Deployment execution: per-contract commit protocol and run reports.

pub mod executor;
pub mod outcome;
pub mod service;

pub use executor::{Action, Executor, UnitFailure, decide};
pub use outcome::{DeploymentReport, RunStatus, UnitOutcome, UnitStage, UnitStatus};
pub use service::{Deployer, RunOptions};
