//! Plan command: show the deployment order without touching the network.

use std::path::PathBuf;

use super::context::ProjectContext;
use crate::deploy::Deployer;
use crate::guard::StandardContractPrompt;
use crate::types::Address;

/// Options for the plan command
#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Network to plan for
    pub network: String,
}

impl PlanOptions {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
        }
    }
}

/// One contract in deployment order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanEntry {
    pub contract: String,
    pub account: String,
    pub address: Address,
    /// Contracts of the same run this one imports
    pub dependencies: Vec<String>,
    pub has_args: bool,
}

#[derive(Debug, Clone)]
pub struct PlanReport {
    pub network: String,
    pub entries: Vec<PlanEntry>,
}

pub struct PlanCommand {
    context: ProjectContext,
}

impl PlanCommand {
    pub fn new(global_dir: PathBuf, project_root: PathBuf) -> Self {
        Self {
            context: ProjectContext::new(global_dir, project_root),
        }
    }

    /// Create a plan command with default paths
    pub fn with_defaults() -> anyhow::Result<Self> {
        Ok(Self {
            context: ProjectContext::with_defaults()?,
        })
    }

    pub fn execute(
        &self,
        options: &PlanOptions,
        prompt: &dyn StandardContractPrompt,
    ) -> anyhow::Result<PlanReport> {
        let state = self.context.state()?;
        let loader = self.context.loader();
        let plan = Deployer::new(state, &loader, prompt).plan(&options.network)?;

        let entries = plan
            .units()
            .iter()
            .map(|unit| PlanEntry {
                contract: unit.name.clone(),
                account: unit.account_name.clone(),
                address: unit.address,
                dependencies: unit.dependencies.clone(),
                has_args: unit.has_args(),
            })
            .collect();

        Ok(PlanReport {
            network: options.network.clone(),
            entries,
        })
    }
}
