//! Deploy a project to one network.

use tracing::info;

use super::{DeploymentReport, Executor};
use crate::contracts::{DependencyGraph, DeploymentPlan, SourceLoader, prepare_units};
use crate::error::DeployError;
use crate::gateway::Gateway;
use crate::guard::{
    StandardContractPrompt, StandardContractRegistry, apply_standard_contracts, check_conflicts,
};
use crate::signer::SignerProvider;
use crate::state::ProjectState;
use crate::transaction::TransactionTemplates;

/// Settings for one deployment run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Replace contracts that already exist with different code
    pub update: bool,
    /// Account paying for every transaction, defaults to each target account
    pub payer: Option<String>,
}

impl RunOptions {
    pub fn with_update(mut self, update: bool) -> Self {
        self.update = update;
        self
    }

    pub fn with_payer(mut self, payer: impl Into<String>) -> Self {
        self.payer = Some(payer.into());
        self
    }
}

/// Wires pre-flight checks, planning and execution together.
pub struct Deployer<'a> {
    state: &'a ProjectState,
    loader: &'a dyn SourceLoader,
    prompt: &'a dyn StandardContractPrompt,
    registry: StandardContractRegistry,
}

impl<'a> Deployer<'a> {
    pub fn new(
        state: &'a ProjectState,
        loader: &'a dyn SourceLoader,
        prompt: &'a dyn StandardContractPrompt,
    ) -> Self {
        Self {
            state,
            loader,
            prompt,
            registry: StandardContractRegistry::mainnet(),
        }
    }

    pub fn with_registry(mut self, registry: StandardContractRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Check, resolve and order the contracts of `network` without any network call.
    pub fn plan(&self, network: &str) -> Result<DeploymentPlan, DeployError> {
        let mut set = self.state.deployment_set(network)?;
        check_conflicts(&set)?;
        apply_standard_contracts(&mut set, &self.registry, self.prompt)?;

        let units = prepare_units(&set, self.loader)?;
        let graph = DependencyGraph::build(units)?;
        let plan = DeploymentPlan::from_graph(graph)?;

        info!(
            network,
            contracts = plan.len(),
            accounts = ?self.state.account_names_for_network(network),
            "Planned deployment order: {}",
            plan.names().join(", ")
        );
        Ok(plan)
    }

    /// Plan `network`, then commit every contract through `gateway`.
    ///
    /// Structural problems are returned as errors before the gateway is
    /// touched. Per-contract failures are part of the report.
    pub fn deploy(
        &self,
        network: &str,
        options: &RunOptions,
        gateway: &dyn Gateway,
        signers: &dyn SignerProvider,
        templates: &dyn TransactionTemplates,
    ) -> Result<DeploymentReport, DeployError> {
        let payer = match &options.payer {
            Some(name) => Some(self.state.account(name).ok_or_else(|| {
                DeployError::UnknownAccount {
                    network: network.to_string(),
                    account: name.clone(),
                }
            })?),
            None => None,
        };

        let plan = self.plan(network)?;

        let report = Executor::new(self.state, gateway, signers, templates)
            .with_update(options.update)
            .with_payer(payer)
            .execute(network, &plan);
        Ok(report)
    }
}
