//! Deploy command implementation.
//!
//! Loads the project, plans the target network and commits every contract
//! through the network's access API.

use std::path::PathBuf;

use super::context::ProjectContext;
use crate::deploy::{Deployer, DeploymentReport, RunOptions};
use crate::gateway::{Gateway, RestGateway};
use crate::guard::StandardContractPrompt;
use crate::signer::KeyringSigners;
use crate::transaction::CadenceTemplates;

/// Options for the deploy command
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Network to deploy to
    pub network: String,
    /// Update contracts whose code changed
    pub update: bool,
    /// Account paying for all transactions
    pub payer: Option<String>,
}

impl DeployOptions {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            update: false,
            payer: None,
        }
    }

    /// Set the update flag
    pub fn with_update(mut self, update: bool) -> Self {
        self.update = update;
        self
    }

    /// Set the paying account
    pub fn with_payer(mut self, payer: impl Into<String>) -> Self {
        self.payer = Some(payer.into());
        self
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            update: self.update,
            payer: self.payer.clone(),
        }
    }
}

pub struct DeployCommand {
    context: ProjectContext,
}

impl DeployCommand {
    pub fn new(global_dir: PathBuf, project_root: PathBuf) -> Self {
        Self {
            context: ProjectContext::new(global_dir, project_root),
        }
    }

    /// Create a deploy command with default paths
    pub fn with_defaults() -> anyhow::Result<Self> {
        Ok(Self {
            context: ProjectContext::with_defaults()?,
        })
    }

    pub fn context(&self) -> &ProjectContext {
        &self.context
    }

    /// Deploy through the network's configured access API.
    pub fn execute(
        &self,
        options: &DeployOptions,
        prompt: &dyn StandardContractPrompt,
    ) -> anyhow::Result<DeploymentReport> {
        let state = self.context.state()?;
        let gateway = RestGateway::for_network(state.network(&options.network)?)?;
        self.execute_with_gateway(options, prompt, &gateway)
    }

    /// Deploy through an explicit gateway.
    pub fn execute_with_gateway(
        &self,
        options: &DeployOptions,
        prompt: &dyn StandardContractPrompt,
        gateway: &dyn Gateway,
    ) -> anyhow::Result<DeploymentReport> {
        let state = self.context.state()?;
        let loader = self.context.loader();
        let signers = KeyringSigners::from_state(state);

        let report = Deployer::new(state, &loader, prompt).deploy(
            &options.network,
            &options.run_options(),
            gateway,
            &signers,
            &CadenceTemplates,
        )?;
        Ok(report)
    }
}
