//! In-memory project model built from the merged configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::{KeyEntry, NetworkEntry, TetherConfig};
use crate::contracts::{AliasTable, ContractSpec, DeploymentSet};
use crate::error::DeployError;
use crate::types::Address;

/// Named account with the key used to sign on its behalf.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub name: String,
    pub address: Address,
    pub key: KeyEntry,
}

impl Account {
    pub fn key_index(&self) -> u32 {
        self.key.index
    }
}

/// Read-only view of a project: accounts, networks and deployments.
#[derive(Debug, Clone)]
pub struct ProjectState {
    root: PathBuf,
    config: TetherConfig,
    accounts: BTreeMap<String, Account>,
}

impl ProjectState {
    pub fn new(root: impl Into<PathBuf>, config: TetherConfig) -> Self {
        let accounts = config
            .accounts
            .iter()
            .map(|(name, entry)| {
                (
                    name.clone(),
                    Account {
                        name: name.clone(),
                        address: entry.address,
                        key: entry.key.clone(),
                    },
                )
            })
            .collect();

        Self {
            root: root.into(),
            config,
            accounts,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &TetherConfig {
        &self.config
    }

    pub fn account(&self, name: &str) -> Option<&Account> {
        self.accounts.get(name)
    }

    pub fn account_by_address(&self, address: Address) -> Option<&Account> {
        self.accounts.values().find(|a| a.address == address)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn network(&self, name: &str) -> Result<&NetworkEntry, DeployError> {
        self.config
            .networks
            .get(name)
            .ok_or_else(|| DeployError::UnknownNetwork(name.to_string()))
    }

    /// Names of accounts that receive contracts on `network`, in declaration order.
    pub fn account_names_for_network(&self, network: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for deployment in self.config.deployments.iter().filter(|d| d.network == network) {
            if !names.contains(&deployment.account) {
                names.push(deployment.account.clone());
            }
        }
        names
    }

    /// Contract name to address mapping for contracts already deployed on `network`.
    pub fn aliases_for_network(&self, network: &str) -> AliasTable {
        let mut aliases = AliasTable::new();
        for (name, contract) in &self.config.contracts {
            if let Some(address) = contract.aliases.get(network) {
                aliases.insert(name.clone(), *address);
            }
        }
        aliases
    }

    /// Contracts targeted at `network`, flattened in declaration order.
    ///
    /// A contract listed again for the same account keeps its first entry.
    pub fn deployment_contracts(&self, network: &str) -> Result<Vec<ContractSpec>, DeployError> {
        self.network(network)?;

        let mut specs: Vec<ContractSpec> = Vec::new();
        for deployment in self.config.deployments.iter().filter(|d| d.network == network) {
            let account =
                self.account(&deployment.account)
                    .ok_or_else(|| DeployError::UnknownAccount {
                        network: network.to_string(),
                        account: deployment.account.clone(),
                    })?;

            for contract in &deployment.contracts {
                let entry = self.config.contracts.get(contract.name()).ok_or_else(|| {
                    DeployError::UnknownContract {
                        network: network.to_string(),
                        contract: contract.name().to_string(),
                    }
                })?;

                let repeated = specs
                    .iter()
                    .any(|s| s.name == contract.name() && s.account_name == account.name);
                if repeated {
                    warn!(
                        network,
                        account = %account.name,
                        contract = contract.name(),
                        "Duplicate contract entry, keeping the first"
                    );
                    continue;
                }

                specs.push(ContractSpec {
                    name: contract.name().to_string(),
                    account_name: account.name.clone(),
                    address: account.address,
                    location: entry.source.clone(),
                    args: contract.args().to_vec(),
                });
            }
        }
        Ok(specs)
    }

    /// Build the per-run deployment set for `network`.
    pub fn deployment_set(&self, network: &str) -> Result<DeploymentSet, DeployError> {
        Ok(DeploymentSet::new(
            network,
            self.deployment_contracts(network)?,
            self.aliases_for_network(network),
        ))
    }
}
