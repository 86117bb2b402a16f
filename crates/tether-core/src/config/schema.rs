//! Configuration schema for tether.toml
//!
//! Describes networks, accounts, contracts and the ordered list of
//! deployments (which contracts go to which account on which network).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Address, Argument};

/// Root configuration structure for tether.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TetherConfig {
    /// Network definitions keyed by network name
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkEntry>,

    /// Account definitions keyed by account name
    #[serde(default)]
    pub accounts: BTreeMap<String, AccountEntry>,

    /// Contract definitions keyed by contract name
    #[serde(default)]
    pub contracts: BTreeMap<String, ContractEntry>,

    /// Ordered deployment declarations
    #[serde(default)]
    pub deployments: Vec<DeploymentEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkEntry {
    /// Access API base URL
    pub host: String,

    /// Per-request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Upper bound on waiting for a transaction to settle, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle_timeout_secs: Option<u64>,
}

impl NetworkEntry {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            timeout_secs: None,
            settle_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountEntry {
    pub address: Address,
    pub key: KeyEntry,
}

/// Signing key of an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct KeyEntry {
    /// Key index on the on-chain account
    #[serde(default)]
    pub index: u32,

    /// Hex-encoded private key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,

    /// Environment variable holding the hex-encoded private key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContractEntry {
    /// Path to the contract source, relative to the project root
    pub source: String,

    /// Existing deployments of this contract, keyed by network name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, Address>,
}

/// One `[[deployments]]` entry: contracts deployed to a single account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeploymentEntry {
    pub network: String,
    pub account: String,
    #[serde(default)]
    pub contracts: Vec<DeploymentContract>,
}

/// Contract reference inside a deployment, optionally with constructor arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DeploymentContract {
    Name(String),
    WithArgs {
        name: String,
        #[serde(default)]
        args: Vec<Argument>,
    },
}

impl DeploymentContract {
    pub fn name(&self) -> &str {
        match self {
            DeploymentContract::Name(name) => name,
            DeploymentContract::WithArgs { name, .. } => name,
        }
    }

    pub fn args(&self) -> &[Argument] {
        match self {
            DeploymentContract::Name(_) => &[],
            DeploymentContract::WithArgs { args, .. } => args,
        }
    }
}

impl TetherConfig {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration written by `init`: the three well-known networks, nothing else.
    pub fn with_default_networks() -> Self {
        let mut config = Self::new();
        config.networks.insert(
            "emulator".to_string(),
            NetworkEntry::new("http://127.0.0.1:8888"),
        );
        config.networks.insert(
            "testnet".to_string(),
            NetworkEntry::new("https://rest-testnet.onflow.org"),
        );
        config.networks.insert(
            "mainnet".to_string(),
            NetworkEntry::new("https://rest-mainnet.onflow.org"),
        );
        config
    }

    /// Validate value formats and cross references.
    ///
    /// Only meaningful on a merged configuration, since one layer may refer
    /// to entries declared in another.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_values()?;
        self.validate_references()
    }

    /// Validate the entries of a single layer on their own.
    pub fn validate_values(&self) -> anyhow::Result<()> {
        for (name, network) in &self.networks {
            url::Url::parse(&network.host).map_err(|e| {
                anyhow::anyhow!("Network '{}' has an invalid host '{}': {}", name, network.host, e)
            })?;
        }

        for (name, account) in &self.accounts {
            match (&account.key.private_key, &account.key.private_key_env) {
                (Some(_), Some(_)) => anyhow::bail!(
                    "Account '{}' key must set only one of private_key or private_key_env",
                    name
                ),
                (None, None) => anyhow::bail!(
                    "Account '{}' key must set private_key or private_key_env",
                    name
                ),
                _ => {}
            }
        }
        Ok(())
    }

    fn validate_references(&self) -> anyhow::Result<()> {
        for deployment in &self.deployments {
            if !self.networks.contains_key(&deployment.network) {
                anyhow::bail!(
                    "Deployment for account '{}' references unknown network '{}'",
                    deployment.account,
                    deployment.network
                );
            }
            if !self.accounts.contains_key(&deployment.account) {
                anyhow::bail!(
                    "Deployment on network '{}' references unknown account '{}'",
                    deployment.network,
                    deployment.account
                );
            }
            for contract in &deployment.contracts {
                if !self.contracts.contains_key(contract.name()) {
                    anyhow::bail!(
                        "Deployment on network '{}' references unknown contract '{}'",
                        deployment.network,
                        contract.name()
                    );
                }
            }
        }

        Ok(())
    }
}
