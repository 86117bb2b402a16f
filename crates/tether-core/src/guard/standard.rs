//! Well-known contracts on the canonical network.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::contracts::DeploymentSet;
use crate::error::DeployError;
use crate::types::Address;

/// Network on which standard contracts already exist.
pub const CANONICAL_NETWORK: &str = "mainnet";

/// A contract already deployed at a fixed address on the canonical network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardContract {
    pub name: String,
    pub address: Address,
    pub info_link: String,
}

/// Lookup of standard contracts by name.
#[derive(Debug, Clone, Default)]
pub struct StandardContractRegistry {
    network: String,
    contracts: BTreeMap<String, StandardContract>,
}

const MAINNET_CONTRACTS: &[(&str, [u8; 8], &str)] = &[
    (
        "FungibleToken",
        [0xf2, 0x33, 0xdc, 0xee, 0x88, 0xfe, 0x0a, 0xbe],
        "https://developers.flow.com/flow/core-contracts/fungible-token",
    ),
    (
        "FlowToken",
        [0x16, 0x54, 0x65, 0x33, 0x99, 0x04, 0x0a, 0x61],
        "https://developers.flow.com/flow/core-contracts/flow-token",
    ),
    (
        "FlowFees",
        [0xf9, 0x19, 0xee, 0x77, 0x44, 0x7b, 0x74, 0x97],
        "https://developers.flow.com/flow/core-contracts/flow-fees",
    ),
    (
        "FlowServiceAccount",
        [0xe4, 0x67, 0xb9, 0xdd, 0x11, 0xfa, 0x00, 0xdf],
        "https://developers.flow.com/flow/core-contracts/service-account",
    ),
    (
        "FlowStorageFees",
        [0xe4, 0x67, 0xb9, 0xdd, 0x11, 0xfa, 0x00, 0xdf],
        "https://developers.flow.com/flow/core-contracts/service-account",
    ),
    (
        "FlowIDTableStaking",
        [0x86, 0x24, 0xb5, 0x2f, 0x9d, 0xdc, 0xd0, 0x4a],
        "https://developers.flow.com/flow/core-contracts/staking-contract-reference",
    ),
    (
        "FlowEpoch",
        [0x86, 0x24, 0xb5, 0x2f, 0x9d, 0xdc, 0xd0, 0x4a],
        "https://developers.flow.com/flow/core-contracts/epoch-contract-reference",
    ),
    (
        "FlowClusterQC",
        [0x86, 0x24, 0xb5, 0x2f, 0x9d, 0xdc, 0xd0, 0x4a],
        "https://developers.flow.com/flow/core-contracts/epoch-contract-reference",
    ),
    (
        "FlowDKG",
        [0x86, 0x24, 0xb5, 0x2f, 0x9d, 0xdc, 0xd0, 0x4a],
        "https://developers.flow.com/flow/core-contracts/epoch-contract-reference",
    ),
    (
        "NonFungibleToken",
        [0x1d, 0x7e, 0x57, 0xaa, 0x55, 0x81, 0x74, 0x48],
        "https://developers.flow.com/flow/core-contracts/non-fungible-token",
    ),
    (
        "MetadataViews",
        [0x1d, 0x7e, 0x57, 0xaa, 0x55, 0x81, 0x74, 0x48],
        "https://developers.flow.com/flow/core-contracts/nft-metadata",
    ),
];

impl StandardContractRegistry {
    /// Empty registry scoped to `network`.
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            contracts: BTreeMap::new(),
        }
    }

    /// Core contracts deployed on mainnet.
    pub fn mainnet() -> Self {
        let mut registry = Self::new(CANONICAL_NETWORK);
        for (name, address, link) in MAINNET_CONTRACTS {
            registry.insert(StandardContract {
                name: name.to_string(),
                address: Address::new(*address),
                info_link: link.to_string(),
            });
        }
        registry
    }

    pub fn insert(&mut self, contract: StandardContract) {
        self.contracts.insert(contract.name.clone(), contract);
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn get(&self, name: &str) -> Option<&StandardContract> {
        self.contracts.get(name)
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

/// Asks whether the existing copy of a standard contract should be used.
pub trait StandardContractPrompt {
    /// `Ok(true)` replaces the contract with its canonical address.
    fn use_existing(&self, contract: &StandardContract) -> anyhow::Result<bool>;
}

/// Always reuse the existing contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl StandardContractPrompt for AcceptAll {
    fn use_existing(&self, _contract: &StandardContract) -> anyhow::Result<bool> {
        Ok(true)
    }
}

/// Never reuse; deploy every contract as declared.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclineAll;

impl StandardContractPrompt for DeclineAll {
    fn use_existing(&self, _contract: &StandardContract) -> anyhow::Result<bool> {
        Ok(false)
    }
}

/// Offer every standard contract in `set` to `prompt`.
///
/// Only applies when the set targets the registry's network. Accepted
/// contracts are dropped from the set and aliased to their canonical address.
/// Returns the names that were replaced.
pub fn apply_standard_contracts(
    set: &mut DeploymentSet,
    registry: &StandardContractRegistry,
    prompt: &dyn StandardContractPrompt,
) -> Result<Vec<String>, DeployError> {
    if set.network() != registry.network() {
        return Ok(Vec::new());
    }

    let matches: Vec<StandardContract> = set
        .contracts()
        .iter()
        .filter_map(|c| registry.get(&c.name).cloned())
        .collect();

    let mut replaced = Vec::new();
    for standard in matches {
        warn!(
            contract = %standard.name,
            address = %standard.address,
            link = %standard.info_link,
            "Standard contract is already deployed on {}",
            registry.network()
        );

        let accepted = prompt.use_existing(&standard).map_err(DeployError::Guard)?;
        if accepted && set.replace_with_alias(&standard.name, standard.address) {
            info!(contract = %standard.name, "Using existing deployment at {}", standard.address);
            replaced.push(standard.name);
        }
    }
    Ok(replaced)
}
