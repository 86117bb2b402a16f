//! Contract preparation: source loading, import resolution, graph and plan.

pub mod graph;
pub mod loader;
pub mod planner;
pub mod resolver;

use std::collections::BTreeMap;

use crate::error::DeployError;
use crate::types::{Address, Argument};

pub use graph::DependencyGraph;
pub use loader::{FilesystemLoader, MemoryLoader, SourceLoader};
pub use planner::DeploymentPlan;
pub use resolver::{
    ImportLine, ImportLocation, ImportResolver, ImportStatement, ResolvedSource, classify_line,
};

/// Contract name to address mapping, scoped to one network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable(BTreeMap<String, Address>);

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, address: Address) -> Option<Address> {
        self.0.insert(name.into(), address)
    }

    pub fn get(&self, name: &str) -> Option<Address> {
        self.0.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Address)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, Address)> for AliasTable {
    fn from_iter<I: IntoIterator<Item = (String, Address)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A contract as declared for one network, before its source is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractSpec {
    pub name: String,
    pub account_name: String,
    pub address: Address,
    /// Source location understood by a [`SourceLoader`]
    pub location: String,
    pub args: Vec<Argument>,
}

/// Contracts and aliases for a single deployment run on one network.
///
/// Owned by the run; pre-flight checks may remove contracts from it and add
/// aliases, without touching the loaded project.
#[derive(Debug, Clone)]
pub struct DeploymentSet {
    network: String,
    contracts: Vec<ContractSpec>,
    aliases: AliasTable,
}

impl DeploymentSet {
    pub fn new(
        network: impl Into<String>,
        contracts: Vec<ContractSpec>,
        aliases: AliasTable,
    ) -> Self {
        Self {
            network: network.into(),
            contracts,
            aliases,
        }
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn contracts(&self) -> &[ContractSpec] {
        &self.contracts
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Stop deploying `name` and resolve imports of it to `address` instead.
    pub fn replace_with_alias(&mut self, name: &str, address: Address) -> bool {
        let before = self.contracts.len();
        self.contracts.retain(|c| c.name != name);
        self.aliases.insert(name, address);
        before != self.contracts.len()
    }
}

/// A contract ready for planning: source loaded and imports bound to addresses.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractUnit {
    pub name: String,
    pub account_name: String,
    pub address: Address,
    pub location: String,
    pub args: Vec<Argument>,
    /// Source text as written
    pub source: String,
    /// Source text with every import bound to an address
    pub code: String,
    /// Names of contracts in the same run that this one imports
    pub dependencies: Vec<String>,
}

impl ContractUnit {
    pub fn has_args(&self) -> bool {
        !self.args.is_empty()
    }
}

/// Load and resolve every contract of the set, in declaration order.
pub fn prepare_units(
    set: &DeploymentSet,
    loader: &dyn SourceLoader,
) -> Result<Vec<ContractUnit>, DeployError> {
    let resolver = ImportResolver::new(set.aliases(), set.contracts());

    set.contracts()
        .iter()
        .map(|spec| {
            let source = loader
                .load(&spec.location)
                .map_err(|source| DeployError::SourceLoad {
                    contract: spec.name.clone(),
                    location: spec.location.clone(),
                    source,
                })?;
            let resolved = resolver.resolve(&spec.name, &source)?;

            Ok(ContractUnit {
                name: spec.name.clone(),
                account_name: spec.account_name.clone(),
                address: spec.address,
                location: spec.location.clone(),
                args: spec.args.clone(),
                source,
                code: resolved.code,
                dependencies: resolved.dependencies,
            })
        })
        .collect()
}
