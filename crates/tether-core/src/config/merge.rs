//! Configuration layer merging logic
//!
//! Global -> Project. Keyed sections are replaced entry by entry; deployments
//! are replaced per network.

use std::collections::BTreeSet;

use super::schema::TetherConfig;

/// Merge the global and project layers into one configuration.
pub fn merge_configs(global: Option<TetherConfig>, project: Option<TetherConfig>) -> TetherConfig {
    let mut merged = global.unwrap_or_default();

    if let Some(layer) = project {
        merge_layer(&mut merged, layer);
    }

    merged
}

fn merge_layer(base: &mut TetherConfig, layer: TetherConfig) {
    base.networks.extend(layer.networks);
    base.accounts.extend(layer.accounts);
    base.contracts.extend(layer.contracts);

    // A network declared in the overlay owns all of its deployments.
    let overridden: BTreeSet<String> = layer
        .deployments
        .iter()
        .map(|d| d.network.clone())
        .collect();
    base.deployments
        .retain(|d| !overridden.contains(&d.network));
    base.deployments.extend(layer.deployments);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{DeploymentContract, DeploymentEntry, NetworkEntry};

    fn deployment(network: &str, account: &str, contract: &str) -> DeploymentEntry {
        DeploymentEntry {
            network: network.to_string(),
            account: account.to_string(),
            contracts: vec![DeploymentContract::Name(contract.to_string())],
        }
    }

    #[test]
    fn project_overrides_network_host() {
        let mut global = TetherConfig::with_default_networks();
        global
            .networks
            .insert("custom".to_string(), NetworkEntry::new("http://global:1"));
        let mut project = TetherConfig::new();
        project
            .networks
            .insert("emulator".to_string(), NetworkEntry::new("http://localhost:9999"));

        let merged = merge_configs(Some(global), Some(project));
        assert_eq!(merged.networks["emulator"].host, "http://localhost:9999");
        assert_eq!(merged.networks["custom"].host, "http://global:1");
        assert!(merged.networks.contains_key("mainnet"));
    }

    #[test]
    fn project_deployments_replace_per_network() {
        let mut global = TetherConfig::new();
        global.deployments.push(deployment("emulator", "alice", "A"));
        global.deployments.push(deployment("testnet", "alice", "A"));
        let mut project = TetherConfig::new();
        project.deployments.push(deployment("emulator", "bob", "B"));

        let merged = merge_configs(Some(global), Some(project));
        assert_eq!(merged.deployments.len(), 2);
        assert_eq!(merged.deployments[0].network, "testnet");
        assert_eq!(merged.deployments[1].account, "bob");
    }

    #[test]
    fn missing_layers_yield_empty_config() {
        let merged = merge_configs(None, None);
        assert_eq!(merged, TetherConfig::default());
    }
}
