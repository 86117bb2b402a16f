//! Contract name collision check.

use std::collections::BTreeMap;

use crate::contracts::DeploymentSet;
use crate::error::DeployError;

/// Fail if any contract name is assigned to more than one account.
///
/// Reports the first colliding name in declaration order, together with
/// every account it is assigned to.
pub fn check_conflicts(set: &DeploymentSet) -> Result<(), DeployError> {
    let mut owners: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut order: Vec<&str> = Vec::new();

    for contract in set.contracts() {
        let accounts = owners.entry(contract.name.as_str()).or_insert_with(|| {
            order.push(contract.name.as_str());
            Vec::new()
        });
        if !accounts.contains(&contract.account_name.as_str()) {
            accounts.push(contract.account_name.as_str());
        }
    }

    for name in order {
        let accounts = &owners[name];
        if accounts.len() > 1 {
            return Err(DeployError::ContractConflict {
                network: set.network().to_string(),
                contract: name.to_string(),
                accounts: accounts.iter().map(|a| a.to_string()).collect(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{AliasTable, ContractSpec};

    fn spec(name: &str, account: &str) -> ContractSpec {
        ContractSpec {
            name: name.to_string(),
            account_name: account.to_string(),
            address: "01".parse().unwrap(),
            location: format!("{}.cdc", name),
            args: Vec::new(),
        }
    }

    #[test]
    fn distinct_names_pass() {
        let set = DeploymentSet::new(
            "emulator",
            vec![spec("A", "alice"), spec("B", "bob")],
            AliasTable::new(),
        );
        assert!(check_conflicts(&set).is_ok());
    }

    #[test]
    fn same_name_on_two_accounts_is_rejected() {
        let set = DeploymentSet::new(
            "emulator",
            vec![spec("A", "alice"), spec("B", "alice"), spec("A", "bob")],
            AliasTable::new(),
        );
        match check_conflicts(&set) {
            Err(DeployError::ContractConflict {
                network,
                contract,
                accounts,
            }) => {
                assert_eq!(network, "emulator");
                assert_eq!(contract, "A");
                assert_eq!(accounts, vec!["alice", "bob"]);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn repeated_entry_on_one_account_is_not_a_conflict() {
        let set = DeploymentSet::new(
            "emulator",
            vec![spec("A", "alice"), spec("A", "alice")],
            AliasTable::new(),
        );
        assert!(check_conflicts(&set).is_ok());
    }
}
