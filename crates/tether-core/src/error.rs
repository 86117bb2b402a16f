//! Structural errors that abort a deployment before any network call.

use thiserror::Error;

/// Errors detected while preparing a deployment.
///
/// Any of these aborts the whole operation with no partial effect on chain.
/// Failures of individual contracts during execution are reported through
/// [`crate::deploy::UnitFailure`] instead.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("network '{0}' is not defined in the configuration")]
    UnknownNetwork(String),

    #[error("account '{account}' used by a deployment on network '{network}' is not defined")]
    UnknownAccount { network: String, account: String },

    #[error("contract '{contract}' used by a deployment on network '{network}' is not defined")]
    UnknownContract { network: String, contract: String },

    #[error(
        "the same contract cannot be deployed to multiple accounts on the same network: \
         '{contract}' is assigned to {} on '{network}'",
        accounts.join(", ")
    )]
    ContractConflict {
        network: String,
        contract: String,
        accounts: Vec<String>,
    },

    #[error("failed to load source of contract '{contract}' from '{location}'")]
    SourceLoad {
        contract: String,
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("import '{import}' in contract '{contract}' could not be resolved")]
    UnresolvedImport { contract: String, import: String },

    #[error("unrecognised import in contract '{contract}': {line}")]
    MalformedImport { contract: String, line: String },

    #[error("dependency cycle detected: {}", path.join(" -> "))]
    DependencyCycle { path: Vec<String> },

    #[error("pre-flight check failed")]
    Guard(#[source] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_names_contract_and_accounts() {
        let err = DeployError::ContractConflict {
            network: "emulator".to_string(),
            contract: "Kibble".to_string(),
            accounts: vec!["alice".to_string(), "bob".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'Kibble'"));
        assert!(msg.contains("alice, bob"));
    }

    #[test]
    fn cycle_message_shows_path() {
        let err = DeployError::DependencyCycle {
            path: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(err.to_string(), "dependency cycle detected: A -> B -> A");
    }
}
