//! Signers backed by keys declared in the project configuration.

use std::collections::BTreeMap;

use anyhow::Context;

use super::{Secp256k1Signer, Signer, SignerProvider};
use crate::config::KeyEntry;
use crate::state::{Account, ProjectState};

/// Key material for every configured account, read lazily on first use.
#[derive(Debug, Clone, Default)]
pub struct KeyringSigners {
    keys: BTreeMap<String, KeyEntry>,
}

impl KeyringSigners {
    pub fn from_state(state: &ProjectState) -> Self {
        Self {
            keys: state
                .accounts()
                .map(|account| (account.name.clone(), account.key.clone()))
                .collect(),
        }
    }

    pub fn contains(&self, account: &str) -> bool {
        self.keys.contains_key(account)
    }
}

impl SignerProvider for KeyringSigners {
    fn signer_for(&self, account: &Account, key_index: u32) -> anyhow::Result<Box<dyn Signer>> {
        let key = self
            .keys
            .get(&account.name)
            .ok_or_else(|| anyhow::anyhow!("No key configured for account '{}'", account.name))?;

        if key.index != key_index {
            anyhow::bail!(
                "Account '{}' has key index {} configured, not {}",
                account.name,
                key.index,
                key_index
            );
        }

        let hex_key = match (&key.private_key, &key.private_key_env) {
            (Some(inline), _) => inline.clone(),
            (None, Some(var)) => std::env::var(var).with_context(|| {
                format!(
                    "Environment variable '{}' for account '{}' is not set",
                    var, account.name
                )
            })?,
            (None, None) => anyhow::bail!("Account '{}' has no private key", account.name),
        };

        let signer = Secp256k1Signer::from_hex(&hex_key)
            .with_context(|| format!("Invalid private key for account '{}'", account.name))?;
        Ok(Box::new(signer))
    }
}
