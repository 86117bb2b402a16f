//! Scripts that add or update a contract on an account.

use super::Transaction;
use crate::types::{Address, Argument};

/// Builds unsigned deployment transactions.
pub trait TransactionTemplates {
    /// Transaction adding contract `name` to `address` with constructor arguments.
    fn add_contract(
        &self,
        address: Address,
        name: &str,
        code: &str,
        args: &[Argument],
    ) -> anyhow::Result<Transaction>;

    /// Transaction replacing the code of contract `name` on `address`.
    fn update_contract(
        &self,
        address: Address,
        name: &str,
        code: &str,
    ) -> anyhow::Result<Transaction>;
}

/// Cadence scripts using the account contracts API.
///
/// Contract code travels hex encoded and is decoded on chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct CadenceTemplates;

const UPDATE_CONTRACT: &str = "transaction(name: String, code: String) {
    prepare(signer: AuthAccount) {
        signer.contracts.update__experimental(name: name, code: code.decodeHex())
    }
}";

impl TransactionTemplates for CadenceTemplates {
    fn add_contract(
        &self,
        address: Address,
        name: &str,
        code: &str,
        args: &[Argument],
    ) -> anyhow::Result<Transaction> {
        let mut params = String::new();
        let mut call_args = String::new();
        for (i, arg) in args.iter().enumerate() {
            if arg.type_id.trim().is_empty() {
                anyhow::bail!("Argument {} of contract '{}' has no type", i, name);
            }
            params.push_str(&format!(", arg{}: {}", i, arg.type_id));
            call_args.push_str(&format!(", arg{}", i));
        }

        let script = format!(
            "transaction(name: String, code: String{params}) {{
    prepare(signer: AuthAccount) {{
        signer.contracts.add(name: name, code: code.decodeHex(){call_args})
    }}
}}"
        );

        let mut arguments = vec![Argument::string(name), Argument::string(hex::encode(code))];
        arguments.extend(args.iter().cloned());
        Ok(Transaction::new(script, arguments, address))
    }

    fn update_contract(
        &self,
        address: Address,
        name: &str,
        code: &str,
    ) -> anyhow::Result<Transaction> {
        let arguments = vec![Argument::string(name), Argument::string(hex::encode(code))];
        Ok(Transaction::new(UPDATE_CONTRACT, arguments, address))
    }
}
