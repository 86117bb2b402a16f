//! Transaction signers.
//!
//! A [`SignerProvider`] hands out one [`Signer`] per account key. The shipped
//! provider, [`KeyringSigners`], reads secp256k1 keys from the project
//! configuration.

pub mod keyring;
pub mod secp256k1;

pub use keyring::KeyringSigners;
pub use secp256k1::Secp256k1Signer;

use crate::state::Account;

/// Produces signatures over arbitrary messages with one private key.
pub trait Signer {
    fn sign(&self, message: &[u8]) -> anyhow::Result<Vec<u8>>;
}

/// Looks up the signer for an account key.
pub trait SignerProvider {
    fn signer_for(&self, account: &Account, key_index: u32) -> anyhow::Result<Box<dyn Signer>>;
}
