//! Transactions and their signature roles.
//!
//! A transaction carries two signature sections. Payload signatures cover
//! the transaction body; envelope signatures cover the body plus the payload
//! signatures and are produced by the payer.

pub mod templates;

use serde::{Deserialize, Serialize};

pub use templates::{CadenceTemplates, TransactionTemplates};

use crate::signer::Signer;
use crate::types::{Address, Argument, BlockRef};

/// Gas limit applied to every deployment transaction.
pub const DEFAULT_GAS_LIMIT: u64 = 1000;

const DOMAIN_TAG: &[u8] = b"FLOW-V0.0-transaction";
const DOMAIN_TAG_LENGTH: usize = 32;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalKey {
    pub address: Address,
    pub key_index: u32,
    pub sequence_number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    pub address: Address,
    pub key_index: u32,
    /// Hex-encoded signature bytes
    pub signature: String,
}

/// Which signature section a signer contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningRole {
    /// The signer pays for the transaction and signs the envelope.
    Envelope,
    /// Any other signer signs the payload.
    Payload,
}

impl SigningRole {
    /// Decide the role from exact address equality with the payer.
    pub fn for_signer(signer: Address, payer: Address) -> Self {
        if signer == payer {
            SigningRole::Envelope
        } else {
            SigningRole::Payload
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub script: String,
    pub arguments: Vec<Argument>,
    pub reference_block_id: String,
    pub gas_limit: u64,
    pub proposal_key: ProposalKey,
    pub payer: Address,
    pub authorizers: Vec<Address>,
    #[serde(default)]
    pub payload_signatures: Vec<TransactionSignature>,
    #[serde(default)]
    pub envelope_signatures: Vec<TransactionSignature>,
}

#[derive(Serialize)]
struct PayloadFields<'a> {
    script: &'a str,
    arguments: &'a [Argument],
    reference_block_id: &'a str,
    gas_limit: u64,
    proposal_key: &'a ProposalKey,
    payer: Address,
    authorizers: &'a [Address],
}

#[derive(Serialize)]
struct EnvelopeFields<'a> {
    payload: PayloadFields<'a>,
    payload_signatures: &'a [TransactionSignature],
}

impl Transaction {
    /// Unsigned transaction running `script`, authorized and paid by `account`.
    pub fn new(script: impl Into<String>, arguments: Vec<Argument>, account: Address) -> Self {
        Self {
            script: script.into(),
            arguments,
            reference_block_id: String::new(),
            gas_limit: DEFAULT_GAS_LIMIT,
            proposal_key: ProposalKey::default(),
            payer: account,
            authorizers: vec![account],
            payload_signatures: Vec::new(),
            envelope_signatures: Vec::new(),
        }
    }

    pub fn set_reference_block(&mut self, block: &BlockRef) -> &mut Self {
        self.reference_block_id = block.id.clone();
        self
    }

    pub fn set_proposer(
        &mut self,
        address: Address,
        key_index: u32,
        sequence_number: u64,
    ) -> &mut Self {
        self.proposal_key = ProposalKey {
            address,
            key_index,
            sequence_number,
        };
        self
    }

    pub fn set_payer(&mut self, payer: Address) -> &mut Self {
        self.payer = payer;
        self
    }

    fn payload_fields(&self) -> PayloadFields<'_> {
        PayloadFields {
            script: &self.script,
            arguments: &self.arguments,
            reference_block_id: &self.reference_block_id,
            gas_limit: self.gas_limit,
            proposal_key: &self.proposal_key,
            payer: self.payer,
            authorizers: &self.authorizers,
        }
    }

    /// Bytes signed by payload signers.
    pub fn payload_message(&self) -> anyhow::Result<Vec<u8>> {
        let body = serde_json::to_vec(&self.payload_fields())?;
        Ok(tagged(&body))
    }

    /// Bytes signed by the payer. Includes every payload signature.
    pub fn envelope_message(&self) -> anyhow::Result<Vec<u8>> {
        let body = serde_json::to_vec(&EnvelopeFields {
            payload: self.payload_fields(),
            payload_signatures: &self.payload_signatures,
        })?;
        Ok(tagged(&body))
    }

    /// Sign for `address` in the section its role calls for.
    ///
    /// Payload signatures must be added before the envelope is signed, since
    /// the envelope covers them.
    pub fn sign(
        &mut self,
        address: Address,
        key_index: u32,
        signer: &dyn Signer,
    ) -> anyhow::Result<SigningRole> {
        let role = SigningRole::for_signer(address, self.payer);
        let message = match role {
            SigningRole::Envelope => self.envelope_message()?,
            SigningRole::Payload => self.payload_message()?,
        };
        let signature = TransactionSignature {
            address,
            key_index,
            signature: hex::encode(signer.sign(&message)?),
        };
        match role {
            SigningRole::Envelope => self.envelope_signatures.push(signature),
            SigningRole::Payload => self.payload_signatures.push(signature),
        }
        Ok(role)
    }
}

fn tagged(body: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(DOMAIN_TAG_LENGTH + body.len());
    message.extend_from_slice(DOMAIN_TAG);
    message.resize(DOMAIN_TAG_LENGTH, 0);
    message.extend_from_slice(body);
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoSigner;

    impl Signer for EchoSigner {
        fn sign(&self, message: &[u8]) -> anyhow::Result<Vec<u8>> {
            Ok(message[..4].to_vec())
        }
    }

    fn address(hex: &str) -> Address {
        hex.parse().unwrap()
    }

    #[test]
    fn role_is_decided_by_exact_address_equality() {
        assert_eq!(
            SigningRole::for_signer(address("01"), address("0x0000000000000001")),
            SigningRole::Envelope
        );
        assert_eq!(
            SigningRole::for_signer(address("01"), address("02")),
            SigningRole::Payload
        );
    }

    #[test]
    fn payer_signs_envelope_only() {
        let mut tx = Transaction::new("transaction {}", Vec::new(), address("01"));
        let role = tx.sign(address("01"), 0, &EchoSigner).unwrap();
        assert_eq!(role, SigningRole::Envelope);
        assert_eq!(tx.envelope_signatures.len(), 1);
        assert!(tx.payload_signatures.is_empty());
    }

    #[test]
    fn non_payer_signs_payload_only() {
        let mut tx = Transaction::new("transaction {}", Vec::new(), address("01"));
        tx.set_payer(address("02"));
        let role = tx.sign(address("01"), 3, &EchoSigner).unwrap();
        assert_eq!(role, SigningRole::Payload);
        assert_eq!(tx.payload_signatures[0].key_index, 3);
        assert!(tx.envelope_signatures.is_empty());
    }

    #[test]
    fn messages_carry_padded_domain_tag() {
        let tx = Transaction::new("transaction {}", Vec::new(), address("01"));
        let message = tx.payload_message().unwrap();
        assert_eq!(&message[..DOMAIN_TAG.len()], DOMAIN_TAG);
        assert!(message[DOMAIN_TAG.len()..DOMAIN_TAG_LENGTH].iter().all(|b| *b == 0));
        assert_eq!(message[DOMAIN_TAG_LENGTH], b'{');
    }

    #[test]
    fn envelope_covers_payload_signatures() {
        let mut tx = Transaction::new("transaction {}", Vec::new(), address("01"));
        tx.set_payer(address("02"));
        let before = tx.envelope_message().unwrap();
        tx.sign(address("01"), 0, &EchoSigner).unwrap();
        assert_ne!(before, tx.envelope_message().unwrap());
        assert!(tx.payload_message().is_ok());
    }

    #[test]
    fn builder_sets_reference_and_proposer() {
        let mut tx = Transaction::new("transaction {}", Vec::new(), address("01"));
        tx.set_reference_block(&BlockRef {
            id: "abcd".to_string(),
            height: 7,
        })
        .set_proposer(address("01"), 1, 42);
        assert_eq!(tx.reference_block_id, "abcd");
        assert_eq!(tx.proposal_key.sequence_number, 42);
        assert_eq!(tx.gas_limit, DEFAULT_GAS_LIMIT);
        assert_eq!(tx.authorizers, vec![address("01")]);
    }
}
