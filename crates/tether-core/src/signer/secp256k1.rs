//! ECDSA over secp256k1 with SHA-256.

use anyhow::Context;
use k256::ecdsa::signature::Signer as _;
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;

use super::Signer;

/// In-memory secp256k1 private key.
///
/// Signatures are deterministic (RFC 6979) and encoded as 64 bytes `r || s`.
#[derive(Clone)]
pub struct Secp256k1Signer {
    signing_key: SigningKey,
}

impl Secp256k1Signer {
    /// Create from a 32-byte secret scalar.
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| anyhow::anyhow!("Invalid private key"))?;
        Ok(Self { signing_key })
    }

    /// Create from hex, with or without a `0x` prefix.
    pub fn from_hex(hex_key: &str) -> anyhow::Result<Self> {
        let trimmed = hex_key.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(digits).context("Private key is not valid hex")?;
        Self::from_bytes(&bytes)
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Uncompressed public key without the SEC1 tag byte, hex encoded.
    pub fn public_key_hex(&self) -> String {
        let point = self.verifying_key().as_affine().to_encoded_point(false);
        hex::encode(&point.as_bytes()[1..])
    }
}

impl std::fmt::Debug for Secp256k1Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1Signer")
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}

impl Signer for Secp256k1Signer {
    fn sign(&self, message: &[u8]) -> anyhow::Result<Vec<u8>> {
        let signature: Signature = self.signing_key.sign(message);
        Ok(signature.to_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use k256::ecdsa::signature::Verifier;

    use super::*;

    const KEY: &str = "4f3edf983ac636a65a842ce7c78d9aa706d3b113bce9c46f30d7d21715b23b1d";

    #[test]
    fn signatures_are_deterministic_and_verifiable() {
        let signer = Secp256k1Signer::from_hex(KEY).unwrap();
        let first = signer.sign(b"payload").unwrap();
        let second = signer.sign(b"payload").unwrap();
        assert_eq!(first.len(), 64);
        assert_eq!(first, second);

        let signature = Signature::from_slice(&first).unwrap();
        assert!(signer.verifying_key().verify(b"payload", &signature).is_ok());
        assert!(signer.verifying_key().verify(b"other", &signature).is_err());
    }

    #[test]
    fn accepts_prefixed_hex() {
        let plain = Secp256k1Signer::from_hex(KEY).unwrap();
        let prefixed = Secp256k1Signer::from_hex(&format!("0x{}", KEY)).unwrap();
        assert_eq!(plain.public_key_hex(), prefixed.public_key_hex());
        assert_eq!(plain.public_key_hex().len(), 128);
    }

    #[test]
    fn rejects_bad_key_material() {
        assert!(Secp256k1Signer::from_hex("zz").is_err());
        assert!(Secp256k1Signer::from_hex("00").is_err());
        assert!(Secp256k1Signer::from_bytes(&[0u8; 32]).is_err());
    }
}
