//! Shared core types used across configuration, planning and execution layers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Length of an account address in bytes.
pub const ADDRESS_LENGTH: usize = 8;

/// Account address on the network.
///
/// Displayed as `0x` followed by 16 lowercase hex digits. Parsing accepts the
/// value with or without the `0x` prefix and left-pads short input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Hex form without the `0x` prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.is_empty() {
            anyhow::bail!("Invalid address: empty value");
        }
        if digits.len() > ADDRESS_LENGTH * 2 {
            anyhow::bail!(
                "Invalid address '{}': longer than {} bytes",
                s,
                ADDRESS_LENGTH
            );
        }

        let padded = format!("{:0>width$}", digits, width = ADDRESS_LENGTH * 2);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(&padded, &mut bytes)
            .map_err(|e| anyhow::anyhow!("Invalid address '{}': {}", s, e))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Reference to a block, used to anchor a transaction's validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    pub id: String,
    pub height: u64,
}

/// Identifier of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(pub String);

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Typed constructor argument in JSON-Cadence shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    /// Type identifier, e.g. `String`, `UFix64`, `Address`
    #[serde(rename = "type")]
    pub type_id: String,
    pub value: serde_json::Value,
}

impl Argument {
    pub fn new(type_id: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            type_id: type_id.into(),
            value: value.into(),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new("String", value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_parses_with_and_without_prefix() {
        let a: Address = "0xf8d6e0586b0a20c7".parse().unwrap();
        let b: Address = "f8d6e0586b0a20c7".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "0xf8d6e0586b0a20c7");
    }

    #[test]
    fn short_address_is_left_padded() {
        let a: Address = "0x01".parse().unwrap();
        assert_eq!(a.to_string(), "0x0000000000000001");
    }

    #[test]
    fn rejects_invalid_addresses() {
        assert!("".parse::<Address>().is_err());
        assert!("0xzz".parse::<Address>().is_err());
        assert!("0x0102030405060708090a".parse::<Address>().is_err());
    }

    #[test]
    fn argument_serializes_as_json_cadence() {
        let arg = Argument::string("hello");
        let json = serde_json::to_value(&arg).unwrap();
        assert_eq!(json, serde_json::json!({"type": "String", "value": "hello"}));
    }
}
