//! On-chain value types: wallet addresses and transaction hashes.
//!
//! Both are stored in their canonical lower-case `0x`-prefixed hex form.
//! Parsing is the only way to build one, so a value that made it into a
//! record is known to be well formed.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::MarketError;

/// Decodes a `0x`-prefixed hex string of exactly `bytes` bytes and returns
/// its lower-case canonical form.
fn canonical_hex(raw: &str, bytes: usize, what: &str) -> Result<String, MarketError> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| MarketError::Validation(format!("{what} must start with 0x")))?;
    let decoded = hex::decode(body)
        .map_err(|e| MarketError::Validation(format!("{what} is not valid hex: {e}")))?;
    if decoded.len() != bytes {
        return Err(MarketError::Validation(format!(
            "{what} must be {bytes} bytes, got {}",
            decoded.len()
        )));
    }
    Ok(format!("0x{}", hex::encode(decoded)))
}

/// EVM-style account address (`0x` + 40 hex chars).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Parses and canonicalises an address.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] when the input is not a
    /// `0x`-prefixed 20-byte hex string.
    pub fn parse(raw: &str) -> Result<Self, MarketError> {
        canonical_hex(raw, 20, "wallet address").map(Self)
    }

    /// Returns the canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transaction hash of a confirmed transfer (`0x` + 64 hex chars).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    /// Parses and canonicalises a transaction hash.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] when the input is not a
    /// `0x`-prefixed 32-byte hex string.
    pub fn parse(raw: &str) -> Result<Self, MarketError> {
        canonical_hex(raw, 32, "transaction hash").map(Self)
    }

    /// Returns the canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn address_is_lowercased() {
        let Ok(addr) = WalletAddress::parse("0xABCDEF0123456789abcdef0123456789ABCDEF01") else {
            panic!("valid address rejected");
        };
        assert_eq!(addr.as_str(), "0xabcdef0123456789abcdef0123456789abcdef01");
    }

    #[test]
    fn address_without_prefix_is_rejected() {
        assert!(WalletAddress::parse("abcdef0123456789abcdef0123456789abcdef01").is_err());
    }

    #[test]
    fn address_of_wrong_length_is_rejected() {
        assert!(WalletAddress::parse("0xabcd").is_err());
    }

    #[test]
    fn tx_hash_requires_32_bytes() {
        let good = format!("0x{}", "ab".repeat(32));
        assert!(TxHash::parse(&good).is_ok());
        let short = format!("0x{}", "ab".repeat(20));
        let Err(MarketError::Validation(msg)) = TxHash::parse(&short) else {
            panic!("short hash accepted");
        };
        assert!(msg.contains("32 bytes"));
    }

    #[test]
    fn non_hex_is_rejected() {
        let bad = format!("0x{}", "zz".repeat(32));
        assert!(TxHash::parse(&bad).is_err());
    }
}
