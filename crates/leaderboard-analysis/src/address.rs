//! Address canonicalization: topic word -> 20-byte address -> EIP-55 text.
//!
//! Indexed `address` parameters are stored in topics as 32-byte words with the
//! address right-aligned. The high-order padding is not checked for zeros, so a
//! malformed producer yields a well-formed but wrong address rather than an
//! error.

use std::fmt;

use alloy::primitives::{keccak256, Address, B256};
use serde::{Serialize, Serializer};

use crate::error::{AnalysisError, TopicField};

/// Length of an Ethereum address in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// A 20-byte address together with its EIP-55 checksummed rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalAddress {
    address: Address,
    checksummed: String,
}

impl CanonicalAddress {
    pub fn from_address(address: Address) -> Self {
        let checksummed = checksum_address(&address);
        Self {
            address,
            checksummed,
        }
    }

    /// Raw 20-byte value.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// `0x` followed by 40 case-encoded hex characters.
    pub fn as_str(&self) -> &str {
        &self.checksummed
    }
}

impl fmt::Display for CanonicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.checksummed)
    }
}

impl Serialize for CanonicalAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.checksummed)
    }
}

/// Canonicalizes a hex topic (optionally `0x`-prefixed) into an address.
///
/// # Errors
/// Returns [`AnalysisError::HexDecode`] on odd length or non-hex characters.
pub fn canonicalize_topic(topic: &str) -> Result<CanonicalAddress, AnalysisError> {
    canonicalize_field(topic, TopicField::Raw)
}

pub(crate) fn canonicalize_field(
    topic: &str,
    field: TopicField,
) -> Result<CanonicalAddress, AnalysisError> {
    let word = decode_topic(topic, field)?;
    Ok(CanonicalAddress::from_address(address_from_word(&word)))
}

/// Removes a single leading `0x`; anything else is returned unchanged.
pub(crate) fn strip_hex_prefix(topic: &str) -> &str {
    topic.strip_prefix("0x").unwrap_or(topic)
}

pub(crate) fn decode_topic(topic: &str, field: TopicField) -> Result<Vec<u8>, AnalysisError> {
    hex::decode(strip_hex_prefix(topic)).map_err(|source| AnalysisError::HexDecode {
        field,
        topic: topic.to_string(),
        source,
    })
}

/// Right-aligns `word` into 20 bytes: longer input keeps its last 20 bytes,
/// shorter input is left-padded with zeros.
pub fn address_from_word(word: &[u8]) -> Address {
    let tail = &word[word.len().saturating_sub(ADDRESS_LENGTH)..];
    let mut bytes = [0u8; ADDRESS_LENGTH];
    bytes[ADDRESS_LENGTH - tail.len()..].copy_from_slice(tail);
    Address::from(bytes)
}

/// EIP-55 checksummed form of `address`.
pub fn checksum_address(address: &Address) -> String {
    let body = hex::encode(address);
    let digest = keccak256(body.as_bytes());
    to_checksum_hex(&body, &digest)
}

/// Applies the EIP-55 case rule to a lowercase hex body (no `0x`).
///
/// Letter `i` is uppercased when nibble `i` of `digest` (high nibble first)
/// is greater than 7. Digits are left alone.
pub fn to_checksum_hex(lower_body: &str, digest: &B256) -> String {
    let mut out = String::with_capacity(lower_body.len() + 2);
    out.push_str("0x");
    for (i, c) in lower_body.chars().enumerate() {
        let nibble = digest
            .get(i / 2)
            .map(|byte| if i % 2 == 0 { byte >> 4 } else { byte & 0x0f })
            .unwrap_or(0);
        if matches!(c, 'a'..='f') && nibble > 7 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const EIP55_VECTORS: [&str; 6] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        "0x52908400098527886E0F7030069857D2E4169EE7",
        "0xde709f2102306220921060314715629080e2fb77",
    ];

    #[test]
    fn eip55_known_vectors() {
        for expected in EIP55_VECTORS {
            let lower = expected.to_lowercase();
            let canonical = canonicalize_topic(&lower).unwrap();
            assert_eq!(canonical.as_str(), expected);
        }
    }

    #[test]
    fn padded_topic_word() {
        let topic = "0x0000000000000000000000005aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
        let canonical = canonicalize_topic(topic).unwrap();
        assert_eq!(
            canonical.to_string(),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }

    #[test]
    fn agrees_with_alloy_checksum() {
        for i in 0u8..32 {
            let mut bytes = [0u8; 20];
            for (j, b) in bytes.iter_mut().enumerate() {
                *b = i.wrapping_mul(37).wrapping_add(j as u8 * 11);
            }
            let address = Address::from(bytes);
            assert_eq!(checksum_address(&address), address.to_checksum(None));
        }
    }

    #[test]
    fn prefix_is_optional() {
        let with = canonicalize_topic("0x000000000000000000000000000000000000000a").unwrap();
        let without = canonicalize_topic("000000000000000000000000000000000000000a").unwrap();
        assert_eq!(with, without);
        assert_eq!(with.as_str(), "0x000000000000000000000000000000000000000A");
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        let err = canonicalize_topic("0X000000000000000000000000000000000000000a").unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::HexDecode {
                source: hex::FromHexError::InvalidHexCharacter { c: 'X', index: 1 },
                ..
            }
        ));
    }

    #[test]
    fn only_one_prefix_is_stripped() {
        assert!(canonicalize_topic("0x0x0a").is_err());
    }

    #[test]
    fn short_input_is_left_padded() {
        let canonical = canonicalize_topic("0x1a2b").unwrap();
        assert_eq!(canonical.as_str(), "0x0000000000000000000000000000000000001a2B");

        let empty = canonicalize_topic("0x").unwrap();
        assert_eq!(*empty.address(), Address::ZERO);
    }

    #[test]
    fn non_zero_padding_is_truncated_not_rejected() {
        let topic = "0xffffffffffffffffffffffff000000000000000000000000000000000000000a";
        let canonical = canonicalize_topic(topic).unwrap();
        assert_eq!(canonical.as_str(), "0x000000000000000000000000000000000000000A");
    }

    #[test]
    fn odd_length_is_a_decode_error() {
        let err = canonicalize_topic("0x1a2").unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::HexDecode {
                field: TopicField::Raw,
                source: hex::FromHexError::OddLength,
                ..
            }
        ));
        assert!(err.to_string().contains("\"0x1a2\""));
    }

    #[test]
    fn checksum_is_idempotent() {
        for expected in EIP55_VECTORS {
            let once = canonicalize_topic(expected).unwrap();
            let twice = canonicalize_topic(&once.as_str().to_lowercase()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn digits_never_change_case() {
        let digest = B256::repeat_byte(0xff);
        assert_eq!(
            to_checksum_hex("0123456789abcdef", &digest),
            "0x0123456789ABCDEF"
        );
        assert_eq!(
            to_checksum_hex("0123456789abcdef", &B256::ZERO),
            "0x0123456789abcdef"
        );
    }

    #[test]
    fn serializes_as_checksummed_string() {
        let canonical = canonicalize_topic(EIP55_VECTORS[0]).unwrap();
        let json = serde_json::to_string(&canonical).unwrap();
        assert_eq!(json, format!("\"{}\"", EIP55_VECTORS[0]));
    }
}
