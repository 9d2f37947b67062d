//! The ERC-20 `Transfer` event signature hash.

use alloy::primitives::{keccak256, B256};

/// Canonical signature of the ERC-20 Transfer event.
pub const TRANSFER_EVENT_SIGNATURE: &str = "Transfer(address,address,uint256)";

/// Keccak-256 of [`TRANSFER_EVENT_SIGNATURE`], as raw bytes and as `0x` hex.
///
/// Compute it once at startup and hand a reference to whatever needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSignature {
    bytes: B256,
    hex: String,
}

impl TransferSignature {
    pub fn compute() -> Self {
        let bytes = keccak256(TRANSFER_EVENT_SIGNATURE.as_bytes());
        let hex = format!("0x{}", hex::encode(bytes));
        Self { bytes, hex }
    }

    /// The 32-byte hash.
    pub fn bytes(&self) -> &B256 {
        &self.bytes
    }

    /// Lowercase `0x`-prefixed hex form, 66 characters long.
    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// Byte-for-byte comparison against a decoded topic0.
    pub fn matches(&self, topic0: &[u8]) -> bool {
        self.bytes.as_slice() == topic0
    }
}
