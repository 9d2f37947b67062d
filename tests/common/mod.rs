//! Shared test helpers for building raw log records.

#![allow(dead_code)]

use alloy::primitives::Address;
use leaderboard_analysis::TransferSignature;
use leaderboard_data::types::EthLogRecord;
use proptest::prelude::*;

/// keccak256("Approval(address,address,uint256)").
pub const APPROVAL_TOPIC0: &str =
    "0x8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925";

/// Address whose last byte is `n`, all other bytes zero.
pub fn addr(n: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = n;
    Address::from(bytes)
}

/// 32-byte topic word with `address` right-aligned.
pub fn topic_for(address: &Address) -> String {
    format!("0x{:0>64}", alloy::primitives::hex::encode(address))
}

/// A log record with the given topics and realistic auxiliary fields.
pub fn sample_log(topics: Vec<String>) -> EthLogRecord {
    EthLogRecord {
        address: "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48".to_string(),
        block_hash: format!("0x{:064x}", 19_000_000u64),
        block_number: "0x121eac0".to_string(),
        data: format!("0x{:064x}", 1_000_000u64),
        log_index: "0x0".to_string(),
        removed: false,
        topics,
        transaction_hash: format!("0x{:064x}", 42u64),
        transaction_index: "0x0".to_string(),
    }
}

/// A well-formed Transfer log from `from` to `to`.
pub fn transfer_log(sig: &TransferSignature, from: &Address, to: &Address) -> EthLogRecord {
    sample_log(vec![sig.hex().to_string(), topic_for(from), topic_for(to)])
}

/// Shape of one generated log record.
#[derive(Debug, Clone)]
pub enum FeedEntry {
    /// Transfer log with both address topics.
    Transfer(Address, Address),
    /// Approval log: three topics, other event.
    Approval(Address, Address),
    /// Transfer signature with only the sender topic.
    Short(Address),
}

impl FeedEntry {
    pub fn to_log(&self, sig: &TransferSignature) -> EthLogRecord {
        match self {
            Self::Transfer(from, to) => transfer_log(sig, from, to),
            Self::Approval(owner, spender) => sample_log(vec![
                APPROVAL_TOPIC0.to_string(),
                topic_for(owner),
                topic_for(spender),
            ]),
            Self::Short(from) => sample_log(vec![sig.hex().to_string(), topic_for(from)]),
        }
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::Transfer(..))
    }
}

/// Any 20-byte address.
pub fn any_address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from)
}

/// Mostly a small pool of addresses so counts collide, sometimes a fresh one.
pub fn pooled_address() -> impl Strategy<Value = Address> {
    prop_oneof![
        3 => (0u8..12).prop_map(addr),
        1 => any_address(),
    ]
}

/// Transfer, Approval and short records in a 2:1:1 mix.
pub fn feed_entry() -> impl Strategy<Value = FeedEntry> {
    prop_oneof![
        2 => (pooled_address(), pooled_address()).prop_map(|(f, t)| FeedEntry::Transfer(f, t)),
        1 => (pooled_address(), pooled_address()).prop_map(|(o, s)| FeedEntry::Approval(o, s)),
        1 => pooled_address().prop_map(FeedEntry::Short),
    ]
}
