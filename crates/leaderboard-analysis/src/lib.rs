//! leaderboard-analysis crate
//!
//! Turns raw ERC-20 Transfer logs into a ranking of the most active
//! addresses: signature matching, EIP-55 address canonicalization,
//! per-address activity counting and top-K selection.

pub mod activity;
pub mod address;
pub mod error;
pub mod ranking;
pub mod signature;

pub use activity::{ActivityAggregator, ActivityRecord, ActivityTally, AggregationStats, Ingested};
pub use address::{canonicalize_topic, checksum_address, to_checksum_hex, CanonicalAddress};
pub use error::{AnalysisError, TopicField};
pub use ranking::{rank_top5, top5, top_k, TOP_K};
pub use signature::{TransferSignature, TRANSFER_EVENT_SIGNATURE};
