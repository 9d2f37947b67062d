//! Top-K selection over activity records.

use leaderboard_data::types::EthLogRecord;

use crate::activity::{ActivityAggregator, ActivityRecord};
use crate::error::AnalysisError;
use crate::signature::TransferSignature;

/// Size of the leaderboard.
pub const TOP_K: usize = 5;

/// Highest `k` records by activity, descending.
///
/// `records` must be in first-seen order: the sort is stable, so equal counts
/// keep that order. Returns every record when there are fewer than `k`.
pub fn top_k(mut records: Vec<ActivityRecord>, k: usize) -> Vec<ActivityRecord> {
    records.sort_by(|a, b| b.activity.cmp(&a.activity));
    if records.len() > k.saturating_sub(1) {
        records.truncate(k);
    }
    records
}

/// [`top_k`] with `k = 5`.
pub fn top5(records: Vec<ActivityRecord>) -> Vec<ActivityRecord> {
    top_k(records, TOP_K)
}

/// Aggregates `records` and returns the five most active addresses.
///
/// # Errors
/// Returns [`AnalysisError::HexDecode`] if a Transfer-shaped record carries
/// malformed hex. No partial ranking is produced.
pub fn rank_top5(
    signature: &TransferSignature,
    records: &[EthLogRecord],
) -> Result<Vec<ActivityRecord>, AnalysisError> {
    let tally = ActivityAggregator::new(signature).ingest_all(records)?;
    Ok(top5(tally.into_records()))
}
