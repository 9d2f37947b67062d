//! Per-address activity counting over Transfer logs.
//!
//! Every matching log counts once for its sender and once for its receiver,
//! so a self-transfer adds 2 to a single address. Addresses are kept in an
//! append-only list in first-seen order with a hash index into it; ranking
//! relies on that order to break ties.

use std::collections::HashMap;

use alloy::primitives::Address;
use leaderboard_data::types::EthLogRecord;
use serde::Serialize;

use crate::address::{canonicalize_field, decode_topic, CanonicalAddress};
use crate::error::{AnalysisError, TopicField};
use crate::signature::TransferSignature;

/// topic0 (signature), topic1 (from), topic2 (to).
pub const TRANSFER_TOPICS_LENGTH: usize = 3;

const SIGNATURE_TOPIC_IDX: usize = 0;
const FROM_TOPIC_IDX: usize = 1;
const TO_TOPIC_IDX: usize = 2;

/// An address and the number of transfers it took part in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRecord {
    pub address: CanonicalAddress,
    pub activity: u64,
}

/// What happened to a single log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingested {
    /// A Transfer log; both parties were counted.
    Counted,
    /// Fewer than three topics.
    SkippedShort,
    /// topic0 is some other event.
    SkippedOtherEvent,
}

/// Counters describing one aggregation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregationStats {
    pub records_seen: u64,
    pub transfers_counted: u64,
    pub skipped_short: u64,
    pub skipped_other_event: u64,
}

/// Activity counts in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ActivityTally {
    index: HashMap<Address, usize>,
    records: Vec<ActivityRecord>,
    stats: AggregationStats,
}

impl ActivityTally {
    /// Records in the order their address was first seen.
    pub fn records(&self) -> &[ActivityRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ActivityRecord> {
        self.records
    }

    pub fn count_of(&self, address: &Address) -> Option<u64> {
        self.index.get(address).map(|&ix| self.records[ix].activity)
    }

    /// Sum of all counts; always twice the number of counted transfers.
    pub fn total_activity(&self) -> u64 {
        self.records.iter().map(|r| r.activity).sum()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> &AggregationStats {
        &self.stats
    }

    fn bump(&mut self, address: CanonicalAddress) {
        match self.index.get(address.address()) {
            Some(&ix) => self.records[ix].activity += 1,
            None => {
                self.index.insert(*address.address(), self.records.len());
                self.records.push(ActivityRecord {
                    address,
                    activity: 1,
                });
            }
        }
    }
}

/// Folds Transfer logs into an [`ActivityTally`].
#[derive(Debug)]
pub struct ActivityAggregator<'a> {
    signature: &'a TransferSignature,
    tally: ActivityTally,
}

impl<'a> ActivityAggregator<'a> {
    pub fn new(signature: &'a TransferSignature) -> Self {
        Self {
            signature,
            tally: ActivityTally::default(),
        }
    }

    /// Counts one log record.
    ///
    /// Short and non-Transfer records are skipped. The tally is left untouched
    /// when an error is returned.
    ///
    /// # Errors
    /// Returns [`AnalysisError::HexDecode`] if topic0, topic1 or topic2 of a
    /// record with at least three topics is not valid hex.
    pub fn ingest(&mut self, record: &EthLogRecord) -> Result<Ingested, AnalysisError> {
        let topics = &record.topics;
        if topics.len() < TRANSFER_TOPICS_LENGTH {
            tracing::trace!(topics = topics.len(), "skipping log with too few topics");
            self.tally.stats.records_seen += 1;
            self.tally.stats.skipped_short += 1;
            return Ok(Ingested::SkippedShort);
        }

        let topic0 = decode_topic(&topics[SIGNATURE_TOPIC_IDX], TopicField::Signature)?;
        if !self.signature.matches(&topic0) {
            tracing::trace!(topic0 = %topics[SIGNATURE_TOPIC_IDX], "skipping non-Transfer log");
            self.tally.stats.records_seen += 1;
            self.tally.stats.skipped_other_event += 1;
            return Ok(Ingested::SkippedOtherEvent);
        }

        let from = canonicalize_field(&topics[FROM_TOPIC_IDX], TopicField::From)?;
        let to = canonicalize_field(&topics[TO_TOPIC_IDX], TopicField::To)?;

        self.tally.bump(from);
        self.tally.bump(to);
        self.tally.stats.records_seen += 1;
        self.tally.stats.transfers_counted += 1;
        Ok(Ingested::Counted)
    }

    pub fn finish(self) -> ActivityTally {
        self.tally
    }

    /// Counts every record, aborting on the first decode error.
    ///
    /// # Errors
    /// See [`ActivityAggregator::ingest`]. No partial tally is returned.
    #[tracing::instrument(skip_all, fields(records = records.len()))]
    pub fn ingest_all(mut self, records: &[EthLogRecord]) -> Result<ActivityTally, AnalysisError> {
        for record in records {
            self.ingest(record)?;
        }

        let tally = self.finish();
        tracing::debug!(
            addresses = tally.len(),
            transfers = tally.stats.transfers_counted,
            skipped_short = tally.stats.skipped_short,
            skipped_other_event = tally.stats.skipped_other_event,
            "aggregated transfer activity"
        );
        Ok(tally)
    }
}
