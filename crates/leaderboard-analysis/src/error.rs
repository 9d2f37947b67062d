//! Errors raised while decoding log topics.

use std::fmt;

use thiserror::Error;

/// Which topic of a log record failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicField {
    /// topic0, the event signature hash.
    Signature,
    /// topic1, the indexed sender.
    From,
    /// topic2, the indexed receiver.
    To,
    /// A topic decoded outside of a log record.
    Raw,
}

impl fmt::Display for TopicField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signature => f.write_str("topic0 (event signature)"),
            Self::From => f.write_str("topic1 (from)"),
            Self::To => f.write_str("topic2 (to)"),
            Self::Raw => f.write_str("topic"),
        }
    }
}

/// Errors that abort an aggregation run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A topic was not valid hex (odd length or a non-hex character).
    #[error("invalid hex in {field}: {topic:?}")]
    HexDecode {
        field: TopicField,
        topic: String,
        #[source]
        source: hex::FromHexError,
    },
}
