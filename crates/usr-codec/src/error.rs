//! Error types for the interchange codec
//!
//! Every decode error carries the 1-based line number of the offending input
//! so bulk ingestion can report it and move on to the next block.

use crate::block::BlockTag;

/// Why an entry line was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryLineFault {
    /// Fewer than the nine tab-separated columns
    #[error("expected 9 tab-separated fields, found {0}")]
    FieldCount(usize),

    /// Index column is not an integer
    #[error("index column is not an integer: '{0}'")]
    BadIndex(String),
}

/// Why a relation reference was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceFault {
    /// No `:` between target and label
    #[error("missing ':' separator")]
    MissingSeparator,

    /// Target is neither an integer nor `null`
    #[error("target is not an integer: '{0}'")]
    BadTarget(String),

    /// Nothing after the separator
    #[error("empty label")]
    EmptyLabel,
}

/// Errors during decoding
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Entry line with the wrong shape
    #[error("line {line}: malformed entry line ({fault}): '{raw}'")]
    MalformedEntryLine {
        line: usize,
        raw: String,
        fault: EntryLineFault,
    },

    /// Relation field with a malformed reference
    #[error("line {line}: malformed reference '{reference}' ({fault})")]
    MalformedReference {
        line: usize,
        reference: String,
        fault: ReferenceFault,
    },

    /// Input has no block at all
    #[error("no <segment_id=...> or <sent_id=...> block in input")]
    MissingBlock,

    /// Opening tag without its closing tag
    #[error("line {line}: <{tag}={segment_id}> is not closed")]
    UnterminatedBlock {
        line: usize,
        tag: BlockTag,
        segment_id: String,
    },
}

impl DecodeError {
    /// Line the error refers to (`0` when not tied to a line)
    #[inline]
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::MalformedEntryLine { line, .. }
            | Self::MalformedReference { line, .. }
            | Self::UnterminatedBlock { line, .. } => *line,
            Self::MissingBlock => 0,
        }
    }

    /// Attach a line number to a reference fault
    pub(crate) fn reference(line: usize, reference: &str, fault: ReferenceFault) -> Self {
        Self::MalformedReference {
            line,
            reference: reference.to_string(),
            fault,
        }
    }
}

/// Errors while reading a bulk upload
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// A text block failed to decode
    #[error("block error: {0}")]
    Decode(#[from] DecodeError),

    /// A JSON line failed to parse
    #[error("line {line}: invalid USR JSON: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
