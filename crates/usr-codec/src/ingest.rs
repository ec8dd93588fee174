//! Bulk upload parsing
//!
//! An upload is either a file of text blocks, passed on verbatim in raw form,
//! or one JSON record per line. Every item is parsed independently.

use crate::block::{contains_block_tag, BlockTag};
use crate::decode::{decode_block, decode_raw};
use crate::error::IngestError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use usr_model::{SentenceType, UsrRecord};

static SEGMENT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<segment_id=([^>]+)>").expect("segment-id pattern is valid"));

/// Body of a create request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UsrUpload {
    /// Block text for the service to parse itself
    Raw { raw_text: String, raw_format: bool },
    /// A record in the JSON transport
    Structured(UsrRecord),
}

impl UsrUpload {
    /// Wrap block text
    #[inline]
    #[must_use]
    pub fn raw(raw_text: impl Into<String>) -> Self {
        Self::Raw {
            raw_text: raw_text.into(),
            raw_format: true,
        }
    }

    /// Is this raw block text?
    #[inline]
    #[must_use]
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw { .. })
    }
}

/// One parsed item of an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadItem {
    /// Routing target taken from a `<segment_id=...>` tag
    pub segment_id: Option<String>,
    /// Identifier printed in reports (tag value or `line N`)
    pub label: String,
    /// Line the item starts on
    pub source_line: usize,
    pub upload: UsrUpload,
    pub sentence_type: SentenceType,
    pub scope: Option<String>,
}

/// Split an upload into items
///
/// Text containing a block tag is raw-decoded block by block; anything else
/// is read as one JSON record per non-empty line.
#[must_use]
pub fn parse_upload(text: &str) -> Vec<Result<UploadItem, IngestError>> {
    if contains_block_tag(text) {
        decode_raw(text)
            .into_iter()
            .map(|raw| {
                let raw = raw?;
                let segment_id = (raw.tag == BlockTag::SegmentId).then(|| raw.segment_id.clone());
                Ok(UploadItem {
                    segment_id,
                    label: raw.segment_id,
                    source_line: raw.open_line,
                    upload: UsrUpload::raw(raw.raw_text),
                    sentence_type: raw.sentence_type,
                    scope: raw.scope,
                })
            })
            .collect()
    } else {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| parse_json_line(line.trim(), i + 1))
            .collect()
    }
}

fn parse_json_line(line: &str, number: usize) -> Result<UploadItem, IngestError> {
    let record = UsrRecord::from_json(line).map_err(|source| IngestError::Json {
        line: number,
        source,
    })?;
    Ok(UploadItem {
        segment_id: None,
        label: format!("line {number}"),
        source_line: number,
        sentence_type: record.sentence_type,
        scope: record.sentence_type_info.scope.clone(),
        upload: UsrUpload::Structured(record),
    })
}

/// Segment identifier of the first `<segment_id=...>` tag
#[must_use]
pub fn extract_segment_id(block: &str) -> Option<String> {
    SEGMENT_ID
        .captures(block)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Build a record from either transport
///
/// Text with a block tag is fully decoded (first block); otherwise the whole
/// input is read as a JSON record.
///
/// # Errors
/// The decode or JSON error of the input
pub fn materialize(input: &str) -> Result<UsrRecord, IngestError> {
    if contains_block_tag(input) {
        Ok(decode_block(input)?.record)
    } else {
        UsrRecord::from_json(input).map_err(|source| IngestError::Json { line: 1, source })
    }
}
