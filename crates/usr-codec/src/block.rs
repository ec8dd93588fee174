//! Block delimiters and the shared line scanner
//!
//! A block opens with `<segment_id=ID>` (canonical) or `<sent_id=ID>`
//! (bulk-ingestion synonym) and closes with the lexically matching closing
//! tag. Both decode modes run on top of [`scan_blocks`].

use crate::error::DecodeError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{self, Display, Formatter};

static OPEN_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<(segment_id|sent_id)=([^>]*)>").expect("opening-tag pattern is valid")
});

/// Which delimiter pair bounds a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockTag {
    /// `<segment_id=ID> ... </segment_id>`
    #[default]
    SegmentId,
    /// `<sent_id=ID> ... </sent_id>`
    SentId,
}

impl BlockTag {
    /// Tag name
    #[inline]
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::SegmentId => "segment_id",
            Self::SentId => "sent_id",
        }
    }

    /// Opening tag for an identifier
    #[must_use]
    pub fn open(self, segment_id: &str) -> String {
        format!("<{}={}>", self.name(), segment_id)
    }

    /// Closing tag
    #[inline]
    #[must_use]
    pub fn close(self) -> &'static str {
        match self {
            Self::SegmentId => "</segment_id>",
            Self::SentId => "</sent_id>",
        }
    }

    /// Does this (trimmed) line close a block of this kind?
    #[inline]
    #[must_use]
    pub fn is_closed_by(self, line: &str) -> bool {
        line.starts_with(self.close())
    }
}

impl Display for BlockTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Recognize an opening tag at the start of a trimmed line
#[must_use]
pub fn parse_open_tag(line: &str) -> Option<(BlockTag, &str)> {
    let caps = OPEN_TAG.captures(line)?;
    let tag = match caps.get(1)?.as_str() {
        "sent_id" => BlockTag::SentId,
        _ => BlockTag::SegmentId,
    };
    Some((tag, caps.get(2)?.as_str().trim()))
}

/// Does the text contain any opening tag?
#[must_use]
pub fn contains_block_tag(text: &str) -> bool {
    text.lines().any(|l| parse_open_tag(l.trim()).is_some())
}

/// A body line with its 1-based line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLine<'a> {
    pub number: usize,
    pub text: &'a str,
}

/// One delimited block, borrowed from the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpan<'a> {
    pub tag: BlockTag,
    pub segment_id: String,
    /// Line of the opening tag
    pub open_line: usize,
    pub open_text: &'a str,
    pub close_text: &'a str,
    pub body: Vec<BodyLine<'a>>,
}

impl<'a> BlockSpan<'a> {
    fn open(tag: BlockTag, segment_id: &str, number: usize, open_text: &'a str) -> Self {
        Self {
            tag,
            segment_id: segment_id.to_string(),
            open_line: number,
            open_text,
            close_text: "",
            body: Vec::new(),
        }
    }

    fn unterminated(self) -> DecodeError {
        tracing::warn!(
            line = self.open_line,
            segment_id = %self.segment_id,
            "block is not closed"
        );
        DecodeError::UnterminatedBlock {
            line: self.open_line,
            tag: self.tag,
            segment_id: self.segment_id,
        }
    }
}

/// Split input into blocks
///
/// Lines outside any block are ignored. An opening tag inside an open block
/// terminates the open one as [`DecodeError::UnterminatedBlock`]; so does end
/// of input. Each block gets its own result.
#[must_use]
pub fn scan_blocks(input: &str) -> Vec<Result<BlockSpan<'_>, DecodeError>> {
    let mut blocks = Vec::new();
    let mut current: Option<BlockSpan<'_>> = None;

    for (i, line) in input.lines().enumerate() {
        let number = i + 1;
        let trimmed = line.trim();

        if let Some((tag, segment_id)) = parse_open_tag(trimmed) {
            if let Some(open) = current.take() {
                blocks.push(Err(open.unterminated()));
            }
            current = Some(BlockSpan::open(tag, segment_id, number, trimmed));
            continue;
        }

        match current.as_mut() {
            Some(open) if open.tag.is_closed_by(trimmed) => {
                if let Some(mut done) = current.take() {
                    done.close_text = trimmed;
                    blocks.push(Ok(done));
                }
            }
            Some(open) => open.body.push(BodyLine { number, text: line }),
            None if !trimmed.is_empty() => {
                tracing::trace!(line = number, "ignoring text outside any block");
            }
            None => {}
        }
    }

    if let Some(open) = current {
        blocks.push(Err(open.unterminated()));
    }

    blocks
}
