//! Block decoding
//!
//! One [`Decoder`] with two modes over the shared block scanner:
//!
//! - [`DecodeMode::Full`] parses entry lines into a [`UsrRecord`]
//! - [`DecodeMode::Raw`] keeps the block text verbatim and only reads `%`
//!   markers, for hand-off to an authoritative parser elsewhere
//!
//! Each block produces its own `Result`; a malformed block never hides the
//! blocks around it.

use crate::block::{scan_blocks, BlockSpan, BlockTag};
use crate::error::{DecodeError, EntryLineFault};
use crate::reference::{parse_field, Reference};
use serde::Serialize;
use tracing::{debug, trace};
use usr_model::{
    normalize_unset, ConstructionEntry, EntryId, LexicalEntry, LinkedEntry, SentenceType,
    TokenIndex, UsrRecord,
};

/// Number of tab-separated columns in an entry line
pub const ENTRY_FIELDS: usize = 9;

const COMMENT_PREFIX: char = '#';
const MARKER_PREFIX: char = '%';

/// How much of a block to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Parse every entry line
    #[default]
    Full,
    /// Keep the text, read only markers
    Raw,
}

/// A fully decoded block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedBlock {
    #[serde(skip)]
    pub tag: BlockTag,
    pub segment_id: String,
    /// Text of the `#` line, without the `#`
    pub comment: Option<String>,
    pub record: UsrRecord,
}

/// A block kept verbatim, with best-effort hints from its markers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawRecord {
    #[serde(skip)]
    pub tag: BlockTag,
    pub segment_id: String,
    /// Line of the opening tag
    pub open_line: usize,
    /// Trimmed lines of the block, tags included, each followed by `\n`
    pub raw_text: String,
    pub sentence_type: SentenceType,
    pub scope: Option<String>,
}

/// Output of one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Full(DecodedBlock),
    Raw(RawRecord),
}

impl Decoded {
    /// Identifier from the opening tag
    #[must_use]
    pub fn segment_id(&self) -> &str {
        match self {
            Self::Full(b) => &b.segment_id,
            Self::Raw(r) => &r.segment_id,
        }
    }
}

/// A `%` marker line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// `interrogative`, `imperative` or `declarative`
    SentenceType(SentenceType),
    /// `affirmative` or `negative`
    Scope(String),
    /// Anything else; ignored
    Unknown(String),
}

impl Marker {
    /// Parse a trimmed line; `None` when it is not a marker line
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let keyword = line.strip_prefix(MARKER_PREFIX)?.trim().to_ascii_lowercase();
        let marker = match keyword.as_str() {
            "interrogative" => Self::SentenceType(SentenceType::Interrogative),
            "imperative" => Self::SentenceType(SentenceType::Imperative),
            "declarative" => Self::SentenceType(SentenceType::Declarative),
            scope @ ("affirmative" | "negative") => Self::Scope(scope.to_string()),
            other => Self::Unknown(other.to_string()),
        };
        Some(marker)
    }
}

/// Sentence-level hints accumulated from markers
#[derive(Debug, Default)]
struct MarkerState {
    sentence_type: SentenceType,
    scope: Option<String>,
}

impl MarkerState {
    fn apply(&mut self, marker: Marker, line: usize) {
        match marker {
            Marker::SentenceType(t) => self.sentence_type = t,
            Marker::Scope(s) => self.scope = Some(s),
            Marker::Unknown(k) => trace!(line, marker = %k, "ignoring unknown marker"),
        }
    }
}

/// Decoder for the block text format
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    mode: DecodeMode,
}

impl Decoder {
    /// Create new decoder
    #[inline]
    #[must_use]
    pub fn new(mode: DecodeMode) -> Self {
        Self { mode }
    }

    /// Mode of this decoder
    #[inline]
    #[must_use]
    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    /// Decode every block in the input
    #[must_use]
    pub fn decode(&self, input: &str) -> Vec<Result<Decoded, DecodeError>> {
        scan_blocks(input)
            .into_iter()
            .map(|span| {
                let span = span?;
                match self.mode {
                    DecodeMode::Full => decode_span(&span).map(Decoded::Full),
                    DecodeMode::Raw => Ok(Decoded::Raw(raw_span(&span))),
                }
            })
            .collect()
    }
}

/// Fully decode every block
#[must_use]
pub fn decode_full(input: &str) -> Vec<Result<DecodedBlock, DecodeError>> {
    scan_blocks(input)
        .into_iter()
        .map(|span| decode_span(&span?))
        .collect()
}

/// Raw-decode every block
#[must_use]
pub fn decode_raw(input: &str) -> Vec<Result<RawRecord, DecodeError>> {
    scan_blocks(input)
        .into_iter()
        .map(|span| span.map(|s| raw_span(&s)))
        .collect()
}

/// Fully decode the first block of the input
///
/// # Errors
/// [`DecodeError::MissingBlock`] when there is no block, otherwise the first
/// block's own error
pub fn decode_block(input: &str) -> Result<DecodedBlock, DecodeError> {
    decode_full(input)
        .into_iter()
        .next()
        .unwrap_or(Err(DecodeError::MissingBlock))
}

/// One entry line before sentence-level scope is known
struct EntryRow {
    lexical: LexicalEntry,
    scope_column: Option<String>,
}

fn decode_span(span: &BlockSpan<'_>) -> Result<DecodedBlock, DecodeError> {
    let mut record = UsrRecord::new();
    let mut markers = MarkerState::default();
    let mut comment = None;
    let mut rows = Vec::new();

    for body in &span.body {
        let line = body.text.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(text) = line.strip_prefix(COMMENT_PREFIX) {
            if comment.is_none() {
                comment = Some(text.to_string());
            }
            continue;
        }
        if let Some(marker) = Marker::parse(line) {
            markers.apply(marker, body.number);
            continue;
        }
        rows.push(decode_entry_line(
            entry_text(body.text),
            body.number,
            &mut record,
        )?);
    }

    let scope = markers.scope.or_else(|| shared_scope(&rows));
    for row in rows {
        let mut lexical = row.lexical;
        lexical.scope = row.scope_column.filter(|s| Some(s) != scope.as_ref());
        record.lexical_info.push(lexical);
    }
    record.sentence_type = markers.sentence_type;
    record.sentence_type_info.scope = scope;

    debug!(
        segment_id = %span.segment_id,
        tokens = record.lexical_info.len(),
        sentence_type = %record.sentence_type,
        "decoded block"
    );

    Ok(DecodedBlock {
        tag: span.tag,
        segment_id: span.segment_id.clone(),
        comment,
        record,
    })
}

/// Scope column value shared by every row, if any
fn shared_scope(rows: &[EntryRow]) -> Option<String> {
    let first = rows.first()?.scope_column.as_ref()?;
    rows.iter()
        .all(|r| r.scope_column.as_ref() == Some(first))
        .then(|| first.clone())
}

/// Body line without surrounding spaces or line ending
///
/// Tabs separate columns and stay, so an empty leading column survives.
fn entry_text(line: &str) -> &str {
    line.trim_matches(|c| c == ' ' || c == '\r')
}

/// Parse one entry line; relation entries go straight into the record
fn decode_entry_line(
    line: &str,
    number: usize,
    record: &mut UsrRecord,
) -> Result<EntryRow, DecodeError> {
    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    let malformed = |fault| DecodeError::MalformedEntryLine {
        line: number,
        raw: line.to_string(),
        fault,
    };

    if fields.len() < ENTRY_FIELDS {
        return Err(malformed(EntryLineFault::FieldCount(fields.len())));
    }
    if fields.len() > ENTRY_FIELDS {
        tracing::warn!(
            line = number,
            extra = fields.len() - ENTRY_FIELDS,
            "ignoring extra columns"
        );
    }

    let index: TokenIndex = fields[1]
        .parse()
        .map_err(|_| malformed(EntryLineFault::BadIndex(fields[1].to_string())))?;
    let concept = fields[0].to_string();
    let id = EntryId::generate();

    let dependencies = parse_field(fields[4], number)?;
    let corefs = parse_field(fields[5], number)?;
    let constructions = parse_field(fields[8], number)?;

    push_linked(&mut record.dependency_info, &id, &concept, index, dependencies);
    push_linked(&mut record.discourse_coref_info, &id, &concept, index, corefs);
    push_linked::<ConstructionEntry>(
        &mut record.construction_info,
        &id,
        &concept,
        index,
        constructions,
    );

    let mut lexical = LexicalEntry::new(id, concept, index);
    lexical.semantic_category = normalize_unset(fields[2]);
    lexical.morpho_semantic = normalize_unset(fields[3]);
    lexical.speakers_view = normalize_unset(fields[6]);

    Ok(EntryRow {
        lexical,
        scope_column: normalize_unset(fields[7]),
    })
}

fn push_linked<E: LinkedEntry>(
    layer: &mut Vec<E>,
    id: &EntryId,
    concept: &str,
    index: TokenIndex,
    references: Vec<Reference>,
) {
    layer.extend(references.into_iter().map(|r| {
        E::new_linked(id.clone(), concept.to_string(), index, r.target, r.label)
    }));
}

fn raw_span(span: &BlockSpan<'_>) -> RawRecord {
    let mut markers = MarkerState::default();
    let mut raw_text = String::new();
    raw_text.push_str(span.open_text);
    raw_text.push('\n');

    for body in &span.body {
        let line = body.text.trim();
        if let Some(marker) = Marker::parse(line) {
            markers.apply(marker, body.number);
        }
        if !line.is_empty() {
            raw_text.push_str(entry_text(body.text));
        }
        raw_text.push('\n');
    }

    raw_text.push_str(span.close_text);
    raw_text.push('\n');

    debug!(segment_id = %span.segment_id, bytes = raw_text.len(), "captured raw block");

    RawRecord {
        tag: span.tag,
        segment_id: span.segment_id.clone(),
        open_line: span.open_line,
        raw_text,
        sentence_type: markers.sentence_type,
        scope: markers.scope,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const S1: &str = "<segment_id=S1>\n#hello world\nhello\t1\t-\t-\t-\t-\t-\t-\t-\nworld\t2\t-\t-\t1:k1\t-\t-\t-\t-\n</segment_id>";

    #[test]
    fn decodes_two_token_block() {
        let block = decode_block(S1).unwrap();
        assert_eq!(block.segment_id, "S1");
        assert_eq!(block.comment.as_deref(), Some("hello world"));

        let record = &block.record;
        assert_eq!(record.lexical_info.len(), 2);
        assert_eq!(record.lexical_info[1].index, TokenIndex::new(2));
        assert_eq!(record.dependency_info.len(), 1);

        let dep = &record.dependency_info[0];
        assert_eq!(dep.index, TokenIndex::new(2));
        assert_eq!(dep.head_index, Some(TokenIndex::new(1)));
        assert_eq!(dep.relation.as_deref(), Some("k1"));
        assert_eq!(dep.id, record.lexical_info[1].id);
        assert_eq!(record.sentence_type, SentenceType::Declarative);
    }

    #[test]
    fn markers_are_case_insensitive() {
        assert_eq!(
            Marker::parse("%Interrogative"),
            Some(Marker::SentenceType(SentenceType::Interrogative))
        );
        assert_eq!(
            Marker::parse("%NEGATIVE"),
            Some(Marker::Scope("negative".to_string()))
        );
        assert_eq!(
            Marker::parse("%exclamative"),
            Some(Marker::Unknown("exclamative".to_string()))
        );
        assert_eq!(Marker::parse("hello"), None);
    }

    #[test]
    fn multiple_references_share_one_token() {
        let input = "<segment_id=M>\nx\t3\t-\t-\t1:k1 2:k2\t-\t-\t-\tnull:op1\n</segment_id>";
        let record = decode_block(input).unwrap().record;
        assert_eq!(record.dependency_info.len(), 2);
        assert!(record.dependency_info.iter().all(|d| d.index == TokenIndex::new(3)));
        assert_eq!(record.dependency_info[1].relation.as_deref(), Some("k2"));
        assert_eq!(record.construction_info[0].cxn_index, None);
        assert_eq!(record.construction_info[0].component_type.as_deref(), Some("op1"));
    }

    #[test]
    fn short_entry_line_is_malformed() {
        let input = "<segment_id=B>\n#t\nhello\t1\t-\n</segment_id>";
        let err = decode_block(input).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MalformedEntryLine {
                line: 3,
                raw: "hello\t1\t-".to_string(),
                fault: EntryLineFault::FieldCount(3),
            }
        );
    }

    #[test]
    fn empty_concept_column_keeps_nine_fields() {
        let input = "<segment_id=E>\n#t\n\t1\t-\t-\t-\t-\t-\t-\t-\r\n</segment_id>";
        let record = decode_block(input).unwrap().record;
        assert_eq!(record.lexical_info.len(), 1);
        assert_eq!(record.lexical_info[0].concept, "");
        assert_eq!(record.lexical_info[0].index, TokenIndex::new(1));

        let raw = decode_raw(input);
        assert_eq!(
            raw[0].as_ref().unwrap().raw_text,
            "<segment_id=E>\n#t\n\t1\t-\t-\t-\t-\t-\t-\t-\n</segment_id>\n"
        );
    }

    #[test]
    fn non_integer_index_is_malformed() {
        let input = "<segment_id=B>\nhello\tone\t-\t-\t-\t-\t-\t-\t-\n</segment_id>";
        assert!(matches!(
            decode_block(input),
            Err(DecodeError::MalformedEntryLine {
                fault: EntryLineFault::BadIndex(_),
                ..
            })
        ));
    }

    #[test]
    fn shared_scope_column_lifts_to_sentence() {
        let input = "<segment_id=N>\na\t1\t-\t-\t-\t-\t-\tnegative\t-\nb\t2\t-\t-\t-\t-\t-\tnegative\t-\n</segment_id>";
        let record = decode_block(input).unwrap().record;
        assert_eq!(record.scope(), Some("negative"));
        assert!(record.lexical_info.iter().all(|e| e.scope.is_none()));
    }

    #[test]
    fn differing_scope_column_is_override() {
        let input = "<segment_id=N>\na\t1\t-\t-\t-\t-\t-\taffirmative\t-\nb\t2\t-\t-\t-\t-\t-\tnegative\t-\n%affirmative\n</segment_id>";
        let record = decode_block(input).unwrap().record;
        assert_eq!(record.scope(), Some("affirmative"));
        assert_eq!(record.lexical_info[0].scope, None);
        assert_eq!(record.lexical_info[1].scope.as_deref(), Some("negative"));
    }

    #[test]
    fn raw_mode_keeps_text_and_reads_markers() {
        let input = "<sent_id=R1>\n  a\t1\t-\t-\t-\t-\t-\t-\t-\n%interrogative\n%negative\n</sent_id>\n";
        let records = decode_raw(input);
        let raw = records[0].as_ref().unwrap();
        assert_eq!(raw.segment_id, "R1");
        assert_eq!(
            raw.raw_text,
            "<sent_id=R1>\na\t1\t-\t-\t-\t-\t-\t-\t-\n%interrogative\n%negative\n</sent_id>\n"
        );
        assert_eq!(raw.sentence_type, SentenceType::Interrogative);
        assert_eq!(raw.scope.as_deref(), Some("negative"));
    }

    #[test]
    fn raw_mode_does_not_parse_entries() {
        let input = "<segment_id=R>\nnot an entry line\n</segment_id>";
        assert!(decode_raw(input)[0].is_ok());
        assert!(decode_full(input)[0].is_err());
    }

    #[test]
    fn decoder_modes_agree_on_blocks() {
        let full = Decoder::new(DecodeMode::Full).decode(S1);
        let raw = Decoder::new(DecodeMode::Raw).decode(S1);
        assert_eq!(full.len(), 1);
        assert_eq!(raw.len(), 1);
        assert_eq!(full[0].as_ref().unwrap().segment_id(), "S1");
        assert!(matches!(raw[0], Ok(Decoded::Raw(_))));
    }

    #[test]
    fn missing_block() {
        assert_eq!(decode_block("no tags here"), Err(DecodeError::MissingBlock));
    }
}
