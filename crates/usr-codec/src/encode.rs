//! Block encoding
//!
//! Encoding never fails: absent data serializes as `-` or `null`.

use crate::block::BlockTag;
use crate::decode::ENTRY_FIELDS;
use crate::reference::format_field;
use usr_model::{LexicalEntry, LinkedEntry, TokenIndex, UsrRecord, UNSET};

/// Encoder for the block text format
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder {
    tag: BlockTag,
}

impl Encoder {
    /// Create new encoder writing `<segment_id=...>` blocks
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different delimiter pair
    #[inline]
    #[must_use]
    pub fn with_tag(mut self, tag: BlockTag) -> Self {
        self.tag = tag;
        self
    }

    /// Encode a record as one block, without a trailing newline
    ///
    /// The scope column holds the entry's own scope, else the sentence scope.
    /// A record without sentence scope whose entries all carry the same
    /// override decodes with that value as its sentence scope instead.
    #[must_use]
    pub fn encode(&self, record: &UsrRecord, segment_id: &str, text: &str) -> String {
        let mut lines = Vec::with_capacity(record.lexical_info.len() + 4);
        lines.push(self.tag.open(segment_id));
        lines.push(format!("#{text}"));

        for entry in record.lexical_by_index() {
            lines.push(entry_line(record, entry));
        }

        if !record.sentence_type.is_default() {
            lines.push(format!("%{}", record.sentence_type));
        }

        lines.push(self.tag.close().to_string());

        tracing::trace!(segment_id, lines = lines.len(), "encoded block");
        lines.join("\n")
    }
}

/// Encode a record as a `<segment_id=...>` block
#[must_use]
pub fn encode(record: &UsrRecord, segment_id: &str, text: &str) -> String {
    Encoder::new().encode(record, segment_id, text)
}

fn entry_line(record: &UsrRecord, entry: &LexicalEntry) -> String {
    let scope = entry
        .scope
        .as_deref()
        .or_else(|| record.scope())
        .unwrap_or(UNSET);

    let columns: [String; ENTRY_FIELDS] = [
        entry.concept.clone(),
        entry.index.to_string(),
        or_unset(entry.semantic_category.as_deref()),
        or_unset(entry.morpho_semantic.as_deref()),
        relation_column(&record.dependency_info, entry.index),
        relation_column(&record.discourse_coref_info, entry.index),
        or_unset(entry.speakers_view.as_deref()),
        scope.to_string(),
        relation_column(&record.construction_info, entry.index),
    ];
    columns.join("\t")
}

fn relation_column<E: LinkedEntry>(layer: &[E], index: TokenIndex) -> String {
    format_field(layer.iter().filter(|e| e.index() == index))
}

#[inline]
fn or_unset(value: Option<&str>) -> String {
    value.unwrap_or(UNSET).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use usr_model::{ConstructionEntry, EntryId, RelationEntry, SentenceType};

    fn token(record: &mut UsrRecord, concept: &str, index: u32) -> EntryId {
        let id = EntryId::generate();
        record
            .lexical_info
            .push(LexicalEntry::new(id.clone(), concept, TokenIndex::new(index)));
        id
    }

    #[test]
    fn uniform_entry_scope_decodes_as_sentence_scope() {
        let mut record = UsrRecord::new();
        token(&mut record, "a", 1);
        token(&mut record, "b", 2);
        for entry in &mut record.lexical_info {
            entry.scope = Some("negative".to_string());
        }

        let decoded = crate::decode::decode_block(&encode(&record, "S", "a b"))
            .unwrap()
            .record;
        assert_eq!(decoded.scope(), Some("negative"));
        assert!(decoded.lexical_info.iter().all(|e| e.scope.is_none()));
    }

    #[test]
    fn empty_record_has_frame_only() {
        let text = encode(&UsrRecord::new(), "S0", "");
        assert_eq!(text, "<segment_id=S0>\n#\n</segment_id>");
    }

    #[test]
    fn entries_are_sorted_by_index() {
        let mut record = UsrRecord::new();
        token(&mut record, "b", 2);
        token(&mut record, "a", 1);
        let text = encode(&record, "S", "a b");
        let lines: Vec<_> = text.lines().collect();
        assert!(lines[2].starts_with("a\t1\t"));
        assert!(lines[3].starts_with("b\t2\t"));
    }

    #[test]
    fn null_target_and_unset_label() {
        let mut record = UsrRecord::new();
        let id = token(&mut record, "x", 1);
        record.construction_info.push(
            ConstructionEntry::blank(id.clone(), "x", TokenIndex::new(1)).with_cxn(None, "op1"),
        );
        record.dependency_info.push(
            RelationEntry::blank(id, "x", TokenIndex::new(1)).with_head(Some(TokenIndex::new(0)), "-"),
        );
        let text = encode(&record, "S", "x");
        assert_eq!(text.lines().nth(2), Some("x\t1\t-\t-\t0:-\t-\t-\t-\tnull:op1"));
    }

    #[test]
    fn scope_column_prefers_entry_override() {
        let mut record = UsrRecord::new();
        token(&mut record, "a", 1);
        token(&mut record, "b", 2);
        record.lexical_info[1].scope = Some("negative".to_string());
        record.sentence_type_info.scope = Some("affirmative".to_string());

        let text = encode(&record, "S", "");
        let scopes: Vec<_> = text
            .lines()
            .skip(2)
            .take(2)
            .map(|l| l.split('\t').nth(7).unwrap_or_default())
            .collect();
        assert_eq!(scopes, vec!["affirmative", "negative"]);
    }

    #[test]
    fn marker_only_for_non_declarative() {
        let mut record = UsrRecord::new();
        token(&mut record, "a", 1);
        assert!(!encode(&record, "S", "").contains('%'));

        record.sentence_type = SentenceType::Interrogative;
        let text = encode(&record, "S", "");
        assert_eq!(text.matches('%').count(), 1);
        assert!(text.ends_with("%interrogative\n</segment_id>"));
    }

    #[test]
    fn sent_id_tag() {
        let text = Encoder::new()
            .with_tag(BlockTag::SentId)
            .encode(&UsrRecord::new(), "7", "t");
        assert_eq!(text, "<sent_id=7>\n#t\n</sent_id>");
    }
}
