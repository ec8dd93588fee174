//! Testing utilities for the USR workspace
//!
//! Shared fixtures, a record builder, and proptest strategies.

#![allow(missing_docs)]

use proptest::prelude::*;
use usr_model::{
    ConstructionEntry, EntryId, LexicalEntry, RelationEntry, SentenceType, TokenIndex, UsrRecord,
    Vocabulary, UNSET,
};

/// Two-token block with one dependency
pub const TWO_TOKEN_BLOCK: &str = "<segment_id=S1>\n#hello world\nhello\t1\t-\t-\t-\t-\t-\t-\t-\nworld\t2\t-\t-\t1:k1\t-\t-\t-\t-\n</segment_id>";

/// Builder for hand-written records
///
/// Linked entries reuse the id of the lexical entry at the same index, so
/// fixtures behave like records produced by the editor.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    record: UsrRecord,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(mut self, concept: &str, index: u32) -> Self {
        self.record.lexical_info.push(LexicalEntry::new(
            EntryId::generate(),
            concept,
            TokenIndex::new(index),
        ));
        self
    }

    pub fn lexical(mut self, index: u32, f: impl FnOnce(&mut LexicalEntry)) -> Self {
        if let Some(entry) = self
            .record
            .lexical_info
            .iter_mut()
            .find(|e| e.index == TokenIndex::new(index))
        {
            f(entry);
        }
        self
    }

    pub fn dependency(mut self, index: u32, head: Option<u32>, relation: &str) -> Self {
        let (id, concept) = self.identity(index);
        self.record.dependency_info.push(
            RelationEntry::blank(id, concept, TokenIndex::new(index))
                .with_head(head.map(TokenIndex::new), relation),
        );
        self
    }

    pub fn coref(mut self, index: u32, head: Option<u32>, relation: &str) -> Self {
        let (id, concept) = self.identity(index);
        self.record.discourse_coref_info.push(
            RelationEntry::blank(id, concept, TokenIndex::new(index))
                .with_head(head.map(TokenIndex::new), relation),
        );
        self
    }

    pub fn construction(mut self, index: u32, cxn: Option<u32>, component: &str) -> Self {
        let (id, concept) = self.identity(index);
        self.record.construction_info.push(
            ConstructionEntry::blank(id, concept, TokenIndex::new(index))
                .with_cxn(cxn.map(TokenIndex::new), component),
        );
        self
    }

    /// Blank entries in every linking layer, as the editor adds them
    pub fn blank_links(mut self, index: u32) -> Self {
        let (id, concept) = self.identity(index);
        let at = TokenIndex::new(index);
        self.record
            .dependency_info
            .push(RelationEntry::blank(id.clone(), concept.clone(), at));
        self.record
            .discourse_coref_info
            .push(RelationEntry::blank(id.clone(), concept.clone(), at));
        self.record
            .construction_info
            .push(ConstructionEntry::blank(id, concept, at));
        self
    }

    pub fn sentence_type(mut self, sentence_type: SentenceType) -> Self {
        self.record.sentence_type = sentence_type;
        self
    }

    pub fn scope(mut self, scope: &str) -> Self {
        self.record.sentence_type_info.scope = Some(scope.to_string());
        self
    }

    pub fn build(self) -> UsrRecord {
        self.record
    }

    fn identity(&self, index: u32) -> (EntryId, String) {
        self.record
            .lexical_at(TokenIndex::new(index))
            .map_or_else(
                || (EntryId::generate(), format!("orphan_{index}")),
                |e| (e.id.clone(), e.concept.clone()),
            )
    }
}

/// "The earth shakes" with a conjunction construction
pub fn sample_record() -> UsrRecord {
    RecordBuilder::new()
        .token("BUkampa_1", 1)
        .token("A_1", 2)
        .token("[conj_1]", 3)
        .lexical(1, |e| {
            e.semantic_category = Some("anim".to_string());
            e.morpho_semantic = Some("pl".to_string());
        })
        .dependency(1, Some(2), "k1")
        .dependency(2, Some(0), "main")
        .construction(1, Some(3), "op1")
        .construction(2, Some(3), "op2")
        .build()
}

/// Record with lexical entries only
pub fn lexical_only(concepts: &[(&str, u32)]) -> UsrRecord {
    concepts
        .iter()
        .fold(RecordBuilder::new(), |b, (c, i)| b.token(c, *i))
        .build()
}

fn vocab_value(vocabulary: Vocabulary) -> impl Strategy<Value = Option<String>> {
    let values: Vec<String> = vocabulary
        .values()
        .iter()
        .filter(|v| **v != UNSET && !v.is_empty())
        .map(|v| (*v).to_string())
        .collect();
    proptest::option::of(proptest::sample::select(values))
}

/// Link from one token: target index (drawn from `0..=tokens`) and label
fn link(vocabulary: Vocabulary, tokens: u32) -> impl Strategy<Value = (u32, String)> {
    let labels: Vec<String> = vocabulary
        .values()
        .iter()
        .filter(|v| **v != UNSET && !v.is_empty())
        .map(|v| (*v).to_string())
        .collect();
    (0..=tokens, proptest::sample::select(labels))
}

type TokenShape = (
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Vec<(u32, String)>,
    Vec<(u32, String)>,
    Vec<(u32, String)>,
);

fn token_shape(tokens: u32) -> impl Strategy<Value = TokenShape> {
    (
        "[a-zA-Z]{1,10}_[1-9]",
        vocab_value(Vocabulary::SemanticCategory),
        vocab_value(Vocabulary::MorphoSemantic),
        vocab_value(Vocabulary::SpeakersView),
        proptest::collection::vec(link(Vocabulary::DependencyRelation, tokens), 0..3),
        proptest::collection::vec(link(Vocabulary::DiscourseRelation, tokens), 0..2),
        proptest::collection::vec(link(Vocabulary::ComponentType, tokens), 0..2),
    )
}

/// Records that survive an encode/decode round trip
///
/// Vocabulary-valid values, unique indices, no blank or dangling linked
/// entries, no per-entry scope, sentence type declarative, interrogative or
/// imperative, at least one token.
pub fn arb_round_trip_record() -> impl Strategy<Value = UsrRecord> {
    (1u32..6)
        .prop_flat_map(|tokens| {
            (
                proptest::collection::vec(token_shape(tokens), tokens as usize),
                prop_oneof![
                    Just(SentenceType::Declarative),
                    Just(SentenceType::Interrogative),
                    Just(SentenceType::Imperative),
                ],
                proptest::option::of(prop_oneof![
                    Just("affirmative".to_string()),
                    Just("negative".to_string()),
                ]),
            )
        })
        .prop_map(|(shapes, sentence_type, scope)| {
            let mut builder = RecordBuilder::new().sentence_type(sentence_type);
            for (i, shape) in shapes.iter().enumerate() {
                let index = u32::try_from(i).unwrap_or(u32::MAX - 1) + 1;
                let (concept, sem, morpho, view, _, _, _) = shape;
                builder = builder.token(concept, index).lexical(index, |e| {
                    e.semantic_category = sem.clone();
                    e.morpho_semantic = morpho.clone();
                    e.speakers_view = view.clone();
                });
            }
            for (i, (_, _, _, _, deps, corefs, cxns)) in shapes.iter().enumerate() {
                let index = u32::try_from(i).unwrap_or(u32::MAX - 1) + 1;
                for (head, rel) in deps {
                    builder = builder.dependency(index, Some(*head), rel);
                }
                for (head, rel) in corefs {
                    builder = builder.coref(index, Some(*head), rel);
                }
                for (cxn, component) in cxns {
                    builder = builder.construction(index, Some(*cxn), component);
                }
            }
            if let Some(scope) = scope {
                builder = builder.scope(&scope);
            }
            builder.build()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_record_links_share_lexical_ids() {
        let record = sample_record();
        assert_eq!(record.lexical_info.len(), 3);
        assert_eq!(record.dependency_info[0].id, record.lexical_info[0].id);
        assert!(record.dangling_references().is_empty());
    }

    #[test]
    fn lexical_only_has_no_links() {
        let record = lexical_only(&[("a", 1), ("b", 2)]);
        assert_eq!(record.next_index(), TokenIndex::new(3));
        assert!(record.dependency_info.is_empty());
    }
}
