//! The four-layer USR record
//!
//! [`UsrRecord`] is also the JSON structural transport: its field names are
//! the ones the external service reads and writes.

use crate::entry::{ConstructionEntry, LexicalEntry, LinkedEntry, RelationEntry};
use crate::error::ModelError;
use crate::index::{lenient, TokenIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Sentence-level mood/polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentenceType {
    #[default]
    Declarative,
    Interrogative,
    Imperative,
    Affirmative,
    Negative,
}

impl SentenceType {
    /// All sentence types
    pub const ALL: [SentenceType; 5] = [
        SentenceType::Declarative,
        SentenceType::Interrogative,
        SentenceType::Imperative,
        SentenceType::Affirmative,
        SentenceType::Negative,
    ];

    /// Lowercase keyword, as used in `%` marker lines
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Declarative => "declarative",
            Self::Interrogative => "interrogative",
            Self::Imperative => "imperative",
            Self::Affirmative => "affirmative",
            Self::Negative => "negative",
        }
    }

    /// Is this the default type?
    #[inline]
    #[must_use]
    pub fn is_default(self) -> bool {
        self == Self::Declarative
    }
}

impl Display for SentenceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentenceType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| ModelError::UnknownSentenceType(s.to_string()))
    }
}

/// Sentence-level discourse information
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SentenceTypeInfo {
    /// Scope marker (`affirmative`, `negative`, or free text)
    #[serde(
        default,
        deserialize_with = "crate::index::lenient::deserialize_unset",
        skip_serializing_if = "Option::is_none"
    )]
    pub scope: Option<String>,
}

/// One of the four annotation layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Lexical,
    Dependency,
    Discourse,
    Construction,
}

impl Layer {
    /// All layers in presentation order
    pub const ALL: [Layer; 4] = [
        Layer::Lexical,
        Layer::Dependency,
        Layer::Discourse,
        Layer::Construction,
    ];

    /// Section name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lexical => "lexical",
            Self::Dependency => "dependency",
            Self::Discourse => "discourse",
            Self::Construction => "construction",
        }
    }
}

impl Display for Layer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layer {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| ModelError::UnknownLayer(s.to_string()))
    }
}

/// Universal Semantic Representation of one segment
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsrRecord {
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub sentence_type: SentenceType,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub sentence_type_info: SentenceTypeInfo,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub lexical_info: Vec<LexicalEntry>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub dependency_info: Vec<RelationEntry>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub discourse_coref_info: Vec<RelationEntry>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub construction_info: Vec<ConstructionEntry>,
}

impl UsrRecord {
    /// Create an empty record
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the JSON structural transport
    ///
    /// # Errors
    /// Returns the serde error if the document does not match the schema
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to the JSON structural transport
    ///
    /// # Errors
    /// Only fails if serde_json fails on a string map, which it does not
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Sentence-level scope
    #[inline]
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.sentence_type_info.scope.as_deref()
    }

    /// Number of entries in a layer
    #[must_use]
    pub fn layer_len(&self, layer: Layer) -> usize {
        match layer {
            Layer::Lexical => self.lexical_info.len(),
            Layer::Dependency => self.dependency_info.len(),
            Layer::Discourse => self.discourse_coref_info.len(),
            Layer::Construction => self.construction_info.len(),
        }
    }

    /// Empty one layer
    pub fn clear_layer(&mut self, layer: Layer) {
        match layer {
            Layer::Lexical => self.lexical_info.clear(),
            Layer::Dependency => self.dependency_info.clear(),
            Layer::Discourse => self.discourse_coref_info.clear(),
            Layer::Construction => self.construction_info.clear(),
        }
    }

    /// Every index named by any layer
    pub fn all_indices(&self) -> impl Iterator<Item = TokenIndex> + '_ {
        self.lexical_info
            .iter()
            .map(|e| e.index)
            .chain(self.dependency_info.iter().map(|e| e.index))
            .chain(self.discourse_coref_info.iter().map(|e| e.index))
            .chain(self.construction_info.iter().map(|e| e.index))
    }

    /// Index for a new token: one past the largest index in any layer
    #[must_use]
    pub fn next_index(&self) -> TokenIndex {
        self.all_indices()
            .max()
            .map_or(TokenIndex::new(1), TokenIndex::next)
    }

    /// Lexical entry at a token index
    #[must_use]
    pub fn lexical_at(&self, index: TokenIndex) -> Option<&LexicalEntry> {
        self.lexical_info.iter().find(|e| e.index == index)
    }

    /// Lexical entries in ascending index order (stable for duplicates)
    #[must_use]
    pub fn lexical_by_index(&self) -> Vec<&LexicalEntry> {
        let mut entries: Vec<_> = self.lexical_info.iter().collect();
        entries.sort_by_key(|e| e.index);
        entries
    }

    /// Lexical indices that occur more than once
    #[must_use]
    pub fn duplicate_lexical_indices(&self) -> Vec<TokenIndex> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for entry in &self.lexical_info {
            if !seen.insert(entry.index) && !duplicates.contains(&entry.index) {
                duplicates.push(entry.index);
            }
        }
        duplicates
    }

    /// Entries in the linking layers whose index has no lexical entry
    ///
    /// Reported as [`ModelError::DanglingIndexReference`], in layer order.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<ModelError> {
        let known: HashSet<TokenIndex> = self.lexical_info.iter().map(|e| e.index).collect();
        let mut out = Vec::new();
        let mut scan = |layer: Layer, indices: &mut dyn Iterator<Item = TokenIndex>| {
            for index in indices {
                if !known.contains(&index) {
                    out.push(ModelError::DanglingIndexReference { layer, index });
                }
            }
        };
        scan(Layer::Dependency, &mut self.dependency_info.iter().map(|e| e.index));
        scan(Layer::Discourse, &mut self.discourse_coref_info.iter().map(|e| e.index));
        scan(Layer::Construction, &mut self.construction_info.iter().map(|e| e.index));
        out
    }

    /// Identity-independent structural equality
    ///
    /// Ignores `id` fields and insertion order across tokens; entries sharing
    /// an index must still appear in the same relative order.
    #[must_use]
    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.sentence_type == other.sentence_type
            && self.sentence_type_info == other.sentence_type_info
            && lexical_shape(&self.lexical_info) == lexical_shape(&other.lexical_info)
            && linked_shape(&self.dependency_info) == linked_shape(&other.dependency_info)
            && linked_shape(&self.discourse_coref_info)
                == linked_shape(&other.discourse_coref_info)
            && linked_shape(&self.construction_info) == linked_shape(&other.construction_info)
    }
}

type LexicalShape<'a> = (
    TokenIndex,
    &'a str,
    Option<&'a str>,
    Option<&'a str>,
    Option<&'a str>,
    Option<&'a str>,
);

fn lexical_shape(entries: &[LexicalEntry]) -> Vec<LexicalShape<'_>> {
    let mut shape: Vec<_> = entries
        .iter()
        .map(|e| {
            (
                e.index,
                e.concept.as_str(),
                e.semantic_category.as_deref(),
                e.morpho_semantic.as_deref(),
                e.speakers_view.as_deref(),
                e.scope.as_deref(),
            )
        })
        .collect();
    shape.sort_by_key(|s| s.0);
    shape
}

fn linked_shape<E: LinkedEntry>(
    entries: &[E],
) -> Vec<(TokenIndex, &str, Option<TokenIndex>, Option<&str>)> {
    let mut shape: Vec<_> = entries
        .iter()
        .map(|e| (e.index(), e.concept(), e.target(), e.label()))
        .collect();
    shape.sort_by_key(|s| s.0);
    shape
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::EntryId;
    use pretty_assertions::assert_eq;

    fn record_with(indices: &[u32]) -> UsrRecord {
        let mut record = UsrRecord::new();
        for &i in indices {
            record.lexical_info.push(LexicalEntry::new(
                EntryId::generate(),
                format!("c{i}"),
                TokenIndex::new(i),
            ));
        }
        record
    }

    #[test]
    fn next_index_on_empty_record_is_one() {
        assert_eq!(UsrRecord::new().next_index(), TokenIndex::new(1));
    }

    #[test]
    fn next_index_considers_all_layers() {
        let mut record = record_with(&[1, 2]);
        record.construction_info.push(ConstructionEntry::blank(
            EntryId::generate(),
            "[conj_1]",
            TokenIndex::new(9),
        ));
        assert_eq!(record.next_index(), TokenIndex::new(10));
    }

    #[test]
    fn dangling_references_are_reported_per_layer() {
        let mut record = record_with(&[1]);
        record.dependency_info.push(
            RelationEntry::blank(EntryId::generate(), "c1", TokenIndex::new(1))
                .with_head(Some(TokenIndex::new(0)), "main"),
        );
        record
            .discourse_coref_info
            .push(RelationEntry::blank(EntryId::generate(), "x", TokenIndex::new(4)));

        assert_eq!(
            record.dangling_references(),
            vec![ModelError::DanglingIndexReference {
                layer: Layer::Discourse,
                index: TokenIndex::new(4),
            }]
        );
    }

    #[test]
    fn structural_equality_ignores_ids_and_token_order() {
        let a = record_with(&[1, 2]);
        let b = record_with(&[2, 1]);
        assert_ne!(a, b);
        assert!(a.structurally_eq(&b));

        let mut c = record_with(&[1, 2]);
        c.sentence_type = SentenceType::Interrogative;
        assert!(!a.structurally_eq(&c));
    }

    #[test]
    fn duplicate_indices() {
        let record = record_with(&[1, 2, 2, 3, 2]);
        assert_eq!(record.duplicate_lexical_indices(), vec![TokenIndex::new(2)]);
    }

    #[test]
    fn json_transport_field_names() {
        let json = r#"{
            "sentence_type": "interrogative",
            "lexical_info": [
                {"concept": "BUkampa_1", "index": 1, "semantic_category": "",
                 "morpho_semantic": "pl", "speakers_view": "-"}
            ],
            "dependency_info": [
                {"concept": "BUkampa_1", "index": 1, "head_index": 9, "relation": "op1"}
            ],
            "sentence_type_info": {"scope": "affirmative"}
        }"#;
        let record = UsrRecord::from_json(json).unwrap();
        assert_eq!(record.sentence_type, SentenceType::Interrogative);
        assert_eq!(record.scope(), Some("affirmative"));
        assert_eq!(record.lexical_info[0].semantic_category, None);
        assert_eq!(record.lexical_info[0].morpho_semantic.as_deref(), Some("pl"));
        assert_eq!(record.lexical_info[0].speakers_view, None);
        assert_eq!(record.dependency_info[0].head_index, Some(TokenIndex::new(9)));
        assert!(record.discourse_coref_info.is_empty());
    }

    #[test]
    fn null_fields_read_as_defaults() {
        let json = r#"{
            "sentence_type": null,
            "sentence_type_info": null,
            "lexical_info": [{"concept": null, "index": 1}],
            "dependency_info": null,
            "discourse_coref_info": null,
            "construction_info": [{"concept": null, "index": 1}]
        }"#;
        let record = UsrRecord::from_json(json).unwrap();
        assert_eq!(record.sentence_type, SentenceType::default());
        assert_eq!(record.sentence_type_info, SentenceTypeInfo::default());
        assert_eq!(record.lexical_info[0].concept, "");
        assert_eq!(record.lexical_info[0].index, TokenIndex::new(1));
        assert!(record.dependency_info.is_empty());
        assert!(record.discourse_coref_info.is_empty());
        assert_eq!(record.construction_info[0].concept, "");
    }

    #[test]
    fn sentence_type_parse() {
        assert_eq!("Interrogative".parse::<SentenceType>().unwrap(), SentenceType::Interrogative);
        assert!("exclamative".parse::<SentenceType>().is_err());
        assert!(SentenceType::default().is_default());
    }
}
