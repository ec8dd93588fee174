//! Layer entries
//!
//! The lexical layer has one entry per token. The dependency, discourse and
//! construction layers have zero or more entries per token, each linking the
//! token to a target index with a label; [`LinkedEntry`] abstracts over them.

use crate::index::{lenient, EntryId, TokenIndex};
use serde::{Deserialize, Serialize};

/// One token of the lexical layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalEntry {
    #[serde(default)]
    pub id: EntryId,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub concept: String,
    pub index: TokenIndex,
    #[serde(
        default,
        deserialize_with = "lenient::deserialize_unset",
        serialize_with = "lenient::serialize_unset"
    )]
    pub semantic_category: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::deserialize_unset",
        serialize_with = "lenient::serialize_unset"
    )]
    pub morpho_semantic: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::deserialize_unset",
        serialize_with = "lenient::serialize_unset"
    )]
    pub speakers_view: Option<String>,
    /// Per-entry scope override; falls back to the sentence scope
    #[serde(
        default,
        deserialize_with = "lenient::deserialize_unset",
        skip_serializing_if = "Option::is_none"
    )]
    pub scope: Option<String>,
}

impl LexicalEntry {
    /// Create an entry with every optional field unset
    #[must_use]
    pub fn new(id: EntryId, concept: impl Into<String>, index: TokenIndex) -> Self {
        Self {
            id,
            concept: concept.into(),
            index,
            semantic_category: None,
            morpho_semantic: None,
            speakers_view: None,
            scope: None,
        }
    }
}

/// Dependency or discourse/coreference relation of one token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEntry {
    #[serde(default)]
    pub id: EntryId,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub concept: String,
    pub index: TokenIndex,
    #[serde(default, deserialize_with = "lenient::deserialize_target")]
    pub head_index: Option<TokenIndex>,
    #[serde(
        default,
        deserialize_with = "lenient::deserialize_unset",
        serialize_with = "lenient::serialize_unset"
    )]
    pub relation: Option<String>,
}

impl RelationEntry {
    /// Create a blank relation (null head, unset label)
    #[must_use]
    pub fn blank(id: EntryId, concept: impl Into<String>, index: TokenIndex) -> Self {
        Self {
            id,
            concept: concept.into(),
            index,
            head_index: None,
            relation: None,
        }
    }

    /// Set head and label
    #[must_use]
    pub fn with_head(mut self, head: Option<TokenIndex>, relation: impl Into<String>) -> Self {
        self.head_index = head;
        self.relation = crate::vocab::normalize_unset(&relation.into());
        self
    }
}

/// Membership of one token in a construction instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionEntry {
    #[serde(default)]
    pub id: EntryId,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub concept: String,
    pub index: TokenIndex,
    #[serde(default, deserialize_with = "lenient::deserialize_target")]
    pub cxn_index: Option<TokenIndex>,
    #[serde(
        default,
        deserialize_with = "lenient::deserialize_unset",
        serialize_with = "lenient::serialize_unset"
    )]
    pub component_type: Option<String>,
}

impl ConstructionEntry {
    /// Create a blank membership (null construction, unset component type)
    #[must_use]
    pub fn blank(id: EntryId, concept: impl Into<String>, index: TokenIndex) -> Self {
        Self {
            id,
            concept: concept.into(),
            index,
            cxn_index: None,
            component_type: None,
        }
    }

    /// Set construction index and component type
    #[must_use]
    pub fn with_cxn(mut self, cxn: Option<TokenIndex>, component: impl Into<String>) -> Self {
        self.cxn_index = cxn;
        self.component_type = crate::vocab::normalize_unset(&component.into());
        self
    }
}

/// Common view of the three linking layers
///
/// Each entry links the token at [`index`](LinkedEntry::index) to a target
/// (head or construction index) with a label (relation or component type).
pub trait LinkedEntry: Clone {
    /// Build a new entry for a token
    fn new_linked(
        id: EntryId,
        concept: String,
        index: TokenIndex,
        target: Option<TokenIndex>,
        label: Option<String>,
    ) -> Self;

    /// Shared identity
    fn id(&self) -> &EntryId;

    /// Concept of the token
    fn concept(&self) -> &str;

    /// Mutable concept
    fn concept_mut(&mut self) -> &mut String;

    /// Token index
    fn index(&self) -> TokenIndex;

    /// Head or construction index
    fn target(&self) -> Option<TokenIndex>;

    /// Relation or component label
    fn label(&self) -> Option<&str>;

    /// Neither target nor label is set
    fn is_blank(&self) -> bool {
        self.target().is_none() && self.label().is_none()
    }
}

impl LinkedEntry for RelationEntry {
    fn new_linked(
        id: EntryId,
        concept: String,
        index: TokenIndex,
        target: Option<TokenIndex>,
        label: Option<String>,
    ) -> Self {
        Self {
            id,
            concept,
            index,
            head_index: target,
            relation: label,
        }
    }

    fn id(&self) -> &EntryId {
        &self.id
    }

    fn concept(&self) -> &str {
        &self.concept
    }

    fn concept_mut(&mut self) -> &mut String {
        &mut self.concept
    }

    fn index(&self) -> TokenIndex {
        self.index
    }

    fn target(&self) -> Option<TokenIndex> {
        self.head_index
    }

    fn label(&self) -> Option<&str> {
        self.relation.as_deref()
    }
}

impl LinkedEntry for ConstructionEntry {
    fn new_linked(
        id: EntryId,
        concept: String,
        index: TokenIndex,
        target: Option<TokenIndex>,
        label: Option<String>,
    ) -> Self {
        Self {
            id,
            concept,
            index,
            cxn_index: target,
            component_type: label,
        }
    }

    fn id(&self) -> &EntryId {
        &self.id
    }

    fn concept(&self) -> &str {
        &self.concept
    }

    fn concept_mut(&mut self) -> &mut String {
        &mut self.concept
    }

    fn index(&self) -> TokenIndex {
        self.index
    }

    fn target(&self) -> Option<TokenIndex> {
        self.cxn_index
    }

    fn label(&self) -> Option<&str> {
        self.component_type.as_deref()
    }
}
