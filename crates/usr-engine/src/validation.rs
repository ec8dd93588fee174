//! Field-level validation report

use crate::field::EntryRef;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use usr_model::{Layer, TokenIndex, Vocabulary};

/// What is wrong with an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// Lexical concept is empty
    RequiredConceptMissing,
    /// Value outside its vocabulary
    InvalidEnumValue {
        vocabulary: Vocabulary,
        value: String,
    },
    /// Linked entry whose index has no lexical entry
    DanglingIndexReference,
    /// Two lexical entries share an index
    DuplicateIndex,
}

impl Display for IssueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequiredConceptMissing => f.write_str("concept is required"),
            Self::InvalidEnumValue { vocabulary, value } => {
                write!(f, "invalid {vocabulary} value: '{value}'")
            }
            Self::DanglingIndexReference => f.write_str("index has no matching lexical entry"),
            Self::DuplicateIndex => f.write_str("index is used by another lexical entry"),
        }
    }
}

/// One problem, located at an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub layer: Layer,
    #[serde(skip)]
    pub entry: EntryRef,
    pub index: TokenIndex,
    #[serde(flatten)]
    pub kind: IssueKind,
    /// Does this issue block a commit?
    pub blocking: bool,
}

impl Display for ValidationIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} entry at index {}: {}", self.layer, self.index, self.kind)
    }
}

/// Every issue found in one pass over the record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// No issues at all?
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Any issue that blocks commit?
    #[inline]
    #[must_use]
    pub fn has_blocking(&self) -> bool {
        self.issues.iter().any(|i| i.blocking)
    }

    /// Number of blocking issues
    #[must_use]
    pub fn blocking_count(&self) -> usize {
        self.issues.iter().filter(|i| i.blocking).count()
    }

    /// Issues for one entry, for inline display next to it
    pub fn for_entry<'a>(
        &'a self,
        layer: Layer,
        entry: &'a EntryRef,
    ) -> impl Iterator<Item = &'a ValidationIssue> + 'a {
        self.issues
            .iter()
            .filter(move |i| i.layer == layer && &i.entry == entry)
    }

    pub(crate) fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }
}
