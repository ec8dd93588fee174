//! Relation references: `TARGET:LABEL`
//!
//! ```text
//! field     := "-" | reference (" " reference)*
//! reference := (INTEGER | "null") ":" LABEL
//! ```

use crate::error::{DecodeError, ReferenceFault};
use std::fmt::{self, Display, Formatter};
use usr_model::{normalize_unset, LinkedEntry, TokenIndex, UNSET};

const NULL_TARGET: &str = "null";

/// One `(target, label)` pair inside a relation column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Head or construction index; `None` is written `null`
    pub target: Option<TokenIndex>,
    /// Relation or component type; `None` is written `-`
    pub label: Option<String>,
}

impl Reference {
    /// Create a reference
    #[inline]
    #[must_use]
    pub fn new(target: Option<TokenIndex>, label: impl Into<String>) -> Self {
        Self {
            target,
            label: normalize_unset(&label.into()),
        }
    }

    /// Parse a single `TARGET:LABEL` segment
    ///
    /// # Errors
    /// Returns the fault when the separator, target or label is malformed
    pub fn parse(segment: &str) -> Result<Self, ReferenceFault> {
        let (target, label) = segment
            .split_once(':')
            .ok_or(ReferenceFault::MissingSeparator)?;

        let target = match target.trim() {
            NULL_TARGET => None,
            t => Some(
                t.parse::<TokenIndex>()
                    .map_err(|_| ReferenceFault::BadTarget(t.to_string()))?,
            ),
        };

        let label = label.trim();
        if label.is_empty() {
            return Err(ReferenceFault::EmptyLabel);
        }

        Ok(Self {
            target,
            label: normalize_unset(label),
        })
    }

    /// Build from a layer entry; blank entries have no reference
    #[must_use]
    pub fn from_entry<E: LinkedEntry>(entry: &E) -> Option<Self> {
        if entry.is_blank() {
            None
        } else {
            Some(Self {
                target: entry.target(),
                label: entry.label().map(str::to_string),
            })
        }
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.target {
            Some(t) => write!(f, "{t}")?,
            None => f.write_str(NULL_TARGET)?,
        }
        write!(f, ":{}", self.label.as_deref().unwrap_or(UNSET))
    }
}

/// Parse a whole relation column
///
/// `-` (or an empty column) yields no references.
///
/// # Errors
/// Returns [`DecodeError::MalformedReference`] for the first bad segment
pub fn parse_field(field: &str, line: usize) -> Result<Vec<Reference>, DecodeError> {
    let field = field.trim();
    if field.is_empty() || field == UNSET {
        return Ok(Vec::new());
    }

    field
        .split_whitespace()
        .map(|segment| {
            Reference::parse(segment).map_err(|fault| DecodeError::reference(line, segment, fault))
        })
        .collect()
}

/// Serialize the entries of one token into a relation column
///
/// Blank entries contribute nothing; no references at all gives `-`.
#[must_use]
pub fn format_field<'a, E, I>(entries: I) -> String
where
    E: LinkedEntry + 'a,
    I: IntoIterator<Item = &'a E>,
{
    let parts: Vec<String> = entries
        .into_iter()
        .filter_map(Reference::from_entry)
        .map(|r| r.to_string())
        .collect();

    if parts.is_empty() {
        UNSET.to_string()
    } else {
        parts.join(" ")
    }
}
