//! Concept classification
//!
//! A concept wrapped in `[` and `]` names a multi-token construction and is
//! drawn from the fixed pattern vocabulary; anything else is a free lexical
//! concept looked up through concept search.

use crate::error::ModelError;
use crate::vocab::{is_defined_construction_pattern, Vocabulary};

/// How a concept string is edited and validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConceptKind {
    /// Free lexical concept (searched, any non-empty string)
    FreeLexical,
    /// Bracketed construction pattern from the closed vocabulary
    ConstructionPattern,
}

impl ConceptKind {
    /// Classify a concept string
    #[inline]
    #[must_use]
    pub fn of(concept: &str) -> Self {
        if concept.len() >= 2 && concept.starts_with('[') && concept.ends_with(']') {
            Self::ConstructionPattern
        } else {
            Self::FreeLexical
        }
    }

    /// Validate a concept of this kind
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidEnumValue`] for an undefined construction pattern
    pub fn validate(self, concept: &str) -> Result<(), ModelError> {
        match self {
            Self::FreeLexical => Ok(()),
            Self::ConstructionPattern if is_defined_construction_pattern(concept) => Ok(()),
            Self::ConstructionPattern => Err(ModelError::invalid_enum(
                Vocabulary::ConstructionPattern,
                concept,
            )),
        }
    }
}

/// Is the concept a construction pattern?
#[inline]
#[must_use]
pub fn is_construction_pattern(concept: &str) -> bool {
    ConceptKind::of(concept) == ConceptKind::ConstructionPattern
}

/// Classify and validate in one step
///
/// # Errors
/// Returns [`ModelError::InvalidEnumValue`] for an undefined construction pattern
pub fn validate_concept(concept: &str) -> Result<ConceptKind, ModelError> {
    let kind = ConceptKind::of(concept);
    kind.validate(concept)?;
    Ok(kind)
}

/// Concept-search term: the concept with its `_<digits>` sense suffix removed
///
/// `BUkampa_1` searches for `BUkampa`; `hE_1-pres` is left untouched.
#[must_use]
pub fn search_term(concept: &str) -> &str {
    match concept.rsplit_once('_') {
        Some((base, suffix))
            if !base.is_empty()
                && !suffix.is_empty()
                && suffix.bytes().all(|b| b.is_ascii_digit()) =>
        {
            base
        }
        _ => concept,
    }
}
