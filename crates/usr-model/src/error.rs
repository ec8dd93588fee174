//! Error types for the USR record model

use crate::index::TokenIndex;
use crate::record::Layer;
use crate::vocab::Vocabulary;

/// Errors raised by record-level validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Field value outside its vocabulary table
    #[error("invalid {vocabulary} value: '{value}'")]
    InvalidEnumValue {
        vocabulary: Vocabulary,
        value: String,
    },

    /// A non-lexical entry names an index with no lexical entry
    #[error("{layer} entry at index {index} has no matching lexical entry")]
    DanglingIndexReference { layer: Layer, index: TokenIndex },

    /// Unknown sentence type keyword
    #[error("unknown sentence type: '{0}'")]
    UnknownSentenceType(String),

    /// Unknown vocabulary name
    #[error("unknown vocabulary: '{0}'")]
    UnknownVocabulary(String),

    /// Unknown layer name
    #[error("unknown layer: '{0}'")]
    UnknownLayer(String),
}

impl ModelError {
    /// Create invalid enum value error
    pub fn invalid_enum(vocabulary: Vocabulary, value: impl Into<String>) -> Self {
        Self::InvalidEnumValue {
            vocabulary,
            value: value.into(),
        }
    }
}
