//! Field edits and entry addressing

use crate::error::EngineError;
use usr_model::{normalize_unset, EntryId, Layer, TokenIndex, Vocabulary};

/// One entry of a layer: its id plus an ordinal among entries sharing it
///
/// A token with several dependency relations has several entries with the
/// same id; `occurrence` picks one of them in stored order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryRef {
    pub id: EntryId,
    pub occurrence: usize,
}

impl EntryRef {
    /// The `n`-th entry with this id (0-based)
    #[inline]
    #[must_use]
    pub fn nth(id: EntryId, occurrence: usize) -> Self {
        Self { id, occurrence }
    }
}

impl From<EntryId> for EntryRef {
    fn from(id: EntryId) -> Self {
        Self::nth(id, 0)
    }
}

impl From<&EntryId> for EntryRef {
    fn from(id: &EntryId) -> Self {
        Self::nth(id.clone(), 0)
    }
}

/// New value for one field of one entry
///
/// `None` clears a field (written `-` in the text format).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Index(TokenIndex),
    SemanticCategory(Option<String>),
    MorphoSemantic(Option<String>),
    SpeakersView(Option<String>),
    Scope(Option<String>),
    HeadIndex(Option<TokenIndex>),
    Relation(Option<String>),
    CxnIndex(Option<TokenIndex>),
    ComponentType(Option<String>),
}

impl FieldEdit {
    /// JSON field name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Index(_) => "index",
            Self::SemanticCategory(_) => "semantic_category",
            Self::MorphoSemantic(_) => "morpho_semantic",
            Self::SpeakersView(_) => "speakers_view",
            Self::Scope(_) => "scope",
            Self::HeadIndex(_) => "head_index",
            Self::Relation(_) => "relation",
            Self::CxnIndex(_) => "cxn_index",
            Self::ComponentType(_) => "component_type",
        }
    }

    /// Does the field exist on entries of the layer?
    #[must_use]
    pub fn applies_to(&self, layer: Layer) -> bool {
        match self {
            Self::Index(_) => true,
            Self::SemanticCategory(_)
            | Self::MorphoSemantic(_)
            | Self::SpeakersView(_)
            | Self::Scope(_) => layer == Layer::Lexical,
            Self::HeadIndex(_) | Self::Relation(_) => {
                matches!(layer, Layer::Dependency | Layer::Discourse)
            }
            Self::CxnIndex(_) | Self::ComponentType(_) => layer == Layer::Construction,
        }
    }

    /// Vocabulary constraining the value in the layer, if enum-typed
    #[must_use]
    pub fn vocabulary(&self, layer: Layer) -> Option<Vocabulary> {
        match (self, layer) {
            (Self::SemanticCategory(_), _) => Some(Vocabulary::SemanticCategory),
            (Self::MorphoSemantic(_), _) => Some(Vocabulary::MorphoSemantic),
            (Self::SpeakersView(_), _) => Some(Vocabulary::SpeakersView),
            (Self::Relation(_), Layer::Discourse) => Some(Vocabulary::DiscourseRelation),
            (Self::Relation(_), _) => Some(Vocabulary::DependencyRelation),
            (Self::ComponentType(_), _) => Some(Vocabulary::ComponentType),
            _ => None,
        }
    }

    /// Text value carried by the edit, if any
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::SemanticCategory(v)
            | Self::MorphoSemantic(v)
            | Self::SpeakersView(v)
            | Self::Scope(v)
            | Self::Relation(v)
            | Self::ComponentType(v) => v.as_deref(),
            _ => None,
        }
    }

    /// The same edit with `-` and empty text turned into `None`
    #[must_use]
    pub fn normalized(self) -> Self {
        let unset = |v: Option<String>| v.as_deref().and_then(normalize_unset);
        match self {
            Self::SemanticCategory(v) => Self::SemanticCategory(unset(v)),
            Self::MorphoSemantic(v) => Self::MorphoSemantic(unset(v)),
            Self::SpeakersView(v) => Self::SpeakersView(unset(v)),
            Self::Scope(v) => Self::Scope(unset(v)),
            Self::Relation(v) => Self::Relation(unset(v)),
            Self::ComponentType(v) => Self::ComponentType(unset(v)),
            other => other,
        }
    }

    /// Check layer membership and vocabulary
    ///
    /// # Errors
    /// [`EngineError::FieldNotInLayer`] or the vocabulary's
    /// `InvalidEnumValue`
    pub fn check(&self, layer: Layer) -> Result<(), EngineError> {
        if !self.applies_to(layer) {
            return Err(EngineError::FieldNotInLayer {
                layer,
                field: self.name(),
            });
        }
        if let Some(vocabulary) = self.vocabulary(layer) {
            vocabulary.check(self.text())?;
        }
        Ok(())
    }

    /// Build an edit from a field name and its text form
    ///
    /// `-` and the empty string clear the field; `null` clears a target.
    ///
    /// # Errors
    /// [`EngineError::UnknownField`] or [`EngineError::BadFieldValue`]
    pub fn parse(field: &str, value: &str) -> Result<Self, EngineError> {
        let text = || normalize_unset(value);
        let edit = match field {
            "index" => Self::Index(parse_index("index", value)?),
            "semantic_category" => Self::SemanticCategory(text()),
            "morpho_semantic" => Self::MorphoSemantic(text()),
            "speakers_view" => Self::SpeakersView(text()),
            "scope" => Self::Scope(text()),
            "head_index" => Self::HeadIndex(parse_target("head_index", value)?),
            "relation" => Self::Relation(text()),
            "cxn_index" => Self::CxnIndex(parse_target("cxn_index", value)?),
            "component_type" => Self::ComponentType(text()),
            other => return Err(EngineError::UnknownField(other.to_string())),
        };
        Ok(edit)
    }
}

fn parse_index(field: &'static str, value: &str) -> Result<TokenIndex, EngineError> {
    value
        .parse()
        .map_err(|_| EngineError::bad_value(field, value))
}

fn parse_target(field: &'static str, value: &str) -> Result<Option<TokenIndex>, EngineError> {
    match value.trim() {
        "" | "-" | "null" => Ok(None),
        v => parse_index(field, v).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usr_model::ModelError;

    #[test]
    fn relation_vocabulary_depends_on_layer() {
        let edit = FieldEdit::Relation(Some("coref".to_string()));
        assert!(edit.check(Layer::Discourse).is_ok());
        assert!(matches!(
            edit.check(Layer::Dependency),
            Err(EngineError::Model(ModelError::InvalidEnumValue { .. }))
        ));
    }

    #[test]
    fn sentinel_text_normalizes_to_none() {
        assert_eq!(
            FieldEdit::Relation(Some("-".to_string())).normalized(),
            FieldEdit::Relation(None)
        );
        assert_eq!(
            FieldEdit::ComponentType(Some(String::new())).normalized(),
            FieldEdit::ComponentType(None)
        );
        assert_eq!(
            FieldEdit::Relation(Some("k1".to_string())).normalized(),
            FieldEdit::Relation(Some("k1".to_string()))
        );
    }

    #[test]
    fn field_must_belong_to_layer() {
        let edit = FieldEdit::HeadIndex(None);
        assert!(matches!(
            edit.check(Layer::Construction),
            Err(EngineError::FieldNotInLayer { field: "head_index", .. })
        ));
        assert!(FieldEdit::Index(TokenIndex::new(2)).check(Layer::Construction).is_ok());
    }

    #[test]
    fn parse_from_text() {
        assert_eq!(
            FieldEdit::parse("head_index", "null").unwrap(),
            FieldEdit::HeadIndex(None)
        );
        assert_eq!(
            FieldEdit::parse("semantic_category", "-").unwrap(),
            FieldEdit::SemanticCategory(None)
        );
        assert!(matches!(
            FieldEdit::parse("cxn_index", "x"),
            Err(EngineError::BadFieldValue { field: "cxn_index", .. })
        ));
        assert!(matches!(
            FieldEdit::parse("colour", "red"),
            Err(EngineError::UnknownField(_))
        ));
    }

    #[test]
    fn cleared_enum_field_is_valid() {
        assert!(FieldEdit::SemanticCategory(None).check(Layer::Lexical).is_ok());
    }
}
