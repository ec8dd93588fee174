//! Cross-layer consistency engine
//!
//! The only mutation surface for a record under edit. Every operation checks
//! the section permission first, then keeps the four layers consistent:
//!
//! - a new token gets one id shared by an entry in each layer
//! - removing a token cascades to every linked entry with its concept
//! - a concept rename reaches every entry sharing the id
//!
//! Disabled layers stay readable and are sent as empty sequences on commit.

use crate::config::DanglingPolicy;
use crate::error::EngineError;
use crate::field::{EntryRef, FieldEdit};
use crate::permissions::SectionPermissions;
use crate::validation::{IssueKind, ValidationIssue, ValidationReport};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};
use usr_model::{
    validate_concept, ConceptKind, ConstructionEntry, EntryId, Layer, LexicalEntry, LinkedEntry,
    ModelError, RelationEntry, SentenceType, TokenIndex, UsrRecord, Vocabulary,
};

/// Entries addressable by id
trait Keyed {
    fn key(&self) -> &EntryId;
}

impl Keyed for LexicalEntry {
    fn key(&self) -> &EntryId {
        &self.id
    }
}

impl Keyed for RelationEntry {
    fn key(&self) -> &EntryId {
        &self.id
    }
}

impl Keyed for ConstructionEntry {
    fn key(&self) -> &EntryId {
        &self.id
    }
}

fn position_of<E: Keyed>(entries: &[E], target: &EntryRef) -> Option<usize> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.key() == &target.id)
        .nth(target.occurrence)
        .map(|(i, _)| i)
}

fn find_mut<'a, E: Keyed>(
    entries: &'a mut [E],
    layer: Layer,
    target: &EntryRef,
) -> Result<&'a mut E, EngineError> {
    let position = position_of(entries, target)
        .ok_or_else(|| EngineError::not_found(layer, &target.id, target.occurrence))?;
    Ok(&mut entries[position])
}

/// Refs for every entry of a layer, in stored order
fn entry_refs<E: Keyed>(entries: &[E]) -> Vec<EntryRef> {
    let mut seen: HashMap<&EntryId, usize> = HashMap::new();
    entries
        .iter()
        .map(|e| {
            let n = seen.entry(e.key()).or_insert(0);
            let r = EntryRef::nth(e.key().clone(), *n);
            *n += 1;
            r
        })
        .collect()
}

fn enum_issue(vocabulary: Vocabulary, value: Option<&str>) -> Option<IssueKind> {
    match vocabulary.check(value) {
        Err(ModelError::InvalidEnumValue { vocabulary, value }) => {
            Some(IssueKind::InvalidEnumValue { vocabulary, value })
        }
        _ => None,
    }
}

/// Editor state for one record
#[derive(Debug, Clone)]
pub struct ConsistencyEngine {
    record: UsrRecord,
    permissions: SectionPermissions,
    dangling_policy: DanglingPolicy,
    dirty: bool,
}

impl ConsistencyEngine {
    /// Create new engine over a hydrated record
    #[must_use]
    pub fn new(record: UsrRecord, permissions: SectionPermissions) -> Self {
        Self {
            record,
            permissions,
            dangling_policy: DanglingPolicy::default(),
            dirty: false,
        }
    }

    /// With dangling-reference policy
    #[inline]
    #[must_use]
    pub fn with_dangling_policy(mut self, policy: DanglingPolicy) -> Self {
        self.dangling_policy = policy;
        self
    }

    /// Current record, disabled layers included
    #[inline]
    #[must_use]
    pub fn record(&self) -> &UsrRecord {
        &self.record
    }

    #[inline]
    #[must_use]
    pub fn permissions(&self) -> SectionPermissions {
        self.permissions
    }

    #[inline]
    #[must_use]
    pub fn dangling_policy(&self) -> DanglingPolicy {
        self.dangling_policy
    }

    /// Changed since hydration or the last commit?
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    #[must_use]
    pub fn into_record(self) -> UsrRecord {
        self.record
    }

    /// How the concept of a token is edited
    #[must_use]
    pub fn concept_kind(&self, id: &EntryId) -> Option<ConceptKind> {
        self.record
            .lexical_info
            .iter()
            .find(|e| &e.id == id)
            .map(|e| ConceptKind::of(&e.concept))
    }

    /// Append a token to every layer
    ///
    /// Returns the id shared by the four new entries.
    ///
    /// # Errors
    /// [`EngineError::PermissionDenied`] without lexical permission
    pub fn add_item(&mut self) -> Result<EntryId, EngineError> {
        self.permissions.require(Layer::Lexical)?;

        let index = self.record.next_index();
        let id = EntryId::generate();

        self.record
            .lexical_info
            .push(LexicalEntry::new(id.clone(), "", index));
        self.record
            .dependency_info
            .push(RelationEntry::blank(id.clone(), "", index));
        self.record
            .discourse_coref_info
            .push(RelationEntry::blank(id.clone(), "", index));
        self.record
            .construction_info
            .push(ConstructionEntry::blank(id.clone(), "", index));

        self.dirty = true;
        debug!(%id, %index, "added item");
        Ok(id)
    }

    /// Remove the lexical entry at a position
    ///
    /// Every dependency, discourse and construction entry whose concept
    /// equals the removed concept goes with it.
    ///
    /// # Errors
    /// [`EngineError::PermissionDenied`] or [`EngineError::PositionOutOfRange`]
    pub fn remove_item(&mut self, position: usize) -> Result<LexicalEntry, EngineError> {
        self.permissions.require(Layer::Lexical)?;
        if position >= self.record.lexical_info.len() {
            return Err(EngineError::PositionOutOfRange(position));
        }

        let removed = self.record.lexical_info.remove(position);
        let concept = removed.concept.as_str();
        let before = self.linked_len();

        self.record.dependency_info.retain(|e| e.concept != concept);
        self.record.discourse_coref_info.retain(|e| e.concept != concept);
        self.record.construction_info.retain(|e| e.concept != concept);

        self.dirty = true;
        debug!(
            position,
            concept,
            cascaded = before - self.linked_len(),
            "removed item"
        );
        Ok(removed)
    }

    fn linked_len(&self) -> usize {
        self.record.dependency_info.len()
            + self.record.discourse_coref_info.len()
            + self.record.construction_info.len()
    }

    /// Give a token a new concept in every layer
    ///
    /// # Errors
    /// [`EngineError::PermissionDenied`], [`EngineError::EntryNotFound`] when
    /// no lexical entry has the id, or `InvalidEnumValue` for an undefined
    /// construction pattern
    pub fn rename_concept(
        &mut self,
        id: &EntryId,
        new_concept: impl Into<String>,
    ) -> Result<ConceptKind, EngineError> {
        self.permissions.require(Layer::Lexical)?;
        let concept = new_concept.into();
        let kind = validate_concept(&concept)?;

        if !self.record.lexical_info.iter().any(|e| &e.id == id) {
            return Err(EngineError::not_found(Layer::Lexical, id, 0));
        }

        for entry in self.record.lexical_info.iter_mut().filter(|e| &e.id == id) {
            entry.concept.clone_from(&concept);
        }
        rename_linked(&mut self.record.dependency_info, id, &concept);
        rename_linked(&mut self.record.discourse_coref_info, id, &concept);
        rename_linked(&mut self.record.construction_info, id, &concept);

        self.dirty = true;
        debug!(%id, concept, ?kind, "renamed concept");
        Ok(kind)
    }

    /// Set one field of one entry
    ///
    /// # Errors
    /// [`EngineError::PermissionDenied`], [`EngineError::FieldNotInLayer`],
    /// `InvalidEnumValue`, [`EngineError::EntryNotFound`], or
    /// [`EngineError::DuplicateIndex`] for a lexical index already in use
    pub fn set_field(
        &mut self,
        layer: Layer,
        target: impl Into<EntryRef>,
        edit: FieldEdit,
    ) -> Result<(), EngineError> {
        let target = target.into();
        let edit = edit.normalized();
        self.permissions.require(layer)?;
        edit.check(layer)?;

        match layer {
            Layer::Lexical => self.set_lexical(&target, edit)?,
            Layer::Dependency => {
                set_relation(find_mut(&mut self.record.dependency_info, layer, &target)?, edit);
            }
            Layer::Discourse => set_relation(
                find_mut(&mut self.record.discourse_coref_info, layer, &target)?,
                edit,
            ),
            Layer::Construction => set_construction(
                find_mut(&mut self.record.construction_info, layer, &target)?,
                edit,
            ),
        }

        self.dirty = true;
        Ok(())
    }

    fn set_lexical(&mut self, target: &EntryRef, edit: FieldEdit) -> Result<(), EngineError> {
        let position = position_of(&self.record.lexical_info, target)
            .ok_or_else(|| EngineError::not_found(Layer::Lexical, &target.id, target.occurrence))?;

        if let FieldEdit::Index(index) = edit {
            let taken = self
                .record
                .lexical_info
                .iter()
                .enumerate()
                .any(|(i, e)| i != position && e.index == index);
            if taken {
                return Err(EngineError::DuplicateIndex(index));
            }
        }

        let entry = &mut self.record.lexical_info[position];
        match edit {
            FieldEdit::Index(v) => entry.index = v,
            FieldEdit::SemanticCategory(v) => entry.semantic_category = v,
            FieldEdit::MorphoSemantic(v) => entry.morpho_semantic = v,
            FieldEdit::SpeakersView(v) => entry.speakers_view = v,
            FieldEdit::Scope(v) => entry.scope = v,
            _ => {}
        }
        Ok(())
    }

    /// Add a blank relation for a token in a linking layer
    ///
    /// The entry copies id, concept and index from the token's lexical entry
    /// (or from an existing entry of the layer) and is inserted after the
    /// token's other entries.
    ///
    /// # Errors
    /// [`EngineError::NotALinkingLayer`], [`EngineError::PermissionDenied`] or
    /// [`EngineError::EntryNotFound`]
    pub fn add_relation(&mut self, layer: Layer, id: &EntryId) -> Result<EntryRef, EngineError> {
        if layer == Layer::Lexical {
            return Err(EngineError::NotALinkingLayer(layer));
        }
        self.permissions.require(layer)?;

        let (concept, index) = self
            .token_of(layer, id)
            .ok_or_else(|| EngineError::not_found(Layer::Lexical, id, 0))?;

        let occurrence = match layer {
            Layer::Dependency => {
                insert_linked(&mut self.record.dependency_info, id, concept, index)
            }
            Layer::Discourse => {
                insert_linked(&mut self.record.discourse_coref_info, id, concept, index)
            }
            _ => insert_linked(&mut self.record.construction_info, id, concept, index),
        };

        self.dirty = true;
        debug!(%id, %layer, occurrence, "added relation");
        Ok(EntryRef::nth(id.clone(), occurrence))
    }

    fn token_of(&self, layer: Layer, id: &EntryId) -> Option<(String, TokenIndex)> {
        self.record
            .lexical_info
            .iter()
            .find(|e| &e.id == id)
            .map(|e| (e.concept.clone(), e.index))
            .or_else(|| match layer {
                Layer::Dependency => first_linked(&self.record.dependency_info, id),
                Layer::Discourse => first_linked(&self.record.discourse_coref_info, id),
                Layer::Construction => first_linked(&self.record.construction_info, id),
                Layer::Lexical => None,
            })
    }

    /// Remove one entry of a linking layer
    ///
    /// # Errors
    /// [`EngineError::NotALinkingLayer`], [`EngineError::PermissionDenied`] or
    /// [`EngineError::EntryNotFound`]
    pub fn remove_relation(
        &mut self,
        layer: Layer,
        target: impl Into<EntryRef>,
    ) -> Result<(), EngineError> {
        let target = target.into();
        if layer == Layer::Lexical {
            return Err(EngineError::NotALinkingLayer(layer));
        }
        self.permissions.require(layer)?;

        let not_found = || EngineError::not_found(layer, &target.id, target.occurrence);
        match layer {
            Layer::Dependency => {
                let at = position_of(&self.record.dependency_info, &target).ok_or_else(not_found)?;
                self.record.dependency_info.remove(at);
            }
            Layer::Discourse => {
                let at =
                    position_of(&self.record.discourse_coref_info, &target).ok_or_else(not_found)?;
                self.record.discourse_coref_info.remove(at);
            }
            _ => {
                let at =
                    position_of(&self.record.construction_info, &target).ok_or_else(not_found)?;
                self.record.construction_info.remove(at);
            }
        }

        self.dirty = true;
        Ok(())
    }

    /// Sentence type is sentence-level and needs no section permission
    pub fn set_sentence_type(&mut self, sentence_type: SentenceType) {
        self.record.sentence_type = sentence_type;
        self.dirty = true;
    }

    /// Sentence-level scope; `None` clears it
    pub fn set_scope(&mut self, scope: Option<String>) {
        self.record.sentence_type_info.scope = scope;
        self.dirty = true;
    }

    /// Check every enabled layer
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        let known: HashSet<TokenIndex> =
            self.record.lexical_info.iter().map(|e| e.index).collect();

        if self.permissions.lexical {
            self.validate_lexical(&mut report);
        }
        if self.permissions.dependency {
            self.validate_linked(
                &mut report,
                Layer::Dependency,
                &self.record.dependency_info,
                Vocabulary::DependencyRelation,
                &known,
            );
        }
        if self.permissions.discourse {
            self.validate_linked(
                &mut report,
                Layer::Discourse,
                &self.record.discourse_coref_info,
                Vocabulary::DiscourseRelation,
                &known,
            );
        }
        if self.permissions.construction {
            self.validate_linked(
                &mut report,
                Layer::Construction,
                &self.record.construction_info,
                Vocabulary::ComponentType,
                &known,
            );
        }

        report
    }

    fn validate_lexical(&self, report: &mut ValidationReport) {
        let entries = &self.record.lexical_info;
        let mut seen = HashSet::new();

        for (entry, entry_ref) in entries.iter().zip(entry_refs(entries)) {
            let mut kinds = Vec::new();

            if entry.concept.trim().is_empty() {
                kinds.push((IssueKind::RequiredConceptMissing, true));
            } else if let Err(ModelError::InvalidEnumValue { vocabulary, value }) =
                ConceptKind::of(&entry.concept).validate(&entry.concept)
            {
                kinds.push((IssueKind::InvalidEnumValue { vocabulary, value }, true));
            }

            let fields = [
                (Vocabulary::SemanticCategory, entry.semantic_category.as_deref()),
                (Vocabulary::MorphoSemantic, entry.morpho_semantic.as_deref()),
                (Vocabulary::SpeakersView, entry.speakers_view.as_deref()),
            ];
            for (vocabulary, value) in fields {
                if let Some(kind) = enum_issue(vocabulary, value) {
                    kinds.push((kind, true));
                }
            }

            if !seen.insert(entry.index) {
                kinds.push((IssueKind::DuplicateIndex, false));
            }

            for (kind, blocking) in kinds {
                report.push(ValidationIssue {
                    layer: Layer::Lexical,
                    entry: entry_ref.clone(),
                    index: entry.index,
                    kind,
                    blocking,
                });
            }
        }
    }

    fn validate_linked<E: LinkedEntry + Keyed>(
        &self,
        report: &mut ValidationReport,
        layer: Layer,
        entries: &[E],
        vocabulary: Vocabulary,
        known: &HashSet<TokenIndex>,
    ) {
        for (entry, entry_ref) in entries.iter().zip(entry_refs(entries)) {
            if let Some(kind) = enum_issue(vocabulary, entry.label()) {
                report.push(ValidationIssue {
                    layer,
                    entry: entry_ref.clone(),
                    index: entry.index(),
                    kind,
                    blocking: true,
                });
            }

            if self.dangling_policy != DanglingPolicy::Ignore && !known.contains(&entry.index()) {
                report.push(ValidationIssue {
                    layer,
                    entry: entry_ref,
                    index: entry.index(),
                    kind: IssueKind::DanglingIndexReference,
                    blocking: self.dangling_policy == DanglingPolicy::Reject,
                });
            }
        }
    }

    /// Record to send on commit
    ///
    /// Disabled layers are emptied. Dangling entries are handled per the
    /// configured [`DanglingPolicy`].
    ///
    /// # Errors
    /// [`EngineError::CommitBlocked`] while any blocking issue remains
    pub fn commit_payload(&self) -> Result<UsrRecord, EngineError> {
        let report = self.validate();
        if report.has_blocking() {
            warn!(blocking = report.blocking_count(), "commit blocked by validation");
            return Err(EngineError::CommitBlocked(report));
        }

        let mut payload = self.record.clone();
        for layer in Layer::ALL {
            if !self.permissions.allows(layer) {
                payload.clear_layer(layer);
            }
        }

        let dangling = report
            .issues
            .iter()
            .filter(|i| i.kind == IssueKind::DanglingIndexReference);
        match self.dangling_policy {
            DanglingPolicy::Warn => {
                for issue in dangling {
                    warn!(layer = %issue.layer, index = %issue.index, "dangling index reference");
                }
            }
            DanglingPolicy::Drop => {
                let known: HashSet<TokenIndex> =
                    self.record.lexical_info.iter().map(|e| e.index).collect();
                let before = payload.dependency_info.len()
                    + payload.discourse_coref_info.len()
                    + payload.construction_info.len();
                payload.dependency_info.retain(|e| known.contains(&e.index));
                payload.discourse_coref_info.retain(|e| known.contains(&e.index));
                payload.construction_info.retain(|e| known.contains(&e.index));
                let dropped = before
                    - payload.dependency_info.len()
                    - payload.discourse_coref_info.len()
                    - payload.construction_info.len();
                if dropped > 0 {
                    info!(dropped, "dropped dangling entries from payload");
                }
            }
            DanglingPolicy::Ignore | DanglingPolicy::Reject => {}
        }

        Ok(payload)
    }
}

fn rename_linked<E: LinkedEntry>(entries: &mut [E], id: &EntryId, concept: &str) {
    for entry in entries.iter_mut().filter(|e| e.id() == id) {
        *entry.concept_mut() = concept.to_string();
    }
}

fn first_linked<E: LinkedEntry>(entries: &[E], id: &EntryId) -> Option<(String, TokenIndex)> {
    entries
        .iter()
        .find(|e| e.id() == id)
        .map(|e| (e.concept().to_string(), e.index()))
}

fn insert_linked<E: LinkedEntry>(
    entries: &mut Vec<E>,
    id: &EntryId,
    concept: String,
    index: TokenIndex,
) -> usize {
    let occurrence = entries.iter().filter(|e| e.id() == id).count();
    let entry = E::new_linked(id.clone(), concept, index, None, None);
    match entries.iter().rposition(|e| e.id() == id) {
        Some(last) => entries.insert(last + 1, entry),
        None => entries.push(entry),
    }
    occurrence
}

fn set_relation(entry: &mut RelationEntry, edit: FieldEdit) {
    match edit {
        FieldEdit::Index(v) => entry.index = v,
        FieldEdit::HeadIndex(v) => entry.head_index = v,
        FieldEdit::Relation(v) => entry.relation = v,
        _ => {}
    }
}

fn set_construction(entry: &mut ConstructionEntry, edit: FieldEdit) {
    match edit {
        FieldEdit::Index(v) => entry.index = v,
        FieldEdit::CxnIndex(v) => entry.cxn_index = v,
        FieldEdit::ComponentType(v) => entry.component_type = v,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usr_test_utils::{sample_record, RecordBuilder};

    fn engine(permissions: SectionPermissions) -> ConsistencyEngine {
        ConsistencyEngine::new(sample_record(), permissions)
    }

    #[test]
    fn add_item_shares_one_id_across_layers() {
        let mut engine = engine(SectionPermissions::all());
        let id = engine.add_item().unwrap();
        let record = engine.record();

        assert_eq!(record.lexical_info.last().unwrap().id, id);
        assert_eq!(record.lexical_info.last().unwrap().index, TokenIndex::new(4));
        let dep = record.dependency_info.last().unwrap();
        assert_eq!(dep.id, id);
        assert!(dep.is_blank());
        assert_eq!(record.construction_info.last().unwrap().id, id);
        assert!(engine.is_dirty());
    }

    #[test]
    fn add_item_requires_lexical() {
        let mut engine = engine(SectionPermissions::only(&[Layer::Dependency]));
        assert!(matches!(
            engine.add_item(),
            Err(EngineError::PermissionDenied(Layer::Lexical))
        ));
        assert_eq!(engine.record().lexical_info.len(), 3);
        assert!(!engine.is_dirty());
    }

    #[test]
    fn remove_item_cascades_by_concept() {
        let mut engine = engine(SectionPermissions::all());
        let removed = engine.remove_item(0).unwrap();
        assert_eq!(removed.concept, "BUkampa_1");

        let record = engine.record();
        assert!(record.dependency_info.iter().all(|e| e.concept != "BUkampa_1"));
        assert!(record.construction_info.iter().all(|e| e.concept != "BUkampa_1"));
        assert_eq!(record.dependency_info.len(), 1);
        assert!(matches!(
            engine.remove_item(10),
            Err(EngineError::PositionOutOfRange(10))
        ));
    }

    #[test]
    fn rename_propagates_by_id() {
        let mut engine = engine(SectionPermissions::all());
        let id = engine.record().lexical_info[0].id.clone();
        engine.rename_concept(&id, "BUcAla_1").unwrap();

        let record = engine.record();
        assert_eq!(record.lexical_info[0].concept, "BUcAla_1");
        assert_eq!(record.dependency_info[0].concept, "BUcAla_1");
        assert_eq!(record.construction_info[0].concept, "BUcAla_1");
        assert_eq!(record.dependency_info[1].concept, "A_1");
    }

    #[test]
    fn rename_to_undefined_pattern_is_rejected() {
        let mut engine = engine(SectionPermissions::all());
        let id = engine.record().lexical_info[2].id.clone();
        assert_eq!(
            engine.rename_concept(&id, "[conj_2]").unwrap(),
            ConceptKind::ConstructionPattern
        );
        assert!(matches!(
            engine.rename_concept(&id, "[conj_99]"),
            Err(EngineError::Model(ModelError::InvalidEnumValue { .. }))
        ));
        assert_eq!(engine.record().lexical_info[2].concept, "[conj_2]");
    }

    #[test]
    fn set_field_checks_permission_and_vocabulary() {
        let mut engine = engine(SectionPermissions::only(&[Layer::Dependency]));
        let id = engine.record().lexical_info[0].id.clone();

        engine
            .set_field(Layer::Dependency, &id, FieldEdit::Relation(Some("k2".to_string())))
            .unwrap();
        assert_eq!(engine.record().dependency_info[0].relation.as_deref(), Some("k2"));

        assert!(matches!(
            engine.set_field(Layer::Dependency, &id, FieldEdit::Relation(Some("zz".into()))),
            Err(EngineError::Model(ModelError::InvalidEnumValue { .. }))
        ));
        assert!(matches!(
            engine.set_field(Layer::Lexical, &id, FieldEdit::SemanticCategory(None)),
            Err(EngineError::PermissionDenied(Layer::Lexical))
        ));
    }

    #[test]
    fn occurrence_addresses_second_relation() {
        let mut engine = ConsistencyEngine::new(
            RecordBuilder::new()
                .token("a", 1)
                .token("b", 2)
                .dependency(1, Some(2), "k1")
                .dependency(1, Some(0), "main")
                .build(),
            SectionPermissions::all(),
        );
        let id = engine.record().lexical_info[0].id.clone();
        engine
            .set_field(
                Layer::Dependency,
                EntryRef::nth(id.clone(), 1),
                FieldEdit::HeadIndex(None),
            )
            .unwrap();
        assert_eq!(engine.record().dependency_info[0].head_index, Some(TokenIndex::new(2)));
        assert_eq!(engine.record().dependency_info[1].head_index, None);

        assert!(matches!(
            engine.set_field(Layer::Dependency, EntryRef::nth(id, 2), FieldEdit::HeadIndex(None)),
            Err(EngineError::EntryNotFound { occurrence: 2, .. })
        ));
    }

    #[test]
    fn lexical_index_must_stay_unique() {
        let mut engine = engine(SectionPermissions::all());
        let id = engine.record().lexical_info[0].id.clone();
        assert!(matches!(
            engine.set_field(Layer::Lexical, &id, FieldEdit::Index(TokenIndex::new(2))),
            Err(EngineError::DuplicateIndex(_))
        ));
        engine
            .set_field(Layer::Lexical, &id, FieldEdit::Index(TokenIndex::new(7)))
            .unwrap();
    }

    #[test]
    fn add_and_remove_relation() {
        let mut engine = engine(SectionPermissions::all());
        let id = engine.record().lexical_info[0].id.clone();

        let added = engine.add_relation(Layer::Dependency, &id).unwrap();
        assert_eq!(added.occurrence, 1);
        let deps = &engine.record().dependency_info;
        assert_eq!(deps.len(), 3);
        assert_eq!(deps[1].id, id);
        assert!(deps[1].is_blank());

        engine.remove_relation(Layer::Dependency, added).unwrap();
        assert_eq!(engine.record().dependency_info.len(), 2);

        assert!(matches!(
            engine.add_relation(Layer::Lexical, &id),
            Err(EngineError::NotALinkingLayer(Layer::Lexical))
        ));
    }

    #[test]
    fn validation_flags_missing_concept_after_add() {
        let mut engine = engine(SectionPermissions::all());
        let id = engine.add_item().unwrap();
        let report = engine.validate();
        let entry = EntryRef::from(&id);
        let issues: Vec<_> = report.for_entry(Layer::Lexical, &entry).collect();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::RequiredConceptMissing);
        assert!(matches!(engine.commit_payload(), Err(EngineError::CommitBlocked(_))));
    }

    #[test]
    fn disabled_layers_are_sent_empty() {
        let engine = engine(SectionPermissions::only(&[Layer::Lexical]));
        let payload = engine.commit_payload().unwrap();
        assert_eq!(payload.lexical_info.len(), 3);
        assert!(payload.dependency_info.is_empty());
        assert!(payload.construction_info.is_empty());
        assert_eq!(engine.record().dependency_info.len(), 2);
    }

    #[test]
    fn dangling_policy_controls_commit() {
        let record = RecordBuilder::new()
            .token("a", 1)
            .dependency(5, Some(1), "k1")
            .build();

        let warn = ConsistencyEngine::new(record.clone(), SectionPermissions::all());
        assert_eq!(warn.commit_payload().unwrap().dependency_info.len(), 1);

        let reject = warn.clone().with_dangling_policy(DanglingPolicy::Reject);
        assert!(matches!(reject.commit_payload(), Err(EngineError::CommitBlocked(_))));

        let drop = warn.clone().with_dangling_policy(DanglingPolicy::Drop);
        assert!(drop.commit_payload().unwrap().dependency_info.is_empty());

        let ignore = warn.with_dangling_policy(DanglingPolicy::Ignore);
        assert!(ignore.validate().is_clean());
    }

    #[test]
    fn sentence_level_edits_need_no_permission() {
        let mut engine = engine(SectionPermissions::none());
        engine.set_sentence_type(SentenceType::Interrogative);
        engine.set_scope(Some("negative".to_string()));
        assert_eq!(engine.record().sentence_type, SentenceType::Interrogative);
        assert_eq!(engine.record().scope(), Some("negative"));
    }
}
