use proptest::prelude::*;
use usr_codec::{decode_block, encode};
use usr_engine::{
    ConsistencyEngine, EngineError, EntryRef, FieldEdit, IssueKind, SectionPermissions,
};
use usr_model::{is_construction_pattern, Layer, LinkedEntry, TokenIndex, UsrRecord};
use usr_test_utils::{sample_record, RecordBuilder};

#[test]
fn test_conj_pattern_validation() {
    assert!(is_construction_pattern("[conj_1]"));

    let mut engine = ConsistencyEngine::new(sample_record(), SectionPermissions::all());
    assert!(engine.validate().is_clean());

    let id = engine.record().lexical_info[2].id.clone();
    assert!(engine.rename_concept(&id, "[not_a_pattern]").is_err());

    let mut record = sample_record();
    record.lexical_info[2].concept = "[not_a_pattern]".to_string();
    let engine = ConsistencyEngine::new(record, SectionPermissions::all());
    let report = engine.validate();
    assert_eq!(report.blocking_count(), 1);
    assert!(matches!(
        report.issues[0].kind,
        IssueKind::InvalidEnumValue { ref value, .. } if value == "[not_a_pattern]"
    ));
}

#[test]
fn test_cascade_removes_every_entry_with_concept() {
    let record = RecordBuilder::new()
        .token("a_1", 1)
        .token("b_1", 2)
        .blank_links(1)
        .dependency(1, Some(2), "k1")
        .coref(1, Some(2), "coref")
        .construction(1, None, "op1")
        .dependency(2, Some(0), "main")
        .build();
    let mut engine = ConsistencyEngine::new(record, SectionPermissions::all());

    engine.remove_item(0).unwrap();
    let record = engine.record();
    assert_eq!(record.lexical_info.len(), 1);
    assert!(record.dependency_info.iter().all(|e| e.concept() != "a_1"));
    assert!(record.discourse_coref_info.is_empty());
    assert!(record.construction_info.is_empty());
    assert_eq!(record.dependency_info.len(), 1);
}

#[test]
fn test_remove_requires_lexical_permission() {
    let mut engine = ConsistencyEngine::new(
        sample_record(),
        SectionPermissions::only(&[Layer::Dependency, Layer::Discourse, Layer::Construction]),
    );
    assert!(matches!(
        engine.remove_item(0),
        Err(EngineError::PermissionDenied(Layer::Lexical))
    ));
    assert_eq!(engine.record().lexical_info.len(), 3);
}

#[test]
fn test_disabled_layer_submitted_as_empty_sequence() {
    let engine = ConsistencyEngine::new(
        sample_record(),
        SectionPermissions::all().with(Layer::Construction, false),
    );
    let payload = engine.commit_payload().unwrap();
    assert!(payload.construction_info.is_empty());
    assert_eq!(payload.dependency_info.len(), 2);

    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["construction_info"], serde_json::json!([]));
}

#[test]
fn test_disabled_layer_rejects_mutation_but_keeps_values() {
    let mut engine = ConsistencyEngine::new(
        sample_record(),
        SectionPermissions::only(&[Layer::Lexical]),
    );
    let id = engine.record().lexical_info[0].id.clone();
    let result = engine.set_field(
        Layer::Construction,
        EntryRef::from(&id),
        FieldEdit::ComponentType(Some("op2".to_string())),
    );
    assert!(matches!(result, Err(EngineError::PermissionDenied(Layer::Construction))));
    assert_eq!(
        engine.record().construction_info[0].component_type.as_deref(),
        Some("op1")
    );
}

#[test]
fn test_invalid_lexical_value_blocks_commit_until_fixed() {
    let mut record = sample_record();
    record.lexical_info[1].semantic_category = Some("animal".to_string());
    let mut engine = ConsistencyEngine::new(record, SectionPermissions::all());

    let err = engine.commit_payload().unwrap_err();
    assert_eq!(err.to_string(), "commit blocked by 1 issue(s)");

    let id = engine.record().lexical_info[1].id.clone();
    engine
        .set_field(Layer::Lexical, &id, FieldEdit::SemanticCategory(None))
        .unwrap();
    assert!(engine.commit_payload().is_ok());
}

#[test]
fn test_sentinel_value_clears_field() {
    let mut engine = ConsistencyEngine::new(sample_record(), SectionPermissions::all());
    let id = engine.record().lexical_info[0].id.clone();

    engine
        .set_field(Layer::Dependency, &id, FieldEdit::Relation(Some("-".to_string())))
        .unwrap();
    engine
        .set_field(Layer::Lexical, &id, FieldEdit::MorphoSemantic(Some("-".to_string())))
        .unwrap();

    let record = engine.record();
    assert_eq!(record.dependency_info[0].relation, None);
    assert_eq!(record.lexical_info[0].morpho_semantic, None);
}

#[test]
fn test_freshly_added_item_survives_encode_decode() {
    let mut engine = ConsistencyEngine::new(UsrRecord::new(), SectionPermissions::all());
    engine.add_item().unwrap();

    let text = encode(engine.record(), "S", "t");
    assert_eq!(text, "<segment_id=S>\n#t\n\t1\t-\t-\t-\t-\t-\t-\t-\n</segment_id>");

    let decoded = decode_block(&text).unwrap().record;
    assert_eq!(decoded.lexical_info.len(), 1);
    assert_eq!(decoded.lexical_info[0].concept, "");
    assert_eq!(decoded.lexical_info[0].index, TokenIndex::new(1));
    assert_eq!(encode(&decoded, "S", "t"), text);
}

#[derive(Debug, Clone)]
enum Op {
    Add,
    Remove(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![3 => Just(Op::Add), 1 => (0usize..8).prop_map(Op::Remove)]
}

proptest! {
    #[test]
    fn prop_added_index_exceeds_every_existing_index(ops in proptest::collection::vec(op(), 1..20)) {
        let mut engine = ConsistencyEngine::new(UsrRecord::new(), SectionPermissions::all());
        for op in ops {
            match op {
                Op::Add => {
                    let max = engine.record().all_indices().max();
                    let id = engine.add_item().unwrap();
                    let added = engine
                        .record()
                        .lexical_info
                        .iter()
                        .find(|e| e.id == id)
                        .map(|e| e.index)
                        .unwrap();
                    prop_assert_eq!(added, max.map_or(TokenIndex::new(1), TokenIndex::next));
                }
                Op::Remove(position) => {
                    let len = engine.record().lexical_info.len();
                    let result = engine.remove_item(position);
                    prop_assert_eq!(result.is_ok(), position < len);
                }
            }
        }
    }

    #[test]
    fn prop_added_ids_are_shared_by_four_layers(adds in 1usize..10) {
        let mut engine = ConsistencyEngine::new(sample_record(), SectionPermissions::all());
        for _ in 0..adds {
            let id = engine.add_item().unwrap();
            let record = engine.record();
            prop_assert!(record.dependency_info.iter().any(|e| e.id == id && e.is_blank()));
            prop_assert!(record.discourse_coref_info.iter().any(|e| e.id == id && e.is_blank()));
            prop_assert!(record.construction_info.iter().any(|e| e.id == id && e.is_blank()));
        }
    }
}
