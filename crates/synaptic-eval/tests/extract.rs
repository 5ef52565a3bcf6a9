use serde_json::{json, Value};
use synaptic_core::{Sample, SynapticError};
use synaptic_eval::{extract_answers, extract_sample_answers, RunnableKind};

fn sample(key: &str, value: Value) -> Sample {
    Sample::from([(key.to_string(), value)])
}

#[test]
fn component_answers_are_read_directly() {
    let outputs = vec![sample("answers", json!(["Paris"]))];
    let answers = extract_answers(&outputs, "answers", RunnableKind::Component).unwrap();
    assert_eq!(answers, vec!["Paris".to_string()]);
}

#[test]
fn plain_string_is_one_answer() {
    let outputs = vec![sample("answer", json!("Rome")), sample("answer", json!("Berlin"))];
    let answers = extract_answers(&outputs, "answer", RunnableKind::Component).unwrap();
    assert_eq!(answers, vec!["Rome".to_string(), "Berlin".to_string()]);
}

#[test]
fn generated_answers_use_their_data() {
    let outputs = vec![sample(
        "answers",
        json!([{"data": "Paris", "meta": {"score": 0.9}}]),
    )];
    let answers = extract_answers(&outputs, "answers", RunnableKind::Component).unwrap();
    assert_eq!(answers, vec!["Paris".to_string()]);
}

#[test]
fn empty_answers_are_skipped() {
    let outputs = vec![
        sample("answers", json!(["", null, "Tokyo"])),
        sample("answers", json!(null)),
        sample("answers", json!([])),
    ];
    let answers = extract_answers(&outputs, "answers", RunnableKind::Component).unwrap();
    assert_eq!(answers, vec!["Tokyo".to_string()]);
}

#[test]
fn multiple_answers_keep_their_order() {
    let outputs = vec![sample("answers", json!(["a", "b"])), sample("answers", json!(["c"]))];
    let answers = extract_answers(&outputs, "answers", RunnableKind::Component).unwrap();
    assert_eq!(answers, vec!["a", "b", "c"]);
}

#[test]
fn sample_answers_stay_grouped() {
    let outputs = vec![
        sample("answers", json!(["a", "b"])),
        sample("answers", json!([])),
        sample("answers", json!("c")),
    ];
    let answers = extract_sample_answers(&outputs, "answers", RunnableKind::Component).unwrap();
    assert_eq!(
        answers,
        vec![vec!["a".to_string(), "b".to_string()], vec![], vec!["c".to_string()]]
    );
}

#[test]
fn missing_key_fails_with_sample_index() {
    let outputs = vec![
        sample("answers", json!(["Paris"])),
        sample("documents", json!([])),
    ];
    let err = extract_answers(&outputs, "answers", RunnableKind::Component).unwrap_err();
    match err {
        SynapticError::MissingKey { key, sample } => {
            assert_eq!(key, "answers");
            assert_eq!(sample, 1);
        }
        other => panic!("expected MissingKey, got {other:?}"),
    }
}

#[test]
fn non_text_answer_is_a_shape_error() {
    let outputs = vec![sample("answers", json!(42))];
    let err = extract_answers(&outputs, "answers", RunnableKind::Component).unwrap_err();
    assert!(matches!(err, SynapticError::Shape(_)));

    let outputs = vec![sample("answers", json!([{"text": "Paris"}]))];
    let err = extract_answers(&outputs, "answers", RunnableKind::Component).unwrap_err();
    assert!(matches!(err, SynapticError::Shape(_)));
}

#[test]
fn pipeline_answers_come_from_the_unique_component() {
    let outputs = vec![Sample::from([
        ("retriever".to_string(), json!({"documents": ["doc"]})),
        ("reader".to_string(), json!({"answers": ["Paris"]})),
    ])];
    let answers = extract_answers(&outputs, "answers", RunnableKind::Pipeline).unwrap();
    assert_eq!(answers, vec!["Paris".to_string()]);
}

#[test]
fn pipeline_key_in_two_components_is_ambiguous() {
    let outputs = vec![Sample::from([
        ("reader".to_string(), json!({"answers": ["Paris"]})),
        ("generator".to_string(), json!({"answers": ["Lyon"]})),
    ])];
    let err = extract_answers(&outputs, "answers", RunnableKind::Pipeline).unwrap_err();
    match err {
        SynapticError::AmbiguousKey {
            key, components, ..
        } => {
            assert_eq!(key, "answers");
            assert_eq!(components, vec!["generator".to_string(), "reader".to_string()]);
        }
        other => panic!("expected AmbiguousKey, got {other:?}"),
    }
}

#[test]
fn pipeline_without_the_key_fails() {
    let outputs = vec![Sample::from([(
        "retriever".to_string(),
        json!({"documents": []}),
    )])];
    let err = extract_answers(&outputs, "answers", RunnableKind::Pipeline).unwrap_err();
    assert!(matches!(err, SynapticError::MissingKey { sample: 0, .. }));
}

#[test]
fn pipeline_component_output_must_be_a_mapping() {
    let outputs = vec![Sample::from([("reader".to_string(), json!(["Paris"]))])];
    let err = extract_answers(&outputs, "answers", RunnableKind::Pipeline).unwrap_err();
    assert!(matches!(err, SynapticError::Shape(_)));
}

#[test]
fn component_key_at_top_level_is_not_searched_for_pipelines() {
    let outputs = vec![sample("answers", json!({"answers": ["x"]}))];
    let from_component = extract_answers(&outputs, "answers", RunnableKind::Component);
    assert!(matches!(from_component, Err(SynapticError::Shape(_))));
    let from_pipeline = extract_answers(&outputs, "answers", RunnableKind::Pipeline).unwrap();
    assert_eq!(from_pipeline, vec!["x".to_string()]);
}
