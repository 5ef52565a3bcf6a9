use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use synaptic_core::{RunnableConfig, Sample, SynapticError};
use synaptic_eval::{
    eval, Component, EvalTarget, Metric, MetricOptions, RunnableKind, TextNormalization,
};
use synaptic_runnables::{Pipeline, RunnableLambda};

fn question(text: &str) -> Sample {
    Sample::from([("question".to_string(), json!(text))])
}

fn expected(answer: &str) -> Sample {
    Sample::from([("answers".to_string(), json!([answer]))])
}

/// Answers capital-city questions from a tiny lookup table.
fn reader() -> RunnableLambda<Sample, Sample> {
    RunnableLambda::new(|input: Sample| async move {
        let question = input["question"].as_str().unwrap_or_default().to_string();
        let answer = if question.contains("France") {
            "Paris"
        } else if question.contains("Italy") {
            "Rome"
        } else {
            "unknown"
        };
        Ok(Sample::from([("answers".to_string(), json!([answer]))]))
    })
}

#[tokio::test]
async fn component_outputs_follow_input_order() {
    let inputs = vec![question("capital of France?"), question("capital of Italy?")];
    let expected_outputs = vec![expected("Paris"), expected("Rome")];

    let result = eval(&Component::new(reader()), inputs, expected_outputs)
        .await
        .unwrap();

    assert_eq!(result.runnable_kind(), RunnableKind::Component);
    assert_eq!(result.len(), 2);
    assert_eq!(result.outputs()[0]["answers"], json!(["Paris"]));
    assert_eq!(result.outputs()[1]["answers"], json!(["Rome"]));
    let em = result
        .calculate_metrics(&Metric::Em, &MetricOptions::new("answers"))
        .await
        .unwrap();
    assert_eq!(em.get("exact_match"), Some(1.0));
}

#[tokio::test]
async fn mismatched_lengths_fail_before_running() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let target = Component::new(RunnableLambda::new(move |input: Sample| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(input)
        }
    }));

    let err = eval(&target, vec![question("a"), question("b")], vec![expected("a")])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SynapticError::LengthMismatch {
            left: 2,
            right: 1,
            ..
        }
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn first_failure_aborts_the_evaluation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let target = Component::new(RunnableLambda::new(move |input: Sample| {
        let counter = counter.clone();
        async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n == 1 {
                return Err(SynapticError::Model("backend down".into()));
            }
            Ok(input)
        }
    }));
    let inputs = vec![question("a"), question("b"), question("c")];
    let expected_outputs = vec![expected("a"), expected("b"), expected("c")];

    let err = eval(&target, inputs, expected_outputs).await.unwrap_err();

    assert!(matches!(err, SynapticError::Model(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn empty_evaluation_is_allowed() {
    let result = eval(&Component::new(reader()), vec![], vec![]).await.unwrap();
    assert!(result.is_empty());
    let f1 = result
        .calculate_metrics(&Metric::F1, &MetricOptions::new("answers"))
        .await
        .unwrap();
    assert_eq!(f1.get("f1"), Some(0.0));
}

/// Target that records the run configuration of every call.
struct RecordingTarget {
    runs: Mutex<Vec<RunnableConfig>>,
}

#[async_trait]
impl EvalTarget for RecordingTarget {
    fn kind(&self) -> RunnableKind {
        RunnableKind::Component
    }

    async fn run(&self, input: Sample, config: &RunnableConfig) -> Result<Sample, SynapticError> {
        self.runs.lock().unwrap().push(config.clone());
        Ok(input)
    }
}

#[tokio::test]
async fn each_run_is_named_after_its_sample() {
    let target = RecordingTarget {
        runs: Mutex::new(Vec::new()),
    };
    eval(&target, vec![question("a"), question("b")], vec![expected("a"), expected("b")])
        .await
        .unwrap();

    let runs = target.runs.lock().unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].run_name.as_deref(), Some("eval-0"));
    assert_eq!(runs[1].run_name.as_deref(), Some("eval-1"));
    assert_eq!(runs[1].metadata["sample_index"], json!(1));
}

fn retriever() -> RunnableLambda<Sample, Sample> {
    RunnableLambda::new(|mut input: Sample| async move {
        input.insert("documents".to_string(), json!(["France borders Spain."]));
        Ok(input)
    })
}

#[tokio::test]
async fn pipeline_answers_are_found_in_their_component() {
    let mut pipeline = Pipeline::new();
    pipeline.add_component("retriever", retriever()).unwrap();
    pipeline.add_component("reader", reader()).unwrap();

    let inputs = vec![question("capital of France?"), question("capital of Italy?")];
    let expected_outputs = vec![
        Sample::from([("reader".to_string(), json!({"answers": ["paris"]}))]),
        Sample::from([("reader".to_string(), json!({"answers": ["Milan"]}))]),
    ];

    let result = eval(&pipeline, inputs, expected_outputs).await.unwrap();
    assert_eq!(result.runnable_kind(), RunnableKind::Pipeline);

    let options = MetricOptions::new("answers")
        .with_normalization(TextNormalization::new().with_ignore_case(true));
    let em = result.calculate_metrics(&Metric::Em, &options).await.unwrap();
    assert_eq!(em.get("exact_match"), Some(0.5));
}

#[tokio::test]
async fn pipeline_key_reported_twice_is_ambiguous() {
    let answering_retriever = RunnableLambda::new(|mut input: Sample| async move {
        input.insert("answers".to_string(), json!(["draft"]));
        Ok(input)
    });
    let mut pipeline = Pipeline::new().include_outputs_from("retriever");
    pipeline.add_component("retriever", answering_retriever).unwrap();
    pipeline.add_component("reader", reader()).unwrap();

    let inputs = vec![question("capital of France?")];
    let expected_outputs = vec![Sample::from([(
        "reader".to_string(),
        json!({"answers": ["Paris"]}),
    )])];
    let result = eval(&pipeline, inputs, expected_outputs).await.unwrap();

    let err = result
        .calculate_metrics(&Metric::Em, &MetricOptions::new("answers"))
        .await
        .unwrap_err();
    assert!(matches!(err, SynapticError::AmbiguousKey { .. }));
}
