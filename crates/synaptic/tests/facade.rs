use serde_json::json;
use synaptic::core::Sample;
use synaptic::eval::{eval, Component, Metric, MetricOptions, TextNormalization};
use synaptic::runnables::RunnableLambda;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[tokio::test]
async fn evaluates_through_the_facade() {
    init_tracing();
    let reader = RunnableLambda::new(|input: Sample| async move {
        tracing::debug!(?input, "answering");
        Ok(Sample::from([("answers".to_string(), json!(["The Eiffel Tower"]))]))
    });
    let inputs = vec![Sample::from([("question".to_string(), json!("Tallest tower in Paris?"))])];
    let expected = vec![Sample::from([("answers".to_string(), json!(["Eiffel tower"]))])];

    let result = eval(&Component::new(reader), inputs, expected).await.unwrap();
    let options = MetricOptions::new("answers").with_normalization(
        TextNormalization::new()
            .with_ignore_case(true)
            .with_regexes_to_ignore(["^the "]),
    );

    let em = result.calculate_metrics(&Metric::Em, &options).await.unwrap();
    assert_eq!(em.get("exact_match"), Some(1.0));
}

#[tokio::test]
async fn converter_skips_unreadable_sources() {
    init_tracing();
    let docs = synaptic::docx::DocxToDocument::new()
        .run(vec!["does-not-exist.docx".into()], None)
        .await
        .unwrap();
    assert!(docs.is_empty());
}
