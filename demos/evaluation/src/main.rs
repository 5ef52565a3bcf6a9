use std::sync::Arc;

use serde_json::json;
use synaptic::core::{Sample, SimilarityModel, SynapticError};
use synaptic::embeddings::FakeEmbeddings;
use synaptic::eval::{eval, Component, Metric, MetricOptions, TextNormalization};
use synaptic::runnables::RunnableLambda;

fn question(text: &str) -> Sample {
    Sample::from([("question".to_string(), json!(text))])
}

fn answers(answer: &str) -> Sample {
    Sample::from([("answers".to_string(), json!([answer]))])
}

#[tokio::main]
async fn main() -> Result<(), SynapticError> {
    tracing_subscriber::fmt::init();

    // A toy reader that answers from a lookup table.
    let reader = RunnableLambda::new(|input: Sample| async move {
        let question = input
            .get("question")
            .and_then(|q| q.as_str())
            .unwrap_or_default()
            .to_string();
        let answer = match question.as_str() {
            "What is 2+2?" => "4",
            "Capital of France?" => "Paris!",
            "Largest planet?" => "Saturn",
            _ => "Graydon Hoare",
        };
        Ok(answers(answer))
    });

    let inputs = vec![
        question("What is 2+2?"),
        question("Capital of France?"),
        question("Largest planet?"),
        question("Rust creator?"),
    ];
    let expected = vec![
        answers("four"),
        answers("paris"),
        answers("Jupiter"),
        answers("Graydon Hoare"),
    ];

    println!("=== Running evaluation ===");
    let result = eval(&Component::new(reader), inputs, expected)
        .await?
        .with_model_loader(Arc::new(SimilarityModel::BiEncoder(Arc::new(
            FakeEmbeddings::default(),
        ))));
    println!("Collected {} outputs", result.len());

    let strict = MetricOptions::new("answers");
    let relaxed = MetricOptions::new("answers").with_normalization(
        TextNormalization::new()
            .with_ignore_case(true)
            .with_ignore_punctuation(true),
    );

    println!("\n=== Lexical metrics ===");
    for (label, options) in [("strict", &strict), ("relaxed", &relaxed)] {
        let em = result.calculate_metrics(&Metric::Em, options).await?;
        let f1 = result.calculate_metrics(&Metric::F1, options).await?;
        println!(
            "{label:>8}: exact_match={:.2} f1={:.2}",
            em.get("exact_match").unwrap_or_default(),
            f1.get("f1").unwrap_or_default()
        );
    }

    println!("\n=== Semantic answer similarity ===");
    let sas = result.calculate_metrics(&Metric::Sas, &relaxed).await?;
    println!("sas={:.3}", sas.get("sas").unwrap_or_default());
    for (i, score) in sas.scores.unwrap_or_default().iter().enumerate() {
        println!("  sample {i}: {score:.3}");
    }

    println!("\n=== Retrieval metrics ===");
    for metric in [Metric::Recall, Metric::Mrr, Metric::Map] {
        let value = result.calculate_metrics(&metric, &strict).await?;
        println!("{}: {:?}", metric.name(), value.get(metric.name()));
    }

    println!("\nEvaluation demo completed successfully!");
    Ok(())
}
