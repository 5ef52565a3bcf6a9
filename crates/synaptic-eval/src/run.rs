use serde_json::json;
use synaptic_core::{RunnableConfig, Sample, SynapticError};

use crate::result::EvaluationResult;
use crate::target::EvalTarget;

/// Run `target` on every input, one after another, and collect the outputs.
///
/// Fails before running anything when `inputs` and `expected_outputs` differ
/// in length. The first failing run aborts the evaluation.
///
/// ```ignore
/// let result = eval(&Component::new(reader), inputs, expected).await?;
/// let em = result
///     .calculate_metrics(&Metric::Em, &MetricOptions::new("answers"))
///     .await?;
/// ```
pub async fn eval<T>(
    target: &T,
    inputs: Vec<Sample>,
    expected_outputs: Vec<Sample>,
) -> Result<EvaluationResult, SynapticError>
where
    T: EvalTarget + ?Sized,
{
    if inputs.len() != expected_outputs.len() {
        return Err(SynapticError::length_mismatch(
            "inputs vs expected outputs",
            inputs.len(),
            expected_outputs.len(),
        ));
    }

    let mut outputs = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        tracing::debug!(sample = index, "running evaluation target");
        let config = RunnableConfig::default()
            .with_run_name(format!("eval-{index}"))
            .with_metadata("sample_index", json!(index));
        outputs.push(target.run(input.clone(), &config).await?);
    }

    tracing::info!(
        samples = outputs.len(),
        kind = ?target.kind(),
        "evaluation finished"
    );
    EvaluationResult::new(target.kind(), inputs, outputs, expected_outputs)
}
