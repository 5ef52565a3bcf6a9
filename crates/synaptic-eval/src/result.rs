use std::sync::Arc;

use synaptic_core::{Sample, SimilarityModelLoader, SynapticError};

use crate::extract::{extract_sample_answers, RunnableKind};
use crate::lexical::{exact_match, f1};
use crate::metrics::{Metric, MetricOptions, MetricsResult};
use crate::sas::semantic_answer_similarity;

/// Inputs, outputs and expected outputs of one evaluation run.
///
/// The three sequences are index-aligned. Metrics are computed on demand with
/// [`calculate_metrics`](Self::calculate_metrics); the result itself never
/// changes after construction.
pub struct EvaluationResult {
    runnable_kind: RunnableKind,
    inputs: Vec<Sample>,
    outputs: Vec<Sample>,
    expected_outputs: Vec<Sample>,
    model_loader: Option<Arc<dyn SimilarityModelLoader>>,
}

impl EvaluationResult {
    pub fn new(
        runnable_kind: RunnableKind,
        inputs: Vec<Sample>,
        outputs: Vec<Sample>,
        expected_outputs: Vec<Sample>,
    ) -> Result<Self, SynapticError> {
        if inputs.len() != outputs.len() {
            return Err(SynapticError::length_mismatch(
                "inputs vs outputs",
                inputs.len(),
                outputs.len(),
            ));
        }
        if inputs.len() != expected_outputs.len() {
            return Err(SynapticError::length_mismatch(
                "inputs vs expected outputs",
                inputs.len(),
                expected_outputs.len(),
            ));
        }
        Ok(Self {
            runnable_kind,
            inputs,
            outputs,
            expected_outputs,
            model_loader: None,
        })
    }

    /// Use `loader` to resolve the model for [`Metric::Sas`].
    ///
    /// Without one, the HuggingFace hub loader is used when the `huggingface`
    /// feature is enabled.
    pub fn with_model_loader(mut self, loader: Arc<dyn SimilarityModelLoader>) -> Self {
        self.model_loader = Some(loader);
        self
    }

    pub fn runnable_kind(&self) -> RunnableKind {
        self.runnable_kind
    }

    pub fn inputs(&self) -> &[Sample] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Sample] {
        &self.outputs
    }

    pub fn expected_outputs(&self) -> &[Sample] {
        &self.expected_outputs
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Predicted and expected answers under `output_key`, in sample order.
    ///
    /// Every sample must yield as many predictions as labels, so that the
    /// flattened lists pair answers of the same sample.
    pub fn answers(&self, output_key: &str) -> Result<(Vec<String>, Vec<String>), SynapticError> {
        let predictions = extract_sample_answers(&self.outputs, output_key, self.runnable_kind)?;
        let labels =
            extract_sample_answers(&self.expected_outputs, output_key, self.runnable_kind)?;
        for (index, (predicted, expected)) in predictions.iter().zip(&labels).enumerate() {
            if predicted.len() != expected.len() {
                return Err(SynapticError::length_mismatch(
                    format!("predictions vs labels in sample {index}"),
                    predicted.len(),
                    expected.len(),
                ));
            }
        }
        Ok((
            predictions.into_iter().flatten().collect(),
            labels.into_iter().flatten().collect(),
        ))
    }

    /// Compute `metric` over this run.
    ///
    /// Recall, MRR and MAP are reported as not computed.
    pub async fn calculate_metrics(
        &self,
        metric: &Metric,
        options: &MetricOptions,
    ) -> Result<MetricsResult, SynapticError> {
        tracing::debug!(
            metric = metric.name(),
            output_key = %options.output_key,
            samples = self.len(),
            "calculating metric"
        );
        match metric {
            Metric::Recall | Metric::Mrr | Metric::Map => {
                Ok(MetricsResult::not_computed(metric.name()))
            }
            Metric::Em => {
                let (predictions, labels) = self.normalized_answers(options)?;
                let scores = exact_match(&predictions, &labels)?;
                Ok(MetricsResult::new(metric.name(), Some(scores.score)))
            }
            Metric::F1 => {
                let (predictions, labels) = self.normalized_answers(options)?;
                let scores = f1(&predictions, &labels)?;
                Ok(MetricsResult::new(metric.name(), Some(scores.score)))
            }
            Metric::Sas => self.calculate_sas(options).await,
            Metric::Custom(func) => func(self, options),
        }
    }

    fn normalized_answers(
        &self,
        options: &MetricOptions,
    ) -> Result<(Vec<String>, Vec<String>), SynapticError> {
        let (predictions, labels) = self.answers(&options.output_key)?;
        let normalizer = options.normalization.build()?;
        Ok((
            normalizer.normalize_all(&predictions),
            normalizer.normalize_all(&labels),
        ))
    }

    async fn calculate_sas(&self, options: &MetricOptions) -> Result<MetricsResult, SynapticError> {
        let (predictions, labels) = self.answers(&options.output_key)?;
        if options.sas.batch_size == 0 {
            return Err(SynapticError::Validation(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if predictions.is_empty() {
            return Ok(MetricsResult::new("sas", Some(0.0)).with_scores(vec![0.0]));
        }
        let normalizer = options.normalization.build()?;
        let predictions = normalizer.normalize_all(&predictions);
        let labels = normalizer.normalize_all(&labels);

        let loader = self.similarity_loader()?;
        let model = loader.load(&options.sas.model_request()).await?;
        tracing::debug!(
            model = %options.sas.model,
            cross_encoder = model.is_cross_encoder(),
            "loaded similarity model"
        );

        let sas =
            semantic_answer_similarity(&model, &predictions, &labels, options.sas.batch_size)
                .await?;
        Ok(MetricsResult::new("sas", Some(sas.score)).with_scores(sas.scores))
    }

    fn similarity_loader(&self) -> Result<Arc<dyn SimilarityModelLoader>, SynapticError> {
        if let Some(loader) = &self.model_loader {
            return Ok(loader.clone());
        }
        default_loader()
    }
}

#[cfg(feature = "huggingface")]
fn default_loader() -> Result<Arc<dyn SimilarityModelLoader>, SynapticError> {
    Ok(Arc::new(synaptic_huggingface::HubModelLoader::default()))
}

#[cfg(not(feature = "huggingface"))]
fn default_loader() -> Result<Arc<dyn SimilarityModelLoader>, SynapticError> {
    Err(SynapticError::DependencyUnavailable(
        "semantic answer similarity needs a model loader; enable the `huggingface` feature or call `with_model_loader`".to_string(),
    ))
}

impl std::fmt::Debug for EvaluationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationResult")
            .field("runnable_kind", &self.runnable_kind)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("expected_outputs", &self.expected_outputs)
            .field("model_loader", &self.model_loader.is_some())
            .finish()
    }
}
