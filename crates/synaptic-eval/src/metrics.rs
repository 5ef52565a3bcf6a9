use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use synaptic_core::SynapticError;

use crate::normalize::TextNormalization;
use crate::result::EvaluationResult;
use crate::sas::SasOptions;

/// Signature of a caller-supplied metric.
pub type CustomMetricFn =
    dyn Fn(&EvaluationResult, &MetricOptions) -> Result<MetricsResult, SynapticError> + Send + Sync;

/// A metric that [`EvaluationResult::calculate_metrics`] can compute.
#[derive(Clone)]
pub enum Metric {
    Recall,
    Mrr,
    Map,
    F1,
    Em,
    Sas,
    Custom(Arc<CustomMetricFn>),
}

impl Metric {
    pub fn custom<F>(func: F) -> Self
    where
        F: Fn(&EvaluationResult, &MetricOptions) -> Result<MetricsResult, SynapticError>
            + Send
            + Sync
            + 'static,
    {
        Metric::Custom(Arc::new(func))
    }

    /// Key under which the metric reports its value.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Recall => "recall",
            Metric::Mrr => "mean_reciprocal_rank",
            Metric::Map => "mean_average_precision",
            Metric::F1 => "f1",
            Metric::Em => "exact_match",
            Metric::Sas => "sas",
            Metric::Custom(_) => "custom",
        }
    }
}

impl std::fmt::Debug for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let variant = match self {
            Metric::Recall => "Recall",
            Metric::Mrr => "Mrr",
            Metric::Map => "Map",
            Metric::F1 => "F1",
            Metric::Em => "Em",
            Metric::Sas => "Sas",
            Metric::Custom(_) => "Custom",
        };
        write!(f, "Metric::{variant}")
    }
}

/// Per-call options for [`EvaluationResult::calculate_metrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricOptions {
    /// Key holding the answers in outputs and expected outputs.
    pub output_key: String,
    #[serde(default)]
    pub normalization: TextNormalization,
    #[serde(default)]
    pub sas: SasOptions,
}

impl MetricOptions {
    pub fn new(output_key: impl Into<String>) -> Self {
        Self {
            output_key: output_key.into(),
            ..Self::default()
        }
    }

    pub fn with_normalization(mut self, normalization: TextNormalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_sas(mut self, sas: SasOptions) -> Self {
        self.sas = sas;
        self
    }
}

/// Outcome of one metric calculation.
///
/// A `None` value means the metric is recognised but not computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    pub metrics: BTreeMap<String, Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<Vec<f64>>,
}

impl MetricsResult {
    pub fn new(name: impl Into<String>, value: Option<f64>) -> Self {
        let mut metrics = BTreeMap::new();
        metrics.insert(name.into(), value);
        Self {
            metrics,
            scores: None,
        }
    }

    /// A recognised metric without a value.
    pub fn not_computed(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: Option<f64>) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    pub fn with_scores(mut self, scores: Vec<f64>) -> Self {
        self.scores = Some(scores);
        self
    }

    /// The value of `name`, or `None` when it is absent or not computed.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied().flatten()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }

    pub fn to_json(&self) -> Result<String, SynapticError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SynapticError::Parsing(format!("serializing metrics: {e}")))
    }

    /// Write the result as pretty-printed JSON to `path`.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), SynapticError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SynapticError::Store(format!("failed to create directory: {e}")))?;
        }
        let json = self.to_json()?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| SynapticError::Store(format!("failed to write {}: {e}", path.display())))
    }
}
