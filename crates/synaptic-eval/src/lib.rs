mod extract;
mod lexical;
mod metrics;
mod normalize;
mod result;
mod run;
mod sas;
mod target;

pub use extract::{extract_answers, extract_sample_answers, RunnableKind};
pub use lexical::{exact_match, f1, f1_single, SampleScores};
pub use metrics::{CustomMetricFn, Metric, MetricOptions, MetricsResult};
pub use normalize::{preprocess_text, TextNormalization, TextNormalizer};
pub use result::EvaluationResult;
pub use run::eval;
pub use sas::{cosine_similarity, semantic_answer_similarity, SasOptions, DEFAULT_SAS_MODEL};
pub use target::{Component, EvalTarget};
