use serde::{Deserialize, Serialize};
use synaptic_core::{
    CrossEncoder, Embeddings, HubToken, ModelRequest, SimilarityModel, SynapticError,
};

use crate::lexical::{check_lengths, mean, SampleScores};

/// Model used for semantic answer similarity when none is configured.
pub const DEFAULT_SAS_MODEL: &str = "sentence-transformers/paraphrase-multilingual-mpnet-base-v2";

/// Which model scores semantic similarity and how it is fed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SasOptions {
    pub model: String,
    pub batch_size: usize,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub token: HubToken,
}

impl Default for SasOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_SAS_MODEL.to_string(),
            batch_size: 32,
            device: None,
            token: HubToken::None,
        }
    }
}

impl SasOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn with_token(mut self, token: HubToken) -> Self {
        self.token = token;
        self
    }

    /// The loader request for the configured model, device and token.
    pub fn model_request(&self) -> ModelRequest {
        let request = ModelRequest::new(&self.model).with_token(self.token.clone());
        match &self.device {
            Some(device) => request.with_device(device),
            None => request,
        }
    }
}

/// Semantic answer similarity between parallel predictions and labels.
///
/// Cross-encoders score each `(prediction, label)` pair; when any raw score
/// exceeds 1.0 the scores are logits and all of them go through a sigmoid.
/// Bi-encoders embed both sides and score pair `i` by the cosine similarity
/// of prediction `i` and label `i`. Inputs are sent to the model
/// `batch_size` texts at a time.
///
/// No samples yields a score of 0.0 with a single 0.0 entry in `scores`.
pub async fn semantic_answer_similarity(
    model: &SimilarityModel,
    predictions: &[String],
    labels: &[String],
    batch_size: usize,
) -> Result<SampleScores, SynapticError> {
    check_lengths(predictions, labels)?;
    if batch_size == 0 {
        return Err(SynapticError::Validation(
            "batch_size must be at least 1".to_string(),
        ));
    }
    if predictions.is_empty() {
        return Ok(SampleScores {
            score: 0.0,
            scores: vec![0.0],
        });
    }

    let scores = match model {
        SimilarityModel::CrossEncoder(encoder) => {
            cross_encoder_scores(encoder.as_ref(), predictions, labels, batch_size).await?
        }
        SimilarityModel::BiEncoder(embeddings) => {
            bi_encoder_scores(embeddings.as_ref(), predictions, labels, batch_size).await?
        }
    };

    Ok(SampleScores {
        score: mean(&scores),
        scores,
    })
}

async fn cross_encoder_scores(
    encoder: &dyn CrossEncoder,
    predictions: &[String],
    labels: &[String],
    batch_size: usize,
) -> Result<Vec<f64>, SynapticError> {
    let pairs: Vec<(&str, &str)> = predictions
        .iter()
        .zip(labels)
        .map(|(prediction, label)| (prediction.as_str(), label.as_str()))
        .collect();

    let mut raw = Vec::with_capacity(pairs.len());
    for chunk in pairs.chunks(batch_size) {
        let scores = encoder.score_pairs(chunk).await?;
        if scores.len() != chunk.len() {
            return Err(SynapticError::Model(format!(
                "cross-encoder returned {} scores for {} pairs",
                scores.len(),
                chunk.len()
            )));
        }
        raw.extend(scores.into_iter().map(f64::from));
    }

    let apply_sigmoid = raw.iter().any(|score| *score > 1.0);
    tracing::debug!(pairs = raw.len(), apply_sigmoid, "scored pairs with cross-encoder");
    if apply_sigmoid {
        for score in &mut raw {
            *score = sigmoid(*score);
        }
    }
    Ok(raw)
}

async fn bi_encoder_scores(
    embeddings: &dyn Embeddings,
    predictions: &[String],
    labels: &[String],
    batch_size: usize,
) -> Result<Vec<f64>, SynapticError> {
    let prediction_vectors = embed_in_batches(embeddings, predictions, batch_size).await?;
    let label_vectors = embed_in_batches(embeddings, labels, batch_size).await?;
    tracing::debug!(pairs = predictions.len(), "embedded answers with bi-encoder");

    Ok(prediction_vectors
        .iter()
        .zip(&label_vectors)
        .map(|(prediction, label)| cosine_similarity(prediction, label))
        .collect())
}

async fn embed_in_batches(
    embeddings: &dyn Embeddings,
    texts: &[String],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>, SynapticError> {
    let mut vectors = Vec::with_capacity(texts.len());
    for chunk in texts.chunks(batch_size) {
        let refs: Vec<&str> = chunk.iter().map(String::as_str).collect();
        let batch = embeddings.embed_documents(&refs).await?;
        if batch.len() != refs.len() {
            return Err(SynapticError::Embedding(format!(
                "embedding model returned {} vectors for {} texts",
                batch.len(),
                refs.len()
            )));
        }
        vectors.extend(batch);
    }
    Ok(vectors)
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Cosine similarity of two vectors. Zero vectors have similarity 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_is_centered_at_zero() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(6.0) > 0.99);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
