use async_trait::async_trait;
use serde_json::Value;
use synaptic_core::{CrossEncoder, SynapticError};

use crate::DEFAULT_INFERENCE_URL;

#[derive(Debug, Clone)]
pub struct HuggingFaceCrossEncoderConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub wait_for_model: bool,
}

impl HuggingFaceCrossEncoderConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            base_url: DEFAULT_INFERENCE_URL.to_string(),
            wait_for_model: true,
        }
    }
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
    pub fn with_wait_for_model(mut self, wait: bool) -> Self {
        self.wait_for_model = wait;
        self
    }
}

/// Sequence-classification model scored through the HuggingFace
/// text-classification endpoint.
///
/// Scores are requested without an activation function, so they are the raw
/// logits a local cross-encoder would produce.
pub struct HuggingFaceCrossEncoder {
    config: HuggingFaceCrossEncoderConfig,
    client: reqwest::Client,
}

impl HuggingFaceCrossEncoder {
    pub fn new(config: HuggingFaceCrossEncoderConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(config: HuggingFaceCrossEncoderConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

/// Pull one score per pair out of a text-classification response.
///
/// Each element is either a bare number, a `{label, score}` object, or a list
/// of such objects ordered by score (the first one is taken).
pub(crate) fn parse_pair_scores(resp: &Value) -> Result<Vec<f32>, SynapticError> {
    let items = resp
        .as_array()
        .ok_or_else(|| SynapticError::Model(format!("expected array response, got {resp}")))?;
    items
        .iter()
        .map(|item| {
            let entry = match item {
                Value::Array(labels) => labels.first().ok_or_else(|| {
                    SynapticError::Model("empty label list in response".to_string())
                })?,
                other => other,
            };
            let score = match entry {
                Value::Number(n) => n.as_f64(),
                Value::Object(obj) => obj.get("score").and_then(Value::as_f64),
                _ => None,
            };
            score
                .map(|s| s as f32)
                .ok_or_else(|| SynapticError::Model(format!("no score in response item {item}")))
        })
        .collect()
}

#[async_trait]
impl CrossEncoder for HuggingFaceCrossEncoder {
    async fn score_pairs(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>, SynapticError> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }
        let inputs: Vec<Value> = pairs
            .iter()
            .map(|(text, text_pair)| serde_json::json!({ "text": text, "text_pair": text_pair }))
            .collect();
        let body = serde_json::json!({
            "inputs": inputs,
            "parameters": { "function_to_apply": "none" },
        });
        let url = format!("{}/{}", self.config.base_url, self.config.model);
        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");
        if let Some(ref key) = self.config.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }
        if self.config.wait_for_model {
            request = request.header("x-wait-for-model", "true");
        }
        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| SynapticError::Model(format!("HuggingFace cross-encoder request: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let code = status.as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(SynapticError::Model(format!(
                "HuggingFace API error ({code}): {text}"
            )));
        }
        let json: Value = response
            .json()
            .await
            .map_err(|e| SynapticError::Model(format!("HuggingFace cross-encoder parse: {e}")))?;
        let scores = parse_pair_scores(&json)?;
        if scores.len() != pairs.len() {
            return Err(SynapticError::Model(format!(
                "HuggingFace returned {} scores for {} pairs",
                scores.len(),
                pairs.len()
            )));
        }
        Ok(scores)
    }
}
