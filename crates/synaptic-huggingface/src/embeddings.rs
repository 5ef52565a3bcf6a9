use async_trait::async_trait;
use synaptic_core::{Embeddings, SynapticError};

use crate::DEFAULT_INFERENCE_URL;

#[derive(Debug, Clone)]
pub struct HuggingFaceEmbeddingsConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub wait_for_model: bool,
}

impl HuggingFaceEmbeddingsConfig {
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

/// Bi-encoder backed by the HuggingFace feature-extraction endpoint.
pub struct HuggingFaceEmbeddings {
    config: HuggingFaceEmbeddingsConfig,
    client: reqwest::Client,
}

impl HuggingFaceEmbeddings {
    pub fn new(config: HuggingFaceEmbeddingsConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
    pub fn with_client(config: HuggingFaceEmbeddingsConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SynapticError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/{}", self.config.base_url, self.config.model);
        let body = serde_json::json!({ "inputs": texts });
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
            .map_err(|e| SynapticError::Embedding(format!("HuggingFace request: {e}")))?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let code = status.as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(SynapticError::Embedding(format!(
                "HuggingFace API error ({code}): {text}"
            )));
        }
        let resp: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SynapticError::Embedding(format!("HuggingFace parse: {e}")))?;
        let embeddings = parse_embeddings(&resp)?;
        if embeddings.len() != texts.len() {
            return Err(SynapticError::Embedding(format!(
                "HuggingFace returned {} embeddings for {} inputs",
                embeddings.len(),
                texts.len()
            )));
        }
        Ok(embeddings)
    }
}

pub(crate) fn parse_embeddings(resp: &serde_json::Value) -> Result<Vec<Vec<f32>>, SynapticError> {
    let array = if let Some(arr) = resp.as_array() {
        arr
    } else if let Some(arr) = resp.get("embeddings").and_then(|e| e.as_array()) {
        arr
    } else {
        return Err(SynapticError::Embedding(
            "unexpected HuggingFace response format".to_string(),
        ));
    };
    let mut result = Vec::with_capacity(array.len());
    for item in array {
        let embedding: Vec<f32> = item
            .as_array()
            .ok_or_else(|| SynapticError::Embedding("embedding item is not array".to_string()))?
            .iter()
            .map(|v| {
                v.as_f64().map(|f| f as f32).ok_or_else(|| {
                    SynapticError::Embedding(format!("embedding value is not a number: {v}"))
                })
            })
            .collect::<Result<_, _>>()?;
        result.push(embedding);
    }
    Ok(result)
}

#[async_trait]
impl Embeddings for HuggingFaceEmbeddings {
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SynapticError> {
        self.embed_batch(texts).await
    }
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, SynapticError> {
        let mut results = self.embed_batch(&[text]).await?;
        results
            .pop()
            .ok_or_else(|| SynapticError::Embedding("empty HuggingFace response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_direct_array() {
        let resp = serde_json::json!([[0.1_f32, 0.2_f32], [0.3_f32, 0.4_f32]]);
        let result = parse_embeddings(&resp).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[1].len(), 2);
    }

    #[test]
    fn parse_wrapped_embeddings() {
        let resp = serde_json::json!({ "embeddings": [[1.0, 0.0]] });
        assert_eq!(parse_embeddings(&resp).unwrap(), vec![vec![1.0, 0.0]]);
    }

    #[test]
    fn rejects_non_numeric_values() {
        let resp = serde_json::json!([[1.0, "x"]]);
        assert!(parse_embeddings(&resp).is_err());
    }
}
