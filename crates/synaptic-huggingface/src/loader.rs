use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use synaptic_core::{ModelRequest, SimilarityModel, SimilarityModelLoader, SynapticError};

use crate::cross_encoder::{HuggingFaceCrossEncoder, HuggingFaceCrossEncoderConfig};
use crate::embeddings::{HuggingFaceEmbeddings, HuggingFaceEmbeddingsConfig};
use crate::hub::fetch_model_config;
use crate::{DEFAULT_HUB_URL, DEFAULT_INFERENCE_URL};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubModelLoaderConfig {
    pub hub_url: String,
    pub inference_url: String,
    pub wait_for_model: bool,
}

impl Default for HubModelLoaderConfig {
    fn default() -> Self {
        Self {
            hub_url: DEFAULT_HUB_URL.to_string(),
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            wait_for_model: true,
        }
    }
}

impl HubModelLoaderConfig {
    pub fn with_hub_url(mut self, url: impl Into<String>) -> Self {
        self.hub_url = url.into();
        self
    }
    pub fn with_inference_url(mut self, url: impl Into<String>) -> Self {
        self.inference_url = url.into();
        self
    }
    pub fn with_wait_for_model(mut self, wait: bool) -> Self {
        self.wait_for_model = wait;
        self
    }
}

/// Loads similarity models from the HuggingFace hub.
///
/// The model's `config.json` decides the architecture: sequence classifiers
/// become [`HuggingFaceCrossEncoder`]s, everything else a
/// [`HuggingFaceEmbeddings`] bi-encoder. Inference runs remotely, so the
/// requested device is only recorded in the logs.
pub struct HubModelLoader {
    config: HubModelLoaderConfig,
    client: reqwest::Client,
}

impl HubModelLoader {
    pub fn new(config: HubModelLoaderConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(config: HubModelLoaderConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }
}

impl Default for HubModelLoader {
    fn default() -> Self {
        Self::new(HubModelLoaderConfig::default())
    }
}

#[async_trait]
impl SimilarityModelLoader for HubModelLoader {
    async fn load(&self, request: &ModelRequest) -> Result<SimilarityModel, SynapticError> {
        let token = request.token.resolve();
        let model_config = fetch_model_config(
            &self.client,
            &self.config.hub_url,
            &request.model,
            token.as_deref(),
        )
        .await?;

        tracing::debug!(
            model = %request.model,
            device = ?request.device,
            architectures = ?model_config.architectures,
            "loaded model config"
        );

        if model_config.is_cross_encoder() {
            let mut config = HuggingFaceCrossEncoderConfig::new(&request.model)
                .with_base_url(&self.config.inference_url)
                .with_wait_for_model(self.config.wait_for_model);
            if let Some(token) = token {
                config = config.with_api_key(token);
            }
            Ok(SimilarityModel::CrossEncoder(Arc::new(
                HuggingFaceCrossEncoder::with_client(config, self.client.clone()),
            )))
        } else {
            let mut config = HuggingFaceEmbeddingsConfig::new(&request.model)
                .with_base_url(&self.config.inference_url)
                .with_wait_for_model(self.config.wait_for_model);
            if let Some(token) = token {
                config = config.with_api_key(token);
            }
            Ok(SimilarityModel::BiEncoder(Arc::new(
                HuggingFaceEmbeddings::with_client(config, self.client.clone()),
            )))
        }
    }
}
