use serde::{Deserialize, Serialize};
use synaptic_core::SynapticError;

/// Architecture-name suffix that marks a sequence-classification head.
pub const CROSS_ENCODER_SUFFIX: &str = "ForSequenceClassification";

/// The subset of a model's `config.json` needed to pick an encoder type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub architectures: Option<Vec<String>>,
    #[serde(default)]
    pub model_type: Option<String>,
}

impl ModelConfig {
    pub fn from_json(json: &str) -> Result<Self, SynapticError> {
        serde_json::from_str(json)
            .map_err(|e| SynapticError::Parsing(format!("invalid model config: {e}")))
    }

    /// A model is a cross-encoder when any declared architecture is a
    /// sequence classifier. A config without architectures is a bi-encoder.
    pub fn is_cross_encoder(&self) -> bool {
        self.architectures
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|arch| arch.ends_with(CROSS_ENCODER_SUFFIX))
    }
}

/// Fetch `config.json` for `model` from the hub at `hub_url`.
pub(crate) async fn fetch_model_config(
    client: &reqwest::Client,
    hub_url: &str,
    model: &str,
    token: Option<&str>,
) -> Result<ModelConfig, SynapticError> {
    let url = format!("{hub_url}/{model}/resolve/main/config.json");
    let mut request = client.get(&url);
    if let Some(token) = token {
        request = request.header("Authorization", format!("Bearer {token}"));
    }
    let response = request
        .send()
        .await
        .map_err(|e| SynapticError::Model(format!("fetching config for {model}: {e}")))?;
    let status = response.status();
    if !status.is_success() {
        return Err(SynapticError::Model(format!(
            "fetching config for {model}: hub returned {}",
            status.as_u16()
        )));
    }
    let body = response
        .text()
        .await
        .map_err(|e| SynapticError::Model(format!("reading config for {model}: {e}")))?;
    ModelConfig::from_json(&body)
}
