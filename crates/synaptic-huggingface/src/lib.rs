mod cross_encoder;
mod embeddings;
mod hub;
mod loader;

pub use cross_encoder::{HuggingFaceCrossEncoder, HuggingFaceCrossEncoderConfig};
pub use embeddings::{HuggingFaceEmbeddings, HuggingFaceEmbeddingsConfig};
pub use hub::{ModelConfig, CROSS_ENCODER_SUFFIX};
pub use loader::{HubModelLoader, HubModelLoaderConfig};

pub(crate) const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";
pub(crate) const DEFAULT_HUB_URL: &str = "https://huggingface.co";
