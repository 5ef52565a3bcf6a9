use std::collections::HashMap;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Unified error type shared by every Synaptic crate.
#[derive(Debug, Error)]
pub enum SynapticError {
    #[error("model error: {0}")]
    Model(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("parsing error: {0}")]
    Parsing(String),
    #[error("embedding error: {0}")]
    Embedding(String),
    #[error("loader error: {0}")]
    Loader(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("length mismatch in {context}: {left} vs {right}")]
    LengthMismatch {
        context: String,
        left: usize,
        right: usize,
    },
    #[error("missing key `{key}` in sample {sample}")]
    MissingKey { key: String, sample: usize },
    #[error("ambiguous key `{key}` in sample {sample}: found in components {components:?}")]
    AmbiguousKey {
        key: String,
        sample: usize,
        components: Vec<String>,
    },
    #[error("unexpected output shape: {0}")]
    Shape(String),
    #[error("dependency unavailable: {0}")]
    DependencyUnavailable(String),
}

impl SynapticError {
    /// Build a `LengthMismatch` error for two sequences that must be parallel.
    pub fn length_mismatch(context: impl Into<String>, left: usize, right: usize) -> Self {
        SynapticError::LengthMismatch {
            context: context.into(),
            left,
            right,
        }
    }
}

// ---------------------------------------------------------------------------
// Sample
// ---------------------------------------------------------------------------

/// A keyed record flowing into or out of a component: one input, output or
/// expected output of an evaluation run.
pub type Sample = HashMap<String, Value>;

// ---------------------------------------------------------------------------
// RunnableConfig
// ---------------------------------------------------------------------------

/// Runtime configuration passed through runnable chains: tags, metadata and run identification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnableConfig {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub run_name: Option<String>,
}

impl RunnableConfig {
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_run_name(mut self, name: impl Into<String>) -> Self {
        self.run_name = Some(name.into());
        self
    }

    pub fn with_run_id(mut self, id: impl Into<String>) -> Self {
        self.run_id = Some(id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

// ---------------------------------------------------------------------------
// Embeddings trait (forward-declared here, implemented in synaptic-embeddings)
// ---------------------------------------------------------------------------

/// Trait for embedding text into vectors.
#[async_trait]
pub trait Embeddings: Send + Sync {
    /// Embed multiple texts (for batch document embedding).
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SynapticError>;

    /// Embed a single query text.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, SynapticError>;
}

// ---------------------------------------------------------------------------
// Similarity models (forward-declared here, implemented in synaptic-huggingface)
// ---------------------------------------------------------------------------

/// A model that scores a pair of texts jointly instead of embedding them apart.
#[async_trait]
pub trait CrossEncoder: Send + Sync {
    /// Score each `(left, right)` pair. Returns one score per pair, in input order.
    async fn score_pairs(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>, SynapticError>;
}

/// A loaded semantic-similarity model.
///
/// Bi-encoders embed both texts independently and are compared by cosine
/// similarity; cross-encoders score the pair directly.
#[derive(Clone)]
pub enum SimilarityModel {
    BiEncoder(Arc<dyn Embeddings>),
    CrossEncoder(Arc<dyn CrossEncoder>),
}

impl SimilarityModel {
    pub fn is_cross_encoder(&self) -> bool {
        matches!(self, SimilarityModel::CrossEncoder(_))
    }
}

impl std::fmt::Debug for SimilarityModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimilarityModel::BiEncoder(_) => f.write_str("SimilarityModel::BiEncoder"),
            SimilarityModel::CrossEncoder(_) => f.write_str("SimilarityModel::CrossEncoder"),
        }
    }
}

/// Authentication used when fetching private models from a model hub.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum HubToken {
    /// Anonymous access.
    #[default]
    None,
    /// Use the token configured on this machine: `HF_TOKEN`, then
    /// `HUGGING_FACE_HUB_TOKEN`, then the file written by `huggingface-cli login`.
    Stored,
    /// Use the given token.
    Explicit(String),
}

impl HubToken {
    /// Resolve to a bearer token, if any.
    pub fn resolve(&self) -> Option<String> {
        match self {
            HubToken::None => None,
            HubToken::Stored => ["HF_TOKEN", "HUGGING_FACE_HUB_TOKEN"]
                .iter()
                .filter_map(|name| std::env::var(name).ok())
                .map(|token| token.trim().to_string())
                .find(|token| !token.is_empty())
                .or_else(read_token_file),
            HubToken::Explicit(token) => Some(token.clone()),
        }
    }
}

/// Location of the saved hub token: `HF_TOKEN_PATH`, else `token` under
/// `HF_HOME` (default `$XDG_CACHE_HOME/huggingface` or `~/.cache/huggingface`).
pub fn hub_token_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("HF_TOKEN_PATH") {
        return Some(PathBuf::from(path));
    }
    let hf_home = match std::env::var_os("HF_HOME") {
        Some(home) => PathBuf::from(home),
        None => std::env::var_os("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".cache")))?
            .join("huggingface"),
    };
    Some(hf_home.join("token"))
}

fn read_token_file() -> Option<String> {
    let token = std::fs::read_to_string(hub_token_path()?).ok()?;
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

impl From<&str> for HubToken {
    fn from(token: &str) -> Self {
        HubToken::Explicit(token.to_string())
    }
}

/// Everything a loader needs to locate and instantiate a similarity model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRequest {
    pub model: String,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub token: HubToken,
}

impl ModelRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            device: None,
            token: HubToken::None,
        }
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn with_token(mut self, token: HubToken) -> Self {
        self.token = token;
        self
    }
}

/// Resolves a `ModelRequest` into a ready-to-use `SimilarityModel`.
#[async_trait]
pub trait SimilarityModelLoader: Send + Sync {
    async fn load(&self, request: &ModelRequest) -> Result<SimilarityModel, SynapticError>;
}

/// An already loaded model ignores the request and hands out itself.
#[async_trait]
impl SimilarityModelLoader for SimilarityModel {
    async fn load(&self, _request: &ModelRequest) -> Result<SimilarityModel, SynapticError> {
        Ok(self.clone())
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A document with content and metadata, used throughout the retrieval pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(
        id: impl Into<String>,
        content: impl Into<String>,
        metadata: HashMap<String, Value>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata,
        }
    }
}

// ---------------------------------------------------------------------------
// Loader trait (forward-declared here, implementations in synaptic-docx)
// ---------------------------------------------------------------------------

/// Trait for loading documents from various sources.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Load all documents from this source.
    async fn load(&self) -> Result<Vec<Document>, SynapticError>;

    /// Stream documents lazily. Default implementation wraps load().
    fn lazy_load(
        &self,
    ) -> Pin<Box<dyn Stream<Item = Result<Document, SynapticError>> + Send + '_>> {
        Box::pin(async_stream::stream! {
            match self.load().await {
                Ok(docs) => {
                    for doc in docs {
                        yield Ok(doc);
                    }
                }
                Err(e) => yield Err(e),
            }
        })
    }
}
