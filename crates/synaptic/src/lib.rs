//! Synaptic: evaluation harness and document conversion for pipelines.
//!
//! This crate re-exports the Synaptic sub-crates for convenient single-import usage.
//! Enable features to control which modules are available.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `default` | `runnables`, `eval`, `docx` |
//! | `runnables` | `Runnable`, `RunnableLambda`, named-component `Pipeline` |
//! | `eval` | `eval`, `EvaluationResult`, EM / F1 / SAS metrics |
//! | `docx` | `DocxToDocument` converter and `DocxLoader` |
//! | `embeddings` | `FakeEmbeddings` for tests and demos |
//! | `huggingface` | HuggingFace embeddings, cross-encoders and the hub model loader used by SAS |
//! | `full` | All features enabled |
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use synaptic::eval::{eval, Component, Metric, MetricOptions};
//! use synaptic::runnables::RunnableLambda;
//!
//! let result = eval(&Component::new(reader), inputs, expected).await?;
//! let f1 = result.calculate_metrics(&Metric::F1, &MetricOptions::new("answers")).await?;
//! ```

/// Core traits and types: SynapticError, Document, Embeddings, CrossEncoder,
/// SimilarityModelLoader, RunnableConfig, etc. Always available.
pub use synaptic_core as core;

/// Composition: Runnable trait, BoxRunnable, Lambda and named-component Pipeline.
#[cfg(feature = "runnables")]
pub use synaptic_runnables as runnables;

/// Deterministic FakeEmbeddings.
#[cfg(feature = "embeddings")]
pub use synaptic_embeddings as embeddings;

/// HuggingFace Inference API embeddings and cross-encoders, plus the hub model loader.
#[cfg(feature = "huggingface")]
pub use synaptic_huggingface as huggingface;

/// Evaluation harness: answer extraction, text normalization, EM, F1 and SAS.
#[cfg(feature = "eval")]
pub use synaptic_eval as eval;

/// DOCX to Document conversion.
#[cfg(feature = "docx")]
pub use synaptic_docx as docx;
