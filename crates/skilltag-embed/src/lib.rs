//! Skilltag Embedding Models
//!
//! Text-to-vector models behind a common [`EmbeddingModel`] trait.
//!
//! # Models
//!
//! - `HashingEmbeddingModel`: deterministic feature-hashed bag of words, no
//!   model files needed. Identifier `hashing` or `hashing-<dim>`.
//! - `FastEmbedModel` (feature `fastembed`): local ONNX sentence transformers
//!   such as `all-MiniLM-L6-v2`.
//!
//! Use [`resolve_model`] to turn a model identifier into a boxed model.
//!
//! # Examples
//!
//! ```
//! use skilltag_embed::{resolve_model, EmbeddingModel, ModelOptions};
//!
//! let model = resolve_model("hashing-64", &ModelOptions::default()).unwrap();
//! let vector = model.embed("graph neural networks").unwrap();
//! assert_eq!(vector.len(), 64);
//! assert_eq!(model.model_id(), "hashing-64");
//! ```

#![warn(missing_docs)]

pub mod hashing;

#[cfg(feature = "fastembed")]
pub mod sentence;

use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

pub use hashing::HashingEmbeddingModel;

#[cfg(feature = "fastembed")]
pub use sentence::FastEmbedModel;

/// Errors that can occur while loading a model or embedding text
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// The model identifier could not be resolved or the model failed to load
    #[error("Failed to load embedding model '{model}': {reason}")]
    ModelLoad {
        /// Requested model identifier
        model: String,
        /// Why loading failed
        reason: String,
    },

    /// Empty or whitespace-only input text
    #[error("Empty text cannot be embedded")]
    EmptyInput,

    /// Model inference error
    #[error("Model inference failed: {0}")]
    Inference(String),
}

/// Trait for text embedding models
///
/// Implementations must be deterministic: the same text always yields the
/// same vector for the lifetime of the model.
pub trait EmbeddingModel {
    /// Generate an embedding vector for the given text
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::EmptyInput`] for empty or whitespace-only text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Generate embeddings for several texts, in input order
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Dimension of the produced vectors
    fn dimension(&self) -> usize;

    /// Identifier recorded alongside every extraction result
    fn model_id(&self) -> &str;
}

impl<M: EmbeddingModel + ?Sized> EmbeddingModel for Box<M> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed_batch(texts)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

/// Options used when constructing a model
#[derive(Debug, Clone, Default)]
pub struct ModelOptions {
    /// Directory for downloaded model files
    pub cache_dir: Option<PathBuf>,
}

/// Sentence-transformer models known to the `fastembed` backend, with their
/// output dimension
pub const KNOWN_MODELS: &[(&str, usize)] = &[
    ("all-MiniLM-L6-v2", 384),
    ("all-MiniLM-L12-v2", 384),
    ("bge-small-en-v1.5", 384),
    ("bge-base-en-v1.5", 768),
    ("bge-large-en-v1.5", 1024),
    ("paraphrase-multilingual-MiniLM-L12-v2", 384),
    ("paraphrase-multilingual-mpnet-base-v2", 768),
    ("nomic-embed-text-v1.5", 768),
];

/// Strip a hub organisation prefix such as `sentence-transformers/`
pub fn canonical_model_name(identifier: &str) -> &str {
    let trimmed = identifier.trim();
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// The id results are recorded under for a model identifier, without loading
/// the model
///
/// `hashing` becomes `hashing-384`; hub prefixes are stripped. Unknown or
/// malformed identifiers are returned canonicalized.
///
/// ```
/// use skilltag_embed::recorded_model_id;
///
/// assert_eq!(recorded_model_id("hashing"), "hashing-384");
/// assert_eq!(recorded_model_id("sentence-transformers/all-MiniLM-L6-v2"), "all-MiniLM-L6-v2");
/// ```
pub fn recorded_model_id(identifier: &str) -> String {
    match HashingEmbeddingModel::from_identifier(identifier) {
        Ok(Some(model)) => model.model_id().to_string(),
        _ => canonical_model_name(identifier).to_string(),
    }
}

/// Resolve a model identifier into a ready-to-use model
///
/// # Errors
///
/// Returns [`EmbeddingError::ModelLoad`] if the identifier is unknown, names a
/// sentence-transformer while the `fastembed` feature is disabled, or the
/// model files cannot be loaded.
pub fn resolve_model(
    identifier: &str,
    options: &ModelOptions,
) -> Result<Box<dyn EmbeddingModel>, EmbeddingError> {
    if let Some(model) = HashingEmbeddingModel::from_identifier(identifier)? {
        debug!("Resolved '{}' to hashing model ({} dims)", identifier, model.dimension());
        return Ok(Box::new(model));
    }

    let name = canonical_model_name(identifier);
    if !KNOWN_MODELS.iter().any(|(known, _)| known.eq_ignore_ascii_case(name)) {
        return Err(EmbeddingError::ModelLoad {
            model: identifier.to_string(),
            reason: "unknown model identifier".to_string(),
        });
    }

    load_sentence_model(identifier, options)
}

#[cfg(feature = "fastembed")]
fn load_sentence_model(
    identifier: &str,
    options: &ModelOptions,
) -> Result<Box<dyn EmbeddingModel>, EmbeddingError> {
    let model = FastEmbedModel::new(identifier, options.cache_dir.clone())?;
    Ok(Box::new(model))
}

#[cfg(not(feature = "fastembed"))]
fn load_sentence_model(
    identifier: &str,
    _options: &ModelOptions,
) -> Result<Box<dyn EmbeddingModel>, EmbeddingError> {
    Err(EmbeddingError::ModelLoad {
        model: identifier.to_string(),
        reason: "sentence-transformer models require the `fastembed` feature".to_string(),
    })
}

/// Calculate cosine similarity between two embedding vectors
///
/// # Returns
///
/// Cosine similarity clamped to [-1, 1]; 0.0 when either vector has zero
/// magnitude.
///
/// # Panics
///
/// Panics if vectors have different lengths
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "Vectors must have same length");

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    (dot_product / (magnitude_a * magnitude_b)).clamp(-1.0, 1.0)
}
