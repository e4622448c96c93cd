//! Local sentence-transformer models via fastembed
//!
//! Model files are downloaded on first use into the cache directory and run
//! on ONNX Runtime. Nothing here touches the network after the first load.

use crate::{canonical_model_name, EmbeddingError, EmbeddingModel, KNOWN_MODELS};
use fastembed::{InitOptions, TextEmbedding};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

/// Sentence-transformer embedding model backed by fastembed
pub struct FastEmbedModel {
    // fastembed needs `&mut` to embed; the trait takes `&self`
    model: Mutex<TextEmbedding>,
    model_id: String,
    dimension: usize,
}

impl FastEmbedModel {
    /// Load a model by its sentence-transformers name, e.g. `all-MiniLM-L6-v2`
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::ModelLoad`] if the name is not supported or
    /// the model files cannot be fetched or initialized.
    pub fn new(identifier: &str, cache_dir: Option<PathBuf>) -> Result<Self, EmbeddingError> {
        let name = canonical_model_name(identifier);
        let (kind, dimension) = Self::lookup(name).ok_or_else(|| EmbeddingError::ModelLoad {
            model: identifier.to_string(),
            reason: "not supported by fastembed".to_string(),
        })?;

        let mut options = InitOptions::new(kind).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }

        info!("Loading sentence-transformer '{}'", name);
        let model = TextEmbedding::try_new(options).map_err(|e| EmbeddingError::ModelLoad {
            model: identifier.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            model: Mutex::new(model),
            model_id: name.to_string(),
            dimension,
        })
    }

    fn lookup(name: &str) -> Option<(fastembed::EmbeddingModel, usize)> {
        use fastembed::EmbeddingModel as Kind;

        let kind = match name.to_ascii_lowercase().as_str() {
            "all-minilm-l6-v2" => Kind::AllMiniLML6V2,
            "all-minilm-l12-v2" => Kind::AllMiniLML12V2,
            "bge-small-en-v1.5" => Kind::BGESmallENV15,
            "bge-base-en-v1.5" => Kind::BGEBaseENV15,
            "bge-large-en-v1.5" => Kind::BGELargeENV15,
            "paraphrase-multilingual-minilm-l12-v2" => Kind::ParaphraseMLMiniLML12V2,
            "paraphrase-multilingual-mpnet-base-v2" => Kind::ParaphraseMLMpnetBaseV2,
            "nomic-embed-text-v1.5" => Kind::NomicEmbedTextV15,
            _ => return None,
        };

        let dimension = KNOWN_MODELS
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(_, dim)| *dim)?;

        Some((kind, dimension))
    }

    fn run(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut model = self
            .model
            .lock()
            .map_err(|_| EmbeddingError::Inference("model lock poisoned".to_string()))?;

        model
            .embed(texts, None)
            .map_err(|e| EmbeddingError::Inference(e.to_string()))
    }
}

impl EmbeddingModel for FastEmbedModel {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        self.run(vec![text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Inference("no embedding generated".to_string()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.iter().any(|text| text.trim().is_empty()) {
            return Err(EmbeddingError::EmptyInput);
        }

        self.run(texts.iter().map(|text| text.to_string()).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// TextEmbedding does not implement Debug
impl std::fmt::Debug for FastEmbedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedModel")
            .field("model_id", &self.model_id)
            .field("dimension", &self.dimension)
            .finish()
    }
}
