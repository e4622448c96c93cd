//! Feature-hashed bag-of-words embeddings
//!
//! Each lowercase alphanumeric token is hashed to one bucket of the output
//! vector with a hashed sign, and the result is L2-normalized. Texts sharing
//! words therefore point in similar directions, which is enough to rank a
//! skill vocabulary against an abstract without any model files.
//!
//! # Examples
//!
//! ```rust
//! use skilltag_embed::{cosine_similarity, EmbeddingModel, HashingEmbeddingModel};
//!
//! let model = HashingEmbeddingModel::new(256);
//! let python = model.embed("Python").unwrap();
//! let abstract_text = model.embed("We use Python for data analysis").unwrap();
//! let cooking = model.embed("Cooking").unwrap();
//!
//! assert!(cosine_similarity(&python, &abstract_text) > cosine_similarity(&cooking, &abstract_text));
//! ```

use crate::{EmbeddingError, EmbeddingModel};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Dimension used by the bare `hashing` identifier
pub const DEFAULT_DIMENSION: usize = 384;

const IDENTIFIER: &str = "hashing";

/// Deterministic embedding model based on the hashing trick
#[derive(Debug, Clone)]
pub struct HashingEmbeddingModel {
    dimension: usize,
    model_id: String,
}

impl HashingEmbeddingModel {
    /// Create a model producing vectors of `dimension` components
    ///
    /// A dimension of zero is raised to one.
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            model_id: format!("{}-{}", IDENTIFIER, dimension),
        }
    }

    /// Parse `hashing` or `hashing-<dim>`
    ///
    /// Returns `Ok(None)` when the identifier names some other model.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::ModelLoad`] for `hashing-<dim>` with a
    /// dimension that is not a positive integer.
    pub fn from_identifier(identifier: &str) -> Result<Option<Self>, EmbeddingError> {
        let identifier = identifier.trim();
        let lower = identifier.to_ascii_lowercase();

        if lower == IDENTIFIER {
            return Ok(Some(Self::new(DEFAULT_DIMENSION)));
        }

        let Some(suffix) = lower.strip_prefix("hashing-") else {
            return Ok(None);
        };

        match suffix.parse::<usize>() {
            Ok(dimension) if dimension > 0 => Ok(Some(Self::new(dimension))),
            _ => Err(EmbeddingError::ModelLoad {
                model: identifier.to_string(),
                reason: format!("invalid hashing dimension '{}'", suffix),
            }),
        }
    }

    fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
            .map(str::to_lowercase)
    }

    fn bucket(&self, token: &str) -> (usize, f32) {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        let hash = hasher.finish();

        let index = (hash % self.dimension as u64) as usize;
        let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }
}

impl Default for HashingEmbeddingModel {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl EmbeddingModel for HashingEmbeddingModel {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let mut vector = vec![0.0f32; self.dimension];
        for token in Self::tokens(text) {
            let (index, sign) = self.bucket(&token);
            vector[index] += sign;
        }

        // Punctuation-only text has no tokens and stays a zero vector
        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cosine_similarity;

    #[test]
    fn test_deterministic() {
        let model = HashingEmbeddingModel::new(128);
        let a = model.embed("Rust systems programming").unwrap();
        let b = model.embed("Rust systems programming").unwrap();
        assert_eq!(a, b);

        // A fresh instance hashes identically
        let other = HashingEmbeddingModel::new(128);
        assert_eq!(a, other.embed("Rust systems programming").unwrap());
    }

    #[test]
    fn test_dimension_and_normalization() {
        let model = HashingEmbeddingModel::new(64);
        let embedding = model.embed("graph neural networks for molecules").unwrap();
        assert_eq!(embedding.len(), 64);

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let model = HashingEmbeddingModel::new(64);
        assert_eq!(model.embed("Python!").unwrap(), model.embed("python").unwrap());
    }

    #[test]
    fn test_empty_input() {
        let model = HashingEmbeddingModel::default();
        assert!(matches!(model.embed(""), Err(EmbeddingError::EmptyInput)));
        assert!(matches!(model.embed("  \t\n"), Err(EmbeddingError::EmptyInput)));
    }

    #[test]
    fn test_punctuation_only_is_zero_vector() {
        let model = HashingEmbeddingModel::new(16);
        let embedding = model.embed("?!").unwrap();
        assert!(embedding.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_shared_tokens_rank_higher() {
        let model = HashingEmbeddingModel::new(DEFAULT_DIMENSION);
        let query = model.embed("We use Python and Rust for data analysis").unwrap();
        let python = model.embed("Python").unwrap();
        let cooking = model.embed("Cooking").unwrap();

        assert!(cosine_similarity(&query, &python) > 0.0);
        assert!(cosine_similarity(&query, &python) > cosine_similarity(&query, &cooking));
    }

    #[test]
    fn test_from_identifier() {
        let model = HashingEmbeddingModel::from_identifier("hashing").unwrap().unwrap();
        assert_eq!(model.dimension(), DEFAULT_DIMENSION);
        assert_eq!(model.model_id(), "hashing-384");

        let model = HashingEmbeddingModel::from_identifier("Hashing-32").unwrap().unwrap();
        assert_eq!(model.dimension(), 32);

        assert!(HashingEmbeddingModel::from_identifier("all-MiniLM-L6-v2").unwrap().is_none());
        assert!(HashingEmbeddingModel::from_identifier("hashing-0").is_err());
        assert!(HashingEmbeddingModel::from_identifier("hashing-abc").is_err());
    }
}
