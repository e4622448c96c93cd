//! Skill embedding index
//!
//! The index embeds every skill of a taxonomy once, at construction, into a
//! dense row-major matrix. Row `i` is the embedding of skill `i`. The index
//! never changes afterwards; a different taxonomy needs a new index.

use crate::error::ExtractorError;
use crate::matcher::{top_k, SkillMatch};
use crate::taxonomy::{Skill, SkillTaxonomy};
use skilltag_embed::{EmbeddingError, EmbeddingModel};
use tracing::info;

/// Dense row-major `f32` matrix, one row per skill
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    data: Vec<f32>,
    rows: usize,
    dimension: usize,
}

impl EmbeddingMatrix {
    /// Pack rows into a matrix, checking that every row has `dimension`
    /// components
    pub fn from_rows(rows: Vec<Vec<f32>>, dimension: usize) -> Result<Self, EmbeddingError> {
        let count = rows.len();
        let mut data = Vec::with_capacity(count * dimension);

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dimension {
                return Err(EmbeddingError::Inference(format!(
                    "row {} has dimension {}, expected {}",
                    i,
                    row.len(),
                    dimension
                )));
            }
            data.extend(row);
        }

        Ok(Self {
            data,
            rows: count,
            dimension,
        })
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Length of each row
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Row `index`, if in range
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.dimension;
        Some(&self.data[start..start + self.dimension])
    }

    /// Iterate rows in order
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        (0..self.rows).map(move |i| {
            let start = i * self.dimension;
            &self.data[start..start + self.dimension]
        })
    }
}

/// A taxonomy, its embedding matrix, and the model that produced it
pub struct EmbeddingIndex<M: EmbeddingModel = Box<dyn EmbeddingModel>> {
    taxonomy: SkillTaxonomy,
    matrix: EmbeddingMatrix,
    model: M,
}

impl<M: EmbeddingModel> EmbeddingIndex<M> {
    /// Embed every skill label of `taxonomy` with `model`
    ///
    /// # Errors
    ///
    /// Returns [`ExtractorError::Embedding`] if the model fails on any label
    /// or returns the wrong number or shape of vectors.
    pub fn build(taxonomy: SkillTaxonomy, model: M) -> Result<Self, ExtractorError> {
        let labels = taxonomy.labels();
        let vectors = model.embed_batch(&labels)?;

        if vectors.len() != labels.len() {
            return Err(EmbeddingError::Inference(format!(
                "model returned {} embeddings for {} skills",
                vectors.len(),
                labels.len()
            ))
            .into());
        }

        let matrix = EmbeddingMatrix::from_rows(vectors, model.dimension())?;
        info!(
            "Embedded {} skills with '{}' ({} dims)",
            matrix.rows(),
            model.model_id(),
            matrix.dimension()
        );

        Ok(Self {
            taxonomy,
            matrix,
            model,
        })
    }

    /// Embed query text (an abstract)
    pub fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.model.embed(text)
    }

    /// Embed `text` and return its `k` best skills with scores
    pub fn rank(&self, text: &str, k: usize) -> Result<Vec<(&Skill, f32)>, ExtractorError> {
        let query = self.embed_query(text)?;
        let matches = top_k(&query, &self.matrix, k)?;
        Ok(self.resolve(&matches))
    }

    /// Map matcher rows back to taxonomy entries
    pub fn resolve(&self, matches: &[SkillMatch]) -> Vec<(&Skill, f32)> {
        matches
            .iter()
            .filter_map(|m| self.taxonomy.get(m.index).map(|skill| (skill, m.score)))
            .collect()
    }

    /// The taxonomy this index was built from
    pub fn taxonomy(&self) -> &SkillTaxonomy {
        &self.taxonomy
    }

    /// The skill embedding matrix
    pub fn matrix(&self) -> &EmbeddingMatrix {
        &self.matrix
    }

    /// Identifier of the embedding model
    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }
}
