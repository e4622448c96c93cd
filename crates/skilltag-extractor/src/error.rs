//! Error types for the Extractor

use skilltag_embed::EmbeddingError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a skill taxonomy
#[derive(Error, Debug)]
pub enum TaxonomyError {
    /// File missing or unreadable
    #[error("Cannot read taxonomy file '{path}': {source}")]
    Io {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// File extension is neither `.csv` nor `.json`
    #[error("Unsupported taxonomy format: {0} (expected .csv or .json)")]
    UnsupportedFormat(String),

    /// No `preferredLabel` or `skill_name` column in the CSV header
    #[error("No label column found (expected 'preferredLabel' or 'skill_name')")]
    MissingLabelColumn,

    /// JSON document is not an array of records
    #[error("Invalid taxonomy structure: {0}")]
    InvalidStructure(String),

    /// The file yielded no usable skill labels
    #[error("Taxonomy contains no skills")]
    EmptyTaxonomy,
}

/// Errors from the top-K matcher
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// K outside `1..=available`
    #[error("Invalid K: {k} (taxonomy has {available} skills)")]
    InvalidK {
        /// Requested number of matches
        k: usize,
        /// Number of skills in the matrix
        available: usize,
    },

    /// Query and matrix rows differ in length
    #[error("Dimension mismatch: query has {query}, matrix has {matrix}")]
    DimensionMismatch {
        /// Query vector length
        query: usize,
        /// Matrix row length
        matrix: usize,
    },
}

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Taxonomy could not be loaded
    #[error("Taxonomy error: {0}")]
    Taxonomy(#[from] TaxonomyError),

    /// Embedding model error
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Matcher error
    #[error("Match error: {0}")]
    Match(#[from] MatchError),

    /// Corpus or sink error
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
