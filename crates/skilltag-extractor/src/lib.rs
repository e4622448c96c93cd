//! Skilltag Extractor
//!
//! Tags research papers with the skills from a controlled vocabulary whose
//! embeddings are closest to the paper's abstract.
//!
//! # Architecture
//!
//! ```text
//! taxonomy file → SkillTaxonomy → EmbeddingIndex (skill matrix)
//!                                        │
//! PaperCorpus ── pages ──→ SkillExtractor ── embed abstract → top_k → SkillSink
//! ```
//!
//! # Key Features
//!
//! - **Taxonomy loading**: CSV (`preferredLabel` / `skill_name` column) or a
//!   JSON array of records, de-duplicated in file order
//! - **Deterministic ranking**: cosine similarity, ties broken by taxonomy order
//! - **Idempotent runs**: papers with results for the current model are
//!   skipped unless re-processing is requested
//! - **Per-paper isolation**: one failed paper does not stop the run
//!
//! # Example Usage
//!
//! ```no_run
//! use skilltag_domain::CorpusFilter;
//! use skilltag_embed::HashingEmbeddingModel;
//! use skilltag_extractor::{
//!     EmbeddingIndex, ExtractionRequest, ExtractorConfig, SkillExtractor, SkillTaxonomy,
//! };
//! use skilltag_store::SqliteStore;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let taxonomy = SkillTaxonomy::load("skills.csv")?;
//! let index = EmbeddingIndex::build(taxonomy, HashingEmbeddingModel::default())?;
//! let extractor = SkillExtractor::new(&index, ExtractorConfig::offline())?;
//!
//! let mut store = SqliteStore::new("skilltag.db")?;
//! let request = ExtractionRequest::new(CorpusFilter::by_author("alice"));
//! let report = extractor.run(&mut store, &request)?;
//!
//! println!("Processed: {} papers", report.processed);
//! println!("Failures: {}", report.failures.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod index;
mod matcher;
mod taxonomy;
mod types;

#[cfg(test)]
mod tests;

pub use config::{ExtractorConfig, DEFAULT_MODEL};
pub use error::{ExtractorError, MatchError, TaxonomyError};
pub use extractor::SkillExtractor;
pub use index::{EmbeddingIndex, EmbeddingMatrix};
pub use matcher::{top_k, validate_k, SkillMatch};
pub use taxonomy::{Skill, SkillTaxonomy, TaxonomyFormat};
pub use types::{ExtractionEvent, ExtractionReport, ExtractionRequest, ItemFailure, SkipReason};
