//! Skilltag Domain Layer
//!
//! Core value types and repository traits for the paper catalog and the
//! skill-extraction pipeline. This crate performs no I/O; storage, embedding
//! models and the command line live in other crates.
//!
//! ## Key Concepts
//!
//! - **Paper**: a catalog entry (title, authors, year, DOI, abstract, metrics)
//! - **CorpusItem**: the slice of a paper the extractor needs (id, abstract,
//!   authors, year)
//! - **CorpusFilter**: conjunctive author / year-range selection
//! - **ExtractedSkill**: one (paper, skill, confidence, model) result record,
//!   append-only
//!
//! ## Architecture
//!
//! - Only `uuid` as an external dependency
//! - Repository traits (`PaperCorpus`, `SkillSink`, `PaperCatalog`) are
//!   implemented by `skilltag-store`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod extraction;
pub mod filter;
pub mod paper;
pub mod traits;

// Re-exports for convenience
pub use extraction::{AttributionPolicy, ExtractedSkill, ExtractionId};
pub use filter::CorpusFilter;
pub use paper::{CorpusItem, Paper, PaperId};
pub use traits::CorpusPager;
