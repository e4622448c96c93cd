//! Request and response types for extraction

use skilltag_domain::{CorpusFilter, PaperId};

/// Which part of the corpus to process
#[derive(Debug, Clone, Default)]
pub struct ExtractionRequest {
    /// Author and year-range selection
    pub filter: CorpusFilter,

    /// Process papers that already have results for the current model,
    /// appending a new batch next to the old one
    pub reprocess: bool,
}

impl ExtractionRequest {
    /// Request over the whole corpus with the default skip policy
    pub fn new(filter: CorpusFilter) -> Self {
        Self {
            filter,
            reprocess: false,
        }
    }

    /// Set the re-processing flag
    pub fn with_reprocess(mut self, reprocess: bool) -> Self {
        self.reprocess = reprocess;
        self
    }
}

/// A paper that could not be processed
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFailure {
    /// Paper that failed
    pub paper_id: PaperId,

    /// Reason for failure
    pub message: String,
}

/// Why a paper was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Results already exist for this model
    ExistingResults,
    /// Abstract missing or blank
    EmptyAbstract,
}

/// Per-paper progress notification
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionEvent {
    /// A batch of results was persisted
    Processed {
        /// Paper id
        paper_id: PaperId,
        /// Results written
        results: usize,
    },

    /// The paper was skipped without error
    Skipped {
        /// Paper id
        paper_id: PaperId,
        /// Why
        reason: SkipReason,
    },

    /// Embedding, matching or persistence failed for this paper
    Failed {
        /// Paper id
        paper_id: PaperId,
        /// Error message
        message: String,
    },
}

/// Summary of an extraction run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionReport {
    /// Papers whose result batch was persisted
    pub processed: usize,

    /// Papers skipped because results already existed for the model
    pub skipped_existing: usize,

    /// Papers skipped because the abstract was blank
    pub skipped_empty: usize,

    /// Result rows written
    pub results_created: usize,

    /// Papers that failed
    pub failures: Vec<ItemFailure>,

    /// Embedding model used
    pub model_id: String,

    /// Wall time in milliseconds
    pub processing_time_ms: u64,
}

impl ExtractionReport {
    /// Record one event in the totals
    pub(crate) fn apply(&mut self, event: &ExtractionEvent) {
        match event {
            ExtractionEvent::Processed { results, .. } => {
                self.processed += 1;
                self.results_created += results;
            }
            ExtractionEvent::Skipped {
                reason: SkipReason::ExistingResults,
                ..
            } => self.skipped_existing += 1,
            ExtractionEvent::Skipped {
                reason: SkipReason::EmptyAbstract,
                ..
            } => self.skipped_empty += 1,
            ExtractionEvent::Failed { paper_id, message } => self.failures.push(ItemFailure {
                paper_id: *paper_id,
                message: message.clone(),
            }),
        }
    }

    /// Total papers visited
    pub fn total_seen(&self) -> usize {
        self.processed + self.skipped_existing + self.skipped_empty + self.failures.len()
    }
}
