//! Core SkillExtractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::index::EmbeddingIndex;
use crate::matcher::{top_k, validate_k};
use crate::types::{ExtractionEvent, ExtractionReport, ExtractionRequest, SkipReason};
use skilltag_domain::traits::{PaperCorpus, SkillSink};
use skilltag_domain::{AttributionPolicy, CorpusItem, CorpusPager, ExtractedSkill, ExtractionId};
use skilltag_embed::EmbeddingModel;
use std::fmt::Display;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Tags corpus papers with their closest skills
///
/// Borrows a prebuilt [`EmbeddingIndex`] so that one index can serve several
/// runs (for example one per author).
pub struct SkillExtractor<'i, M: EmbeddingModel = Box<dyn EmbeddingModel>> {
    index: &'i EmbeddingIndex<M>,
    config: ExtractorConfig,
    policy: AttributionPolicy,
}

impl<'i, M: EmbeddingModel> SkillExtractor<'i, M> {
    /// Create an extractor
    ///
    /// # Errors
    ///
    /// - [`ExtractorError::Match`] if `top_k` is zero or exceeds the taxonomy size
    /// - [`ExtractorError::Config`] if the configuration is otherwise invalid
    pub fn new(index: &'i EmbeddingIndex<M>, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        validate_k(config.top_k, index.taxonomy().len())?;
        config.validate().map_err(ExtractorError::Config)?;
        let policy = config.attribution_policy().map_err(ExtractorError::Config)?;

        Ok(Self {
            index,
            config,
            policy,
        })
    }

    /// Number of papers the request selects (before the skip policy)
    pub fn eligible_count<S>(&self, store: &S, request: &ExtractionRequest) -> Result<usize, ExtractorError>
    where
        S: PaperCorpus,
        S::Error: Display,
    {
        store
            .count(&request.filter)
            .map_err(|e| ExtractorError::Store(e.to_string()))
    }

    /// Process every selected paper
    pub fn run<S>(&self, store: &mut S, request: &ExtractionRequest) -> Result<ExtractionReport, ExtractorError>
    where
        S: PaperCorpus + SkillSink,
        <S as PaperCorpus>::Error: Display,
        <S as SkillSink>::Error: Display,
    {
        self.run_with_progress(store, request, |_| {})
    }

    /// Process every selected paper, reporting each one to `on_event`
    ///
    /// Per-paper failures are recorded in the report and the run continues.
    /// A corpus read failure aborts the run; batches already written stay.
    pub fn run_with_progress<S, F>(
        &self,
        store: &mut S,
        request: &ExtractionRequest,
        mut on_event: F,
    ) -> Result<ExtractionReport, ExtractorError>
    where
        S: PaperCorpus + SkillSink,
        <S as PaperCorpus>::Error: Display,
        <S as SkillSink>::Error: Display,
        F: FnMut(&ExtractionEvent),
    {
        let start = Instant::now();
        let model_id = self.index.model_id();
        let author_filter = request
            .filter
            .author
            .as_deref()
            .filter(|author| !author.trim().is_empty());

        info!(
            "Starting extraction: model '{}', k={}, author={:?}, years={:?}..={:?}, reprocess={}",
            model_id,
            self.config.top_k,
            author_filter,
            request.filter.start_year,
            request.filter.end_year,
            request.reprocess
        );

        let mut report = ExtractionReport {
            model_id: model_id.to_string(),
            ..Default::default()
        };
        let mut pager = CorpusPager::new(request.filter.clone(), self.config.page_size);

        loop {
            let page = match pager.next_page(&*store) {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(e) => return Err(ExtractorError::Store(e.to_string())),
            };
            debug!("Fetched {} papers", page.len());

            for item in &page {
                let event = self.process_item(store, item, request, author_filter);
                if let ExtractionEvent::Failed { paper_id, message } = &event {
                    warn!("Paper {} failed: {}", paper_id, message);
                }
                report.apply(&event);
                on_event(&event);
            }
        }

        report.processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "Extraction complete: {} processed, {} skipped (existing), {} skipped (empty), {} failed, {} results",
            report.processed,
            report.skipped_existing,
            report.skipped_empty,
            report.failures.len(),
            report.results_created
        );

        Ok(report)
    }

    /// Embed, match and persist one paper
    fn process_item<S>(
        &self,
        store: &mut S,
        item: &CorpusItem,
        request: &ExtractionRequest,
        author_filter: Option<&str>,
    ) -> ExtractionEvent
    where
        S: SkillSink,
        S::Error: Display,
    {
        let paper_id = item.id;
        let failed = |message: String| ExtractionEvent::Failed { paper_id, message };

        let Some(text) = item.usable_abstract() else {
            debug!("Paper {} has no abstract", paper_id);
            return ExtractionEvent::Skipped {
                paper_id,
                reason: SkipReason::EmptyAbstract,
            };
        };

        let model_id = self.index.model_id();
        if !request.reprocess {
            match store.has_results(paper_id, model_id) {
                Ok(true) => {
                    debug!("Paper {} already has results for '{}'", paper_id, model_id);
                    return ExtractionEvent::Skipped {
                        paper_id,
                        reason: SkipReason::ExistingResults,
                    };
                }
                Ok(false) => {}
                Err(e) => return failed(format!("Result lookup failed: {}", e)),
            }
        }

        let query = match self.index.embed_query(text) {
            Ok(query) => query,
            Err(e) => return failed(e.to_string()),
        };

        let matches = match top_k(&query, self.index.matrix(), self.config.top_k) {
            Ok(matches) => matches,
            Err(e) => return failed(e.to_string()),
        };

        let created_at = unix_now();
        let author_name = self.policy.attribute(author_filter, item);

        let skills: Vec<ExtractedSkill> = self
            .index
            .resolve(&matches)
            .into_iter()
            .map(|(skill, score)| ExtractedSkill {
                id: ExtractionId::new(),
                paper_id,
                skill_name: skill.label.clone(),
                skill_uri: skill.uri.clone(),
                confidence: score,
                author_name: author_name.clone(),
                embedding_model: model_id.to_string(),
                created_at,
            })
            .collect();

        match store.record_batch(skills) {
            Ok(results) => {
                debug!("Paper {}: {} skills recorded", paper_id, results);
                ExtractionEvent::Processed { paper_id, results }
            }
            Err(e) => failed(format!("Failed to persist results: {}", e)),
        }
    }
}

/// Seconds since the Unix epoch, or 0 if the clock is before it
fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
