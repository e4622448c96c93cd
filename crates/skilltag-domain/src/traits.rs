//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction pipeline and
//! storage. Implementations live in `skilltag-store`; tests use in-memory
//! fakes.

use crate::{CorpusFilter, CorpusItem, ExtractedSkill, ExtractionId, Paper, PaperId};

/// Read access to the papers eligible for skill extraction
///
/// Implemented by the infrastructure layer (skilltag-store)
pub trait PaperCorpus {
    /// Error type for corpus reads
    type Error;

    /// Fetch the next page of eligible items
    ///
    /// Items are ordered by ascending id, start strictly after `after`, and
    /// number at most `limit`. Only items with a non-blank abstract that
    /// satisfy `filter` are returned.
    fn find_page(
        &self,
        filter: &CorpusFilter,
        after: Option<PaperId>,
        limit: usize,
    ) -> Result<Vec<CorpusItem>, Self::Error>;

    /// Count the eligible items matching `filter`
    fn count(&self, filter: &CorpusFilter) -> Result<usize, Self::Error>;
}

/// Append-only sink for extraction results
///
/// Implemented by the infrastructure layer (skilltag-store)
pub trait SkillSink {
    /// Error type for sink operations
    type Error;

    /// Whether any result exists for this paper under this model
    fn has_results(&self, paper: PaperId, model: &str) -> Result<bool, Self::Error>;

    /// Persist one result
    fn record(&mut self, skill: ExtractedSkill) -> Result<ExtractionId, Self::Error>;

    /// Persist the results for one paper
    ///
    /// Stores that support transactions should write the batch atomically.
    fn record_batch(&mut self, skills: Vec<ExtractedSkill>) -> Result<usize, Self::Error> {
        let count = skills.len();
        for skill in skills {
            self.record(skill)?;
        }
        Ok(count)
    }
}

/// CRUD access to the paper catalog
///
/// Implemented by the infrastructure layer (skilltag-store)
pub trait PaperCatalog {
    /// Error type for catalog operations
    type Error;

    /// Insert a new paper, failing if its DOI already exists
    fn insert_paper(&mut self, paper: &Paper) -> Result<PaperId, Self::Error>;

    /// Return the id of the paper with this DOI, inserting it first if absent
    ///
    /// The boolean is `true` when a new row was created.
    fn get_or_create_by_doi(&mut self, paper: &Paper) -> Result<(PaperId, bool), Self::Error>;

    /// Get a paper by id
    fn get_paper(&self, id: PaperId) -> Result<Option<Paper>, Self::Error>;

    /// Replace every field of an existing paper
    fn update_paper(&mut self, paper: &Paper) -> Result<(), Self::Error>;

    /// Delete a paper and its extraction results; `false` if it did not exist
    fn delete_paper(&mut self, id: PaperId) -> Result<bool, Self::Error>;

    /// List papers ordered by title
    fn list_papers(&self, limit: usize, offset: usize) -> Result<Vec<Paper>, Self::Error>;

    /// Papers with an author whose name contains `author` (case-insensitive)
    fn papers_by_author(&self, author: &str) -> Result<Vec<Paper>, Self::Error>;

    /// Extraction results for a paper, optionally restricted to one model,
    /// in insertion order (each batch in rank order, oldest batch first)
    fn skills_for_paper(
        &self,
        id: PaperId,
        model: Option<&str>,
    ) -> Result<Vec<ExtractedSkill>, Self::Error>;
}

/// Keyset cursor over a [`PaperCorpus`]
///
/// Holds only the filter and the last id seen, so the caller is free to
/// mutate the store between pages.
#[derive(Debug, Clone)]
pub struct CorpusPager {
    filter: CorpusFilter,
    after: Option<PaperId>,
    page_size: usize,
    exhausted: bool,
}

impl CorpusPager {
    /// Start paging from the beginning of the corpus
    pub fn new(filter: CorpusFilter, page_size: usize) -> Self {
        Self {
            filter,
            after: None,
            page_size: page_size.max(1),
            exhausted: false,
        }
    }

    /// Fetch the next page, or `None` once the corpus is exhausted
    pub fn next_page<C: PaperCorpus>(
        &mut self,
        corpus: &C,
    ) -> Result<Option<Vec<CorpusItem>>, C::Error> {
        if self.exhausted {
            return Ok(None);
        }

        let page = corpus.find_page(&self.filter, self.after, self.page_size)?;
        if page.len() < self.page_size {
            self.exhausted = true;
        }

        match page.last() {
            Some(last) => {
                self.after = Some(last.id);
                Ok(Some(page))
            }
            None => {
                self.exhausted = true;
                Ok(None)
            }
        }
    }
}
