//! Corpus selection filters

use crate::paper::CorpusItem;

/// Conjunctive selection over the corpus
///
/// Every field is optional; an empty filter selects every item. Items without
/// a publication year never satisfy a year bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusFilter {
    /// Case-insensitive substring matched against each author name
    pub author: Option<String>,

    /// Earliest publication year (inclusive)
    pub start_year: Option<i32>,

    /// Latest publication year (inclusive)
    pub end_year: Option<i32>,
}

impl CorpusFilter {
    /// Filter on an author substring only
    pub fn by_author(author: impl Into<String>) -> Self {
        Self {
            author: Some(author.into()),
            ..Default::default()
        }
    }

    /// Set the inclusive year range
    pub fn with_years(mut self, start: Option<i32>, end: Option<i32>) -> Self {
        self.start_year = start;
        self.end_year = end;
        self
    }

    /// The author filter with surrounding whitespace removed, if non-empty
    pub fn author_needle(&self) -> Option<&str> {
        self.author
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Check whether a year satisfies both bounds
    pub fn year_matches(&self, year: Option<i32>) -> bool {
        if self.start_year.is_none() && self.end_year.is_none() {
            return true;
        }
        let Some(year) = year else {
            return false;
        };
        self.start_year.is_none_or(|start| year >= start)
            && self.end_year.is_none_or(|end| year <= end)
    }

    /// Check whether any author name contains the author filter
    pub fn authors_match<S: AsRef<str>>(&self, authors: &[S]) -> bool {
        match self.author_needle() {
            None => true,
            Some(needle) => authors
                .iter()
                .any(|name| contains_ignore_case(name.as_ref(), needle)),
        }
    }

    /// Check an item against every constraint
    pub fn matches(&self, item: &CorpusItem) -> bool {
        self.year_matches(item.year) && self.authors_match(&item.authors)
    }
}

/// Case-insensitive substring test (Unicode lowercase folding)
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
