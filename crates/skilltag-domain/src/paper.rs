//! Paper module - catalog entries and the corpus view used by extraction

use std::fmt;

/// Identifier of a paper in the catalog (the store's row id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PaperId(i64);

impl PaperId {
    /// Wrap a raw row id
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw row id
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PaperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PaperId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| format!("Invalid paper id '{}': {}", s, e))
    }
}

/// A research paper in the catalog
///
/// `id` is `None` until the paper has been persisted. The DOI is the natural
/// key: the store never holds two papers with the same DOI.
#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
    /// Row id, assigned by the store
    pub id: Option<PaperId>,

    /// Paper title
    pub title: String,

    /// Author names in publication order
    pub authors: Vec<String>,

    /// Publication year, when known
    pub year: Option<i32>,

    /// Digital Object Identifier (unique)
    pub doi: String,

    /// Journal or conference name
    pub venue: Option<String>,

    /// Abstract text
    pub abstract_text: Option<String>,

    /// Fields of study, as reported by the source
    pub fields_of_study: Vec<String>,

    /// Number of citations at import time
    pub citation_count: i64,

    /// Landing page URL
    pub url: Option<String>,
}

impl Paper {
    /// Create an unsaved paper with only the required fields set
    pub fn new(title: impl Into<String>, doi: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            authors: Vec::new(),
            year: None,
            doi: doi.into(),
            venue: None,
            abstract_text: None,
            fields_of_study: Vec::new(),
            citation_count: 0,
            url: None,
        }
    }

    /// Authors joined for display ("A, B, C")
    pub fn authors_display(&self) -> String {
        self.authors.join(", ")
    }

    /// Whether the abstract contains anything besides whitespace
    pub fn has_abstract(&self) -> bool {
        self.abstract_text
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty())
    }

    /// The extraction view of this paper, if it has been persisted
    pub fn corpus_item(&self) -> Option<CorpusItem> {
        self.id.map(|id| CorpusItem {
            id,
            abstract_text: self.abstract_text.clone(),
            authors: self.authors.clone(),
            year: self.year,
        })
    }
}

impl fmt::Display for Paper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.id, self.year) {
            (Some(id), Some(year)) => write!(f, "({}) {} ({})", id, self.title, year),
            (Some(id), None) => write!(f, "({}) {}", id, self.title),
            (None, Some(year)) => write!(f, "{} ({})", self.title, year),
            (None, None) => write!(f, "{}", self.title),
        }
    }
}

/// The part of a paper the extraction pipeline reads
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusItem {
    /// Paper id
    pub id: PaperId,

    /// Abstract text (may be missing or blank)
    pub abstract_text: Option<String>,

    /// Author names
    pub authors: Vec<String>,

    /// Publication year
    pub year: Option<i32>,
}

impl CorpusItem {
    /// The abstract, if it is non-blank
    pub fn usable_abstract(&self) -> Option<&str> {
        self.abstract_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}
