//! Extraction results - the append-only output of the skill pipeline

use crate::filter::contains_ignore_case;
use crate::paper::{CorpusItem, PaperId};
use std::fmt;

/// Unique identifier for an extraction record, based on UUIDv7
///
/// UUIDv7 sorts by creation time, so ordering by id also orders records from
/// the same paper by the run that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExtractionId(u128);

impl ExtractionId {
    /// Generate a new UUIDv7-based id
    ///
    /// # Examples
    ///
    /// ```
    /// use skilltag_domain::ExtractionId;
    ///
    /// let id = ExtractionId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create an id from a raw u128 value (storage deserialization)
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse an id from its hyphenated string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid extraction id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for ExtractionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExtractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// One skill matched to one paper by one embedding model
///
/// Records are never mutated. Re-processing a paper appends a new batch
/// alongside the old one.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSkill {
    /// Record id
    pub id: ExtractionId,

    /// Paper the skill was extracted from
    pub paper_id: PaperId,

    /// Skill label from the taxonomy
    pub skill_name: String,

    /// Skill concept URI, when the taxonomy provides one
    pub skill_uri: Option<String>,

    /// Cosine similarity between abstract and skill, in [-1, 1]
    pub confidence: f32,

    /// Author the result is attributed to (see [`AttributionPolicy`])
    pub author_name: Option<String>,

    /// Identifier of the embedding model that produced the match
    pub embedding_model: String,

    /// Creation time (seconds since Unix epoch)
    pub created_at: u64,
}

impl fmt::Display for ExtractedSkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.2}) - {} [paper {}]",
            self.skill_name,
            self.confidence,
            self.author_name.as_deref().unwrap_or("Unknown"),
            self.paper_id
        )
    }
}

/// How the `author_name` of a result is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttributionPolicy {
    /// The caller's author filter string, verbatim; `None` without a filter.
    ///
    /// This is the historical behavior: the attributed author is not
    /// necessarily an author of the paper.
    #[default]
    FilterValue,

    /// The first author of the paper whose name contains the filter, or the
    /// first author when no filter is given.
    PaperAuthor,
}

impl AttributionPolicy {
    /// Get the policy name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributionPolicy::FilterValue => "filter-value",
            AttributionPolicy::PaperAuthor => "paper-author",
        }
    }

    /// Parse a policy name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "filter-value" | "filter" => Some(AttributionPolicy::FilterValue),
            "paper-author" | "paper" => Some(AttributionPolicy::PaperAuthor),
            _ => None,
        }
    }

    /// Resolve the attributed author for one item
    pub fn attribute(&self, author_filter: Option<&str>, item: &CorpusItem) -> Option<String> {
        match self {
            AttributionPolicy::FilterValue => author_filter.map(str::to_string),
            AttributionPolicy::PaperAuthor => {
                let needle = author_filter.map(str::trim).filter(|s| !s.is_empty());
                let found = match needle {
                    Some(needle) => item
                        .authors
                        .iter()
                        .find(|name| contains_ignore_case(name, needle)),
                    None => item.authors.first(),
                };
                found
                    .cloned()
                    .or_else(|| author_filter.map(str::to_string))
            }
        }
    }
}

impl fmt::Display for AttributionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
