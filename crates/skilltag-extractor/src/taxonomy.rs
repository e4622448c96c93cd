//! Skill taxonomy loading
//!
//! A taxonomy is an ordered list of unique skill labels read from a CSV
//! export (ESCO style, `preferredLabel` column) or a JSON array of records.
//! Row order is preserved after de-duplication so the embedding matrix can
//! be indexed by position.

use crate::error::TaxonomyError;
use serde_json::Value;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const LABEL_COLUMNS: [&str; 2] = ["preferredlabel", "skill_name"];
const URI_COLUMNS: [&str; 2] = ["concepturi", "skill_uri"];

/// One entry of the skill vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    /// Human-readable label, trimmed and non-empty
    pub label: String,

    /// Concept URI, when the source provides one
    pub uri: Option<String>,
}

impl Skill {
    /// Create a skill without a URI
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            uri: None,
        }
    }
}

/// Taxonomy file format, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyFormat {
    /// Comma-separated with a header row
    Csv,
    /// Top-level array of objects
    Json,
}

impl TaxonomyFormat {
    /// Resolve the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self, TaxonomyError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(TaxonomyFormat::Csv),
            Some("json") => Ok(TaxonomyFormat::Json),
            _ => Err(TaxonomyError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Ordered, de-duplicated skill vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillTaxonomy {
    skills: Vec<Skill>,
}

impl SkillTaxonomy {
    /// Build a taxonomy from candidate skills
    ///
    /// Labels are trimmed, empty labels dropped, and duplicates removed
    /// keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`TaxonomyError::EmptyTaxonomy`] if no label survives.
    pub fn from_skills(candidates: impl IntoIterator<Item = Skill>) -> Result<Self, TaxonomyError> {
        let mut seen = HashSet::new();
        let mut skills = Vec::new();

        for candidate in candidates {
            let label = candidate.label.trim();
            if label.is_empty() || !seen.insert(label.to_string()) {
                continue;
            }
            let uri = candidate
                .uri
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty());
            skills.push(Skill {
                label: label.to_string(),
                uri,
            });
        }

        if skills.is_empty() {
            return Err(TaxonomyError::EmptyTaxonomy);
        }
        Ok(Self { skills })
    }

    /// Build a taxonomy from bare labels
    pub fn from_labels<I, S>(labels: I) -> Result<Self, TaxonomyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_skills(labels.into_iter().map(Skill::new))
    }

    /// Load a taxonomy file, choosing the parser by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TaxonomyError> {
        let path = path.as_ref();
        let format = TaxonomyFormat::from_path(path)?;

        let file = File::open(path).map_err(|source| TaxonomyError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let taxonomy = match format {
            TaxonomyFormat::Csv => Self::from_csv_reader(file)?,
            TaxonomyFormat::Json => Self::from_json_reader(file, path)?,
        };

        info!("Loaded {} skills from {}", taxonomy.len(), path.display());
        Ok(taxonomy)
    }

    /// Parse CSV with a header row
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, TaxonomyError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let find_column = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
        };

        let label_idx = find_column(&LABEL_COLUMNS).ok_or(TaxonomyError::MissingLabelColumn)?;
        let uri_idx = find_column(&URI_COLUMNS);
        debug!("CSV label column {}, uri column {:?}", label_idx, uri_idx);

        let mut candidates = Vec::new();
        for record in reader.records() {
            let record = record?;
            let Some(label) = record.get(label_idx) else {
                continue;
            };
            candidates.push(Skill {
                label: label.to_string(),
                uri: uri_idx.and_then(|i| record.get(i)).map(str::to_string),
            });
        }

        Self::from_skills(candidates)
    }

    /// Parse a JSON array of records
    ///
    /// Each object contributes `preferredLabel`, falling back to
    /// `skill_name`. Other elements are ignored.
    pub fn from_json_reader<R: Read>(reader: R, path: &Path) -> Result<Self, TaxonomyError> {
        let value: Value = serde_json::from_reader(reader)?;
        let Value::Array(records) = value else {
            return Err(TaxonomyError::InvalidStructure(format!(
                "{}: expected a top-level array",
                path.display()
            )));
        };

        let candidates = records.iter().filter_map(|record| {
            let object = record.as_object()?;
            let label = ["preferredLabel", "skill_name"]
                .iter()
                .filter_map(|key| object.get(*key).and_then(Value::as_str))
                .find(|label| !label.trim().is_empty())?;
            let uri = ["conceptUri", "skill_uri"]
                .iter()
                .find_map(|key| object.get(*key).and_then(Value::as_str));
            Some(Skill {
                label: label.to_string(),
                uri: uri.map(str::to_string),
            })
        });

        Self::from_skills(candidates)
    }

    /// Number of skills
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Always false for a loaded taxonomy
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Skill at a matrix row
    pub fn get(&self, index: usize) -> Option<&Skill> {
        self.skills.get(index)
    }

    /// Labels in order
    pub fn labels(&self) -> Vec<&str> {
        self.skills.iter().map(|s| s.label.as_str()).collect()
    }
}
