//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use skilltag_domain::AttributionPolicy;
use std::path::PathBuf;

/// Default embedding model identifier
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Embedding model identifier (see `skilltag_embed::resolve_model`)
    pub model: String,

    /// Number of skills recorded per paper
    pub top_k: usize,

    /// Corpus items fetched per page
    pub page_size: usize,

    /// Author attribution policy (`filter-value` or `paper-author`)
    pub attribution: String,

    /// Directory for downloaded model files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

impl ExtractorConfig {
    /// Parsed attribution policy
    pub fn attribution_policy(&self) -> Result<AttributionPolicy, String> {
        AttributionPolicy::parse(&self.attribution)
            .ok_or_else(|| format!("unknown attribution policy '{}'", self.attribution))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.top_k == 0 {
            return Err("top_k must be greater than 0".to_string());
        }
        if self.page_size == 0 {
            return Err("page_size must be greater than 0".to_string());
        }
        self.attribution_policy()?;
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            top_k: 5,
            page_size: 256,
            attribution: AttributionPolicy::default().as_str().to_string(),
            cache_dir: None,
        }
    }
}

impl ExtractorConfig {
    /// Offline preset: hashing embeddings, no model download
    pub fn offline() -> Self {
        Self {
            model: "hashing".to_string(),
            ..Self::default()
        }
    }

    /// Thorough preset: more skills per paper, attributed to real authors
    pub fn thorough() -> Self {
        Self {
            top_k: 10,
            page_size: 64,
            attribution: AttributionPolicy::PaperAuthor.as_str().to_string(),
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
