//! Skilltag Storage Layer
//!
//! Implements the `PaperCorpus`, `SkillSink` and `PaperCatalog` traits on
//! SQLite.
//!
//! # Architecture
//!
//! - `papers` holds the catalog; the DOI is unique
//! - `extracted_skills` is append-only and cascades on paper deletion
//! - Author and field lists are JSON arrays; the `author_matches` and
//!   `has_text` SQL functions apply the same matching rules as
//!   [`CorpusFilter`] so filtering and paging happen inside the query
//!
//! # Examples
//!
//! ```no_run
//! use skilltag_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for catalog and extraction operations
//! ```

#![warn(missing_docs)]

use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OptionalExtension, Row};
use skilltag_domain::filter::contains_ignore_case;
use skilltag_domain::traits::{PaperCatalog, PaperCorpus, SkillSink};
use skilltag_domain::{CorpusFilter, CorpusItem, ExtractedSkill, ExtractionId, Paper, PaperId};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Paper not found
    #[error("Paper not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A paper with this DOI already exists
    #[error("Duplicate DOI: {0}")]
    Duplicate(String),
}

const PAPER_COLUMNS: &str =
    "id, title, authors, year, doi, venue, abstract, fields_of_study, citation_count, url";

const SKILL_COLUMNS: &str =
    "id, paper_id, skill_name, skill_uri, confidence, author_name, embedding_model, created_at";

/// SQLite-based implementation of the catalog and extraction traits
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use skilltag_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("skilltag.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.register_functions()?;
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Register the SQL functions used by corpus queries
    fn register_functions(&self) -> Result<(), StoreError> {
        let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

        // author_matches(authors_json, needle)
        self.conn.create_scalar_function("author_matches", 2, flags, |ctx| {
            let authors: Option<String> = ctx.get(0)?;
            let needle: String = ctx.get(1)?;
            let authors: Vec<String> = match authors {
                Some(json) => serde_json::from_str(&json)
                    .map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))?,
                None => Vec::new(),
            };
            Ok(authors.iter().any(|name| contains_ignore_case(name, &needle)))
        })?;

        // has_text(value): non-NULL and not only whitespace
        self.conn.create_scalar_function("has_text", 1, flags, |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.is_some_and(|t| !t.trim().is_empty()))
        })?;

        Ok(())
    }

    /// Convert ExtractionId to bytes for storage
    fn extraction_id_to_bytes(id: ExtractionId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    /// Convert bytes to ExtractionId
    fn bytes_to_extraction_id(bytes: &[u8]) -> Result<ExtractionId, StoreError> {
        if bytes.len() != 16 {
            return Err(StoreError::InvalidData(format!(
                "Expected 16 bytes for ExtractionId, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(ExtractionId::from_value(u128::from_be_bytes(arr)))
    }

    fn encode_list(values: &[String]) -> Result<String, StoreError> {
        serde_json::to_string(values).map_err(|e| StoreError::InvalidData(e.to_string()))
    }

    fn decode_list(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
        let json: String = row.get(idx)?;
        serde_json::from_str(&json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    }

    fn row_to_paper(row: &Row<'_>) -> rusqlite::Result<Paper> {
        Ok(Paper {
            id: Some(PaperId::new(row.get(0)?)),
            title: row.get(1)?,
            authors: Self::decode_list(row, 2)?,
            year: row.get(3)?,
            doi: row.get(4)?,
            venue: row.get(5)?,
            abstract_text: row.get(6)?,
            fields_of_study: Self::decode_list(row, 7)?,
            citation_count: row.get(8)?,
            url: row.get(9)?,
        })
    }

    fn row_to_skill(row: &Row<'_>) -> rusqlite::Result<ExtractedSkill> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let id = Self::bytes_to_extraction_id(&id_bytes).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Blob, Box::new(e))
        })?;

        Ok(ExtractedSkill {
            id,
            paper_id: PaperId::new(row.get(1)?),
            skill_name: row.get(2)?,
            skill_uri: row.get(3)?,
            confidence: row.get::<_, f64>(4)? as f32,
            author_name: row.get(5)?,
            embedding_model: row.get(6)?,
            created_at: row.get::<_, i64>(7)? as u64,
        })
    }

    /// Append the WHERE clauses selecting eligible corpus items
    fn push_corpus_conditions(
        filter: &CorpusFilter,
        sql: &mut String,
        params: &mut Vec<Box<dyn rusqlite::ToSql>>,
    ) {
        sql.push_str(" WHERE has_text(abstract)");

        if let Some(start) = filter.start_year {
            sql.push_str(" AND year >= ?");
            params.push(Box::new(start));
        }

        if let Some(end) = filter.end_year {
            sql.push_str(" AND year <= ?");
            params.push(Box::new(end));
        }

        if let Some(needle) = filter.author_needle() {
            sql.push_str(" AND author_matches(authors, ?)");
            params.push(Box::new(needle.to_string()));
        }
    }

    fn paper_id_for_doi(&self, doi: &str) -> Result<Option<PaperId>, StoreError> {
        let id = self
            .conn
            .query_row("SELECT id FROM papers WHERE doi = ?1", params![doi], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?;
        Ok(id.map(PaperId::new))
    }

    fn insert_row(&mut self, paper: &Paper) -> Result<PaperId, StoreError> {
        self.conn.execute(
            "INSERT INTO papers (title, authors, year, doi, venue, abstract, fields_of_study, citation_count, url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                &paper.title,
                Self::encode_list(&paper.authors)?,
                paper.year,
                paper.doi.trim(),
                &paper.venue,
                &paper.abstract_text,
                Self::encode_list(&paper.fields_of_study)?,
                paper.citation_count,
                &paper.url,
            ],
        )?;
        Ok(PaperId::new(self.conn.last_insert_rowid()))
    }

    fn validate_doi(paper: &Paper) -> Result<(), StoreError> {
        if paper.doi.trim().is_empty() {
            return Err(StoreError::InvalidData("DOI must not be empty".to_string()));
        }
        Ok(())
    }
}

impl PaperCorpus for SqliteStore {
    type Error = StoreError;

    fn find_page(
        &self,
        filter: &CorpusFilter,
        after: Option<PaperId>,
        limit: usize,
    ) -> Result<Vec<CorpusItem>, Self::Error> {
        let mut sql = String::from("SELECT id, abstract, authors, year FROM papers");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        Self::push_corpus_conditions(filter, &mut sql, &mut params);

        if let Some(after) = after {
            sql.push_str(" AND id > ?");
            params.push(Box::new(after.value()));
        }

        sql.push_str(" ORDER BY id ASC LIMIT ?");
        params.push(Box::new(limit as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let items = stmt
            .query_map(&param_refs[..], |row| {
                Ok(CorpusItem {
                    id: PaperId::new(row.get(0)?),
                    abstract_text: row.get(1)?,
                    authors: Self::decode_list(row, 2)?,
                    year: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    fn count(&self, filter: &CorpusFilter) -> Result<usize, Self::Error> {
        let mut sql = String::from("SELECT COUNT(*) FROM papers");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        Self::push_corpus_conditions(filter, &mut sql, &mut params);

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let count: i64 = self.conn.query_row(&sql, &param_refs[..], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl SkillSink for SqliteStore {
    type Error = StoreError;

    fn has_results(&self, paper: PaperId, model: &str) -> Result<bool, Self::Error> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM extracted_skills WHERE paper_id = ?1 AND embedding_model = ?2)",
            params![paper.value(), model],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn record(&mut self, skill: ExtractedSkill) -> Result<ExtractionId, Self::Error> {
        insert_skill(&self.conn, &skill)?;
        Ok(skill.id)
    }

    /// Writes the whole batch in one transaction
    fn record_batch(&mut self, skills: Vec<ExtractedSkill>) -> Result<usize, Self::Error> {
        let tx = self.conn.transaction()?;
        for skill in &skills {
            insert_skill(&tx, skill)?;
        }
        tx.commit()?;
        Ok(skills.len())
    }
}

fn insert_skill(conn: &Connection, skill: &ExtractedSkill) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO extracted_skills (id, paper_id, skill_name, skill_uri, confidence, author_name, embedding_model, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            SqliteStore::extraction_id_to_bytes(skill.id),
            skill.paper_id.value(),
            &skill.skill_name,
            &skill.skill_uri,
            skill.confidence as f64,
            &skill.author_name,
            &skill.embedding_model,
            skill.created_at as i64,
        ],
    )?;
    Ok(())
}

impl PaperCatalog for SqliteStore {
    type Error = StoreError;

    fn insert_paper(&mut self, paper: &Paper) -> Result<PaperId, Self::Error> {
        Self::validate_doi(paper)?;
        if self.paper_id_for_doi(paper.doi.trim())?.is_some() {
            return Err(StoreError::Duplicate(paper.doi.clone()));
        }
        self.insert_row(paper)
    }

    fn get_or_create_by_doi(&mut self, paper: &Paper) -> Result<(PaperId, bool), Self::Error> {
        Self::validate_doi(paper)?;
        match self.paper_id_for_doi(paper.doi.trim())? {
            Some(id) => Ok((id, false)),
            None => Ok((self.insert_row(paper)?, true)),
        }
    }

    fn get_paper(&self, id: PaperId) -> Result<Option<Paper>, Self::Error> {
        let sql = format!("SELECT {} FROM papers WHERE id = ?1", PAPER_COLUMNS);
        let paper = self
            .conn
            .query_row(&sql, params![id.value()], Self::row_to_paper)
            .optional()?;
        Ok(paper)
    }

    fn update_paper(&mut self, paper: &Paper) -> Result<(), Self::Error> {
        let id = paper
            .id
            .ok_or_else(|| StoreError::InvalidData("Cannot update a paper without an id".to_string()))?;
        Self::validate_doi(paper)?;

        if let Some(other) = self.paper_id_for_doi(paper.doi.trim())? {
            if other != id {
                return Err(StoreError::Duplicate(paper.doi.clone()));
            }
        }

        let updated = self.conn.execute(
            "UPDATE papers SET title = ?1, authors = ?2, year = ?3, doi = ?4, venue = ?5, abstract = ?6,
             fields_of_study = ?7, citation_count = ?8, url = ?9 WHERE id = ?10",
            params![
                &paper.title,
                Self::encode_list(&paper.authors)?,
                paper.year,
                paper.doi.trim(),
                &paper.venue,
                &paper.abstract_text,
                Self::encode_list(&paper.fields_of_study)?,
                paper.citation_count,
                &paper.url,
                id.value(),
            ],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn delete_paper(&mut self, id: PaperId) -> Result<bool, Self::Error> {
        let deleted = self
            .conn
            .execute("DELETE FROM papers WHERE id = ?1", params![id.value()])?;
        Ok(deleted > 0)
    }

    fn list_papers(&self, limit: usize, offset: usize) -> Result<Vec<Paper>, Self::Error> {
        let sql = format!(
            "SELECT {} FROM papers ORDER BY title ASC, id ASC LIMIT ?1 OFFSET ?2",
            PAPER_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let papers = stmt
            .query_map(params![limit as i64, offset as i64], Self::row_to_paper)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(papers)
    }

    fn papers_by_author(&self, author: &str) -> Result<Vec<Paper>, Self::Error> {
        let sql = format!(
            "SELECT {} FROM papers WHERE author_matches(authors, ?1) ORDER BY title ASC, id ASC",
            PAPER_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let papers = stmt
            .query_map(params![author.trim()], Self::row_to_paper)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(papers)
    }

    fn skills_for_paper(
        &self,
        id: PaperId,
        model: Option<&str>,
    ) -> Result<Vec<ExtractedSkill>, Self::Error> {
        let mut sql = format!("SELECT {} FROM extracted_skills WHERE paper_id = ?", SKILL_COLUMNS);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(id.value())];

        if let Some(model) = model {
            sql.push_str(" AND embedding_model = ?");
            params.push(Box::new(model.to_string()));
        }

        sql.push_str(" ORDER BY rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let skills = stmt
            .query_map(&param_refs[..], Self::row_to_skill)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(skills)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_id_bytes_roundtrip() {
        let id = ExtractionId::new();
        let bytes = SqliteStore::extraction_id_to_bytes(id);
        assert_eq!(bytes.len(), 16);
        assert_eq!(SqliteStore::bytes_to_extraction_id(&bytes).unwrap(), id);
        assert!(SqliteStore::bytes_to_extraction_id(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_sql_functions() {
        let store = SqliteStore::new(":memory:").unwrap();

        let matches: bool = store
            .conn
            .query_row(
                "SELECT author_matches(?1, ?2)",
                params![r#"["Bob Stone","Alice Wong"]"#, "ALICE"],
                |row| row.get(0),
            )
            .unwrap();
        assert!(matches);

        let blank: bool = store
            .conn
            .query_row("SELECT has_text(?1)", params![" \n\t"], |row| row.get(0))
            .unwrap();
        assert!(!blank);
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let store = SqliteStore::new(":memory:").unwrap();
        let enabled: i64 = store
            .conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
