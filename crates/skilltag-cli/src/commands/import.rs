//! Import command implementation.

use crate::cli::ImportArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use serde::Deserialize;
use skilltag_domain::traits::PaperCatalog;
use skilltag_domain::Paper;
use skilltag_store::SqliteStore;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// Execute the import command.
pub fn execute_import(args: ImportArgs, store: &mut SqliteStore, formatter: &Formatter) -> Result<()> {
    let json_data = read_input(&args.file)?;
    let papers = parse_papers(&json_data)?;

    let (created, existing) = import_papers(store, &papers)?;
    println!("{}", formatter.format_import(created, existing)?);
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

/// Parse a JSON array of paper records into unsaved papers
pub fn parse_papers(json_data: &str) -> Result<Vec<Paper>> {
    let defs: Vec<PaperDefinition> = serde_json::from_str(json_data)?;
    if defs.is_empty() {
        return Err(CliError::InvalidInput("No papers provided".to_string()));
    }

    defs.into_iter()
        .enumerate()
        .map(|(i, def)| def.into_paper().map_err(|e| CliError::InvalidInput(format!("Record {}: {}", i, e))))
        .collect()
}

/// Get-or-create each paper by DOI; returns (created, already present)
pub fn import_papers<C>(catalog: &mut C, papers: &[Paper]) -> Result<(usize, usize)>
where
    C: PaperCatalog,
    CliError: From<C::Error>,
{
    let mut created = 0;
    let mut existing = 0;

    for paper in papers {
        let (id, is_new) = catalog.get_or_create_by_doi(paper)?;
        if is_new {
            debug!("Created paper {} ({})", id, paper.doi);
            created += 1;
        } else {
            debug!("Paper {} already present as {}", paper.doi, id);
            existing += 1;
        }
    }

    Ok((created, existing))
}

/// Paper record as found in import files
///
/// Accepts the crawler's field names (`fieldsOfStudy`, `citationCount`,
/// `externalIds.DOI`) alongside snake_case ones.
#[derive(Debug, Deserialize)]
struct PaperDefinition {
    title: String,
    #[serde(default)]
    authors: Option<AuthorList>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    doi: Option<String>,
    #[serde(default, rename = "externalIds")]
    external_ids: Option<ExternalIds>,
    #[serde(default)]
    venue: Option<String>,
    #[serde(default, rename = "abstract", alias = "abstract_text")]
    abstract_text: Option<String>,
    #[serde(default, alias = "fieldsOfStudy")]
    fields_of_study: Option<TextList>,
    #[serde(default, alias = "citationCount")]
    citation_count: Option<i64>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExternalIds {
    #[serde(default, rename = "DOI")]
    doi: Option<String>,
}

/// Either a comma-joined string or an array of entries
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AuthorList {
    Joined(String),
    List(Vec<AuthorDef>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AuthorDef {
    Name(String),
    Named {
        name: String,
    },
    Split {
        #[serde(default)]
        given: Option<String>,
        #[serde(default)]
        family: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextList {
    Joined(String),
    List(Vec<String>),
}

impl AuthorDef {
    fn full_name(self) -> String {
        match self {
            AuthorDef::Name(name) | AuthorDef::Named { name } => name.trim().to_string(),
            AuthorDef::Split { given, family } => format!(
                "{} {}",
                given.unwrap_or_default().trim(),
                family.unwrap_or_default().trim()
            )
            .trim()
            .to_string(),
        }
    }
}

impl AuthorList {
    fn into_names(self) -> Vec<String> {
        let names: Vec<String> = match self {
            AuthorList::Joined(joined) => split_joined(&joined),
            AuthorList::List(entries) => entries.into_iter().map(AuthorDef::full_name).collect(),
        };
        names.into_iter().filter(|n| !n.is_empty()).collect()
    }
}

impl TextList {
    fn into_values(self) -> Vec<String> {
        match self {
            TextList::Joined(joined) => split_joined(&joined),
            TextList::List(values) => values
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect(),
        }
    }
}

fn split_joined(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl PaperDefinition {
    fn into_paper(self) -> std::result::Result<Paper, String> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err("title must not be empty".to_string());
        }

        let doi = non_blank(self.doi)
            .or_else(|| non_blank(self.external_ids.and_then(|ids| ids.doi)))
            .ok_or_else(|| format!("paper '{}' has no DOI", title))?;

        let mut paper = Paper::new(title, doi);
        paper.authors = self.authors.map(AuthorList::into_names).unwrap_or_default();
        paper.year = self.year;
        paper.venue = non_blank(self.venue);
        paper.abstract_text = self.abstract_text;
        paper.fields_of_study = self.fields_of_study.map(TextList::into_values).unwrap_or_default();
        paper.citation_count = self.citation_count.unwrap_or(0);
        paper.url = non_blank(self.url);
        Ok(paper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skilltag_domain::PaperId;

    #[test]
    fn test_parse_snake_case_record() {
        let json = r#"[
            {
                "title": "Rust for Data Pipelines",
                "authors": ["Alice Smith", "Bob Jones"],
                "year": 2021,
                "doi": "10.1000/rust",
                "abstract": "We use Rust for data analysis.",
                "fields_of_study": ["Computer Science"],
                "citation_count": 4
            }
        ]"#;

        let papers = parse_papers(json).unwrap();
        assert_eq!(papers.len(), 1);
        let paper = &papers[0];
        assert_eq!(paper.authors, vec!["Alice Smith", "Bob Jones"]);
        assert_eq!(paper.doi, "10.1000/rust");
        assert_eq!(paper.year, Some(2021));
        assert_eq!(paper.fields_of_study, vec!["Computer Science"]);
        assert_eq!(paper.citation_count, 4);
        assert!(paper.id.is_none());
    }

    #[test]
    fn test_parse_crawler_record() {
        let json = r#"[
            {
                "title": "Cooking with Graphs",
                "authors": [{"given": "Carol", "family": "King"}, {"name": "Dan Brown"}],
                "externalIds": {"DOI": "10.1000/cook"},
                "fieldsOfStudy": "Mathematics, Biology",
                "citationCount": 12
            }
        ]"#;

        let papers = parse_papers(json).unwrap();
        let paper = &papers[0];
        assert_eq!(paper.authors, vec!["Carol King", "Dan Brown"]);
        assert_eq!(paper.doi, "10.1000/cook");
        assert_eq!(paper.fields_of_study, vec!["Mathematics", "Biology"]);
        assert_eq!(paper.citation_count, 12);
        assert!(paper.abstract_text.is_none());
    }

    #[test]
    fn test_joined_author_string() {
        let json = r#"[{"title": "T", "doi": "10.1/t", "authors": "Alice Smith, Bob Jones, "}]"#;
        let papers = parse_papers(json).unwrap();
        assert_eq!(papers[0].authors, vec!["Alice Smith", "Bob Jones"]);
    }

    #[test]
    fn test_missing_doi_rejected() {
        let json = r#"[{"title": "No identifier"}]"#;
        let err = parse_papers(json).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(ref msg) if msg.contains("Record 0")));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(parse_papers("[]"), Err(CliError::InvalidInput(_))));
        assert!(matches!(parse_papers("{"), Err(CliError::Serialization(_))));
    }

    #[test]
    fn test_import_is_get_or_create() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let json = r#"[
            {"title": "A", "doi": "10.1/a"},
            {"title": "B", "doi": "10.1/b"},
            {"title": "A again", "doi": "10.1/a"}
        ]"#;
        let papers = parse_papers(json).unwrap();

        let (created, existing) = import_papers(&mut store, &papers).unwrap();
        assert_eq!((created, existing), (2, 1));

        let (created, existing) = import_papers(&mut store, &papers).unwrap();
        assert_eq!((created, existing), (0, 3));

        let first = store.get_paper(PaperId::new(1)).unwrap().unwrap();
        assert_eq!(first.title, "A");
    }
}
